//! Integration tests for rollcall-gateway
//!
//! Uses wiremock to stand in for the workflow webhook, the script webhook
//! and the spreadsheet values API, and verifies request shapes, reply
//! interpretation, and the timeout/retry policy end to end.

mod common;

mod test_retry;
mod test_script;
mod test_sheets;
mod test_workflow;
