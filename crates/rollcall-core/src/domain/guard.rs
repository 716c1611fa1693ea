//! Duplicate attendance guard
//!
//! Decides whether a candidate event may proceed to a backend, based on the
//! events already accepted in this session. The check is local and
//! synchronous; it only sees this session, so a backend's own duplicate
//! signal still has the final word for records made elsewhere.

use tracing::{debug, info};

use super::attendance::AttendanceEvent;

/// Result of a duplicate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// No same-day record for this person: safe to submit
    Admitted,
    /// The person already has a record for the event's date
    Rejected {
        /// The record accepted earlier in this session
        existing: Box<AttendanceEvent>,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Enforces one attendance record per person per day
pub struct DuplicateGuard;

impl DuplicateGuard {
    /// Checks a candidate against the session history
    ///
    /// Matches on exact `person_name` and `occurred_date`; the action is
    /// irrelevant, so a logout after a login on the same day is rejected too.
    pub fn check_and_admit(event: &AttendanceEvent, history: &[AttendanceEvent]) -> Admission {
        let existing = history
            .iter()
            .find(|e| e.same_person_same_day(event.person_name(), event.occurred_date()));

        match existing {
            Some(existing) => {
                info!(
                    name = %event.person_name(),
                    date = %event.occurred_date(),
                    existing_action = %existing.action(),
                    existing_time = existing.occurred_time(),
                    "Duplicate attendance rejected locally"
                );
                Admission::Rejected {
                    existing: Box::new(existing.clone()),
                }
            }
            None => {
                debug!(name = %event.person_name(), "No same-day record, admitted");
                Admission::Admitted
            }
        }
    }
}
