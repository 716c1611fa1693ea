//! Offline fallback backend
//!
//! Used when no remote service is configured. Accepts every submission
//! without sending it anywhere, serves an empty roster and no news (the
//! news board substitutes its fallback banner).

use std::collections::BTreeMap;

use tracing::debug;

use rollcall_core::domain::{AttendanceEvent, NewsItem, RosterSnapshot};
use rollcall_core::ports::{
    BackendFailure, BackendInfo, BackendKind, BackendResult, IAttendanceBackend,
};

/// [`IAttendanceBackend`] that never touches the network
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

impl OfflineBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IAttendanceBackend for OfflineBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            kind: BackendKind::Offline,
            configured: false,
            endpoints: BTreeMap::new(),
            timeout_ms: 0,
            max_attempts: 0,
            retry_delay_ms: 0,
            retry_on_timeout: false,
        }
    }

    async fn submit_attendance(&self, event: &AttendanceEvent) -> BackendResult {
        debug!(name = %event.person_name(), "No backend configured, accepting offline");
        BackendResult::offline()
    }

    async fn fetch_roster(&self) -> Result<RosterSnapshot, BackendFailure> {
        Ok(RosterSnapshot::new())
    }

    async fn fetch_news(&self) -> Result<Vec<NewsItem>, BackendFailure> {
        Ok(Vec::new())
    }

    async fn update_news(&self, _index: usize, _item: &NewsItem) -> Result<(), BackendFailure> {
        Err(BackendFailure::unsupported("Updating news", BackendKind::Offline))
    }

    async fn check_connection(&self) -> Result<String, BackendFailure> {
        Ok("Offline mode: no backend configured".to_string())
    }
}
