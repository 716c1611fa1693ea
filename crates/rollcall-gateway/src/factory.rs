//! Backend selection from configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use rollcall_core::config::Config;
use rollcall_core::ports::{BackendKind, IAttendanceBackend};

use crate::offline::OfflineBackend;
use crate::script::ScriptWebhookBackend;
use crate::sheets::SheetsBackend;
use crate::workflow::WorkflowWebhookBackend;

/// Builds the backend chosen by [`Config::selected_backend`]
///
/// The first backend in `backend.preference` with complete settings wins.
/// When none is complete, the offline backend is used.
///
/// # Errors
/// Returns an error if the selected backend's HTTP client cannot be built
pub fn build_backend(config: &Config) -> Result<Arc<dyn IAttendanceBackend>> {
    let kind = config.selected_backend();

    let backend: Arc<dyn IAttendanceBackend> = match kind {
        BackendKind::Workflow => Arc::new(
            WorkflowWebhookBackend::from_config(config)
                .context("Failed to build workflow webhook backend")?,
        ),
        BackendKind::Script => Arc::new(
            ScriptWebhookBackend::from_config(config)
                .context("Failed to build script webhook backend")?,
        ),
        BackendKind::Sheets => Arc::new(
            SheetsBackend::from_config(config).context("Failed to build sheets backend")?,
        ),
        BackendKind::Offline => {
            warn!("No backend configured, attendance will only be kept for this session");
            Arc::new(OfflineBackend::new())
        }
    };

    info!(backend = %kind, "Attendance backend selected");
    Ok(backend)
}
