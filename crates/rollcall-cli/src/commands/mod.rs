//! Subcommands and the wiring they share

pub mod backend;
pub mod completions;
pub mod config;
pub mod kiosk;
pub mod news;
pub mod record;
pub mod roster;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use rollcall_core::config::Config;
use rollcall_core::domain::AdminGate;
use rollcall_core::ports::{IAttendanceBackend, IClock, InMemorySessionHistory, SystemClock};
use rollcall_core::usecases::{ManageRosterUseCase, NewsUseCase, RecordAttendanceUseCase};
use rollcall_gateway::build_backend;

use crate::output::OutputFormat;

/// Settings resolved from the global flags
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config_path: PathBuf,
    pub config: Config,
    pub format: OutputFormat,
}

/// Use cases wired to the configured backend
pub struct App {
    pub backend: Arc<dyn IAttendanceBackend>,
    pub attendance: RecordAttendanceUseCase,
    pub roster: ManageRosterUseCase,
    pub news: NewsUseCase,
    pub gate: AdminGate,
}

impl App {
    /// Builds the backend chosen by `config` and the use cases around it
    ///
    /// # Errors
    /// Returns an error if the backend's HTTP client cannot be built
    pub fn build(config: &Config) -> Result<Self> {
        let backend = build_backend(config)?;
        Ok(Self::with_backend(backend, config.admin.password.clone()))
    }

    pub fn with_backend(backend: Arc<dyn IAttendanceBackend>, admin_password: Option<String>) -> Self {
        let clock: Arc<dyn IClock> = Arc::new(SystemClock);
        Self {
            attendance: RecordAttendanceUseCase::new(
                Arc::clone(&backend),
                Arc::new(InMemorySessionHistory::new()),
                Arc::clone(&clock),
            ),
            roster: ManageRosterUseCase::new(Arc::clone(&backend)),
            news: NewsUseCase::new(Arc::clone(&backend), clock),
            gate: AdminGate::new(admin_password),
            backend,
        }
    }
}
