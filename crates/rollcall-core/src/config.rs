//! Configuration module for Rollcall.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ports::BackendKind;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Rollcall.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub workflow: WorkflowConfig,
    pub script: ScriptConfig,
    pub sheets: SheetsConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// Backend selection and request policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backends to try, in order; the first fully configured one is used.
    pub preference: Vec<BackendKind>,
    /// Per-attempt request timeout (milliseconds).
    pub timeout_ms: u64,
    /// Total attempts per logical request, including the first.
    pub max_attempts: u32,
    /// Fixed pause between attempts (milliseconds).
    pub retry_delay_ms: u64,
    /// Whether a timed-out attempt is retried.
    pub retry_on_timeout: bool,
    /// How many times to re-poll the roster while a workflow is still starting.
    pub roster_poll_attempts: u32,
    /// Pause between roster re-polls (milliseconds).
    pub roster_poll_delay_ms: u64,
}

/// Workflow-automation webhook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Base URL the `raja-*` webhook paths are appended to.
    pub base_url: Option<String>,
}

/// Script webhook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Deployed script URL receiving form-encoded attendance.
    pub url: Option<String>,
}

/// Spreadsheet values API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// API root, e.g. `https://sheets.googleapis.com/v4/spreadsheets`.
    pub base_url: String,
    pub sheet_id: Option<String>,
    /// API key used for reads.
    pub api_key: Option<String>,
    /// OAuth bearer token; required by the API for writes.
    pub access_token: Option<String>,
}

/// Admin panel settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared admin password. `None` keeps the admin panel locked.
    pub password: Option<String>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/rollcall/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("rollcall")
            .join("config.yaml")
    }

    /// Whether `kind` has every setting it needs to be used.
    pub fn is_complete(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Workflow => present(&self.workflow.base_url),
            BackendKind::Script => present(&self.script.url),
            BackendKind::Sheets => {
                present(&self.sheets.sheet_id)
                    && (present(&self.sheets.api_key) || present(&self.sheets.access_token))
            }
            BackendKind::Offline => true,
        }
    }

    /// The first backend in the preference list whose settings are complete,
    /// or [`BackendKind::Offline`] when there is none.
    pub fn selected_backend(&self) -> BackendKind {
        self.backend
            .preference
            .iter()
            .copied()
            .find(|kind| self.is_complete(*kind))
            .unwrap_or(BackendKind::Offline)
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn roster_poll_delay(&self) -> Duration {
        Duration::from_millis(self.roster_poll_delay_ms)
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            preference: vec![
                BackendKind::Workflow,
                BackendKind::Script,
                BackendKind::Sheets,
            ],
            timeout_ms: 30_000,
            max_attempts: 3,
            retry_delay_ms: 1_000,
            retry_on_timeout: false,
            roster_poll_attempts: 3,
            roster_poll_delay_ms: 2_000,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
            sheet_id: None,
            api_key: None,
            access_token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"backend.timeout_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `backend.max_attempts`.
const MAX_ATTEMPTS_LIMIT: u32 = 10;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. An incomplete
    /// backend section is not an error; that backend is simply skipped.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- backend ---
        if self.backend.preference.is_empty() {
            errors.push(ValidationError {
                field: "backend.preference".into(),
                message: "must list at least one backend".into(),
            });
        }
        if self.backend.timeout_ms == 0 {
            errors.push(ValidationError {
                field: "backend.timeout_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.backend.max_attempts == 0 || self.backend.max_attempts > MAX_ATTEMPTS_LIMIT {
            errors.push(ValidationError {
                field: "backend.max_attempts".into(),
                message: format!("must be in range 1..={MAX_ATTEMPTS_LIMIT}"),
            });
        }
        if self.backend.roster_poll_attempts == 0 {
            errors.push(ValidationError {
                field: "backend.roster_poll_attempts".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- urls ---
        check_url(&mut errors, "workflow.base_url", self.workflow.base_url.as_deref());
        check_url(&mut errors, "script.url", self.script.url.as_deref());
        check_url(&mut errors, "sheets.base_url", Some(self.sheets.base_url.as_str()));

        // --- sheets ---
        if present(&self.sheets.sheet_id)
            && !present(&self.sheets.api_key)
            && !present(&self.sheets.access_token)
        {
            errors.push(ValidationError {
                field: "sheets.api_key".into(),
                message: "an api_key or access_token is required when sheet_id is set".into(),
            });
        }

        // --- admin ---
        if self.admin.password.as_deref() == Some("") {
            errors.push(ValidationError {
                field: "admin.password".into(),
                message: "must not be empty; omit it to lock the admin panel".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(ValidationError {
            field: field.into(),
            message: format!("'{value}' is not an http(s) URL"),
        });
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use rollcall_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .workflow_base_url("https://automation.example.org/webhook")
///     .backend_timeout_ms(10_000)
///     .admin_password("s3cret")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- backend ---

    pub fn backend_preference(mut self, preference: Vec<BackendKind>) -> Self {
        self.config.backend.preference = preference;
        self
    }

    pub fn backend_timeout_ms(mut self, ms: u64) -> Self {
        self.config.backend.timeout_ms = ms;
        self
    }

    pub fn backend_max_attempts(mut self, n: u32) -> Self {
        self.config.backend.max_attempts = n;
        self
    }

    pub fn backend_retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.backend.retry_delay_ms = ms;
        self
    }

    pub fn backend_retry_on_timeout(mut self, retry: bool) -> Self {
        self.config.backend.retry_on_timeout = retry;
        self
    }

    pub fn backend_roster_poll(mut self, attempts: u32, delay_ms: u64) -> Self {
        self.config.backend.roster_poll_attempts = attempts;
        self.config.backend.roster_poll_delay_ms = delay_ms;
        self
    }

    // --- services ---

    pub fn workflow_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.workflow.base_url = Some(url.into());
        self
    }

    pub fn script_url(mut self, url: impl Into<String>) -> Self {
        self.config.script.url = Some(url.into());
        self
    }

    pub fn sheets_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.sheets.base_url = url.into();
        self
    }

    pub fn sheets_sheet_id(mut self, id: impl Into<String>) -> Self {
        self.config.sheets.sheet_id = Some(id.into());
        self
    }

    pub fn sheets_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.sheets.api_key = Some(key.into());
        self
    }

    pub fn sheets_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.sheets.access_token = Some(token.into());
        self
    }

    // --- admin ---

    pub fn admin_password(mut self, password: impl Into<String>) -> Self {
        self.config.admin.password = Some(password.into());
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
