//! Backend command - Inspect and check the configured attendance backend

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use rollcall_gateway::build_backend;

use super::CliContext;
use crate::output::get_formatter;

/// Backend subcommands
#[derive(Debug, Subcommand)]
pub enum BackendCommand {
    /// Show which backend is in use, its endpoints and retry settings
    Info,
    /// Run the backend's connection check
    Check,
}

impl BackendCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        let backend = build_backend(&ctx.config)?;
        let details = backend.info();

        match self {
            BackendCommand::Info => {
                if ctx.format.is_json() {
                    let json = serde_json::to_value(&details)
                        .context("Failed to serialize backend info")?;
                    formatter.print_json(&json);
                    return Ok(());
                }

                formatter.success(&format!("Backend: {}", details.kind));
                if !details.configured {
                    formatter.warn("No backend configured; records stay in this session only");
                    return Ok(());
                }
                for (name, url) in &details.endpoints {
                    formatter.field(name, url);
                }
                formatter.field("timeout", &format!("{} ms", details.timeout_ms));
                formatter.field("attempts", &details.max_attempts.to_string());
                formatter.field("retry delay", &format!("{} ms", details.retry_delay_ms));
                formatter.field(
                    "retry timeouts",
                    if details.retry_on_timeout { "yes" } else { "no" },
                );
            }
            BackendCommand::Check => {
                info!(backend = %details.kind, "Checking backend connection");
                match backend.check_connection().await {
                    Ok(message) => {
                        if ctx.format.is_json() {
                            formatter.print_json(&serde_json::json!({
                                "backend": details.kind,
                                "connected": true,
                                "message": message,
                            }));
                        } else {
                            formatter.success(&message);
                        }
                    }
                    Err(failure) => {
                        if ctx.format.is_json() {
                            formatter.print_json(&serde_json::json!({
                                "backend": details.kind,
                                "connected": false,
                                "failure": failure,
                            }));
                        } else {
                            formatter.error(&format!("{} backend check failed", details.kind));
                            formatter.info(&failure.reason);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
