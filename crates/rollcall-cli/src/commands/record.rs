//! Record command - Submit one attendance action
//!
//! Provides the `rollcall record` CLI command which:
//! 1. Resolves the person's placement (from flags, or from the roster)
//! 2. Runs the duplicate guard and submits to the configured backend
//! 3. Prints the single outcome message

use anyhow::{Context, Result};
use clap::Args;

use rollcall_core::domain::{AttendanceAction, OrgUnit, PersonCategory, PersonName};
use rollcall_core::usecases::{AttendanceOutcome, AttendanceRequest};

use super::{App, CliContext};
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Arguments for the record subcommand
#[derive(Debug, Args)]
pub struct RecordCommand {
    /// Person's name as listed in the roster
    #[arg(long)]
    pub name: String,

    /// login, logout, present or absent
    #[arg(long)]
    pub action: AttendanceAction,

    /// Employee or Student (derived from the placement when omitted)
    #[arg(long)]
    pub category: Option<PersonCategory>,

    /// Employee branch
    #[arg(long, conflicts_with_all = ["grade", "area"])]
    pub branch: Option<String>,

    /// Student grade
    #[arg(long)]
    pub grade: Option<String>,

    /// Student area within the grade
    #[arg(long)]
    pub area: Option<String>,

    /// Reason, typically for absences
    #[arg(long)]
    pub reason: Option<String>,
}

impl RecordCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        let app = App::build(&ctx.config)?;

        let mut org_unit = placement_from_flags(
            self.branch.as_deref(),
            self.grade.as_deref(),
            self.area.as_deref(),
        );
        let no_placement_flags =
            self.branch.is_none() && self.grade.is_none() && self.area.is_none();
        if no_placement_flags {
            if let Ok(name) = PersonName::new(self.name.as_str()) {
                app.roster.refresh().await;
                org_unit = app.roster.placement_of(&name);
            }
        }

        let request = AttendanceRequest {
            name: self.name.clone(),
            category: self
                .category
                .or_else(|| org_unit.as_ref().map(OrgUnit::category)),
            org_unit,
            action: Some(self.action),
            reason: self.reason.clone(),
        };

        let outcome = app.attendance.record_attendance(request).await;
        report_outcome(formatter.as_ref(), ctx.format, &outcome)
    }
}

/// The org unit named by the placement flags, if they name a complete one
pub fn placement_from_flags(
    branch: Option<&str>,
    grade: Option<&str>,
    area: Option<&str>,
) -> Option<OrgUnit> {
    fn present(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|v| !v.is_empty())
    }
    match (present(branch), present(grade), present(area)) {
        (Some(branch), None, None) => Some(OrgUnit::branch(branch)),
        (None, Some(grade), Some(area)) => Some(OrgUnit::grade_area(grade, area)),
        _ => None,
    }
}

/// Prints an attendance outcome as one message (or one JSON document)
///
/// # Errors
/// Returns an error if the outcome cannot be serialized
pub fn report_outcome(
    formatter: &dyn OutputFormatter,
    format: OutputFormat,
    outcome: &AttendanceOutcome,
) -> Result<()> {
    let message = outcome.message();

    if format.is_json() {
        let mut json = serde_json::to_value(outcome).context("Failed to serialize outcome")?;
        if let Some(object) = json.as_object_mut() {
            object.insert("message".to_string(), serde_json::Value::String(message));
        }
        formatter.print_json(&json);
        return Ok(());
    }

    match outcome {
        AttendanceOutcome::Recorded { .. } | AttendanceOutcome::RecordedOffline { .. } => {
            formatter.success(&message)
        }
        AttendanceOutcome::AlreadyRecorded { .. } | AttendanceOutcome::SavedLocallyOnly { .. } => {
            formatter.warn(&message)
        }
        AttendanceOutcome::SelectionRequired { .. } => formatter.error(&message),
    }
    Ok(())
}
