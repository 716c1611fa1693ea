//! Roster command - Load and print the roster cascade

use anyhow::{Context, Result};
use clap::Args;

use rollcall_core::domain::{OrgUnit, RosterSnapshot};

use super::{App, CliContext};
use crate::output::{get_formatter, OutputFormatter};

/// Arguments for the roster subcommand
#[derive(Debug, Args)]
pub struct RosterCommand {}

impl RosterCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        let app = App::build(&ctx.config)?;
        app.roster.refresh().await;
        let roster = app.roster.snapshot();

        if ctx.format.is_json() {
            let json = serde_json::to_value(&roster).context("Failed to serialize roster")?;
            formatter.print_json(&json);
        } else {
            print_roster(formatter.as_ref(), &roster);
        }
        Ok(())
    }
}

/// Prints employees by branch, then students by grade and area
pub fn print_roster(formatter: &dyn OutputFormatter, roster: &RosterSnapshot) {
    if roster.is_empty() {
        formatter.warn("The roster is empty");
        return;
    }

    formatter.success(&format!("Roster ({} people)", roster.len()));

    let branches = roster.branches();
    if !branches.is_empty() {
        formatter.info("Employees");
        for branch in branches {
            let names = roster.names(&OrgUnit::branch(branch));
            formatter.info(&format!("  {branch}: {}", names.join(", ")));
        }
    }

    let grades = roster.grades();
    if !grades.is_empty() {
        formatter.info("Students");
        for grade in grades {
            for area in roster.areas(grade) {
                let names = roster.names(&OrgUnit::grade_area(grade, area));
                formatter.info(&format!("  {grade} / {area}: {}", names.join(", ")));
            }
        }
    }
}
