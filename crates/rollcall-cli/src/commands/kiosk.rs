//! Kiosk command - Interactive attendance session over stdin
//!
//! One line per action. Everyone can mark attendance and browse the news;
//! roster edits, absences and news edits need `admin <password>` first.
//! Arguments containing spaces can be double-quoted.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use rollcall_core::domain::{AdminSession, AttendanceAction, OrgUnit, PersonName};
use rollcall_core::usecases::{AttendanceRequest, NewsEdit, PublishOutcome};

use super::news::describe;
use super::record::report_outcome;
use super::roster::print_roster;
use super::{App, CliContext};
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

const HELP: &[(&str, &str)] = &[
    ("mark <action> <name>", "Record login, logout, present or absent"),
    ("log", "Today's records, newest first"),
    ("clear", "Clear today's log"),
    ("roster", "Show the roster"),
    ("news [next|prev|<n>]", "Show, rotate or jump to a news item"),
    ("admin <password>", "Unlock admin commands"),
    ("lock", "Lock admin commands again"),
    ("absent <name> [-- reason]", "Mark someone absent (admin)"),
    ("add-employee <branch> <name>", "Add an employee to the roster (admin)"),
    ("add-student <grade> <area> <name>", "Add a student to the roster (admin)"),
    ("remove <name>", "Remove someone from the roster (admin)"),
    ("headline <text>", "Edit the current news headline (admin)"),
    ("subtitle <text>", "Edit the current news subtitle (admin)"),
    ("image <url|none>", "Set or remove the current news image (admin)"),
    ("show-image on|off", "Toggle the current news image (admin)"),
    ("publish", "Save the current news item to the backend (admin)"),
    ("help", "Show this list"),
    ("quit", "Leave the kiosk"),
];

/// Arguments for the kiosk subcommand
#[derive(Debug, Args)]
pub struct KioskCommand {}

impl KioskCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let app = App::build(&ctx.config)?;
        let people = app.roster.refresh().await;
        let items = app.news.load().await;
        info!(people, news = items, "Kiosk ready");

        let mut kiosk = Kiosk::new(app, ctx.format);
        kiosk.banner();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            if !ctx.format.is_json() {
                write_prompt(&mut std::io::stdout()).context("Failed to write prompt")?;
            }
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                break;
            };

            match parse_line(&line) {
                Ok(None) => {}
                Ok(Some(KioskInput::Quit)) => break,
                Ok(Some(input)) => kiosk.handle(input).await?,
                Err(message) => kiosk.formatter.error(&message),
            }
        }

        info!("Kiosk closed");
        Ok(())
    }
}

// ============================================================================
// Input parsing
// ============================================================================

/// News navigation requested by `news`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsNav {
    Current,
    Next,
    Previous,
    /// Zero-based index
    GoTo(usize),
}

/// One parsed kiosk line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskInput {
    Mark { action: AttendanceAction, name: String },
    Log,
    Clear,
    Roster,
    News(NewsNav),
    Admin(String),
    Lock,
    Absent { name: String, reason: String },
    AddEmployee { branch: String, name: String },
    AddStudent { grade: String, area: String, name: String },
    Remove(String),
    Headline(String),
    Subtitle(String),
    Image(Option<String>),
    ShowImage(bool),
    Publish,
    Help,
    Quit,
}

/// Writes the input prompt and flushes it so it shows before the read
fn write_prompt(out: &mut impl Write) -> std::io::Result<()> {
    out.write_all(b"> ")?;
    out.flush()
}

/// Splits on whitespace, keeping double-quoted runs together
pub fn split_args(input: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("Unterminated quote".to_string());
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

fn unquote(text: &str) -> String {
    let text = text.trim();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .to_string()
}

/// Parses one kiosk line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<KioskInput>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "mark" => {
            let (action, name) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if action.is_empty() {
                return Err("Usage: mark <action> <name>".to_string());
            }
            let action = action.parse::<AttendanceAction>().map_err(|e| e.to_string())?;
            KioskInput::Mark {
                action,
                name: unquote(name),
            }
        }
        "log" => KioskInput::Log,
        "clear" => KioskInput::Clear,
        "roster" => KioskInput::Roster,
        "news" => KioskInput::News(match rest.to_ascii_lowercase().as_str() {
            "" => NewsNav::Current,
            "next" => NewsNav::Next,
            "prev" | "previous" => NewsNav::Previous,
            n => match n.parse::<usize>() {
                Ok(n) if n >= 1 => NewsNav::GoTo(n - 1),
                _ => return Err("Usage: news [next|prev|<n>]".to_string()),
            },
        }),
        "admin" => KioskInput::Admin(rest.to_string()),
        "lock" => KioskInput::Lock,
        "absent" => {
            let (name, reason) = rest.split_once("--").unwrap_or((rest, ""));
            KioskInput::Absent {
                name: unquote(name),
                reason: reason.trim().to_string(),
            }
        }
        "add-employee" => match split_args(rest)?.as_slice() {
            [branch, name @ ..] if !name.is_empty() => KioskInput::AddEmployee {
                branch: branch.clone(),
                name: name.join(" "),
            },
            _ => return Err("Usage: add-employee <branch> <name>".to_string()),
        },
        "add-student" => match split_args(rest)?.as_slice() {
            [grade, area, name @ ..] if !name.is_empty() => KioskInput::AddStudent {
                grade: grade.clone(),
                area: area.clone(),
                name: name.join(" "),
            },
            _ => return Err("Usage: add-student <grade> <area> <name>".to_string()),
        },
        "remove" => KioskInput::Remove(unquote(rest)),
        "headline" => KioskInput::Headline(rest.to_string()),
        "subtitle" => KioskInput::Subtitle(rest.to_string()),
        "image" => match rest {
            "" => return Err("Usage: image <url|none>".to_string()),
            r if r.eq_ignore_ascii_case("none") => KioskInput::Image(None),
            url => KioskInput::Image(Some(url.to_string())),
        },
        "show-image" => match rest.to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" => KioskInput::ShowImage(true),
            "off" | "false" | "no" => KioskInput::ShowImage(false),
            _ => return Err("Usage: show-image on|off".to_string()),
        },
        "publish" => KioskInput::Publish,
        "help" | "?" => KioskInput::Help,
        "quit" | "exit" => KioskInput::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };

    Ok(Some(input))
}

// ============================================================================
// Kiosk session
// ============================================================================

/// A running kiosk: the use cases plus the admin unlock state
pub struct Kiosk {
    app: App,
    admin: Option<AdminSession>,
    format: OutputFormat,
    formatter: Box<dyn OutputFormatter>,
}

impl Kiosk {
    pub fn new(app: App, format: OutputFormat) -> Self {
        Self {
            app,
            admin: None,
            format,
            formatter: get_formatter(format),
        }
    }

    fn banner(&self) {
        let info = self.app.backend.info();
        let current = self.app.news.current();
        self.formatter.success(&current.headline);
        if !current.subtitle.is_empty() {
            self.formatter.info(&current.subtitle);
        }
        self.formatter.field("backend", info.kind.as_str());
        self.formatter
            .field("roster", &format!("{} people", self.app.roster.snapshot().len()));
        self.formatter.info("Type 'help' for commands.");
    }

    /// Runs one parsed command
    ///
    /// # Errors
    /// Returns an error only if output cannot be serialized
    pub async fn handle(&mut self, input: KioskInput) -> Result<()> {
        if !matches!(input, KioskInput::Admin(_)) {
            debug!(?input, "Kiosk command");
        }
        match input {
            KioskInput::Mark { action, name } => self.mark(action, name).await,
            KioskInput::Log => self.show_log(),
            KioskInput::Clear => {
                self.app.attendance.clear_log();
                self.formatter.success("Today's log cleared");
                Ok(())
            }
            KioskInput::Roster => {
                let roster = self.app.roster.snapshot();
                if self.format.is_json() {
                    let json =
                        serde_json::to_value(&roster).context("Failed to serialize roster")?;
                    self.formatter.print_json(&json);
                } else {
                    print_roster(self.formatter.as_ref(), &roster);
                }
                Ok(())
            }
            KioskInput::News(nav) => self.navigate_news(nav),
            KioskInput::Admin(password) => {
                match self.app.gate.unlock(&password) {
                    Ok(session) => {
                        self.admin = Some(session);
                        self.formatter.success("Admin panel unlocked");
                    }
                    Err(e) => self.formatter.error(&e.to_string()),
                }
                Ok(())
            }
            KioskInput::Lock => {
                self.admin = None;
                self.formatter.success("Admin panel locked");
                Ok(())
            }
            KioskInput::Absent { name, reason } => self.mark_absent(name, reason).await,
            KioskInput::AddEmployee { branch, name } => {
                self.add_person(name, OrgUnit::branch(branch))
            }
            KioskInput::AddStudent { grade, area, name } => {
                self.add_person(name, OrgUnit::grade_area(grade, area))
            }
            KioskInput::Remove(name) => self.remove_person(name),
            KioskInput::Headline(text) => self.edit_news(NewsEdit {
                headline: Some(text),
                ..NewsEdit::default()
            }),
            KioskInput::Subtitle(text) => self.edit_news(NewsEdit {
                subtitle: Some(text),
                ..NewsEdit::default()
            }),
            KioskInput::Image(image) => self.edit_news(NewsEdit {
                show_image: Some(image.is_some()),
                image: Some(image),
                ..NewsEdit::default()
            }),
            KioskInput::ShowImage(show) => self.edit_news(NewsEdit {
                show_image: Some(show),
                ..NewsEdit::default()
            }),
            KioskInput::Publish => {
                let Some(admin) = self.require_admin() else {
                    return Ok(());
                };
                let outcome = self.app.news.publish(admin).await;
                match outcome {
                    PublishOutcome::Failed { .. } => {
                        self.formatter.error(&outcome.message())
                    }
                    _ => self.formatter.success(&outcome.message()),
                }
                Ok(())
            }
            KioskInput::Help => {
                for (usage, what) in HELP {
                    self.formatter.field(usage, what);
                }
                Ok(())
            }
            KioskInput::Quit => Ok(()),
        }
    }

    fn require_admin(&self) -> Option<&AdminSession> {
        if self.admin.is_none() {
            self.formatter
                .error("Admin access required. Use 'admin <password>' first.");
        }
        self.admin.as_ref()
    }

    /// The roster placement of `name`, reporting when there is none
    fn placement(&self, name: &PersonName) -> Option<OrgUnit> {
        let placement = self.app.roster.placement_of(name);
        if placement.is_none() {
            self.formatter.error(&format!(
                "{name} is not on the roster (or is listed more than once)."
            ));
        }
        placement
    }

    async fn mark(&self, action: AttendanceAction, name: String) -> Result<()> {
        let request = match PersonName::new(name.as_str()) {
            Ok(person) => {
                let Some(org_unit) = self.placement(&person) else {
                    return Ok(());
                };
                AttendanceRequest::new(name, org_unit, action)
            }
            // Let the session report the missing selection
            Err(_) => AttendanceRequest {
                name,
                action: Some(action),
                ..AttendanceRequest::default()
            },
        };

        let outcome = self.app.attendance.record_attendance(request).await;
        report_outcome(self.formatter.as_ref(), self.format, &outcome)
    }

    async fn mark_absent(&self, name: String, reason: String) -> Result<()> {
        let Some(admin) = self.require_admin() else {
            return Ok(());
        };
        let person = match PersonName::new(name) {
            Ok(person) => person,
            Err(_) => {
                self.formatter.error("Please select a name first.");
                return Ok(());
            }
        };
        let Some(org_unit) = self.placement(&person) else {
            return Ok(());
        };

        let outcome = self
            .app
            .attendance
            .mark_absent(admin, &person, org_unit, &reason)
            .await;
        report_outcome(self.formatter.as_ref(), self.format, &outcome)
    }

    fn show_log(&self) -> Result<()> {
        let entries = self.app.attendance.today_log();

        if self.format.is_json() {
            let json = serde_json::to_value(&entries).context("Failed to serialize log")?;
            self.formatter.print_json(&json);
            return Ok(());
        }

        if entries.is_empty() {
            self.formatter.info("No records today");
            return Ok(());
        }
        self.formatter
            .success(&format!("Today's records ({})", entries.len()));
        for event in &entries {
            let mut line = format!(
                "{}  {}  {}  ({})",
                event.occurred_time(),
                event.person_name(),
                event.action(),
                event.org_unit()
            );
            if let Some(reason) = event.reason().filter(|r| !r.is_empty()) {
                line.push_str(&format!(" - {reason}"));
            }
            self.formatter.info(&line);
        }
        Ok(())
    }

    fn navigate_news(&self, nav: NewsNav) -> Result<()> {
        let item = match nav {
            NewsNav::Current => self.app.news.current(),
            NewsNav::Next => self.app.news.next(),
            NewsNav::Previous => self.app.news.previous(),
            NewsNav::GoTo(index) => match self.app.news.go_to(index) {
                Ok(item) => item,
                Err(e) => {
                    self.formatter.error(&e.to_string());
                    return Ok(());
                }
            },
        };

        if self.format.is_json() {
            let json = serde_json::to_value(&item).context("Failed to serialize news item")?;
            self.formatter.print_json(&json);
        } else {
            let board = self.app.news.board_snapshot();
            self.formatter.success(&format!(
                "{}/{} {}",
                board.current_index() + 1,
                board.len(),
                describe(&item)
            ));
        }
        Ok(())
    }

    fn add_person(&self, name: String, org_unit: OrgUnit) -> Result<()> {
        let Some(admin) = self.require_admin() else {
            return Ok(());
        };
        let result = PersonName::new(name)
            .and_then(|person| {
                let label = format!("Added {person} to {org_unit}");
                self.app.roster.add_person(admin, person, org_unit).map(|()| label)
            });
        match result {
            Ok(message) => self.formatter.success(&message),
            Err(e) => self.formatter.error(&e.to_string()),
        }
        Ok(())
    }

    fn remove_person(&self, name: String) -> Result<()> {
        let Some(admin) = self.require_admin() else {
            return Ok(());
        };
        let result = PersonName::new(name)
            .and_then(|person| self.app.roster.remove_person(admin, &person).map(|n| (person, n)));
        match result {
            Ok((person, _)) => self.formatter.success(&format!("Removed {person} from the roster")),
            Err(e) => self.formatter.error(&e.to_string()),
        }
        Ok(())
    }

    fn edit_news(&self, edit: NewsEdit) -> Result<()> {
        let Some(admin) = self.require_admin() else {
            return Ok(());
        };
        match self.app.news.edit_current(admin, edit) {
            Ok(item) => {
                self.formatter.success(&format!("Edited: {}", describe(&item)));
                self.formatter.info("Use 'publish' to save it to the backend.");
            }
            Err(e) => self.formatter.error(&e.to_string()),
        }
        Ok(())
    }
}
