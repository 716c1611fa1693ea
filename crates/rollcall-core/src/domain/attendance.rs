//! AttendanceEvent domain entity
//!
//! This module defines the immutable record of a single attendance action,
//! along with the selection types it is built from: who the person is
//! ([`PersonCategory`] + [`OrgUnit`]) and what happened ([`AttendanceAction`]).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{EventId, PersonName};

/// Format used for `occurred_time` (24h, minutes precision)
pub const TIME_FORMAT: &str = "%H:%M";

/// Format used for `occurred_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// PersonCategory
// ============================================================================

/// Whether a person is staff or a pupil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PersonCategory {
    Employee,
    Student,
}

impl PersonCategory {
    /// Returns the wire/display name ("Employee" or "Student")
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonCategory::Employee => "Employee",
            PersonCategory::Student => "Student",
        }
    }
}

impl fmt::Display for PersonCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(PersonCategory::Employee),
            "student" => Ok(PersonCategory::Student),
            other => Err(DomainError::UnknownCategory(other.to_string())),
        }
    }
}

// ============================================================================
// OrgUnit
// ============================================================================

/// The placement of a person inside the school
///
/// Employees belong to a branch; students to a grade and an area within
/// that grade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrgUnit {
    /// An employee branch
    Branch { branch: String },
    /// A student grade and area pair
    GradeArea { grade: String, area: String },
}

impl OrgUnit {
    /// Creates a branch org unit
    pub fn branch(branch: impl Into<String>) -> Self {
        OrgUnit::Branch {
            branch: branch.into(),
        }
    }

    /// Creates a grade+area org unit
    pub fn grade_area(grade: impl Into<String>, area: impl Into<String>) -> Self {
        OrgUnit::GradeArea {
            grade: grade.into(),
            area: area.into(),
        }
    }

    /// The category this org unit belongs to
    pub fn category(&self) -> PersonCategory {
        match self {
            OrgUnit::Branch { .. } => PersonCategory::Employee,
            OrgUnit::GradeArea { .. } => PersonCategory::Student,
        }
    }

    /// Branch name, for employee units
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            OrgUnit::Branch { branch } => Some(branch),
            OrgUnit::GradeArea { .. } => None,
        }
    }

    /// Grade name, for student units
    pub fn grade(&self) -> Option<&str> {
        match self {
            OrgUnit::GradeArea { grade, .. } => Some(grade),
            OrgUnit::Branch { .. } => None,
        }
    }

    /// Area name, for student units
    pub fn area(&self) -> Option<&str> {
        match self {
            OrgUnit::GradeArea { area, .. } => Some(area),
            OrgUnit::Branch { .. } => None,
        }
    }
}

impl fmt::Display for OrgUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgUnit::Branch { branch } => write!(f, "{branch}"),
            OrgUnit::GradeArea { grade, area } => write!(f, "{grade} / {area}"),
        }
    }
}

// ============================================================================
// AttendanceAction
// ============================================================================

/// What the person is recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceAction {
    Login,
    Logout,
    Present,
    Absent,
}

impl AttendanceAction {
    /// All actions, in display order
    pub const ALL: [AttendanceAction; 4] = [
        AttendanceAction::Login,
        AttendanceAction::Logout,
        AttendanceAction::Present,
        AttendanceAction::Absent,
    ];

    /// Returns the wire name ("login", "logout", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceAction::Login => "login",
            AttendanceAction::Logout => "logout",
            AttendanceAction::Present => "present",
            AttendanceAction::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(AttendanceAction::Login),
            "logout" => Ok(AttendanceAction::Logout),
            "present" => Ok(AttendanceAction::Present),
            "absent" => Ok(AttendanceAction::Absent),
            other => Err(DomainError::UnknownAction(other.to_string())),
        }
    }
}

// ============================================================================
// AttendanceEvent
// ============================================================================

/// Immutable record of one attendance action
///
/// Created at submission time and never mutated. At most one event per
/// `(person_name, occurred_date)` may be accepted into a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventFields")]
pub struct AttendanceEvent {
    id: EventId,
    person_name: PersonName,
    person_category: PersonCategory,
    org_unit: OrgUnit,
    action: AttendanceAction,
    occurred_date: NaiveDate,
    occurred_time: String,
    created_at: DateTime<Utc>,
    reason: Option<String>,
}

impl AttendanceEvent {
    /// Creates a new event
    ///
    /// # Errors
    /// Returns [`DomainError::CategoryMismatch`] when `person_category`
    /// disagrees with `org_unit`.
    pub fn new(
        person_name: PersonName,
        person_category: PersonCategory,
        org_unit: OrgUnit,
        action: AttendanceAction,
        occurred_date: NaiveDate,
        occurred_time: NaiveTime,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if org_unit.category() != person_category {
            return Err(DomainError::CategoryMismatch {
                category: person_category.to_string(),
                org_unit: org_unit.to_string(),
            });
        }

        Ok(Self {
            id: EventId::new(),
            person_name,
            person_category,
            org_unit,
            action,
            occurred_date,
            occurred_time: occurred_time.format(TIME_FORMAT).to_string(),
            created_at,
            reason: None,
        })
    }

    /// Attaches a free-text reason (admin absences)
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        self.reason = if reason.trim().is_empty() {
            None
        } else {
            Some(reason)
        };
        self
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn person_name(&self) -> &PersonName {
        &self.person_name
    }

    pub fn person_category(&self) -> PersonCategory {
        self.person_category
    }

    pub fn org_unit(&self) -> &OrgUnit {
        &self.org_unit
    }

    pub fn action(&self) -> AttendanceAction {
        self.action
    }

    pub fn occurred_date(&self) -> NaiveDate {
        self.occurred_date
    }

    /// Wall-clock time in `HH:MM`
    pub fn occurred_time(&self) -> &str {
        &self.occurred_time
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns true if this event is for the same person on the same day
    pub fn same_person_same_day(&self, name: &PersonName, date: NaiveDate) -> bool {
        &self.person_name == name && self.occurred_date == date
    }
}

/// Unchecked serialized form of [`AttendanceEvent`]
#[derive(Deserialize)]
struct EventFields {
    id: EventId,
    person_name: PersonName,
    person_category: PersonCategory,
    org_unit: OrgUnit,
    action: AttendanceAction,
    occurred_date: NaiveDate,
    occurred_time: String,
    created_at: DateTime<Utc>,
    reason: Option<String>,
}

impl TryFrom<EventFields> for AttendanceEvent {
    type Error = DomainError;

    fn try_from(fields: EventFields) -> Result<Self, Self::Error> {
        let occurred_time = NaiveTime::parse_from_str(&fields.occurred_time, TIME_FORMAT)
            .map_err(|_| {
                DomainError::ValidationFailed(format!("Invalid time: {}", fields.occurred_time))
            })?;

        let event = Self::new(
            fields.person_name,
            fields.person_category,
            fields.org_unit,
            fields.action,
            fields.occurred_date,
            occurred_time,
            fields.created_at,
        )?;

        Ok(Self {
            id: fields.id,
            reason: fields.reason,
            ..event
        })
    }
}

// ============================================================================
// ExistingRecord
// ============================================================================

/// The record that caused a duplicate rejection
///
/// Local duplicates carry every field; remote backends usually return only
/// the action and time, so the remaining fields are optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExistingRecord {
    pub name: Option<String>,
    pub date: Option<String>,
    pub action: Option<String>,
    pub time: Option<String>,
}

impl ExistingRecord {
    /// Short "login at 08:00" style description
    pub fn describe(&self) -> String {
        let action = self.action.as_deref().unwrap_or("an entry");
        match self.time.as_deref() {
            Some(time) => format!("{action} at {time}"),
            None => action.to_string(),
        }
    }
}

impl From<&AttendanceEvent> for ExistingRecord {
    fn from(event: &AttendanceEvent) -> Self {
        Self {
            name: Some(event.person_name().to_string()),
            date: Some(event.occurred_date().format(DATE_FORMAT).to_string()),
            action: Some(event.action().to_string()),
            time: Some(event.occurred_time().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn time() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 5, 59).unwrap()
    }

    #[test]
    fn test_action_parse_and_display() {
        for action in AttendanceAction::ALL {
            let parsed: AttendanceAction = action.as_str().parse().unwrap();
            assert_eq!(parsed, action);
        }
        assert_eq!("LOGIN".parse::<AttendanceAction>().unwrap(), AttendanceAction::Login);
        assert!("dance".parse::<AttendanceAction>().is_err());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "employee".parse::<PersonCategory>().unwrap(),
            PersonCategory::Employee
        );
        assert_eq!(
            " Student ".parse::<PersonCategory>().unwrap(),
            PersonCategory::Student
        );
        assert!("visitor".parse::<PersonCategory>().is_err());
    }

    #[test]
    fn test_org_unit_category() {
        assert_eq!(OrgUnit::branch("Main").category(), PersonCategory::Employee);
        assert_eq!(
            OrgUnit::grade_area("Grade 5", "North").category(),
            PersonCategory::Student
        );
        assert_eq!(OrgUnit::grade_area("Grade 5", "North").to_string(), "Grade 5 / North");
    }

    #[test]
    fn test_event_formats_time_to_minutes() {
        let event = AttendanceEvent::new(
            PersonName::new("Alice").unwrap(),
            PersonCategory::Employee,
            OrgUnit::branch("Main"),
            AttendanceAction::Login,
            date(),
            time(),
            ts(),
        )
        .unwrap();

        assert_eq!(event.occurred_time(), "08:05");
        assert_eq!(event.person_category(), PersonCategory::Employee);
        assert!(event.reason().is_none());
    }

    #[test]
    fn test_event_rejects_category_mismatch() {
        let result = AttendanceEvent::new(
            PersonName::new("Alice").unwrap(),
            PersonCategory::Employee,
            OrgUnit::grade_area("Grade 5", "North"),
            AttendanceAction::Login,
            date(),
            time(),
            ts(),
        );

        assert!(matches!(result, Err(DomainError::CategoryMismatch { .. })));
    }

    #[test]
    fn test_deserialize_checks_category() {
        let event = AttendanceEvent::new(
            PersonName::new("Alice").unwrap(),
            PersonCategory::Employee,
            OrgUnit::branch("Main"),
            AttendanceAction::Login,
            date(),
            time(),
            ts(),
        )
        .unwrap()
        .with_reason("Early shift");

        let mut json = serde_json::to_value(&event).unwrap();
        let back: AttendanceEvent = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, event);

        json["org_unit"] = serde_json::json!({
            "kind": "grade_area",
            "grade": "Grade 5",
            "area": "North"
        });
        assert!(serde_json::from_value::<AttendanceEvent>(json.clone()).is_err());

        json["person_category"] = serde_json::json!("Student");
        json["occurred_time"] = serde_json::json!("8 o'clock");
        assert!(serde_json::from_value::<AttendanceEvent>(json).is_err());
    }

    #[test]
    fn test_blank_reason_is_dropped() {
        let event = AttendanceEvent::new(
            PersonName::new("Bob").unwrap(),
            PersonCategory::Student,
            OrgUnit::grade_area("Grade 1", "East"),
            AttendanceAction::Absent,
            date(),
            time(),
            ts(),
        )
        .unwrap()
        .with_reason("   ");

        assert!(event.reason().is_none());
        assert_eq!(event.clone().with_reason("sick").reason(), Some("sick"));
    }

    #[test]
    fn test_existing_record_from_event() {
        let event = AttendanceEvent::new(
            PersonName::new("Alice").unwrap(),
            PersonCategory::Employee,
            OrgUnit::branch("Main"),
            AttendanceAction::Present,
            date(),
            time(),
            ts(),
        )
        .unwrap();

        let existing = ExistingRecord::from(&event);
        assert_eq!(existing.name.as_deref(), Some("Alice"));
        assert_eq!(existing.date.as_deref(), Some("2026-03-02"));
        assert_eq!(existing.describe(), "present at 08:05");
    }

    #[test]
    fn test_existing_record_describe_partial() {
        let existing = ExistingRecord::default();
        assert_eq!(existing.describe(), "an entry");
    }
}
