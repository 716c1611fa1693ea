//! Attendance session use case
//!
//! Drives one submission end to end: validate the selection, run the
//! duplicate guard against this session's history, hand the event to the
//! configured backend, and reconcile the backend's answer with the local
//! log. Every path ends in exactly one [`AttendanceOutcome`] carrying one
//! human-readable message; backend problems never surface as errors.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    AdminSession, Admission, AttendanceAction, AttendanceEvent, DomainError, DuplicateGuard,
    ExistingRecord, OrgUnit, PersonCategory, PersonName,
};
use crate::ports::{BackendFailure, BackendResult, Delivery, IAttendanceBackend, IClock, ISessionHistory};

/// A candidate submission as selected by the user
///
/// Every field is optional or free text because it mirrors form state;
/// [`RecordAttendanceUseCase::record_attendance`] does the validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceRequest {
    pub name: String,
    /// Derived from `org_unit` when absent
    pub category: Option<PersonCategory>,
    pub org_unit: Option<OrgUnit>,
    pub action: Option<AttendanceAction>,
    pub reason: Option<String>,
}

impl AttendanceRequest {
    pub fn new(name: impl Into<String>, org_unit: OrgUnit, action: AttendanceAction) -> Self {
        Self {
            name: name.into(),
            category: Some(org_unit.category()),
            org_unit: Some(org_unit),
            action: Some(action),
            reason: None,
        }
    }
}

/// Who detected a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateSource {
    /// This session's history
    Local,
    /// The remote backend
    Remote,
}

/// The user-visible result of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttendanceOutcome {
    /// Missing or inconsistent selection; nothing was sent
    SelectionRequired { message: String },
    /// Confirmed by the remote backend
    Recorded { event: AttendanceEvent },
    /// Accepted with no backend configured
    RecordedOffline { event: AttendanceEvent },
    /// The person already has a record for today
    AlreadyRecorded {
        name: String,
        existing: ExistingRecord,
        source: DuplicateSource,
        backend_message: Option<String>,
    },
    /// Kept in the session log, but the backend never confirmed it
    SavedLocallyOnly {
        event: AttendanceEvent,
        failure: BackendFailure,
    },
}

impl AttendanceOutcome {
    /// The single message shown to the user
    pub fn message(&self) -> String {
        match self {
            AttendanceOutcome::SelectionRequired { message } => message.clone(),
            AttendanceOutcome::Recorded { event } => format!(
                "Successfully marked {} as {}!",
                event.person_name(),
                event.action()
            ),
            AttendanceOutcome::RecordedOffline { event } => format!(
                "Successfully marked {} as {}! (offline mode)",
                event.person_name(),
                event.action()
            ),
            AttendanceOutcome::AlreadyRecorded {
                name,
                existing,
                backend_message,
                ..
            } => {
                if existing.action.is_none() && existing.time.is_none() {
                    match backend_message {
                        Some(message) => format!("{name}: {message}"),
                        None => format!("{name} already has an entry for today."),
                    }
                } else {
                    format!(
                        "{name} already has an entry for today ({}).",
                        existing.describe()
                    )
                }
            }
            AttendanceOutcome::SavedLocallyOnly { event, failure } => format!(
                "Marked {} as {} locally, but it was not saved to the server. {}",
                event.person_name(),
                event.action(),
                failure.reason
            ),
        }
    }

    /// True when the event ended up in the session log
    pub fn is_logged(&self) -> bool {
        matches!(
            self,
            AttendanceOutcome::Recorded { .. }
                | AttendanceOutcome::RecordedOffline { .. }
                | AttendanceOutcome::SavedLocallyOnly { .. }
        )
    }
}

/// Use case owning the session's attendance log
pub struct RecordAttendanceUseCase {
    backend: Arc<dyn IAttendanceBackend>,
    history: Arc<dyn ISessionHistory>,
    clock: Arc<dyn IClock>,
}

impl RecordAttendanceUseCase {
    /// Creates a new RecordAttendanceUseCase with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `backend` - Remote service used to persist accepted events
    /// * `history` - This session's log of accepted events
    /// * `clock` - Source of the local date and time stamped on events
    pub fn new(
        backend: Arc<dyn IAttendanceBackend>,
        history: Arc<dyn ISessionHistory>,
        clock: Arc<dyn IClock>,
    ) -> Self {
        Self {
            backend,
            history,
            clock,
        }
    }

    /// Records one attendance action
    ///
    /// This method:
    /// 1. Validates the selection (no network call when it is incomplete)
    /// 2. Rejects the event if the person already has a record today
    /// 3. Submits it to the backend
    /// 4. Appends it to the session log unless the backend reports a duplicate
    pub async fn record_attendance(&self, request: AttendanceRequest) -> AttendanceOutcome {
        match self.build_event(&request) {
            Ok(event) => self.submit(event).await,
            Err(message) => {
                debug!(%message, "Attendance selection incomplete");
                AttendanceOutcome::SelectionRequired { message }
            }
        }
    }

    /// Records an absence on someone's behalf
    ///
    /// Goes through the same guard and backend pipeline as
    /// [`Self::record_attendance`], so an absence cannot be added for
    /// someone who already has a record today.
    pub async fn mark_absent(
        &self,
        _admin: &AdminSession,
        name: &PersonName,
        org_unit: OrgUnit,
        reason: &str,
    ) -> AttendanceOutcome {
        let request = AttendanceRequest {
            name: name.to_string(),
            category: Some(org_unit.category()),
            org_unit: Some(org_unit),
            action: Some(AttendanceAction::Absent),
            reason: Some(reason.to_string()),
        };
        info!(name = %name, "Marking absent");
        self.record_attendance(request).await
    }

    /// Today's accepted events, newest first
    pub fn today_log(&self) -> Vec<AttendanceEvent> {
        self.history.entries_on(self.clock.now().date_naive())
    }

    /// Empties the session log
    pub fn clear_log(&self) {
        self.history.clear();
        info!("Session attendance log cleared");
    }

    fn build_event(&self, request: &AttendanceRequest) -> Result<AttendanceEvent, String> {
        if request.name.trim().is_empty() {
            return Err("Please select a name first.".to_string());
        }
        let Some(action) = request.action else {
            return Err("Please select an action.".to_string());
        };
        let Some(org_unit) = request.org_unit.clone() else {
            return Err(match request.category {
                Some(PersonCategory::Employee) => "Please select a branch.".to_string(),
                Some(PersonCategory::Student) => "Please select a grade and area.".to_string(),
                None => "Please select a category.".to_string(),
            });
        };

        let name = PersonName::new(request.name.as_str()).map_err(|e| e.to_string())?;
        let category = request.category.unwrap_or_else(|| org_unit.category());

        let now = self.clock.now();
        let event = AttendanceEvent::new(
            name,
            category,
            org_unit,
            action,
            now.date_naive(),
            now.time(),
            now.with_timezone(&Utc),
        )
        .map_err(|e: DomainError| e.to_string())?;

        Ok(match request.reason.as_deref() {
            Some(reason) => event.with_reason(reason),
            None => event,
        })
    }

    async fn submit(&self, event: AttendanceEvent) -> AttendanceOutcome {
        if let Admission::Rejected { existing } =
            DuplicateGuard::check_and_admit(&event, &self.history.snapshot())
        {
            return Self::local_duplicate(&event, &existing);
        }

        match self.backend.submit_attendance(&event).await {
            BackendResult::Accepted { delivery, message } => {
                info!(
                    name = %event.person_name(),
                    action = %event.action(),
                    ?delivery,
                    message = message.as_deref().unwrap_or(""),
                    "Attendance accepted"
                );
                self.append(event, |event| match delivery {
                    Delivery::Remote => AttendanceOutcome::Recorded { event },
                    Delivery::Offline => AttendanceOutcome::RecordedOffline { event },
                })
            }
            BackendResult::RejectedDuplicate { existing, message } => {
                info!(
                    name = %event.person_name(),
                    existing = %existing.describe(),
                    "Duplicate attendance rejected by backend"
                );
                AttendanceOutcome::AlreadyRecorded {
                    name: event.person_name().to_string(),
                    existing,
                    source: DuplicateSource::Remote,
                    backend_message: message,
                }
            }
            BackendResult::Failed(failure) => {
                warn!(
                    name = %event.person_name(),
                    kind = ?failure.kind,
                    reason = %failure.reason,
                    "Backend failed, keeping attendance locally"
                );
                self.append(event, |event| AttendanceOutcome::SavedLocallyOnly {
                    event,
                    failure,
                })
            }
        }
    }

    /// Appends under the history lock; a racing submission for the same
    /// person and day that landed first turns this into a duplicate.
    fn append(
        &self,
        event: AttendanceEvent,
        outcome: impl FnOnce(AttendanceEvent) -> AttendanceOutcome,
    ) -> AttendanceOutcome {
        match self.history.try_append(event.clone()) {
            Ok(()) => outcome(event),
            Err(existing) => {
                warn!(
                    name = %event.person_name(),
                    "Concurrent submission recorded first"
                );
                Self::local_duplicate(&event, &existing)
            }
        }
    }

    fn local_duplicate(event: &AttendanceEvent, existing: &AttendanceEvent) -> AttendanceOutcome {
        AttendanceOutcome::AlreadyRecorded {
            name: event.person_name().to_string(),
            existing: ExistingRecord::from(existing),
            source: DuplicateSource::Local,
            backend_message: None,
        }
    }
}
