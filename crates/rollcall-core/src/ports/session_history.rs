//! Session history port
//!
//! The ordered, append-only list of attendance events accepted during the
//! current session. It is injected into the session use case instead of
//! living in global state.
//!
//! ## Design Notes
//!
//! - The trait is synchronous: the only implementation is in memory, and
//!   holding a lock across an `.await` is never needed.
//! - [`ISessionHistory::try_append`] is the critical section. It re-checks
//!   `(person_name, occurred_date)` under the lock, so two racing
//!   submissions that both passed the advisory guard cannot both land.

use std::sync::Mutex;

use chrono::NaiveDate;

use crate::domain::{AttendanceEvent, PersonName};

/// Port trait for the in-session attendance log
pub trait ISessionHistory: Send + Sync {
    /// All accepted events, oldest first
    fn snapshot(&self) -> Vec<AttendanceEvent>;

    /// The accepted event for `name` on `date`, if any
    fn find_same_day(&self, name: &PersonName, date: NaiveDate) -> Option<AttendanceEvent>;

    /// Appends `event` unless the person already has a record that day
    ///
    /// Returns the existing record on conflict.
    fn try_append(&self, event: AttendanceEvent) -> Result<(), AttendanceEvent>;

    /// Events that occurred on `date`, newest first
    fn entries_on(&self, date: NaiveDate) -> Vec<AttendanceEvent>;

    /// Forgets every event
    fn clear(&self);
}

/// [`ISessionHistory`] backed by a mutex-guarded vector
#[derive(Debug, Default)]
pub struct InMemorySessionHistory {
    events: Mutex<Vec<AttendanceEvent>>,
}

impl InMemorySessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AttendanceEvent>> {
        // A poisoned lock only means another thread panicked mid-push; the
        // vector itself is still consistent.
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ISessionHistory for InMemorySessionHistory {
    fn snapshot(&self) -> Vec<AttendanceEvent> {
        self.lock().clone()
    }

    fn find_same_day(&self, name: &PersonName, date: NaiveDate) -> Option<AttendanceEvent> {
        self.lock()
            .iter()
            .find(|e| e.same_person_same_day(name, date))
            .cloned()
    }

    fn try_append(&self, event: AttendanceEvent) -> Result<(), AttendanceEvent> {
        let mut events = self.lock();
        if let Some(existing) = events
            .iter()
            .find(|e| e.same_person_same_day(event.person_name(), event.occurred_date()))
        {
            return Err(existing.clone());
        }
        events.push(event);
        Ok(())
    }

    fn entries_on(&self, date: NaiveDate) -> Vec<AttendanceEvent> {
        self.lock()
            .iter()
            .rev()
            .filter(|e| e.occurred_date() == date)
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveTime, Utc};

    use super::*;
    use crate::domain::{AttendanceAction, OrgUnit, PersonCategory};

    fn event(name: &str, day: u32) -> AttendanceEvent {
        AttendanceEvent::new(
            PersonName::new(name).unwrap(),
            PersonCategory::Employee,
            OrgUnit::branch("Main"),
            AttendanceAction::Present,
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_try_append_rejects_same_day() {
        let history = InMemorySessionHistory::new();
        let first = event("Alice", 2);
        history.try_append(first.clone()).unwrap();

        let existing = history.try_append(event("Alice", 2)).unwrap_err();
        assert_eq!(existing.id(), first.id());
        assert_eq!(history.snapshot().len(), 1);

        history.try_append(event("Alice", 3)).unwrap();
        assert_eq!(history.snapshot().len(), 2);
    }

    #[test]
    fn test_entries_on_is_newest_first() {
        let history = InMemorySessionHistory::new();
        history.try_append(event("Alice", 2)).unwrap();
        history.try_append(event("Bob", 2)).unwrap();
        history.try_append(event("Carol", 3)).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let names: Vec<String> = history
            .entries_on(day)
            .iter()
            .map(|e| e.person_name().to_string())
            .collect();
        assert_eq!(names, vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let history = InMemorySessionHistory::new();
        history.try_append(event("Alice", 2)).unwrap();
        history.clear();
        assert!(history.snapshot().is_empty());
        assert!(history
            .find_same_day(&PersonName::new("Alice").unwrap(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .is_none());
    }

    #[test]
    fn test_concurrent_appends_admit_exactly_one() {
        let history = Arc::new(InMemorySessionHistory::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || history.try_append(event("Alice", 2)).is_ok())
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(history.snapshot().len(), 1);
    }
}
