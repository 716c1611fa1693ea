//! Roster management use case
//!
//! Loads the roster from the configured backend and serves the cascading
//! category → branch / grade → area → name lookups. Admin edits change the
//! in-memory copy only; the backend roster is never written.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::domain::{AdminSession, DomainError, OrgUnit, PersonName, RosterEntry, RosterSnapshot};
use crate::ports::IAttendanceBackend;

/// Use case holding the session's roster
pub struct ManageRosterUseCase {
    backend: Arc<dyn IAttendanceBackend>,
    roster: RwLock<RosterSnapshot>,
}

impl ManageRosterUseCase {
    /// Creates a use case with an empty roster
    ///
    /// # Arguments
    ///
    /// * `backend` - Source of the roster
    pub fn new(backend: Arc<dyn IAttendanceBackend>) -> Self {
        Self {
            backend,
            roster: RwLock::new(RosterSnapshot::new()),
        }
    }

    /// Replaces the roster with the backend's current one
    ///
    /// Never fails: when the backend is unreachable or answers with
    /// something unusable the roster becomes empty and a warning is logged.
    /// Returns the number of placements loaded.
    pub async fn refresh(&self) -> usize {
        let snapshot = match self.backend.fetch_roster().await {
            Ok(snapshot) => snapshot,
            Err(failure) => {
                warn!(
                    kind = ?failure.kind,
                    reason = %failure.reason,
                    "Roster unavailable, continuing with an empty roster"
                );
                RosterSnapshot::new()
            }
        };

        let count = snapshot.len();
        *self.write() = snapshot;
        info!(count, "Roster loaded");
        count
    }

    /// A copy of the current roster
    pub fn snapshot(&self) -> RosterSnapshot {
        self.read().clone()
    }

    /// The org unit of `name` when it is listed exactly once
    pub fn placement_of(&self, name: &PersonName) -> Option<OrgUnit> {
        let matches = self.read().find(name);
        match matches.as_slice() {
            [only] => Some(only.org_unit.clone()),
            _ => None,
        }
    }

    /// Adds a person to the in-memory roster
    ///
    /// # Errors
    /// Returns [`DomainError::Roster`] if they are already listed in that unit
    pub fn add_person(
        &self,
        _admin: &AdminSession,
        name: PersonName,
        org_unit: OrgUnit,
    ) -> Result<(), DomainError> {
        info!(name = %name, unit = %org_unit, "Adding roster entry");
        self.write().insert(RosterEntry::new(name, org_unit))
    }

    /// Removes a person from every unit they are listed in
    ///
    /// # Errors
    /// Returns [`DomainError::Roster`] if they were not listed at all
    pub fn remove_person(
        &self,
        _admin: &AdminSession,
        name: &PersonName,
    ) -> Result<usize, DomainError> {
        let removed = self.write().remove(name);
        if removed == 0 {
            return Err(DomainError::Roster(format!("{name} is not on the roster")));
        }
        info!(name = %name, removed, "Removed roster entry");
        Ok(removed)
    }

    fn read(&self) -> RwLockReadGuard<'_, RosterSnapshot> {
        self.roster
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RosterSnapshot> {
        self.roster
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
