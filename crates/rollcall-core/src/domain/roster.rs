//! Roster domain types
//!
//! The roster is the set of people who can record attendance, grouped the
//! way the selection cascade walks it: employees by branch, students by
//! grade and then area.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attendance::{OrgUnit, PersonCategory};
use super::errors::DomainError;
use super::newtypes::PersonName;

/// Placement used when a roster row leaves branch/grade/area blank
pub const DEFAULT_GROUP: &str = "General";

/// A person's identity and placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: PersonName,
    pub org_unit: OrgUnit,
}

impl RosterEntry {
    pub fn new(name: PersonName, org_unit: OrgUnit) -> Self {
        Self { name, org_unit }
    }

    pub fn category(&self) -> PersonCategory {
        self.org_unit.category()
    }
}

/// Nested roster mapping as served by the roster services
///
/// Serializes as `{"Employee": {branch: [names]}, "Student": {grade: {area: [names]}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(rename = "Employee", default)]
    employees: BTreeMap<String, Vec<String>>,
    #[serde(rename = "Student", default)]
    students: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl RosterSnapshot {
    /// Creates an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no person is listed anywhere
    pub fn is_empty(&self) -> bool {
        self.employees.values().all(Vec::is_empty)
            && self
                .students
                .values()
                .all(|areas| areas.values().all(Vec::is_empty))
    }

    /// Total number of people listed
    pub fn len(&self) -> usize {
        let employees: usize = self.employees.values().map(Vec::len).sum();
        let students: usize = self
            .students
            .values()
            .flat_map(|areas| areas.values())
            .map(Vec::len)
            .sum();
        employees + students
    }

    // --- Cascade queries ---

    /// Employee branches, sorted
    pub fn branches(&self) -> Vec<&str> {
        self.employees.keys().map(String::as_str).collect()
    }

    /// Student grades, sorted
    pub fn grades(&self) -> Vec<&str> {
        self.students.keys().map(String::as_str).collect()
    }

    /// Areas of a student grade, sorted; empty for an unknown grade
    pub fn areas(&self, grade: &str) -> Vec<&str> {
        self.students
            .get(grade)
            .map(|areas| areas.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Names available for a selected org unit, in roster order
    pub fn names(&self, org_unit: &OrgUnit) -> &[String] {
        let names = match org_unit {
            OrgUnit::Branch { branch } => self.employees.get(branch),
            OrgUnit::GradeArea { grade, area } => {
                self.students.get(grade).and_then(|areas| areas.get(area))
            }
        };
        names.map(Vec::as_slice).unwrap_or(&[])
    }

    /// Flattens the roster into entries (employees first)
    pub fn entries(&self) -> Vec<RosterEntry> {
        let mut entries = Vec::with_capacity(self.len());

        for (branch, names) in &self.employees {
            for name in names {
                if let Ok(name) = PersonName::new(name.as_str()) {
                    entries.push(RosterEntry::new(name, OrgUnit::branch(branch.as_str())));
                }
            }
        }

        for (grade, areas) in &self.students {
            for (area, names) in areas {
                for name in names {
                    if let Ok(name) = PersonName::new(name.as_str()) {
                        entries.push(RosterEntry::new(
                            name,
                            OrgUnit::grade_area(grade.as_str(), area.as_str()),
                        ));
                    }
                }
            }
        }

        entries
    }

    /// Finds every placement of a person by exact name
    pub fn find(&self, name: &PersonName) -> Vec<RosterEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| &entry.name == name)
            .collect()
    }

    // --- Mutation ---

    /// Adds a person to the roster
    ///
    /// # Errors
    /// Returns [`DomainError::Roster`] if the person is already listed in
    /// the same org unit.
    pub fn insert(&mut self, entry: RosterEntry) -> Result<(), DomainError> {
        let name = entry.name.as_str().to_string();
        let names = match entry.org_unit {
            OrgUnit::Branch { branch } => self.employees.entry(branch).or_default(),
            OrgUnit::GradeArea { grade, area } => self
                .students
                .entry(grade)
                .or_default()
                .entry(area)
                .or_default(),
        };

        if names.iter().any(|n| n == &name) {
            return Err(DomainError::Roster(format!(
                "{name} is already listed there"
            )));
        }

        names.push(name);
        Ok(())
    }

    /// Removes a person from every org unit they appear in
    ///
    /// Empty groups left behind are pruned so they disappear from the cascade.
    /// Returns the number of placements removed.
    pub fn remove(&mut self, name: &PersonName) -> usize {
        let mut removed = 0;

        for names in self.employees.values_mut() {
            let before = names.len();
            names.retain(|n| n != name.as_str());
            removed += before - names.len();
        }
        self.employees.retain(|_, names| !names.is_empty());

        for areas in self.students.values_mut() {
            for names in areas.values_mut() {
                let before = names.len();
                names.retain(|n| n != name.as_str());
                removed += before - names.len();
            }
            areas.retain(|_, names| !names.is_empty());
        }
        self.students.retain(|_, areas| !areas.is_empty());

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PersonName {
        PersonName::new(s).unwrap()
    }

    fn sample() -> RosterSnapshot {
        let json = r#"{
            "Employee": {"Main": ["Alice", "Bob"], "Annex": ["Carol"]},
            "Student": {"Grade 5": {"North": ["Dan"], "South": ["Eve", "Alice"]}}
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_cascade_queries() {
        let roster = sample();
        assert_eq!(roster.branches(), vec!["Annex", "Main"]);
        assert_eq!(roster.grades(), vec!["Grade 5"]);
        assert_eq!(roster.areas("Grade 5"), vec!["North", "South"]);
        assert!(roster.areas("Grade 9").is_empty());
        assert_eq!(roster.names(&OrgUnit::branch("Main")), ["Alice", "Bob"]);
        assert_eq!(
            roster.names(&OrgUnit::grade_area("Grade 5", "South")),
            ["Eve", "Alice"]
        );
        assert!(roster.names(&OrgUnit::branch("Nowhere")).is_empty());
    }

    #[test]
    fn test_entries_and_find() {
        let roster = sample();
        assert_eq!(roster.len(), 6);
        assert_eq!(roster.entries().len(), 6);

        let alice = roster.find(&name("Alice"));
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].category(), PersonCategory::Employee);
        assert_eq!(alice[1].category(), PersonCategory::Student);
    }

    #[test]
    fn test_missing_sections_deserialize_as_empty() {
        let roster: RosterSnapshot = serde_json::from_str("{}").unwrap();
        assert!(roster.is_empty());

        let roster: RosterSnapshot =
            serde_json::from_str(r#"{"Employee": {"Main": []}}"#).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_insert_rejects_duplicate_in_same_unit() {
        let mut roster = RosterSnapshot::new();
        roster
            .insert(RosterEntry::new(name("Zed"), OrgUnit::branch("Main")))
            .unwrap();
        let err = roster
            .insert(RosterEntry::new(name("Zed"), OrgUnit::branch("Main")))
            .unwrap_err();
        assert!(matches!(err, DomainError::Roster(_)));

        roster
            .insert(RosterEntry::new(name("Zed"), OrgUnit::grade_area("G1", "A")))
            .unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_remove_prunes_empty_groups() {
        let mut roster = sample();
        assert_eq!(roster.remove(&name("Carol")), 1);
        assert_eq!(roster.branches(), vec!["Main"]);

        assert_eq!(roster.remove(&name("Alice")), 2);
        assert_eq!(roster.remove(&name("Dan")), 1);
        assert_eq!(roster.areas("Grade 5"), vec!["South"]);
        assert_eq!(roster.remove(&name("Nobody")), 0);
    }

    #[test]
    fn test_serializes_with_category_keys() {
        let roster = sample();
        let value = serde_json::to_value(&roster).unwrap();
        assert!(value.get("Employee").is_some());
        assert!(value.get("Student").is_some());
    }
}
