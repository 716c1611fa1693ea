//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures, selection mismatches, and admin
//! authorization.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid or empty person name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// The chosen category does not match the chosen org unit
    #[error("Category {category} does not match org unit {org_unit}")]
    CategoryMismatch {
        /// The selected category
        category: String,
        /// The selected org unit
        org_unit: String,
    },

    /// Unknown attendance action keyword
    #[error("Unknown attendance action: {0}")]
    UnknownAction(String),

    /// Unknown person category keyword
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The admin password did not match
    #[error("Incorrect password. Please try again.")]
    Unauthorized,

    /// The admin panel has no password configured
    #[error("Admin panel is locked: no password configured")]
    AdminDisabled,

    /// A roster entry could not be found or modified
    #[error("Roster error: {0}")]
    Roster(String),

    /// News index or content is invalid
    #[error("News error: {0}")]
    News(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidName("   ".to_string());
        assert_eq!(err.to_string(), "Invalid name:    ");

        let err = DomainError::CategoryMismatch {
            category: "Employee".to_string(),
            org_unit: "Grade 5 / North".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Category Employee does not match org unit Grade 5 / North"
        );

        assert_eq!(
            DomainError::Unauthorized.to_string(),
            "Incorrect password. Please try again."
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::UnknownAction("dance".to_string());
        let err2 = DomainError::UnknownAction("dance".to_string());
        let err3 = DomainError::UnknownAction("sing".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
