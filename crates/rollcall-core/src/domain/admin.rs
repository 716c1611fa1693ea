//! Admin gate
//!
//! The admin panel is protected by a single shared plaintext password.
//! Unlocking the gate yields an [`AdminSession`] token; admin operations
//! take it by reference so they cannot be called without unlocking first.

use tracing::{info, warn};

use super::errors::DomainError;

/// Proof that the admin password was entered correctly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    _private: (),
}

/// Compares a submitted password against the configured shared secret
#[derive(Debug, Clone)]
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    /// Creates a gate; `None` locks the admin panel for everyone
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret.filter(|s| !s.is_empty());
        Self { secret }
    }

    /// Returns true if a password is configured
    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Attempts to unlock the admin panel
    ///
    /// # Errors
    /// - [`DomainError::AdminDisabled`] when no password is configured
    /// - [`DomainError::Unauthorized`] when the password does not match
    pub fn unlock(&self, password: &str) -> Result<AdminSession, DomainError> {
        let Some(secret) = self.secret.as_deref() else {
            warn!("Admin unlock attempted but no password is configured");
            return Err(DomainError::AdminDisabled);
        };

        if password == secret {
            info!("Admin panel unlocked");
            Ok(AdminSession { _private: () })
        } else {
            warn!("Admin unlock failed: incorrect password");
            Err(DomainError::Unauthorized)
        }
    }
}
