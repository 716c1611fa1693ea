//! Clock port
//!
//! Attendance dates and times are taken from the client's local wall clock.
//! Injecting the clock keeps the session use case deterministic under test.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Local};

/// Source of the current local time
pub trait IClock: Send + Sync {
    /// Current time with the local UTC offset
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The system clock in the local timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl IClock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Parses an RFC 3339 timestamp
    ///
    /// # Errors
    /// Returns an error if `rfc3339` is not a valid timestamp
    pub fn at(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self::new)
    }

    /// Moves the clock to `now`
    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }
}

impl IClock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
