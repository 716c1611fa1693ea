//! News banner domain types
//!
//! News items are shown one at a time in a rotating banner above the
//! attendance form. [`NewsBoard`] holds the items plus the rotation cursor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Headline shown when no news could be loaded
pub const FALLBACK_HEADLINE: &str = "Rollcall Attendance System";

/// Subtitle shown when no news could be loaded
pub const FALLBACK_SUBTITLE: &str = "Please connect to database to load news and student data";

/// Display priority of a news item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewsPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl NewsPriority {
    /// Parses a sheet cell, defaulting to `Medium`
    pub fn from_cell(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => NewsPriority::Low,
            "high" => NewsPriority::High,
            _ => NewsPriority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NewsPriority::Low => "Low",
            NewsPriority::Medium => "Medium",
            NewsPriority::High => "High",
        }
    }
}

/// Whether a news item is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewsStatus {
    #[default]
    Active,
    Inactive,
}

impl NewsStatus {
    /// Parses a sheet cell, defaulting to `Active`
    pub fn from_cell(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("inactive") {
            NewsStatus::Inactive
        } else {
            NewsStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Active => "Active",
            NewsStatus::Inactive => "Inactive",
        }
    }
}

/// A single news banner entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub headline: String,
    #[serde(default)]
    pub subtitle: String,
    /// Image URL or data URI
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub show_image: bool,
    #[serde(default)]
    pub priority: NewsPriority,
    pub date_created: NaiveDate,
    #[serde(default)]
    pub status: NewsStatus,
}

impl NewsItem {
    /// Creates an active, medium-priority item without image
    pub fn new(
        headline: impl Into<String>,
        subtitle: impl Into<String>,
        date_created: NaiveDate,
    ) -> Self {
        Self {
            headline: headline.into(),
            subtitle: subtitle.into(),
            image: None,
            show_image: false,
            priority: NewsPriority::Medium,
            date_created,
            status: NewsStatus::Active,
        }
    }

    /// The banner shown when nothing else is available
    pub fn fallback(today: NaiveDate) -> Self {
        let mut item = Self::new(FALLBACK_HEADLINE, FALLBACK_SUBTITLE, today);
        item.priority = NewsPriority::High;
        item
    }
}

// ============================================================================
// NewsBoard
// ============================================================================

/// Rotating set of news items with a current position
///
/// Never empty: constructing from an empty list yields the fallback banner.
#[derive(Debug, Clone)]
pub struct NewsBoard {
    items: Vec<NewsItem>,
    current: usize,
}

impl NewsBoard {
    /// Builds a board, substituting the fallback banner for an empty list
    pub fn new(items: Vec<NewsItem>, today: NaiveDate) -> Self {
        let items = if items.is_empty() {
            vec![NewsItem::fallback(today)]
        } else {
            items
        };
        Self { items, current: 0 }
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the item currently shown
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The item currently shown
    pub fn current(&self) -> &NewsItem {
        &self.items[self.current]
    }

    /// Mutable access to the current item, for admin edits
    pub fn current_mut(&mut self) -> &mut NewsItem {
        &mut self.items[self.current]
    }

    /// Advances to the next item, wrapping to the first
    pub fn next(&mut self) -> &NewsItem {
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    /// Steps back to the previous item, wrapping to the last
    pub fn previous(&mut self) -> &NewsItem {
        self.current = if self.current == 0 {
            self.items.len() - 1
        } else {
            self.current - 1
        };
        self.current()
    }

    /// Jumps to a specific item
    ///
    /// # Errors
    /// Returns [`DomainError::News`] if `index` is out of range.
    pub fn go_to(&mut self, index: usize) -> Result<&NewsItem, DomainError> {
        if index >= self.items.len() {
            return Err(DomainError::News(format!(
                "index {index} out of range (0..{})",
                self.items.len()
            )));
        }
        self.current = index;
        Ok(self.current())
    }
}
