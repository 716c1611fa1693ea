//! News board use case
//!
//! Loads banner items, rotates through them, and lets an admin edit and
//! publish the current one.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{AdminSession, DomainError, NewsBoard, NewsItem};
use crate::ports::{FailureKind, IAttendanceBackend, IClock};

/// Field changes to apply to the current news item
///
/// `None` leaves a field untouched; `image: Some(None)` removes the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsEdit {
    pub headline: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<Option<String>>,
    pub show_image: Option<bool>,
}

/// Result of pushing the current item to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The backend stored the item
    Published,
    /// The backend cannot store news; the edit lives only in this session
    UpdatedLocally,
    /// The backend tried and failed; the edit lives only in this session
    Failed { reason: String },
}

impl PublishOutcome {
    pub fn message(&self) -> String {
        match self {
            PublishOutcome::Published => "News updated successfully!".to_string(),
            PublishOutcome::UpdatedLocally => {
                "News updated locally (no backend connected).".to_string()
            }
            PublishOutcome::Failed { reason } => {
                format!("Failed to update news on the server. {reason}")
            }
        }
    }
}

/// Use case holding the session's news board
pub struct NewsUseCase {
    backend: Arc<dyn IAttendanceBackend>,
    clock: Arc<dyn IClock>,
    board: Mutex<NewsBoard>,
}

impl NewsUseCase {
    /// Creates a use case showing only the fallback banner until
    /// [`Self::load`] is called
    pub fn new(backend: Arc<dyn IAttendanceBackend>, clock: Arc<dyn IClock>) -> Self {
        let board = NewsBoard::new(Vec::new(), clock.now().date_naive());
        Self {
            backend,
            clock,
            board: Mutex::new(board),
        }
    }

    /// Reloads the board from the backend
    ///
    /// A failed or empty load leaves a single fallback banner. Returns the
    /// number of items on the board.
    pub async fn load(&self) -> usize {
        let items = match self.backend.fetch_news().await {
            Ok(items) => items,
            Err(failure) => {
                warn!(
                    kind = ?failure.kind,
                    reason = %failure.reason,
                    "News unavailable, showing fallback banner"
                );
                Vec::new()
            }
        };

        let board = NewsBoard::new(items, self.clock.now().date_naive());
        let count = board.len();
        *self.board() = board;
        info!(count, "News loaded");
        count
    }

    /// A copy of the whole board
    pub fn board_snapshot(&self) -> NewsBoard {
        self.board().clone()
    }

    pub fn current(&self) -> NewsItem {
        self.board().current().clone()
    }

    pub fn next(&self) -> NewsItem {
        self.board().next().clone()
    }

    pub fn previous(&self) -> NewsItem {
        self.board().previous().clone()
    }

    /// # Errors
    /// Returns [`DomainError::News`] if `index` is out of range
    pub fn go_to(&self, index: usize) -> Result<NewsItem, DomainError> {
        self.board().go_to(index).cloned()
    }

    /// Applies `edit` to the current item and returns the result
    ///
    /// # Errors
    /// Returns [`DomainError::News`] if the edit would blank the headline
    pub fn edit_current(
        &self,
        _admin: &AdminSession,
        edit: NewsEdit,
    ) -> Result<NewsItem, DomainError> {
        if edit
            .headline
            .as_deref()
            .is_some_and(|h| h.trim().is_empty())
        {
            return Err(DomainError::News("headline cannot be empty".to_string()));
        }

        let mut board = self.board();
        let item = board.current_mut();
        if let Some(headline) = edit.headline {
            item.headline = headline;
        }
        if let Some(subtitle) = edit.subtitle {
            item.subtitle = subtitle;
        }
        if let Some(image) = edit.image {
            item.image = image;
        }
        if let Some(show_image) = edit.show_image {
            item.show_image = show_image;
        }
        Ok(item.clone())
    }

    /// Pushes the current item to the backend
    pub async fn publish(&self, _admin: &AdminSession) -> PublishOutcome {
        let (index, item) = {
            let board = self.board();
            (board.current_index(), board.current().clone())
        };

        match self.backend.update_news(index, &item).await {
            Ok(()) => {
                info!(index, headline = %item.headline, "News item published");
                PublishOutcome::Published
            }
            Err(failure) if failure.kind == FailureKind::Unsupported => {
                info!(index, "Backend does not store news, kept locally");
                PublishOutcome::UpdatedLocally
            }
            Err(failure) => {
                warn!(index, reason = %failure.reason, "Publishing news failed");
                PublishOutcome::Failed {
                    reason: failure.reason,
                }
            }
        }
    }

    fn board(&self) -> MutexGuard<'_, NewsBoard> {
        self.board
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
