//! Error types for store access

use thiserror::Error;

/// A failure reported by the store driver behind a [`crate::TableHandle`].
///
/// Drivers often attach a hint and the statement that failed; both are kept
/// so an error pane can show them next to the message.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
    pub hint: Option<String>,
    pub query: Option<String>,
}

/// Broad classification of a store failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Connection,
    Syntax,
    Permission,
    Cancelled,
    Other,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: None,
            query: None,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Connection, message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Syntax, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Permission, message)
    }

    pub fn cancelled() -> Self {
        Self::new(StoreErrorKind::Cancelled, "canceling statement due to user request")
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Message followed by the hint and failing SQL, one per line, when present
    pub fn display_detail(&self) -> String {
        let mut detail = self.message.clone();
        if let Some(hint) = &self.hint {
            detail.push_str("\nHint: ");
            detail.push_str(hint);
        }
        if let Some(query) = &self.query {
            detail.push_str("\nSQL: ");
            detail.push_str(query);
        }
        detail
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
