use tabview_core::{RowIdentity, StoreError, TableKind};
use tabview_filter::ValidationError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Session-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "No records updated in {table} ({column}), probably table content was changed since you started editing. Refresh and edit again"
    )]
    Conflict { table: String, column: String },

    #[error("Can't modify rows of a {table_kind}")]
    NotMutable { table_kind: TableKind },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Already on the first page (offset {offset}, page size {limit})")]
    StaleOffset { offset: usize, limit: usize },

    #[error("No page loaded")]
    NoPageLoaded,

    #[error("No table open")]
    NoTableOpen,

    #[error("Nothing to insert: every field is empty")]
    NothingToInsert,

    #[error("Row {0} is not on the loaded page")]
    RowNotLoaded(RowIdentity),
}

impl ServiceError {
    /// Returns true if the error came back from the store rather than
    /// being rejected before any store call
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Text for an error pane: store errors include hint and SQL
    pub fn display_detail(&self) -> String {
        match self {
            Self::Store(err) => err.display_detail(),
            other => other.to_string(),
        }
    }
}
