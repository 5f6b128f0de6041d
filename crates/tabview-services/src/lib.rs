//! tabview Services Layer
//!
//! This crate sits between a presentation layer and the store-side
//! [`tabview_core::TableHandle`]. It owns the per-table browsing state and
//! turns user intent (page, sort, filter, edit) into handle calls.
//!
//! # Architecture
//!
//! ```text
//! Presentation (rows, dialogs, menus)
//!     ↓
//! Service Layer (tabview-services) ← This crate
//!     ↓
//! Filter compiler (tabview-filter)
//!     ↓
//! Core types and TableHandle (tabview-core)
//! ```
//!
//! # Services
//!
//! - [`TableSession`] - Paging, sorting, filtering and row mutations for one open table
//! - [`QueryState`] - The offset/limit/sort/filter state a session fetches with
//! - [`BrowserSettings`] - Page size defaults loaded from `settings.toml`
//! - [`logging`] - tracing subscriber setup

mod error;
pub mod logging;
mod page_summary;
mod query_state;
mod row_draft;
mod settings;
mod table_session;

pub use error::{ServiceError, ServiceResult};
pub use page_summary::PageSummary;
pub use query_state::QueryState;
pub use row_draft::{DraftColumn, InputKind, RowDraft};
pub use settings::{BrowserSettings, settings_file};
pub use table_session::{LoadedPage, OpenOptions, SessionMonitor, SessionPhase, TableSession};
