//! tabview Core - shared types and collaborator traits for table browsing
//!
//! This crate provides the fundamental pieces every other tabview crate
//! depends on:
//!
//! - `TableHandle` - Trait for the store-side handle of one open table
//! - `Value`, `Row`, `Page`, `ColumnType` - Data exchanged with the handle
//! - `StoreError` - Failures reported by the store driver
//! - `escape` - Identifier/literal quoting for generated SQL fragments

mod error;
pub mod escape;
mod table;
mod types;

pub use error::*;
pub use escape::{double_percent, escape_identifier, escape_literal, quote_identifier, quote_literal};
pub use table::*;
pub use types::*;
