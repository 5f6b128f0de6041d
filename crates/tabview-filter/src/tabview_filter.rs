//! tabview Filter - operator registry and predicate compilation
//!
//! Maps a user-chosen operator, column and raw value onto a single
//! PostgreSQL `WHERE` fragment. Every operator validates the value against
//! the column's store type before anything is compiled, and every
//! compiled fragment goes through the escaping rules in
//! [`tabview_core::escape`].

mod condition;
mod error;
mod operator;

pub use condition::FilterCondition;
pub use error::{ValidationError, ValidationResult};
pub use operator::FilterOperator;
