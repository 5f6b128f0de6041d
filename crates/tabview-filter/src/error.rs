//! Filter validation errors

use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Why a filter value was rejected before reaching the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Value is required")]
    ValueRequired,

    #[error("Value must be numeric (field type: {data_type})")]
    NotNumeric { data_type: String },

    #[error("cannot use {operation} with numeric types (field type: {data_type})")]
    NumericColumn {
        operation: &'static str,
        data_type: String,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),
}
