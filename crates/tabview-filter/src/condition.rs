//! The single active filter of a table session

use tabview_core::ColumnTypes;

use crate::error::{ValidationError, ValidationResult};
use crate::operator::FilterOperator;

/// A validated, compiled filter.
///
/// Only constructed through [`FilterCondition::new`] or
/// [`FilterCondition::for_column`], so holding one means validation passed
/// for the column type it was built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    operator: FilterOperator,
    column: String,
    raw_value: String,
    predicate: String,
}

impl FilterCondition {
    /// Validate `raw_value` and compile the predicate
    pub fn new(
        operator: FilterOperator,
        column: impl Into<String>,
        data_type: &str,
        raw_value: impl Into<String>,
    ) -> ValidationResult<Self> {
        let column = column.into();
        let raw_value = raw_value.into();

        if let Err(err) = operator.validate(data_type, &raw_value) {
            tracing::debug!(
                column = %column,
                operator = operator.key(),
                data_type = %data_type,
                error = %err,
                "filter value rejected"
            );
            return Err(err);
        }

        let predicate = operator.compile(data_type, &column, &raw_value);
        tracing::debug!(predicate = %predicate, "compiled filter predicate");

        Ok(Self {
            operator,
            column,
            raw_value,
            predicate,
        })
    }

    /// Like [`FilterCondition::new`], looking the column's type up first
    pub fn for_column(
        operator: FilterOperator,
        column: &str,
        column_types: &ColumnTypes,
        raw_value: impl Into<String>,
    ) -> ValidationResult<Self> {
        let data_type = column_types
            .data_type(column)
            .ok_or_else(|| ValidationError::UnknownColumn(column.to_string()))?;
        Self::new(operator, column, data_type, raw_value)
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// The compiled `WHERE` fragment
    pub fn predicate(&self) -> &str {
        &self.predicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabview_core::ColumnType;

    fn types() -> ColumnTypes {
        ColumnTypes::new([
            ColumnType::new("id", "integer", 1),
            ColumnType::new("name", "character varying", 2),
        ])
    }

    #[test]
    fn for_column_uses_the_column_type() {
        let condition = FilterCondition::for_column(FilterOperator::Gt, "id", &types(), "30")
            .expect("valid filter");
        assert_eq!(condition.predicate(), "\"id\" > 30");
        assert_eq!(condition.column(), "id");
        assert_eq!(condition.raw_value(), "30");
        assert_eq!(condition.operator(), FilterOperator::Gt);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = FilterCondition::for_column(FilterOperator::Eq, "missing", &types(), "1")
            .expect_err("column does not exist");
        assert_eq!(err, ValidationError::UnknownColumn("missing".to_string()));
    }

    #[test]
    fn failed_validation_builds_nothing() {
        let err = FilterCondition::for_column(FilterOperator::Eq, "id", &types(), "abc")
            .expect_err("not numeric");
        assert_eq!(err.to_string(), "Value must be numeric (field type: integer)");
    }
}
