//! The closed set of filter operators

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tabview_core::{double_percent, escape_identifier, escape_literal, is_boolean_type, is_numeric_type};

use crate::error::{ValidationError, ValidationResult};

/// Filter operators for WHERE fragment generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    // Comparison operators
    #[default]
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,

    // NULL/Empty operators
    IsNull,
    NotNull,
    IsEmpty,

    // Pattern operators
    Like,
    NotLike,
    Regexp,
    Starts,
    Ends,
    Contains,

    /// Raw trailing fragment appended after the column identifier.
    ///
    /// The value is not constrained to a literal, so this operator is NOT
    /// injection-safe. Only `%` is doubled for the template step.
    Custom,
}

impl FilterOperator {
    /// Every registered operator, in display order
    pub fn all() -> &'static [FilterOperator] {
        &[
            Self::Eq,
            Self::NotEq,
            Self::Gt,
            Self::Lt,
            Self::Gte,
            Self::Lte,
            Self::IsNull,
            Self::NotNull,
            Self::IsEmpty,
            Self::Like,
            Self::NotLike,
            Self::Regexp,
            Self::Starts,
            Self::Ends,
            Self::Contains,
            Self::Custom,
        ]
    }

    /// Stable key used in settings and presets
    pub fn key(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::NotEq => "not_eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::IsNull => "is_null",
            Self::NotNull => "not_null",
            Self::IsEmpty => "is_empty",
            Self::Like => "like",
            Self::NotLike => "not_like",
            Self::Regexp => "regexp",
            Self::Starts => "starts",
            Self::Ends => "ends",
            Self::Contains => "contains",
            Self::Custom => "custom",
        }
    }

    /// Display label for the operator picker
    pub fn label(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "≠",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => "≥",
            Self::Lte => "≤",
            Self::IsNull => "is null",
            Self::NotNull => "not null",
            Self::IsEmpty => "empty",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::Regexp => "regexp",
            Self::Starts => "starts",
            Self::Ends => "ends",
            Self::Contains => "contain",
            Self::Custom => "custom",
        }
    }

    /// Returns true if the raw value takes part in the predicate
    pub fn uses_value(&self) -> bool {
        !matches!(self, Self::IsNull | Self::NotNull | Self::IsEmpty)
    }

    /// Check `value` against the column's store type.
    ///
    /// Must pass before [`FilterOperator::compile`] is called.
    pub fn validate(&self, data_type: &str, value: &str) -> ValidationResult<()> {
        match self {
            Self::Eq | Self::NotEq | Self::Gt | Self::Lt | Self::Gte | Self::Lte => {
                basic_validation(data_type, value)
            }
            Self::Like | Self::NotLike | Self::Starts | Self::Ends | Self::Contains => {
                reject_numeric("like", data_type)
            }
            Self::Regexp => reject_numeric("regex", data_type),
            Self::IsNull | Self::NotNull | Self::IsEmpty => Ok(()),
            Self::Custom => {
                if value.is_empty() && !is_boolean_type(data_type) {
                    Err(ValidationError::ValueRequired)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Compile a validated value into a `WHERE` fragment for `column`
    pub fn compile(&self, data_type: &str, column: &str, value: &str) -> String {
        let field = escape_identifier(column);
        let compare = |op: &str| format!("{} {} {}", field, op, num_or_literal(data_type, value));

        match self {
            Self::Eq => compare("="),
            Self::NotEq => compare("!="),
            Self::Gt => compare(">"),
            Self::Lt => compare("<"),
            Self::Gte => compare(">="),
            Self::Lte => compare("<="),
            Self::IsNull => format!("{} is null", field),
            Self::NotNull => format!("{} is not null", field),
            Self::IsEmpty => {
                if is_numeric_type(data_type) {
                    format!("{} is null", field)
                } else {
                    format!("({} is null or {} = '')", field, field)
                }
            }
            Self::Like => format!("{} like {}", field, escape_literal(value)),
            Self::NotLike => format!("{} not like {}", field, escape_literal(value)),
            Self::Regexp => format!("{} ~* {}", field, escape_literal(value)),
            // Wildcards go on the raw value so they are escaped along with it
            Self::Starts => format!("{} like {}", field, escape_literal(&format!("{}%", value))),
            Self::Ends => format!("{} like {}", field, escape_literal(&format!("%{}", value))),
            Self::Contains => format!("{} like {}", field, escape_literal(&format!("%{}%", value))),
            Self::Custom if value.is_empty() => field,
            Self::Custom => format!("{} {}", field, double_percent(value)),
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterOperator {
    type Err = ValidationError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        // "null", "empty" and "contain" are the keys older presets were saved with
        match key {
            "null" => return Ok(Self::IsNull),
            "empty" => return Ok(Self::IsEmpty),
            "contain" => return Ok(Self::Contains),
            _ => {}
        }
        Self::all()
            .iter()
            .copied()
            .find(|op| op.key() == key)
            .ok_or_else(|| ValidationError::UnknownOperator(key.to_string()))
    }
}

fn basic_validation(data_type: &str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::ValueRequired);
    }
    if is_numeric_type(data_type) && value.chars().any(|c| !c.is_ascii_digit()) {
        return Err(ValidationError::NotNumeric {
            data_type: data_type.to_string(),
        });
    }
    Ok(())
}

fn reject_numeric(operation: &'static str, data_type: &str) -> ValidationResult<()> {
    if is_numeric_type(data_type) {
        return Err(ValidationError::NumericColumn {
            operation,
            data_type: data_type.to_string(),
        });
    }
    Ok(())
}

/// Digits-only values of numeric columns go in unquoted; validation already
/// rejected anything else for those columns.
fn num_or_literal(data_type: &str, value: &str) -> String {
    if is_numeric_type(data_type) {
        value.to_string()
    } else {
        escape_literal(value)
    }
}
