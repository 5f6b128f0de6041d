//! Input state of a row that is being added

use indexmap::IndexMap;
use tabview_core::ColumnTypes;

/// Which editor a new-row field uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Number,
    Text,
}

impl InputKind {
    pub fn for_data_type(data_type: &str) -> Self {
        match data_type.trim().to_ascii_lowercase().as_str() {
            "real" | "smallint" | "numeric" => Self::Number,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftColumn {
    pub name: String,
    pub data_type: String,
    pub input: InputKind,
}

/// A new row being filled in before it is submitted.
///
/// Columns follow the table's ordinal order. Empty inputs are left out of
/// the insert so the store applies column defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDraft {
    columns: Vec<DraftColumn>,
    values: IndexMap<String, String>,
}

impl RowDraft {
    pub fn new(column_types: &ColumnTypes) -> Self {
        let columns = column_types
            .ordered()
            .into_iter()
            .map(|column| DraftColumn {
                name: column.name.clone(),
                data_type: column.data_type.clone(),
                input: InputKind::for_data_type(&column.data_type),
            })
            .collect::<Vec<_>>();
        let values = columns
            .iter()
            .map(|column| (column.name.clone(), String::new()))
            .collect();
        Self { columns, values }
    }

    /// A draft pre-filled with `values`; unknown columns are dropped
    pub fn with_values(column_types: &ColumnTypes, values: &IndexMap<String, String>) -> Self {
        let mut draft = Self::new(column_types);
        for (column, value) in values {
            draft.set(column, value.clone());
        }
        draft
    }

    pub fn columns(&self) -> &[DraftColumn] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Set a field. Returns false if the table has no such column.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(column) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Returns true if discarding the draft would lose typed input
    pub fn has_unsaved_values(&self) -> bool {
        self.values.values().any(|value| !value.is_empty())
    }

    /// Non-empty fields in column order
    pub fn insert_values(&self) -> IndexMap<String, String> {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabview_core::ColumnType;

    fn column_types() -> ColumnTypes {
        ColumnTypes::new([
            ColumnType::new("price", "numeric", 3),
            ColumnType::new("id", "integer", 1),
            ColumnType::new("name", "text", 2),
        ])
    }

    #[test]
    fn columns_follow_ordinal_position() {
        let draft = RowDraft::new(&column_types());
        let names: Vec<_> = draft.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "price"]);
    }

    #[test]
    fn input_kind_by_type() {
        assert_eq!(InputKind::for_data_type("real"), InputKind::Number);
        assert_eq!(InputKind::for_data_type("smallint"), InputKind::Number);
        assert_eq!(InputKind::for_data_type("numeric"), InputKind::Number);
        assert_eq!(InputKind::for_data_type("integer"), InputKind::Text);
        assert_eq!(InputKind::for_data_type("character varying"), InputKind::Text);
    }

    #[test]
    fn empty_inputs_are_not_submitted() {
        let mut draft = RowDraft::new(&column_types());
        assert!(!draft.has_unsaved_values());
        assert!(draft.set("name", "Widget"));
        assert!(!draft.set("missing", "x"));
        assert!(draft.has_unsaved_values());

        let values = draft.insert_values();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("name").map(String::as_str), Some("Widget"));
    }

    #[test]
    fn with_values_restores_known_columns() {
        let mut values = IndexMap::new();
        values.insert("price".to_string(), "9.99".to_string());
        values.insert("ghost".to_string(), "boo".to_string());

        let draft = RowDraft::with_values(&column_types(), &values);
        assert_eq!(draft.get("price"), Some("9.99"));
        assert_eq!(draft.get("ghost"), None);
        assert_eq!(draft.get("id"), Some(""));
    }
}
