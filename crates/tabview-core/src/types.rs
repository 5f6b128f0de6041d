//! Core types for tabview

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A value read from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Numeric/decimal kept as text to preserve precision
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Text(s) | Value::Decimal(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Text the store can compare the cell against in a lookup query.
    ///
    /// `None` for NULL, binary and array cells, whose display form is only
    /// a summary.
    pub fn to_lookup_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Bytes(_) | Value::Array(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(v) | Value::Text(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Json(v) => write!(f, "{}", v),
            Value::Array(v) => write!(f, "[{} items]", v.len()),
        }
    }
}

/// Opaque physical-location handle of a stored row (a ctid for PostgreSQL).
///
/// Only meaningful to the handle that produced it, and only until the row
/// is rewritten by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowIdentity(String);

impl RowIdentity {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable snapshot of one row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: IndexMap<String, Value>,
    identity: Option<RowIdentity>,
}

impl Row {
    pub fn new(values: IndexMap<String, Value>, identity: Option<RowIdentity>) -> Self {
        Self { values, identity }
    }

    /// Build a row from `(column, value)` pairs, keeping their order
    pub fn from_pairs<I, K>(pairs: I, identity: Option<RowIdentity>) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            identity,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn identity(&self) -> Option<&RowIdentity> {
        self.identity.as_ref()
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Field descriptor of a fetched result, in result order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    pub data_type: String,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// One fetched page of rows
#[derive(Debug, Clone)]
pub struct Page {
    pub id: Uuid,
    pub rows: Vec<Row>,
    pub fields: Vec<FieldMeta>,
    /// Limit the page was requested with
    pub limit: usize,
    /// Offset the page was requested with
    pub offset: usize,
    pub fetched_at: DateTime<Utc>,
}

impl Page {
    pub fn new(fields: Vec<FieldMeta>, rows: Vec<Row>, limit: usize, offset: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            rows,
            fields,
            limit,
            offset,
            fetched_at: Utc::now(),
        }
    }

    pub fn empty(limit: usize, offset: usize) -> Self {
        Self::new(Vec::new(), Vec::new(), limit, offset)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// A page with fewer rows than its limit is the last one
    pub fn is_partial(&self) -> bool {
        self.rows.len() < self.limit
    }

    pub fn find_row(&self, identity: &RowIdentity) -> Option<&Row> {
        self.rows.iter().find(|row| row.identity() == Some(identity))
    }
}

/// Store-reported type information for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub name: String,
    pub data_type: String,
    pub ordinal_position: u32,
}

impl ColumnType {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, ordinal_position: u32) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ordinal_position,
        }
    }

    pub fn is_numeric(&self) -> bool {
        is_numeric_type(&self.data_type)
    }
}

/// Column types keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypes {
    columns: HashMap<String, ColumnType>,
}

impl ColumnTypes {
    pub fn new(columns: impl IntoIterator<Item = ColumnType>) -> Self {
        Self {
            columns: columns.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&ColumnType> {
        self.columns.get(column)
    }

    pub fn data_type(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(|c| c.data_type.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Columns sorted by ordinal position
    pub fn ordered(&self) -> Vec<&ColumnType> {
        let mut columns: Vec<&ColumnType> = self.columns.values().collect();
        columns.sort_by(|a, b| {
            a.ordinal_position
                .cmp(&b.ordinal_position)
                .then_with(|| a.name.cmp(&b.name))
        });
        columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Integer-family column types. Only these accept unquoted numeric literals.
pub fn is_numeric_type(data_type: &str) -> bool {
    matches!(
        data_type.trim().to_ascii_lowercase().as_str(),
        "integer"
            | "int"
            | "int2"
            | "int4"
            | "int8"
            | "smallint"
            | "bigint"
            | "serial"
            | "bigserial"
            | "smallserial"
    )
}

pub fn is_boolean_type(data_type: &str) -> bool {
    matches!(data_type.trim().to_ascii_lowercase().as_str(), "boolean" | "bool")
}

/// Foreign-key link from a column of the loaded rows to another table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// Foreign-key linkage metadata for the currently loaded rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSet {
    pub relations: Vec<Relation>,
}

impl RelationSet {
    pub fn new(relations: Vec<Relation>) -> Self {
        Self { relations }
    }

    pub fn for_column(&self, column: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.column == column)
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
