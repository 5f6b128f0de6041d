//! The store-side handle of an open table

use crate::{Page, RelationSet, RowIdentity, StoreResult};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity of an open table: database plus (optionally schema-qualified) name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub database: String,
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}.{}", self.database, schema, self.name),
            None => write!(f, "{}.{}", self.database, self.name),
        }
    }
}

/// Relation kind as reported by `information_schema.tables.table_type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    BaseTable,
    /// VIEW, FOREIGN, LOCAL TEMPORARY, materialized views, ...
    Other(String),
}

impl TableKind {
    pub fn parse(table_type: &str) -> Self {
        if table_type.trim().eq_ignore_ascii_case("BASE TABLE") {
            Self::BaseTable
        } else {
            Self::Other(table_type.trim().to_string())
        }
    }

    /// Only base tables accept insert, update and delete
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::BaseTable)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::BaseTable => "BASE TABLE",
            Self::Other(kind) => kind,
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    None,
    Asc,
    Desc,
}

impl SortDirection {
    /// Next direction when a column header is clicked: none -> asc -> desc -> none
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::Asc,
            Self::Asc => Self::Desc,
            Self::Desc => Self::None,
        }
    }

    pub fn sql(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Asc => Some("ASC"),
            Self::Desc => Some("DESC"),
        }
    }
}

/// Active sort of a fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Options passed along with every page fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub sort: Option<SortSpec>,
    /// Compiled predicate fragments. The session never sets more than one.
    pub conditions: Vec<String>,
    /// Whether the table exposes an `oid` column that should be selected
    pub with_oid: bool,
}

/// Outcome of an insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertResult {
    pub row_count: u64,
}

/// Outcome of a single-column update. A zero `row_count` means the row
/// identity matched nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub row_count: u64,
}

/// Handle for cancelling a running query from any thread.
///
/// Calling `cancel` when nothing is running is a no-op.
pub trait QueryCancelHandle: Send + Sync {
    fn cancel(&self);
}

/// Store access for one open table.
///
/// Implementations own the transport; every call is a single round trip
/// and may fail with a [`crate::StoreError`].
#[async_trait]
pub trait TableHandle: Send + Sync {
    /// Identity of the table this handle reads from
    fn table_ref(&self) -> TableRef;

    /// Fetch `limit` rows starting at `offset`
    async fn get_rows(&self, offset: usize, limit: usize, options: &FetchOptions) -> StoreResult<Page>;

    /// Foreign-key linkage of the table
    async fn get_relations(&self) -> StoreResult<RelationSet>;

    /// Unfiltered row count of the table
    async fn get_total_rows(&self) -> StoreResult<u64>;

    async fn get_table_type(&self) -> StoreResult<TableKind>;

    /// Insert a row from column -> raw text value
    async fn insert_row(&self, fields: &IndexMap<String, String>) -> StoreResult<InsertResult>;

    async fn update_value(
        &self,
        identity: &RowIdentity,
        column: &str,
        value: &str,
        is_null: bool,
    ) -> StoreResult<UpdateResult>;

    async fn delete_row_by_identity(&self, identity: &RowIdentity) -> StoreResult<()>;

    /// Run an ad hoc query. The caller escapes every interpolated value.
    async fn q(&self, sql: &str) -> StoreResult<Page>;

    /// Handle to interrupt the running query, if the driver supports it
    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_kind_parses_information_schema_values() {
        assert_eq!(TableKind::parse("BASE TABLE"), TableKind::BaseTable);
        assert_eq!(TableKind::parse("base table"), TableKind::BaseTable);
        assert_eq!(TableKind::parse("VIEW"), TableKind::Other("VIEW".to_string()));
        assert!(!TableKind::parse("VIEW").is_mutable());
        assert!(TableKind::BaseTable.is_mutable());
    }

    #[test]
    fn sort_direction_cycles_through_none() {
        let mut direction = SortDirection::None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            direction = direction.cycle();
            seen.push(direction);
        }
        assert_eq!(
            seen,
            vec![SortDirection::Asc, SortDirection::Desc, SortDirection::None, SortDirection::Asc]
        );
    }

    #[test]
    fn table_ref_display_includes_schema() {
        let table = TableRef::new("shop", "orders").with_schema("public");
        assert_eq!(table.to_string(), "shop.public.orders");
        assert_eq!(TableRef::new("shop", "orders").to_string(), "shop.orders");
    }
}
