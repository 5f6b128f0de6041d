//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tabview_core::{
    ColumnType, ColumnTypes, FetchOptions, FieldMeta, InsertResult, Page, QueryCancelHandle,
    Relation, RelationSet, Row, RowIdentity, StoreError, StoreResult, TableHandle, TableKind,
    TableRef, UpdateResult, Value,
};
use tokio::sync::Notify;

/// One call received by [`MockTableHandle`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetRows {
        offset: usize,
        limit: usize,
        options: FetchOptions,
    },
    GetRelations,
    GetTotalRows,
    GetTableType,
    InsertRow(IndexMap<String, String>),
    UpdateValue {
        identity: RowIdentity,
        column: String,
        value: String,
        is_null: bool,
    },
    DeleteRow(RowIdentity),
    Q(String),
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::GetRows { .. } => "get_rows",
            Call::GetRelations => "get_relations",
            Call::GetTotalRows => "get_total_rows",
            Call::GetTableType => "get_table_type",
            Call::InsertRow(_) => "insert_row",
            Call::UpdateValue { .. } => "update_value",
            Call::DeleteRow(_) => "delete_row",
            Call::Q(_) => "q",
        }
    }
}

/// Cancel handle that records requests and wakes a gated `get_rows`
#[derive(Default)]
pub struct MockCancel {
    pub requests: AtomicUsize,
    wake: Notify,
}

impl QueryCancelHandle for MockCancel {
    fn cancel(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

/// Mock table handle for testing session logic without a store.
///
/// Serves `total_rows` generated rows of a small `users` table, logs every
/// call, and fails any call registered through [`MockTableHandle::fail_on`].
pub struct MockTableHandle {
    pub table: TableRef,
    pub table_kind: TableKind,
    pub total_rows: usize,
    pub relations: RelationSet,
    pub update_row_count: Mutex<u64>,
    pub cancel: Option<Arc<MockCancel>>,
    /// When set, `get_rows` waits until the cancel handle fires
    pub gated: AtomicBool,
    failures: Mutex<HashMap<&'static str, StoreError>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTableHandle {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            table_kind: TableKind::BaseTable,
            total_rows: 230,
            relations: RelationSet::new(vec![
                Relation {
                    column: "team_id".to_string(),
                    foreign_table: "teams".to_string(),
                    foreign_column: "id".to_string(),
                },
                Relation {
                    column: "avatar".to_string(),
                    foreign_table: "images".to_string(),
                    foreign_column: "data".to_string(),
                },
            ]),
            update_row_count: Mutex::new(1),
            cancel: None,
            gated: AtomicBool::new(false),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_kind(mut self, kind: TableKind) -> Self {
        self.table_kind = kind;
        self
    }

    pub fn with_total_rows(mut self, total_rows: usize) -> Self {
        self.total_rows = total_rows;
        self
    }

    pub fn with_cancel_support(mut self) -> Self {
        self.cancel = Some(Arc::new(MockCancel::default()));
        self
    }

    /// Make every call named `call` fail with `error` until [`MockTableHandle::recover`]
    pub fn fail_on(&self, call: &'static str, error: StoreError) {
        self.failures.lock().insert(call, error);
    }

    pub fn recover(&self, call: &'static str) {
        self.failures.lock().remove(call);
    }

    pub fn set_update_row_count(&self, count: u64) {
        *self.update_row_count.lock() = count;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(Call::name).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Options of the most recent `get_rows` call
    pub fn last_fetch(&self) -> Option<(usize, usize, FetchOptions)> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            Call::GetRows {
                offset,
                limit,
                options,
            } => Some((*offset, *limit, options.clone())),
            _ => None,
        })
    }

    fn record(&self, call: Call) -> StoreResult<()> {
        let name = call.name();
        self.calls.lock().push(call);
        match self.failures.lock().get(name) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TableHandle for MockTableHandle {
    fn table_ref(&self) -> TableRef {
        self.table.clone()
    }

    async fn get_rows(&self, offset: usize, limit: usize, options: &FetchOptions) -> StoreResult<Page> {
        self.record(Call::GetRows {
            offset,
            limit,
            options: options.clone(),
        })?;

        if self.gated.load(Ordering::SeqCst) {
            if let Some(cancel) = &self.cancel {
                cancel.wake.notified().await;
                return Err(StoreError::cancelled());
            }
        }

        let end = (offset + limit).min(self.total_rows);
        let rows = (offset..end).map(user_row).collect();
        Ok(Page::new(user_fields(), rows, limit, offset))
    }

    async fn get_relations(&self) -> StoreResult<RelationSet> {
        self.record(Call::GetRelations)?;
        Ok(self.relations.clone())
    }

    async fn get_total_rows(&self) -> StoreResult<u64> {
        self.record(Call::GetTotalRows)?;
        Ok(self.total_rows as u64)
    }

    async fn get_table_type(&self) -> StoreResult<TableKind> {
        self.record(Call::GetTableType)?;
        Ok(self.table_kind.clone())
    }

    async fn insert_row(&self, fields: &IndexMap<String, String>) -> StoreResult<InsertResult> {
        self.record(Call::InsertRow(fields.clone()))?;
        Ok(InsertResult { row_count: 1 })
    }

    async fn update_value(
        &self,
        identity: &RowIdentity,
        column: &str,
        value: &str,
        is_null: bool,
    ) -> StoreResult<UpdateResult> {
        self.record(Call::UpdateValue {
            identity: identity.clone(),
            column: column.to_string(),
            value: value.to_string(),
            is_null,
        })?;
        Ok(UpdateResult {
            row_count: *self.update_row_count.lock(),
        })
    }

    async fn delete_row_by_identity(&self, identity: &RowIdentity) -> StoreResult<()> {
        self.record(Call::DeleteRow(identity.clone()))
    }

    async fn q(&self, sql: &str) -> StoreResult<Page> {
        self.record(Call::Q(sql.to_string()))?;
        Ok(Page::new(
            vec![FieldMeta::new("id", "integer"), FieldMeta::new("name", "text")],
            vec![Row::from_pairs(
                [("id", Value::Int(3)), ("name", Value::Text("Platform".to_string()))],
                None,
            )],
            1,
            0,
        ))
    }

    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        self.cancel
            .clone()
            .map(|cancel| cancel as Arc<dyn QueryCancelHandle>)
    }
}

/// Identity the mock assigns to generated row `index`
pub fn identity(index: usize) -> RowIdentity {
    RowIdentity::new(format!("(0,{})", index + 1))
}

fn user_fields() -> Vec<FieldMeta> {
    vec![
        FieldMeta::new("id", "integer"),
        FieldMeta::new("name", "character varying"),
        FieldMeta::new("age", "integer"),
        FieldMeta::new("email", "text"),
        FieldMeta::new("team_id", "integer"),
        FieldMeta::new("avatar", "bytea"),
    ]
}

fn user_row(index: usize) -> Row {
    let email = if index % 10 == 0 {
        Value::Null
    } else {
        Value::Text(format!("user{}@example.com", index))
    };
    let team = if index % 7 == 0 {
        Value::Null
    } else {
        Value::Int((index % 5) as i64)
    };
    Row::from_pairs(
        [
            ("id", Value::Int(index as i64)),
            ("name", Value::Text(format!("user{}", index))),
            ("age", Value::Int(20 + (index % 50) as i64)),
            ("email", email),
            ("team_id", team),
            ("avatar", Value::Bytes(vec![0x89, 0x50, 0x4e, 0x47])),
        ],
        Some(identity(index)),
    )
}

pub fn users_table() -> TableRef {
    TableRef::new("shop", "users").with_schema("public")
}

pub fn user_column_types() -> ColumnTypes {
    ColumnTypes::new([
        ColumnType::new("id", "integer", 1),
        ColumnType::new("name", "character varying", 2),
        ColumnType::new("age", "integer", 3),
        ColumnType::new("email", "text", 4),
        ColumnType::new("team_id", "integer", 5),
        ColumnType::new("avatar", "bytea", 6),
    ])
}

pub fn users_handle() -> Arc<MockTableHandle> {
    Arc::new(MockTableHandle::new(users_table()))
}

/// Initialize logging for tests if not already initialized
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("tabview_services=debug"))
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
