//! Table browsing session
//!
//! A [`TableSession`] owns the navigation state of one open table and turns
//! paging, sorting, filtering and row edits into [`TableHandle`] calls.
//! Every operation takes `&mut self`, so a session runs one operation at a
//! time; other tasks follow progress through a [`SessionMonitor`].

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tabview_core::{
    ColumnTypes, Page, QueryCancelHandle, RelationSet, RowIdentity, SortDirection, StoreError,
    StoreResult, TableHandle, Value, quote_identifier, quote_literal,
};
use tabview_filter::{FilterCondition, FilterOperator};

use crate::error::{ServiceError, ServiceResult};
use crate::page_summary::PageSummary;
use crate::query_state::QueryState;
use crate::row_draft::RowDraft;
use crate::settings::BrowserSettings;

/// What a session is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Fetching,
    Mutating,
    /// The last store call failed
    Error,
}

impl SessionPhase {
    /// Returns true while a store call is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Fetching | Self::Mutating)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Mutating => "mutating",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// How to open a table
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Rows per page; the configured default when unset
    pub page_limit: Option<usize>,
    /// Rows the caller already fetched; skips the first `get_rows` call
    pub initial_page: Option<Page>,
    /// A failure the caller hit while preparing the table. The session
    /// opens straight into [`SessionPhase::Error`].
    pub error: Option<StoreError>,
}

impl OpenOptions {
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = Some(limit);
        self
    }

    pub fn with_initial_page(mut self, page: Page) -> Self {
        self.initial_page = Some(page);
        self
    }

    pub fn with_error(mut self, error: StoreError) -> Self {
        self.error = Some(error);
        self
    }
}

/// The published page together with the relations fetched alongside it
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub page: Page,
    pub relations: RelationSet,
}

struct SharedStatus {
    phase: Mutex<SessionPhase>,
    cancel: Mutex<Option<Arc<dyn QueryCancelHandle>>>,
}

/// Read-only view of a session's progress, usable from other tasks while
/// an operation is awaiting the store
#[derive(Clone)]
pub struct SessionMonitor {
    shared: Arc<SharedStatus>,
}

impl SessionMonitor {
    pub fn phase(&self) -> SessionPhase {
        *self.shared.phase.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    /// Ask the driver to interrupt the running query.
    ///
    /// Returns false when nothing is in flight or the driver offers no
    /// cancel handle.
    pub fn cancel(&self) -> bool {
        if !self.is_busy() {
            return false;
        }
        let handle = self.shared.cancel.lock().clone();
        match handle {
            Some(handle) => {
                tracing::info!(phase = %self.phase(), "Cancelling running query");
                handle.cancel();
                true
            }
            None => false,
        }
    }
}

/// Sets the shared phase for the duration of a store call. A guard that is
/// dropped without being settled (the caller dropped the future) puts the
/// session back to `Idle`.
struct PhaseGuard {
    shared: Arc<SharedStatus>,
    settled: bool,
}

impl PhaseGuard {
    fn enter(shared: &Arc<SharedStatus>, phase: SessionPhase) -> Self {
        *shared.phase.lock() = phase;
        Self {
            shared: Arc::clone(shared),
            settled: false,
        }
    }

    fn settle(mut self, phase: SessionPhase) {
        *self.shared.phase.lock() = phase;
        self.settled = true;
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        if !self.settled {
            *self.shared.phase.lock() = SessionPhase::Idle;
        }
    }
}

/// Paging, sorting, filtering and row mutations for one open table
pub struct TableSession {
    settings: BrowserSettings,
    handle: Option<Arc<dyn TableHandle>>,
    column_types: ColumnTypes,
    state: QueryState,
    loaded: Option<LoadedPage>,
    pending_insert: Option<RowDraft>,
    last_error: Option<StoreError>,
    shared: Arc<SharedStatus>,
}

impl Default for TableSession {
    fn default() -> Self {
        Self::new(BrowserSettings::default())
    }
}

impl TableSession {
    pub fn new(settings: BrowserSettings) -> Self {
        let limit = settings.effective_limit(None);
        Self {
            settings,
            handle: None,
            column_types: ColumnTypes::default(),
            state: QueryState::new(limit),
            loaded: None,
            pending_insert: None,
            last_error: None,
            shared: Arc::new(SharedStatus {
                phase: Mutex::new(SessionPhase::Idle),
                cancel: Mutex::new(None),
            }),
        }
    }

    pub fn monitor(&self) -> SessionMonitor {
        SessionMonitor {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.shared.phase.lock()
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn column_types(&self) -> &ColumnTypes {
        &self.column_types
    }

    pub fn loaded_page(&self) -> Option<&LoadedPage> {
        self.loaded.as_ref()
    }

    /// The store error behind [`SessionPhase::Error`], if any
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Open a table, or re-open the current one.
    ///
    /// Navigation state is reset only when the handle points at a different
    /// table than the one this session last showed.
    #[tracing::instrument(skip(self, handle, column_types, options), fields(table = %handle.table_ref()))]
    pub async fn open(
        &mut self,
        handle: Arc<dyn TableHandle>,
        column_types: ColumnTypes,
        options: OpenOptions,
    ) -> ServiceResult<()> {
        let table = handle.table_ref();
        if !self.state.is_for(&table) {
            tracing::debug!("Switching table, resetting query state");
            self.state.reset_for(table);
            self.loaded = None;
            self.pending_insert = None;
        }

        self.state.set_limit(self.settings.effective_limit(options.page_limit));
        self.state.set_include_oid(column_types.contains("oid"));
        self.column_types = column_types;
        *self.shared.cancel.lock() = handle.cancel_handle();
        self.handle = Some(Arc::clone(&handle));

        if let Some(err) = options.error {
            tracing::warn!(error = %err, "Table opened with an error");
            *self.shared.phase.lock() = SessionPhase::Error;
            self.last_error = Some(err.clone());
            return Err(ServiceError::Store(err));
        }

        let kind = self
            .store_call(SessionPhase::Fetching, handle.get_table_type())
            .await?;
        self.state.set_table_kind(kind);

        match options.initial_page {
            Some(page) => {
                let relations = self
                    .store_call(SessionPhase::Fetching, handle.get_relations())
                    .await?;
                self.publish(page, relations);
            }
            None => {
                self.state.set_offset(0);
                self.load_current().await?;
            }
        }

        if self.settings.fetch_total_on_open {
            self.total_row_count().await?;
        }

        tracing::info!(
            limit = self.state.limit(),
            table_kind = ?self.state.table_kind(),
            with_oid = self.state.include_oid(),
            "Table opened"
        );
        Ok(())
    }

    /// Advance one page. The offset moves before the fetch and stays moved
    /// if the fetch fails.
    #[tracing::instrument(skip(self))]
    pub async fn next_page(&mut self) -> ServiceResult<()> {
        self.require_loaded()?;
        self.state.advance();
        tracing::debug!(offset = self.state.offset(), "Getting next page");
        self.load_current().await
    }

    /// Go back one page. Rejected with [`ServiceError::StaleOffset`] when
    /// the current offset is smaller than the page size, including an
    /// initial page that starts part way into the first page.
    #[tracing::instrument(skip(self))]
    pub async fn prev_page(&mut self) -> ServiceResult<()> {
        self.require_loaded()?;
        let (offset, limit) = (self.state.offset(), self.state.limit());
        if !self.state.retreat() {
            tracing::warn!(offset, limit, "Refusing to page before the first row");
            return Err(ServiceError::StaleOffset { offset, limit });
        }
        tracing::debug!(offset = self.state.offset(), "Getting previous page");
        self.load_current().await
    }

    /// Fetch again with the current offset, sort and filter
    #[tracing::instrument(skip(self))]
    pub async fn reload_data(&mut self) -> ServiceResult<()> {
        self.require_handle()?;
        self.load_current().await
    }

    /// Sort by `column` and go back to the first page.
    /// [`SortDirection::None`] removes the sort.
    #[tracing::instrument(skip(self))]
    pub async fn set_sort(&mut self, column: &str, direction: SortDirection) -> ServiceResult<()> {
        self.require_handle()?;
        self.state.set_sort(column, direction);
        self.state.set_offset(0);
        self.load_current().await
    }

    /// Header click: none -> asc -> desc -> none. Returns the new direction.
    pub async fn cycle_sort(&mut self, column: &str) -> ServiceResult<SortDirection> {
        let direction = self.state.sort_direction_for(column).cycle();
        self.set_sort(column, direction).await?;
        Ok(direction)
    }

    /// Validate and apply a filter, replacing any previous one.
    ///
    /// Rejected values leave the session untouched and never reach the
    /// store. The offset is kept as it is.
    #[tracing::instrument(skip(self))]
    pub async fn set_filter(
        &mut self,
        operator: FilterOperator,
        column: &str,
        raw_value: &str,
    ) -> ServiceResult<()> {
        self.require_handle()?;
        let condition = FilterCondition::for_column(operator, column, &self.column_types, raw_value)?;
        self.state.set_filter(condition);
        self.load_current().await
    }

    /// Remove the filter. Returns false without fetching when none was set.
    #[tracing::instrument(skip(self))]
    pub async fn clear_filter(&mut self) -> ServiceResult<bool> {
        self.require_handle()?;
        if self.state.clear_filter().is_none() {
            return Ok(false);
        }
        self.load_current().await?;
        Ok(true)
    }

    /// Unfiltered row count, fetched once per table
    #[tracing::instrument(skip(self))]
    pub async fn total_row_count(&mut self) -> ServiceResult<u64> {
        if let Some(total) = self.state.cached_total_rows() {
            return Ok(total);
        }
        let handle = self.require_handle()?;
        let total = self
            .store_call(SessionPhase::Fetching, handle.get_total_rows())
            .await?;
        self.state.cache_total_rows(total);
        tracing::debug!(total, "Counted table rows");
        Ok(total)
    }

    /// Footer text for the loaded page
    pub fn page_summary(&self) -> Option<PageSummary> {
        self.loaded
            .as_ref()
            .map(|loaded| PageSummary::new(&loaded.page, self.state.cached_total_rows()))
    }

    /// Loaded value of `column` in the row with `identity`
    pub fn row_value(&self, identity: &RowIdentity, column: &str) -> ServiceResult<Option<&Value>> {
        let loaded = self.loaded.as_ref().ok_or(ServiceError::NoPageLoaded)?;
        let row = loaded
            .page
            .find_row(identity)
            .ok_or_else(|| ServiceError::RowNotLoaded(identity.clone()))?;
        Ok(row.get(column))
    }

    /// Start (or resume) filling in a new row
    pub fn begin_insert(&mut self) -> ServiceResult<&mut RowDraft> {
        self.require_handle()?;
        let column_types = &self.column_types;
        Ok(self
            .pending_insert
            .get_or_insert_with(|| RowDraft::new(column_types)))
    }

    pub fn pending_insert(&self) -> Option<&RowDraft> {
        self.pending_insert.as_ref()
    }

    /// Submit the pending draft through [`TableSession::insert_row`]
    pub async fn save_pending_insert(&mut self) -> ServiceResult<u64> {
        let values = self
            .pending_insert
            .as_ref()
            .map(RowDraft::insert_values)
            .ok_or(ServiceError::NothingToInsert)?;
        self.insert_row(values).await
    }

    /// Drop the pending draft. A draft with typed input is only dropped
    /// when `confirmed`; returns whether no draft remains.
    pub fn discard_pending_insert(&mut self, confirmed: bool) -> bool {
        match &self.pending_insert {
            Some(draft) if draft.has_unsaved_values() && !confirmed => false,
            _ => {
                self.pending_insert = None;
                true
            }
        }
    }

    /// Insert a row from column -> raw text. Empty values are left out.
    ///
    /// A failed insert keeps the values as the pending draft so they can be
    /// corrected and saved again. Once the store accepts the row, a failed
    /// page refresh is left in [`TableSession::last_error`] and the insert
    /// still returns `Ok`.
    #[tracing::instrument(skip(self, values))]
    pub async fn insert_row(&mut self, values: IndexMap<String, String>) -> ServiceResult<u64> {
        let handle = self.require_handle()?;
        self.ensure_mutable(&handle).await?;

        let fields: IndexMap<String, String> = values
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();
        if fields.is_empty() {
            return Err(ServiceError::NothingToInsert);
        }

        match self
            .store_call(SessionPhase::Mutating, handle.insert_row(&fields))
            .await
        {
            Ok(result) => {
                self.pending_insert = None;
                tracing::info!(columns = fields.len(), rows = result.row_count, "Row inserted");
                self.refresh_after_mutation().await;
                Ok(result.row_count)
            }
            Err(err) => {
                self.pending_insert = Some(RowDraft::with_values(&self.column_types, &values));
                Err(err)
            }
        }
    }

    /// Set one cell of the row with `identity`.
    ///
    /// When the identity no longer matches a row the session reports
    /// [`ServiceError::Conflict`] and does not reload.
    #[tracing::instrument(skip(self, value))]
    pub async fn update_value(
        &mut self,
        identity: &RowIdentity,
        column: &str,
        value: &str,
        is_null: bool,
    ) -> ServiceResult<u64> {
        let handle = self.require_handle()?;
        self.ensure_mutable(&handle).await?;

        let result = self
            .store_call(
                SessionPhase::Mutating,
                handle.update_value(identity, column, value, is_null),
            )
            .await?;

        if result.row_count == 0 {
            let table = handle.table_ref().to_string();
            tracing::warn!(table = %table, column, "Update matched no rows");
            return Err(ServiceError::Conflict {
                table,
                column: column.to_string(),
            });
        }

        tracing::info!(column, rows = result.row_count, "Value updated");
        self.refresh_after_mutation().await;
        Ok(result.row_count)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_row(&mut self, identity: &RowIdentity) -> ServiceResult<()> {
        let handle = self.require_handle()?;
        self.ensure_mutable(&handle).await?;

        self.store_call(SessionPhase::Mutating, handle.delete_row_by_identity(identity))
            .await?;
        tracing::info!(identity = %identity, "Row deleted");
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Rows of `table` whose `column` equals `value`
    #[tracing::instrument(skip(self))]
    pub async fn follow_foreign_key(
        &mut self,
        table: &str,
        column: &str,
        value: &str,
    ) -> ServiceResult<Page> {
        let handle = self.require_handle()?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = {}",
            quote_identifier(table),
            quote_identifier(column),
            quote_literal(value)
        );
        tracing::debug!("Following foreign key, SQL: {}", sql);
        self.store_call(SessionPhase::Fetching, handle.q(&sql)).await
    }

    /// Follow the relation of `column` from the loaded row with `identity`.
    ///
    /// `None` when the column links nowhere or the cell is NULL, binary or
    /// an array.
    pub async fn follow_relation(
        &mut self,
        identity: &RowIdentity,
        column: &str,
    ) -> ServiceResult<Option<Page>> {
        let loaded = self.loaded.as_ref().ok_or(ServiceError::NoPageLoaded)?;
        let row = loaded
            .page
            .find_row(identity)
            .ok_or_else(|| ServiceError::RowNotLoaded(identity.clone()))?;
        let Some(relation) = loaded.relations.for_column(column) else {
            return Ok(None);
        };
        let Some(value) = row.get(column).and_then(Value::to_lookup_text) else {
            return Ok(None);
        };
        let (table, foreign_column) = (relation.foreign_table.clone(), relation.foreign_column.clone());

        self.follow_foreign_key(&table, &foreign_column, &value)
            .await
            .map(Some)
    }

    fn require_handle(&self) -> ServiceResult<Arc<dyn TableHandle>> {
        self.handle.clone().ok_or(ServiceError::NoTableOpen)
    }

    fn require_loaded(&self) -> ServiceResult<()> {
        self.require_handle()?;
        match self.loaded {
            Some(_) => Ok(()),
            None => Err(ServiceError::NoPageLoaded),
        }
    }

    async fn ensure_mutable(&mut self, handle: &Arc<dyn TableHandle>) -> ServiceResult<()> {
        let kind = match self.state.table_kind() {
            Some(kind) => kind.clone(),
            None => {
                let kind = self
                    .store_call(SessionPhase::Fetching, handle.get_table_type())
                    .await?;
                self.state.set_table_kind(kind.clone());
                kind
            }
        };
        if !kind.is_mutable() {
            tracing::warn!(table_kind = %kind, "Refusing to modify rows");
            return Err(ServiceError::NotMutable { table_kind: kind });
        }
        Ok(())
    }

    /// Reload after a committed mutation. A failed reload does not undo the
    /// mutation, so it is only recorded in `last_error` and the phase.
    async fn refresh_after_mutation(&mut self) {
        if let Err(err) = self.load_current().await {
            tracing::warn!(error = %err, "Mutation committed but the page refresh failed");
        }
    }

    /// Fetch rows and relations for the current state and publish them
    async fn load_current(&mut self) -> ServiceResult<()> {
        let handle = self.require_handle()?;
        let options = self.state.fetch_options();
        let (offset, limit) = (self.state.offset(), self.state.limit());

        let fetch = async {
            let page = handle.get_rows(offset, limit, &options).await?;
            let relations = handle.get_relations().await?;
            Ok::<_, StoreError>((page, relations))
        };
        let (page, relations) = self.store_call(SessionPhase::Fetching, fetch).await?;

        tracing::info!(
            page_id = %page.id,
            fetched_at = %page.fetched_at,
            rows = page.row_count(),
            offset = page.offset,
            limit = page.limit,
            "Page loaded"
        );
        self.publish(page, relations);
        Ok(())
    }

    fn publish(&mut self, page: Page, relations: RelationSet) {
        self.state.set_offset(page.offset);
        if page.limit > 0 {
            self.state.set_limit(page.limit);
        }
        self.loaded = Some(LoadedPage { page, relations });
    }

    async fn store_call<T>(
        &mut self,
        phase: SessionPhase,
        call: impl Future<Output = StoreResult<T>>,
    ) -> ServiceResult<T> {
        let guard = PhaseGuard::enter(&self.shared, phase);
        match call.await {
            Ok(value) => {
                guard.settle(SessionPhase::Idle);
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, phase = %phase, "Store call failed");
                guard.settle(SessionPhase::Error);
                self.last_error = Some(err.clone());
                Err(ServiceError::Store(err))
            }
        }
    }
}
