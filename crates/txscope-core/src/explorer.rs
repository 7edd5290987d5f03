//! Transaction explorer state machine
//!
//! Owns the canonical transaction list together with the load state, the
//! selected transaction, notifications and the view settings (filters,
//! search, sort, page). One instance lives for the whole process and is
//! shared by the HTTP handlers and the background refresh.
//!
//! Locking: state sits behind a `std::sync::RwLock` that is never held
//! across an `.await`.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use txscope_config::ExplorerConfig;

use super::csv::to_csv;
use super::debounce::Debouncer;
use super::draft::DraftStore;
use super::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use super::models::{CreateTxRequest, Stats, Tx};
use super::normalize::{normalize_at, placeholder};
use super::source::{RawTx, SourceRef};
use super::timers::TimerRegistry;
use super::toast::{Toast, ToastQueue, ToastVariant};
use super::types::{LoadState, SortField, StatusFilter, TxStatus};
use super::view::{filter_sorted, normalize_search, paginate, DateRange, Filters, Page, Sort, ViewState};

pub const TOAST_SUBMITTING: &str = "Submitting transaction…";
pub const TOAST_DETAILS_FAILED: &str = "Failed to load details";
pub const TOAST_COPIED: &str = "Copied to clipboard";
pub const TOAST_COPY_FAILED: &str = "Copy failed — copy manually";
pub const TOAST_CREATE_FAILED: &str = "Create failed";

#[derive(Debug, Clone, PartialEq)]
struct MemoKey {
    revision: u64,
    filters: Filters,
    search: String,
    sort: Sort,
}

#[derive(Debug)]
struct Memo {
    key: MemoKey,
    filtered: Arc<Vec<Tx>>,
}

#[derive(Debug)]
struct State {
    list: Vec<Tx>,
    /// Bumped on every change to `list`
    revision: u64,
    load: LoadState,
    selected: Option<Tx>,
    toasts: ToastQueue,
    view: ViewState,
    /// Latest raw search input, before debouncing
    search_input: String,
    memo: Option<Memo>,
}

impl State {
    fn memo_key(&self) -> MemoKey {
        MemoKey {
            revision: self.revision,
            filters: self.view.filters.clone(),
            search: self.view.search.clone(),
            sort: self.view.sort,
        }
    }

    fn replace_list(&mut self, list: Vec<Tx>) {
        self.list = list;
        self.revision += 1;
    }
}

/// Read model handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub list: Vec<Tx>,
    pub load_state: LoadState,
    pub selected: Option<Tx>,
    pub toasts: Vec<Toast>,
    pub status_filter: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: String,
    pub sort: Sort,
    pub page: usize,
}

struct Shared {
    state: RwLock<State>,
    source: SourceRef,
    config: ExplorerConfig,
    timers: TimerRegistry,
    debouncer: Debouncer,
    drafts: Option<Arc<DraftStore>>,
    logger: DefaultErrorLogger,
    recomputes: AtomicU64,
}

#[derive(Clone)]
pub struct Explorer {
    shared: Arc<Shared>,
}

/// Keep the first occurrence of every id
fn dedupe(list: Vec<Tx>) -> Vec<Tx> {
    let mut seen = std::collections::HashSet::new();
    list.into_iter().filter(|tx| seen.insert(tx.id.clone())).collect()
}

impl Explorer {
    pub fn new(source: SourceRef, config: ExplorerConfig, drafts: Option<Arc<DraftStore>>) -> Self {
        let state = State {
            list: Vec::new(),
            revision: 0,
            load: LoadState::Idle,
            selected: None,
            toasts: ToastQueue::new(config.toast_capacity),
            view: ViewState::new(config.page_size),
            search_input: String::new(),
            memo: None,
        };
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                source,
                debouncer: Debouncer::new(config.debounce()),
                config,
                timers: TimerRegistry::new(),
                drafts,
                logger: DefaultErrorLogger,
                recomputes: AtomicU64::new(0),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.shared.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.shared.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Explorer> {
        weak.upgrade().map(|shared| Explorer { shared })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.shared.config
    }

    pub fn drafts(&self) -> Option<&Arc<DraftStore>> {
        self.shared.drafts.as_ref()
    }

    // ==================== Notifications ====================

    /// Push a toast and schedule its expiry
    pub fn notify(&self, message: impl Into<String>, variant: ToastVariant) -> u64 {
        let id = self.write().toasts.push(message, variant);
        let weak = self.downgrade();
        self.shared
            .timers
            .schedule(self.shared.config.toast_lifetime(), async move {
                if let Some(explorer) = Explorer::upgrade(&weak) {
                    explorer.write().toasts.expire(id);
                }
            });
        id
    }

    pub fn dismiss_toast(&self, id: u64) -> bool {
        self.write().toasts.expire(id)
    }

    pub fn record_copy(&self, ok: bool) {
        if ok {
            self.notify(TOAST_COPIED, ToastVariant::Success);
        } else {
            let err = CoreError::Clipboard {
                message: "clipboard write rejected".to_string(),
            };
            self.shared
                .logger
                .log_warning(&err.to_string(), &ErrorContext::new("record_copy"));
            self.notify(TOAST_COPY_FAILED, ToastVariant::Error);
        }
    }

    // ==================== Fetching ====================

    /// Fetch the full list and replace it wholesale.
    ///
    /// A non-silent fetch shows `Loading` and ends in `Error` on failure.
    /// A silent failure is only logged. The previous list is kept either way.
    pub async fn fetch_all(&self, silent: bool) -> CoreResult<()> {
        if !silent {
            self.write().load = LoadState::Loading;
        }

        match self.shared.source.list_transactions().await {
            Ok(raws) => {
                let now = Utc::now();
                let list = dedupe(raws.iter().map(|raw| normalize_at(raw, now)).collect());
                log::debug!("Fetched {} transactions (silent: {})", list.len(), silent);
                let mut state = self.write();
                state.replace_list(list);
                state.load = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                let context = ErrorContext::new("fetch_all")
                    .with_data("silent", serde_json::json!(silent));
                if silent {
                    self.shared
                        .logger
                        .log_warning(&format!("Background refresh failed: {}", e), &context);
                } else {
                    self.shared.logger.log_error(&e, &context);
                    self.write().load = LoadState::Error(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Re-fetch silently every refresh interval. Each tick runs an
    /// independent fetch, so a slow request never delays the next tick.
    pub fn start_polling(&self) {
        let period = self.shared.config.refresh_interval();
        let weak = self.downgrade();
        self.shared.timers.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                let Some(explorer) = Explorer::upgrade(&weak) else {
                    break;
                };
                let worker = explorer.clone();
                explorer.shared.timers.spawn(async move {
                    let _ = worker.fetch_all(true).await;
                });
            }
        });
        log::info!("Background refresh every {:?}", period);
    }

    pub async fn stats(&self) -> CoreResult<Stats> {
        self.shared.source.stats().await.map_err(|e| {
            self.shared.logger.log_error(&e, &ErrorContext::new("stats"));
            e
        })
    }

    // ==================== Details ====================

    pub async fn open_details(&self, id: &str) -> CoreResult<Tx> {
        match self.shared.source.get_transaction(id).await {
            Ok(raw) => {
                let tx = normalize_at(&raw, Utc::now());
                self.write().selected = Some(tx.clone());
                Ok(tx)
            }
            Err(e) => {
                let context = ErrorContext::new("open_details").with_data("id", serde_json::json!(id));
                self.shared.logger.log_error(&e, &context);
                self.notify(TOAST_DETAILS_FAILED, ToastVariant::Error);
                Err(e)
            }
        }
    }

    pub fn close_details(&self) {
        self.write().selected = None;
    }

    // ==================== Optimistic create ====================

    /// Insert the placeholder at the head of the list. No I/O happens here.
    /// Returns the temporary id.
    pub fn begin_create(&self, request: &CreateTxRequest) -> String {
        let temp_id = txscope_utils::generate_id("temp_");
        let raw = serde_json::to_value(request).unwrap_or_default();
        let tx = placeholder(&temp_id, &raw, Utc::now());
        {
            let mut state = self.write();
            let mut list = Vec::with_capacity(state.list.len() + 1);
            list.push(tx);
            list.extend(state.list.drain(..));
            state.replace_list(list);
        }
        self.notify(TOAST_SUBMITTING, ToastVariant::Success);
        temp_id
    }

    /// Resolve the placeholder created by [`Explorer::begin_create`]
    pub async fn settle_create(&self, temp_id: &str, outcome: CoreResult<RawTx>) -> CoreResult<Tx> {
        match outcome {
            Ok(raw) => {
                let tx = normalize_at(&raw, Utc::now());
                {
                    let mut state = self.write();
                    if let Some(pos) = state.list.iter().position(|t| t.id == temp_id) {
                        let mut list = std::mem::take(&mut state.list);
                        if list.iter().any(|t| t.id == tx.id) {
                            list.remove(pos);
                        } else {
                            list[pos] = tx.clone();
                        }
                        state.replace_list(list);
                    }
                }
                self.notify(format!("Created tx {}", tx.hash), ToastVariant::Success);
                if let Some(drafts) = self.shared.drafts.as_ref() {
                    if let Err(e) = drafts.clear().await {
                        self.shared.logger.log_error(&e, &ErrorContext::new("clear_draft"));
                    }
                }
                Ok(tx)
            }
            Err(e) => {
                {
                    let mut state = self.write();
                    if let Some(pos) = state.list.iter().position(|t| t.id == temp_id) {
                        let mut list = std::mem::take(&mut state.list);
                        list[pos].status = TxStatus::Failed;
                        state.replace_list(list);
                    }
                }
                let context =
                    ErrorContext::new("create_transaction").with_data("temp_id", serde_json::json!(temp_id));
                self.shared.logger.log_error(&e, &context);

                let message = e.to_string();
                let message = if message.is_empty() {
                    TOAST_CREATE_FAILED.to_string()
                } else {
                    message
                };
                self.notify(message, ToastVariant::Error);

                let weak = self.downgrade();
                let temp_id = temp_id.to_string();
                self.shared
                    .timers
                    .schedule(self.shared.config.failed_removal(), async move {
                        if let Some(explorer) = Explorer::upgrade(&weak) {
                            let mut state = explorer.write();
                            if state.list.iter().any(|t| t.id == temp_id) {
                                let list = std::mem::take(&mut state.list)
                                    .into_iter()
                                    .filter(|t| t.id != temp_id)
                                    .collect();
                                state.replace_list(list);
                            }
                        }
                    });
                Err(e)
            }
        }
    }

    pub async fn create_optimistic(&self, request: CreateTxRequest) -> CoreResult<Tx> {
        let temp_id = self.begin_create(&request);
        let outcome = self.shared.source.create_transaction(&request).await;
        self.settle_create(&temp_id, outcome).await
    }

    /// Like [`Explorer::create_optimistic`], but only the placeholder insert
    /// happens before returning. The request and settle run as a tracked
    /// task, so `shutdown` cancels them.
    pub fn submit_create(&self, request: CreateTxRequest) -> String {
        let temp_id = self.begin_create(&request);
        let worker = self.clone();
        let id = temp_id.clone();
        self.shared.timers.spawn(async move {
            let outcome = worker.shared.source.create_transaction(&request).await;
            let _ = worker.settle_create(&id, outcome).await;
        });
        temp_id
    }

    /// Fetch one record without touching the selection
    pub async fn lookup(&self, id: &str) -> CoreResult<Tx> {
        let raw = self.shared.source.get_transaction(id).await?;
        Ok(normalize_at(&raw, Utc::now()))
    }

    // ==================== View ====================

    pub fn toggle_sort(&self, field: SortField) -> Sort {
        let mut state = self.write();
        state.view.sort = state.view.sort.toggled(field);
        state.view.sort
    }

    pub fn set_filters(&self, status: StatusFilter, range: DateRange) {
        let mut state = self.write();
        state.view.filters = Filters { status, range };
        state.view.page = 1;
    }

    /// Record the input and apply it once typing pauses.
    /// Returns false when a newer input superseded this one.
    pub async fn set_search(&self, text: &str) -> bool {
        self.write().search_input = text.to_string();
        match self.shared.debouncer.settle(normalize_search(text)).await {
            Some(applied) => {
                let mut state = self.write();
                state.view.search = applied;
                state.view.page = 1;
                true
            }
            None => false,
        }
    }

    pub fn clear_filters(&self) {
        self.shared.debouncer.cancel();
        let mut state = self.write();
        state.view.filters = Filters::default();
        state.view.search.clear();
        state.search_input.clear();
        state.view.page = 1;
    }

    /// Out-of-range pages fall back to 1. Returns the page actually set.
    pub fn set_page(&self, page: usize) -> usize {
        let filtered = self.filtered();
        let count = super::view::page_count(filtered.len(), self.shared.config.page_size);
        let page = if page == 0 || page > count { 1 } else { page };
        self.write().view.page = page;
        page
    }

    /// Filtered and sorted list, recomputed only when its inputs change
    pub fn filtered(&self) -> Arc<Vec<Tx>> {
        {
            let state = self.read();
            let key = state.memo_key();
            if let Some(memo) = state.memo.as_ref() {
                if memo.key == key {
                    return memo.filtered.clone();
                }
            }
        }

        let mut state = self.write();
        let key = state.memo_key();
        if let Some(memo) = state.memo.as_ref() {
            if memo.key == key {
                return memo.filtered.clone();
            }
        }
        let filtered = Arc::new(filter_sorted(&state.list, &state.view, &Local));
        self.shared.recomputes.fetch_add(1, Ordering::Relaxed);
        state.memo = Some(Memo {
            key,
            filtered: filtered.clone(),
        });
        filtered
    }

    /// Current page of the derived view
    pub fn derived_view(&self) -> Page {
        let filtered = self.filtered();
        let mut state = self.write();
        let page = paginate(&filtered, state.view.page, state.view.page_size);
        state.view.page = page.page;
        page
    }

    pub fn export_csv(&self) -> String {
        to_csv(&self.filtered())
    }

    pub fn view_state(&self) -> ViewState {
        self.read().view.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.read();
        Snapshot {
            list: state.list.clone(),
            load_state: state.load.clone(),
            selected: state.selected.clone(),
            toasts: state.toasts.items(),
            status_filter: state.view.filters.status.as_str().to_string(),
            date_from: state.view.filters.range.from,
            date_to: state.view.filters.range.to,
            search: state.search_input.clone(),
            sort: state.view.sort,
            page: state.view.page,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.read().load.clone()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.read().toasts.items()
    }

    /// Number of times the filtered list was rebuilt
    pub fn recompute_count(&self) -> u64 {
        self.shared.recomputes.load(Ordering::Relaxed)
    }

    /// Cancel polling, in-flight refreshes and every pending timer
    pub fn shutdown(&self) {
        self.shared.debouncer.cancel();
        self.shared.timers.cancel_all();
        log::info!("Explorer timers cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TransactionSource;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeSource {
        list: Mutex<Vec<RawTx>>,
        fail_list: AtomicBool,
        list_calls: AtomicUsize,
        details: Mutex<Option<RawTx>>,
        create_result: Mutex<Option<CoreResult<RawTx>>>,
        release_create: Notify,
    }

    impl FakeSource {
        fn with_list(list: Vec<RawTx>) -> Arc<Self> {
            let source = Self::default();
            *source.list.lock().unwrap() = list;
            Arc::new(source)
        }
    }

    #[async_trait]
    impl TransactionSource for FakeSource {
        async fn list_transactions(&self) -> CoreResult<Vec<RawTx>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(CoreError::Network {
                    message: "connection refused".to_string(),
                });
            }
            Ok(self.list.lock().unwrap().clone())
        }

        async fn get_transaction(&self, id: &str) -> CoreResult<RawTx> {
            self.details
                .lock()
                .unwrap()
                .clone()
                .ok_or(CoreError::TransactionNotFound { id: id.to_string() })
        }

        async fn create_transaction(&self, _request: &CreateTxRequest) -> CoreResult<RawTx> {
            self.release_create.notified().await;
            self.create_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(CoreError::Internal {
                    message: "no result".to_string(),
                }))
        }

        async fn stats(&self) -> CoreResult<Stats> {
            Ok(Stats::default())
        }
    }

    fn raw(id: &str, status: &str, day: u32) -> RawTx {
        json!({
            "id": id,
            "hash": format!("0xhash{}", id),
            "from": "0xfrom",
            "to": "0xto",
            "amount": "1",
            "status": status,
            "timestamp": format!("2024-01-{:02}T12:00:00.000Z", day),
        })
    }

    fn request() -> CreateTxRequest {
        CreateTxRequest {
            to_address: "0x1111111111111111111111111111111111111111".to_string(),
            amount: "0.5".to_string(),
            gas_limit: Some("21000".to_string()),
            gas_price: Some("0.00000002".to_string()),
        }
    }

    fn explorer(source: Arc<FakeSource>) -> Explorer {
        Explorer::new(source, ExplorerConfig::default(), None)
    }

    fn ids(explorer: &Explorer) -> Vec<String> {
        explorer.snapshot().list.into_iter().map(|t| t.id).collect()
    }

    #[tokio::test]
    async fn test_fetch_all_replaces_list_and_dedupes() {
        let source = FakeSource::with_list(vec![raw("a", "pending", 1), raw("b", "confirmed", 2), raw("a", "failed", 3)]);
        let explorer = explorer(source);
        assert_eq!(explorer.load_state(), LoadState::Idle);

        explorer.fetch_all(false).await.unwrap();
        assert_eq!(explorer.load_state(), LoadState::Ready);
        assert_eq!(ids(&explorer), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let source = FakeSource::with_list(vec![raw("a", "pending", 1)]);
        let explorer = explorer(source.clone());
        explorer.fetch_all(false).await.unwrap();

        source.fail_list.store(true, Ordering::SeqCst);
        assert!(explorer.fetch_all(true).await.is_err());
        assert_eq!(explorer.load_state(), LoadState::Ready);
        assert_eq!(ids(&explorer), vec!["a"]);

        assert!(explorer.fetch_all(false).await.is_err());
        assert!(matches!(explorer.load_state(), LoadState::Error(ref m) if m.contains("connection refused")));
        assert_eq!(ids(&explorer), vec!["a"]);

        source.fail_list.store(false, Ordering::SeqCst);
        explorer.fetch_all(true).await.unwrap();
        assert_eq!(explorer.load_state(), LoadState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_create_inserts_before_network() {
        let source = FakeSource::with_list(vec![raw("a", "pending", 1)]);
        let explorer = explorer(source.clone());
        explorer.fetch_all(false).await.unwrap();

        let worker = explorer.clone();
        let handle = tokio::spawn(async move { worker.create_optimistic(request()).await });
        tokio::task::yield_now().await;

        let snapshot = explorer.snapshot();
        assert_eq!(snapshot.list.len(), 2);
        assert!(snapshot.list[0].optimistic);
        assert!(snapshot.list[0].id.starts_with("temp_"));
        assert_eq!(snapshot.list[0].status, TxStatus::Pending);
        assert!(snapshot.toasts.iter().any(|t| t.message == TOAST_SUBMITTING));

        *source.create_result.lock().unwrap() = Some(Ok(raw("srv1", "pending", 5)));
        source.release_create.notify_one();
        let created = handle.await.unwrap().unwrap();
        assert_eq!(created.id, "srv1");

        let snapshot = explorer.snapshot();
        assert_eq!(ids(&explorer), vec!["srv1", "a"]);
        assert!(!snapshot.list[0].optimistic);
        assert!(snapshot.toasts.iter().any(|t| t.message == "Created tx 0xhashsrv1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_when_server_id_already_listed() {
        let source = FakeSource::with_list(vec![raw("a", "pending", 1)]);
        let explorer = explorer(source);
        explorer.fetch_all(false).await.unwrap();

        let temp_id = explorer.begin_create(&request());
        explorer.settle_create(&temp_id, Ok(raw("a", "confirmed", 1))).await.unwrap();
        assert_eq!(ids(&explorer), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_after_wholesale_replace_is_noop() {
        let source = FakeSource::with_list(vec![raw("a", "pending", 1)]);
        let explorer = explorer(source);

        let temp_id = explorer.begin_create(&request());
        explorer.fetch_all(true).await.unwrap();
        assert_eq!(ids(&explorer), vec!["a"]);

        explorer.settle_create(&temp_id, Ok(raw("srv", "pending", 2))).await.unwrap();
        assert_eq!(ids(&explorer), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_create_flips_then_removes() {
        let source = FakeSource::with_list(vec![raw("a", "pending", 1)]);
        let explorer = explorer(source);
        explorer.fetch_all(false).await.unwrap();

        let temp_id = explorer.begin_create(&request());
        let err = CoreError::HttpStatus {
            status: 500,
            url: "http://api/transactions".to_string(),
        };
        assert!(explorer.settle_create(&temp_id, Err(err)).await.is_err());

        let snapshot = explorer.snapshot();
        assert_eq!(snapshot.list[0].id, temp_id);
        assert_eq!(snapshot.list[0].status, TxStatus::Failed);
        assert!(snapshot
            .toasts
            .iter()
            .any(|t| t.variant == ToastVariant::Error && t.message.contains("500")));

        tokio::time::sleep(Duration::from_millis(2_400)).await;
        assert_eq!(ids(&explorer).len(), 2);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ids(&explorer), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toasts_expire_by_id() {
        let explorer = explorer(FakeSource::with_list(vec![]));
        explorer.notify("first", ToastVariant::Success);
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        explorer.notify("second", ToastVariant::Success);

        tokio::time::sleep(Duration::from_millis(1_600)).await;
        let messages: Vec<_> = explorer.toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["second"]);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(explorer.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_details_failure_keeps_selection() {
        let source = FakeSource::with_list(vec![]);
        *source.details.lock().unwrap() = Some(raw("d1", "confirmed", 3));
        let explorer = explorer(source.clone());

        let tx = explorer.open_details("d1").await.unwrap();
        assert_eq!(explorer.snapshot().selected, Some(tx));

        *source.details.lock().unwrap() = None;
        assert!(explorer.open_details("missing").await.is_err());
        let snapshot = explorer.snapshot();
        assert_eq!(snapshot.selected.map(|t| t.id), Some("d1".to_string()));
        assert!(snapshot.toasts.iter().any(|t| t.message == TOAST_DETAILS_FAILED));

        explorer.close_details();
        assert!(explorer.snapshot().selected.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_recomputes_once() {
        let source = FakeSource::with_list(vec![raw("1", "pending", 1), raw("2", "pending", 2), raw("abc", "pending", 3)]);
        let explorer = explorer(source);
        explorer.fetch_all(false).await.unwrap();

        explorer.derived_view();
        let before = explorer.recompute_count();

        let mut handles = Vec::new();
        for text in ["0x", "0xHash", "0xhashABC"] {
            let worker = explorer.clone();
            handles.push(tokio::spawn(async move { worker.set_search(text).await }));
            tokio::time::sleep(Duration::from_millis(100)).await;
            explorer.derived_view();
        }
        let mut applied = Vec::new();
        for handle in handles {
            applied.push(handle.await.unwrap());
        }
        assert_eq!(applied, vec![false, false, true]);

        let view = explorer.derived_view();
        explorer.derived_view();
        assert_eq!(explorer.recompute_count() - before, 1);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].id, "abc");
        assert_eq!(explorer.snapshot().search, "0xhashABC");
    }

    #[tokio::test]
    async fn test_pagination_resets_out_of_range() {
        let raws: Vec<RawTx> = (1..=23).map(|i| raw(&i.to_string(), "pending", (i % 28) + 1)).collect();
        let explorer = explorer(FakeSource::with_list(raws));
        explorer.fetch_all(false).await.unwrap();

        assert_eq!(explorer.set_page(3), 3);
        let view = explorer.derived_view();
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.page_count, 3);

        assert_eq!(explorer.set_page(4), 1);
        assert_eq!(explorer.derived_view().items.len(), 10);
    }

    #[tokio::test]
    async fn test_filters_reset_page_and_sort_toggles() {
        let raws: Vec<RawTx> = (1..=15).map(|i| raw(&i.to_string(), "confirmed", i)).collect();
        let explorer = explorer(FakeSource::with_list(raws));
        explorer.fetch_all(false).await.unwrap();

        explorer.set_page(2);
        explorer.set_filters(StatusFilter::parse("confirmed"), DateRange::default());
        assert_eq!(explorer.view_state().page, 1);

        assert_eq!(explorer.toggle_sort(SortField::Date).dir, crate::types::SortDir::Asc);
        assert_eq!(explorer.toggle_sort(SortField::Amount).dir, crate::types::SortDir::Desc);

        explorer.set_page(2);
        explorer.clear_filters();
        let view = explorer.view_state();
        assert_eq!(view.page, 1);
        assert_eq!(view.filters, Filters::default());
    }

    #[tokio::test]
    async fn test_export_covers_filtered_list_not_page() {
        let raws: Vec<RawTx> = (1..=12).map(|i| raw(&i.to_string(), "pending", i)).collect();
        let explorer = explorer(FakeSource::with_list(raws));
        explorer.fetch_all(false).await.unwrap();

        let csv = explorer.export_csv();
        assert_eq!(csv.lines().count(), 13);
        assert!(csv.starts_with(crate::csv::CSV_HEADER));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_until_shutdown() {
        let source = FakeSource::with_list(vec![raw("a", "pending", 1)]);
        let explorer = explorer(source.clone());
        explorer.start_polling();

        tokio::time::sleep(Duration::from_millis(15_100)).await;
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(15_000)).await;
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);

        explorer.shutdown();
        tokio::time::sleep(Duration::from_millis(60_000)).await;
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_copy_toasts() {
        let explorer = explorer(FakeSource::with_list(vec![]));
        explorer.record_copy(true);
        explorer.record_copy(false);
        let messages: Vec<_> = explorer.toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec![TOAST_COPIED, TOAST_COPY_FAILED]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_create_returns_after_placeholder() {
        let source = FakeSource::with_list(vec![]);
        let explorer = explorer(source.clone());

        let temp_id = explorer.submit_create(request());
        assert_eq!(ids(&explorer), vec![temp_id.clone()]);

        *source.create_result.lock().unwrap() = Some(Ok(raw("srv2", "pending", 4)));
        source.release_create.notify_one();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ids(&explorer), vec!["srv2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_submitted_create() {
        let source = FakeSource::with_list(vec![]);
        let explorer = explorer(source.clone());

        let temp_id = explorer.submit_create(request());
        tokio::task::yield_now().await;
        explorer.shutdown();

        *source.create_result.lock().unwrap() = Some(Ok(raw("srv3", "pending", 4)));
        source.release_create.notify_one();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ids(&explorer), vec![temp_id]);
        assert!(source.create_result.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lookup_leaves_selection_alone() {
        let source = FakeSource::with_list(vec![]);
        *source.details.lock().unwrap() = Some(raw("d9", "failed", 9));
        let explorer = explorer(source);

        let tx = explorer.lookup("d9").await.unwrap();
        assert_eq!(tx.status, TxStatus::Failed);
        assert!(explorer.snapshot().selected.is_none());
    }
}
