//! JSON document store
//!
//! 所有状态常驻内存，由一把互斥锁保护 (单写者)。每个文档对应一个
//! 后台落盘 worker，修改只负责登记，写盘在锁外异步完成。
//!
//! # 文档
//!
//! | 文档 | 文件 | 内容 |
//! |------|------|------|
//! | Orders | `orders.json` | `[Order]` |
//! | ReservedTokens | `reserved-tokens.json` | `[string]` |
//! | TokenState | `token-state.json` | `{B, G, ignoreUsedB, ignoreUsedG}` |
//! | Availability | `availability.json` | `{"<counter>": {"<itemId>": false}}` |
//! | Messages | `messages.json` | `[CounterMessage]` |

mod file;
mod flush;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use shared::models::{CounterMessage, Order};
use thiserror::Error;

use crate::core::tasks::BackgroundTasks;
use crate::services::availability::AvailabilityBoard;
use crate::tokens::{ReservedEntry, TokenAllocator, TokenStateDocument};

pub use file::{load_or_seed, write_atomic};
pub use flush::{DocTicket, FlushHandle, FlushState, FlushTicket, FlushWorker, MAX_DELAY_FACTOR, SnapshotFn};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Flush of {document} failed: {message}")]
    FlushFailed {
        document: &'static str,
        message: String,
    },

    #[error("Flush worker for {0} has stopped")]
    WorkerStopped(&'static str),
}

/// Persisted documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Orders,
    ReservedTokens,
    TokenState,
    Availability,
    Messages,
}

impl Document {
    pub const ALL: [Document; 5] = [
        Document::Orders,
        Document::ReservedTokens,
        Document::TokenState,
        Document::Availability,
        Document::Messages,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Document::Orders => "orders",
            Document::ReservedTokens => "reserved-tokens",
            Document::TokenState => "token-state",
            Document::Availability => "availability",
            Document::Messages => "messages",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    const fn index(&self) -> usize {
        match self {
            Document::Orders => 0,
            Document::ReservedTokens => 1,
            Document::TokenState => 2,
            Document::Availability => 3,
            Document::Messages => 4,
        }
    }
}

/// Documents touched by one mutation
#[derive(Debug, Default, Clone, Copy)]
pub struct Changes {
    dirty: [bool; 5],
}

impl Changes {
    pub fn mark(&mut self, doc: Document) {
        self.dirty[doc.index()] = true;
    }

    /// Both token documents (cursor state and reserved set)
    pub fn mark_tokens(&mut self) {
        self.mark(Document::ReservedTokens);
        self.mark(Document::TokenState);
    }

    pub fn mark_all(&mut self) {
        self.dirty = [true; 5];
    }

    pub fn is_dirty(&self, doc: Document) -> bool {
        self.dirty[doc.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.dirty.iter().any(|d| *d)
    }
}

/// In-memory working set
#[derive(Debug, Default)]
pub struct StoreData {
    pub orders: Vec<Order>,
    pub tokens: TokenAllocator,
    pub availability: AvailabilityBoard,
    pub messages: Vec<CounterMessage>,
}

impl StoreData {
    /// Serialize one document
    pub fn encode(&self, doc: Document) -> Result<Vec<u8>, serde_json::Error> {
        match doc {
            Document::Orders => file::encode(&self.orders),
            Document::ReservedTokens => file::encode(&self.tokens.reserved_document()),
            Document::TokenState => file::encode(&self.tokens.state_document()),
            Document::Availability => file::encode(&self.availability.to_document()),
            Document::Messages => file::encode(&self.messages),
        }
    }
}

/// Shared handle to the store
///
/// Cheap to clone; every clone sees the same state and flush workers.
#[derive(Clone)]
pub struct DataStore {
    data: Arc<Mutex<StoreData>>,
    flushers: Arc<HashMap<Document, FlushHandle>>,
    dir: PathBuf,
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore").field("dir", &self.dir).finish()
    }
}

/// Load an array document record by record, skipping malformed entries
async fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let raw: Vec<serde_json::Value> = load_or_seed(path, Vec::new).await?;
    let total = raw.len();
    let records: Vec<T> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();
    if records.len() != total {
        tracing::warn!(
            path = %path.display(),
            kept = records.len(),
            total,
            "Some records could not be loaded"
        );
    }
    Ok(records)
}

impl DataStore {
    /// Load every document from `dir` and start one flush worker per document
    pub async fn open(
        dir: impl AsRef<Path>,
        window: Duration,
        tasks: &mut BackgroundTasks,
    ) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Io {
                path: dir.clone(),
                source: e,
            })?;

        let path = |doc: Document| dir.join(doc.file_name());

        let orders: Vec<Order> = load_records(&path(Document::Orders)).await?;
        let reserved: Vec<ReservedEntry> = load_or_seed(&path(Document::ReservedTokens), Vec::new).await?;
        let state: TokenStateDocument =
            load_or_seed(&path(Document::TokenState), TokenStateDocument::default).await?;
        let availability: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
            load_or_seed(&path(Document::Availability), BTreeMap::new).await?;
        let messages: Vec<CounterMessage> = load_records(&path(Document::Messages)).await?;

        let tokens = TokenAllocator::from_documents(state, reserved, &orders);
        tracing::info!(
            dir = %dir.display(),
            orders = orders.len(),
            reserved = tokens.reserved_count(),
            messages = messages.len(),
            "Store loaded"
        );

        let data = Arc::new(Mutex::new(StoreData {
            orders,
            tokens,
            availability: AvailabilityBoard::from_document(availability),
            messages,
        }));

        let mut flushers = HashMap::new();
        for doc in Document::ALL {
            let source = data.clone();
            let snapshot: SnapshotFn = Arc::new(move || source.lock().encode(doc));
            let (handle, worker) =
                FlushWorker::new(doc.name(), path(doc), window, snapshot, tasks.shutdown_token());
            tasks.spawn(format!("flush:{}", doc.name()), worker.run());
            flushers.insert(doc, handle);
        }

        Ok(Self {
            data,
            flushers: Arc::new(flushers),
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run a read-only query against the working set
    pub fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> R {
        f(&self.data.lock())
    }

    /// Apply a mutation atomically
    ///
    /// Flushes are requested only when `f` returns `Ok`; a rejected mutation
    /// must leave the working set untouched.
    pub fn mutate<R, E>(
        &self,
        f: impl FnOnce(&mut StoreData, &mut Changes) -> Result<R, E>,
    ) -> Result<(R, FlushTicket), E> {
        let mut data = self.data.lock();
        let mut changes = Changes::default();
        let value = f(&mut data, &mut changes)?;

        let mut ticket = FlushTicket::none();
        for doc in Document::ALL {
            if changes.is_dirty(doc)
                && let Some(flusher) = self.flushers.get(&doc)
            {
                ticket.push(flusher.request());
            }
        }
        drop(data);
        Ok((value, ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Counter, OrderItem};

    fn fries() -> Vec<OrderItem> {
        vec![OrderItem {
            id: "fries".into(),
            name: "French Fries".into(),
            price: 40.0,
            qty: 2,
        }]
    }

    #[tokio::test]
    async fn test_open_seeds_every_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut tasks = BackgroundTasks::new();
        let store = DataStore::open(dir.path(), Duration::from_millis(5), &mut tasks)
            .await
            .unwrap();

        for doc in Document::ALL {
            assert!(dir.path().join(doc.file_name()).exists(), "{} missing", doc.name());
        }
        assert_eq!(store.read(|d| d.orders.len()), 0);
        assert_eq!(tasks.len(), Document::ALL.len());
        tasks.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_rejected_mutation_requests_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut tasks = BackgroundTasks::new();
        let store = DataStore::open(dir.path(), Duration::from_millis(5), &mut tasks)
            .await
            .unwrap();

        let result: Result<((), FlushTicket), &str> = store.mutate(|_, changes| {
            changes.mark(Document::Orders);
            Err("nope")
        });
        assert_eq!(result.unwrap_err(), "nope");

        let (_, ticket) = store
            .mutate(|_, _| Ok::<_, ()>(()))
            .unwrap();
        assert!(ticket.is_empty());
        tasks.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_mutation_is_persisted_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut tasks = BackgroundTasks::new();
        let store = DataStore::open(dir.path(), Duration::from_millis(5), &mut tasks)
            .await
            .unwrap();

        let (token, ticket) = store
            .mutate(|data, changes| {
                let token = data.tokens.reserve_sequential(Counter::Two).ok_or(())?;
                data.tokens.commit(&token);
                data.orders.push(Order::new(token.clone(), Counter::Two, fries()));
                changes.mark_tokens();
                changes.mark(Document::Orders);
                Ok::<_, ()>(token)
            })
            .unwrap();
        ticket.wait().await.unwrap();
        tasks.shutdown(Duration::from_secs(1)).await;

        let mut tasks = BackgroundTasks::new();
        let reopened = DataStore::open(dir.path(), Duration::from_millis(5), &mut tasks)
            .await
            .unwrap();
        reopened.read(|d| {
            assert_eq!(d.orders.len(), 1);
            assert_eq!(d.orders[0].token, token);
            assert!(d.tokens.is_used(&token));
            assert_eq!(d.tokens.cursor(Counter::Two), 1);
        });
        tasks.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_malformed_order_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = serde_json::to_value(Order::new("B1", Counter::One, fries())).unwrap();
        let doc = serde_json::json!([good, {"token": "B2"}]);
        std::fs::write(dir.path().join("orders.json"), doc.to_string()).unwrap();

        let mut tasks = BackgroundTasks::new();
        let store = DataStore::open(dir.path(), Duration::from_millis(5), &mut tasks)
            .await
            .unwrap();
        store.read(|d| {
            assert_eq!(d.orders.len(), 1);
            assert!(d.tokens.is_used("B1"));
            assert!(!d.tokens.is_used("B2"));
        });
        tasks.shutdown(Duration::from_secs(1)).await;
    }

    #[test]
    fn test_changes() {
        let mut changes = Changes::default();
        assert!(changes.is_empty());
        changes.mark_tokens();
        assert!(changes.is_dirty(Document::TokenState));
        assert!(changes.is_dirty(Document::ReservedTokens));
        assert!(!changes.is_dirty(Document::Orders));
        changes.mark_all();
        assert!(Document::ALL.iter().all(|d| changes.is_dirty(*d)));
    }
}
