//! Debounced flush scheduler
//!
//! One worker per document. Every mutation bumps a requested generation;
//! the worker waits until requests stop arriving for one window (capped at
//! [`MAX_DELAY_FACTOR`] windows after the first pending request), snapshots
//! the document and writes it once. Callers hold a [`DocTicket`] and can await
//! the write that covers their generation.
//!
//! ```text
//! mutate ─► request() ─► gen=7 ──┐
//! mutate ─► request() ─► gen=8 ──┼─► (quiet for window) ─► snapshot ─► write ─► done=8
//! mutate ─► request() ─► gen=9 ──┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{StorageError, file};

/// Upper bound on how long a steady stream of mutations can postpone a write
pub const MAX_DELAY_FACTOR: u32 = 5;

/// Produces the bytes to write; called by the worker right before each write
pub type SnapshotFn = Arc<dyn Fn() -> Result<Vec<u8>, serde_json::Error> + Send + Sync>;

/// Result of the most recent write
#[derive(Debug, Clone, Default)]
pub struct FlushState {
    /// Highest requested generation covered by a finished write
    pub generation: u64,
    /// Error of that write, if it failed
    pub error: Option<String>,
}

/// Handle used by the store to request flushes of one document
#[derive(Clone)]
pub struct FlushHandle {
    name: &'static str,
    requested: watch::Sender<u64>,
    done: watch::Receiver<FlushState>,
}

impl std::fmt::Debug for FlushHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushHandle")
            .field("name", &self.name)
            .field("requested", &*self.requested.borrow())
            .finish()
    }
}

impl FlushHandle {
    /// Request a flush; must be called after the mutation is applied
    pub fn request(&self) -> DocTicket {
        let mut generation = 0;
        self.requested.send_modify(|g| {
            *g += 1;
            generation = *g;
        });
        DocTicket {
            name: self.name,
            generation,
            done: self.done.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Completion handle for one requested flush of one document
#[derive(Debug, Clone)]
pub struct DocTicket {
    name: &'static str,
    generation: u64,
    done: watch::Receiver<FlushState>,
}

impl DocTicket {
    /// Wait until a write covering this request has finished
    pub async fn wait(mut self) -> Result<(), StorageError> {
        loop {
            {
                let state = self.done.borrow_and_update();
                if state.generation >= self.generation {
                    return match &state.error {
                        None => Ok(()),
                        Some(message) => Err(StorageError::FlushFailed {
                            document: self.name,
                            message: message.clone(),
                        }),
                    };
                }
            }
            if self.done.changed().await.is_err() {
                // worker gone; it may still have published a final state
                let state = self.done.borrow();
                if state.generation >= self.generation && state.error.is_none() {
                    return Ok(());
                }
                return Err(StorageError::WorkerStopped(self.name));
            }
        }
    }
}

/// Tickets for every document touched by one mutation
#[derive(Debug, Default)]
#[must_use = "a flush ticket does nothing unless awaited or dropped on purpose"]
pub struct FlushTicket {
    tickets: Vec<DocTicket>,
}

impl FlushTicket {
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, ticket: DocTicket) {
        self.tickets.push(ticket);
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Wait for every document; returns the first failure
    pub async fn wait(self) -> Result<(), StorageError> {
        let results = futures::future::join_all(self.tickets.into_iter().map(DocTicket::wait)).await;
        results.into_iter().collect()
    }
}

/// Background writer for one document
pub struct FlushWorker {
    name: &'static str,
    path: PathBuf,
    window: Duration,
    snapshot: SnapshotFn,
    requested: watch::Receiver<u64>,
    done: watch::Sender<FlushState>,
    /// Highest generation that actually reached disk
    flushed: u64,
    shutdown: CancellationToken,
}

impl FlushWorker {
    /// Create a worker and the handle that feeds it
    pub fn new(
        name: &'static str,
        path: PathBuf,
        window: Duration,
        snapshot: SnapshotFn,
        shutdown: CancellationToken,
    ) -> (FlushHandle, FlushWorker) {
        let (req_tx, req_rx) = watch::channel(0u64);
        let (done_tx, done_rx) = watch::channel(FlushState::default());
        let handle = FlushHandle {
            name,
            requested: req_tx,
            done: done_rx,
        };
        let worker = FlushWorker {
            name,
            path,
            window,
            snapshot,
            requested: req_rx,
            done: done_tx,
            flushed: 0,
            shutdown,
        };
        (handle, worker)
    }

    /// Run until shutdown; the pending snapshot is written before returning
    pub async fn run(mut self) {
        tracing::debug!(document = %self.name, "Flush worker started");

        let max_delay = self.window * MAX_DELAY_FACTOR;
        let mut first_pending: Option<Instant> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let sleep_until = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    if self.has_pending() {
                        tracing::info!(document = %self.name, "Writing pending snapshot before shutdown");
                        self.flush().await;
                    }
                    break;
                }

                changed = self.requested.changed() => {
                    if changed.is_err() {
                        // store dropped
                        if self.has_pending() {
                            self.flush().await;
                        }
                        break;
                    }
                    let now = Instant::now();
                    let first = *first_pending.get_or_insert(now);
                    deadline = Some((now + self.window).min(first + max_delay));
                }

                _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                    self.flush().await;
                    first_pending = None;
                    deadline = None;
                }
            }
        }

        tracing::debug!(document = %self.name, "Flush worker stopped");
    }

    /// Requested generations not yet on disk, including failed writes
    fn has_pending(&self) -> bool {
        *self.requested.borrow() > self.flushed
    }

    /// Snapshot and write once
    ///
    /// The target generation is read before the snapshot, so every mutation
    /// that requested a generation up to it is included.
    async fn flush(&mut self) {
        let target = *self.requested.borrow_and_update();

        let result = match (self.snapshot)() {
            Ok(bytes) => file::write_atomic(&self.path, &bytes).await,
            Err(e) => Err(StorageError::Serialization(e)),
        };

        let error = match result {
            Ok(()) => {
                tracing::trace!(document = %self.name, generation = target, "Document flushed");
                self.flushed = target;
                None
            }
            Err(e) => {
                tracing::error!(document = %self.name, path = %self.path.display(), error = %e, "Failed to flush document");
                Some(e.to_string())
            }
        };

        self.done.send_replace(FlushState {
            generation: target,
            error,
        });
    }
}
