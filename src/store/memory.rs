//! In-process [`Persistence`] for tests and embedding.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::store::persistence::{PersistFuture, Persistence};

/// Keeps the document in memory.
///
/// Every completed `write` call (successful or not) bumps a counter that
/// callers can await with [`wait_for_writes`](Self::wait_for_writes), which
/// makes fire-and-forget persistence observable in tests.
pub struct MemoryPersistence {
    document: Mutex<Option<Vec<u8>>>,
    failing: AtomicBool,
    writes: watch::Sender<usize>,
}

impl MemoryPersistence {
    /// Starts with no document: the first `read` fails with `NotFound`.
    pub fn new() -> Self {
        Self {
            document: Mutex::new(None),
            failing: AtomicBool::new(false),
            writes: watch::Sender::new(0),
        }
    }

    /// Starts with `document` already stored.
    pub fn with_document(document: impl Into<Vec<u8>>) -> Self {
        let this = Self::new();
        *this.lock() = Some(document.into());
        this
    }

    /// The currently stored document, if any.
    pub fn document(&self) -> Option<Vec<u8>> {
        self.lock().clone()
    }

    /// Makes every subsequent `write` fail with an I/O error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `write` calls that have completed.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    /// Resolves once at least `count` writes have completed.
    pub async fn wait_for_writes(&self, count: usize) {
        let mut rx = self.writes.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|done| *done >= count).await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryPersistence {
    fn default() -> Self { Self::new() }
}

impl Persistence for MemoryPersistence {
    fn read(&self) -> PersistFuture<'_, Vec<u8>> {
        let document = self.lock().clone();
        Box::pin(async move {
            document.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no document stored"))
        })
    }

    fn write(&self, document: Vec<u8>) -> PersistFuture<'_, ()> {
        Box::pin(async move {
            let result = if self.failing.load(Ordering::SeqCst) {
                Err(io::Error::other("simulated write failure"))
            } else {
                *self.lock() = Some(document);
                Ok(())
            };
            self.writes.send_modify(|done| *done += 1);
            result
        })
    }
}
