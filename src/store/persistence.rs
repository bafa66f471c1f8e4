//! Durable storage for the whole-table document.
//!
//! The store never reads or writes files itself. It hands complete document
//! snapshots to a [`Persistence`] implementation and forgets about them.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;

/// A boxed, `Send` future returned by [`Persistence`] methods.
pub type PersistFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// Reads and overwrites one document.
///
/// Implementations do whole-document operations only: `write` replaces
/// whatever was stored before.
pub trait Persistence: Send + Sync + 'static {
    /// Reads the stored document. A missing document is an error
    /// (typically [`io::ErrorKind::NotFound`]).
    fn read(&self) -> PersistFuture<'_, Vec<u8>>;

    /// Replaces the stored document with `document`.
    fn write(&self, document: Vec<u8>) -> PersistFuture<'_, ()>;
}

/// Stores the document in a single file.
///
/// Writes overwrite the file in place. There is no temp-file swap, so a
/// process exit in the middle of a write can leave a truncated file, and two
/// overlapping writes may interleave.
#[derive(Clone, Debug)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for FilePersistence {
    fn read(&self) -> PersistFuture<'_, Vec<u8>> {
        Box::pin(tokio::fs::read(&self.path))
    }

    fn write(&self, document: Vec<u8>) -> PersistFuture<'_, ()> {
        Box::pin(tokio::fs::write(&self.path, document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = FilePersistence::new(dir.path().join("db.json"));

        let err = file.read().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        file.write(br#"{"users":[]}"#.to_vec()).await.unwrap();
        file.write(b"{}".to_vec()).await.unwrap();
        assert_eq!(file.read().await.unwrap(), b"{}");
    }
}
