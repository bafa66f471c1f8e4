//! Named record tables with whole-document, fire-and-forget persistence.
//!
//! # Model
//!
//! The store holds one document: a map from table name to an ordered list of
//! records. A record is a JSON object with a string `id` field. Order is
//! insertion order and updates never reorder.
//!
//! # Persistence
//!
//! [`TableStore::open`] returns immediately and loads the document in the
//! background. Until that load finishes, reads see an empty store, and a
//! successful load replaces anything written in the meantime. Use
//! [`TableStore::ready`] to wait for it.
//!
//! Every mutation updates memory synchronously, snapshots the whole document
//! while still holding the lock, and spawns a write of that snapshot. Callers
//! neither await the write nor learn whether it failed; failures are logged.
//! Writes are not queued, so two overlapping writes can interleave at the
//! storage layer.

mod memory;
mod persistence;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::Error;

pub use memory::MemoryPersistence;
pub use persistence::{FilePersistence, PersistFuture, Persistence};

/// A single record: field name to JSON value.
///
/// Records are addressed by a **string** `id` field. A record whose `id` is
/// missing or not a string (a number in a hand-edited document, say) still
/// loads and shows up in full-table and field-filtered selects, but can never
/// be selected by id, updated, or deleted. The store does not check `id`
/// uniqueness either; see [`TableStore::insert`].
pub type Record = serde_json::Map<String, Value>;

/// The persisted shape: table name to records.
type Document = BTreeMap<String, Vec<Record>>;

const ID: &str = "id";

/// Field filter for [`TableStore::select`].
///
/// An `id` entry takes precedence over every other field. Without one, a
/// record matches when **any** named field contains the filter value,
/// case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    fields: BTreeMap<String, String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter selecting the single record with this `id`.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().field(ID, id)
    }

    /// Adds (or replaces) a field condition.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when at least one field of `record` contains the wanted value.
    fn matches_any(&self, record: &Record) -> bool {
        self.fields.iter().any(|(name, wanted)| {
            record
                .get(name)
                .and_then(searchable_text)
                .is_some_and(|text| text.to_lowercase().contains(&wanted.to_lowercase()))
        })
    }
}

/// The text a filter compares against. Missing, null, and compound values
/// never match.
fn searchable_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn id_of(record: &Record) -> Option<&str> {
    record.get(ID).and_then(Value::as_str)
}

/// What [`TableStore::select`] found.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// Lookup by `id`: the record, or `None`.
    One(Option<Record>),
    /// Full table or field-filtered subsequence, in insertion order.
    Many(Vec<Record>),
}

impl Selection {
    /// The single record of an `id` lookup. Always `None` for `Many`.
    pub fn one(self) -> Option<Record> {
        match self {
            Self::One(record) => record,
            Self::Many(_) => None,
        }
    }

    /// The records found, as a list. An `id` lookup yields zero or one.
    pub fn many(self) -> Vec<Record> {
        match self {
            Self::One(record) => record.into_iter().collect(),
            Self::Many(records) => records,
        }
    }
}

/// The table store. Construct once with [`TableStore::open`] and share the
/// returned `Arc` with every handler that needs it.
pub struct TableStore {
    document: Mutex<Document>,
    persistence: Arc<dyn Persistence>,
    ready: watch::Sender<bool>,
}

impl TableStore {
    /// Creates an empty store and starts loading the persisted document.
    ///
    /// If the load fails (missing, unreadable, or malformed document) the
    /// store stays empty and writes the empty document back out.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(persistence: Arc<dyn Persistence>) -> Arc<Self> {
        let store = Arc::new(Self {
            document: Mutex::new(Document::new()),
            persistence,
            ready: watch::Sender::new(false),
        });

        let loader = Arc::clone(&store);
        tokio::spawn(async move { loader.load().await });

        store
    }

    /// Resolves once the initial load has finished, successfully or not.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    async fn load(&self) {
        match self.read_document().await {
            Ok(loaded) => {
                let tables = loaded.len();
                *self.lock() = loaded;
                info!(tables, "document loaded");
            }
            Err(e) => {
                warn!(error = %e, "document unavailable, starting empty");
                let document = self.lock();
                self.persist(&document);
            }
        }
        self.ready.send_replace(true);
    }

    async fn read_document(&self) -> Result<Document, Error> {
        let bytes = self.persistence.read().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Selects records from `table`.
    ///
    /// - no filter (or an empty one): every record, empty if the table is unknown
    /// - filter with `id`: [`Selection::One`] with that record or `None`
    /// - otherwise: records where any filter field matches
    pub fn select(&self, table: &str, filter: Option<&Filter>) -> Selection {
        let document = self.lock();
        let records = document.get(table).map(Vec::as_slice).unwrap_or_default();

        let Some(filter) = filter.filter(|f| !f.is_empty()) else {
            return Selection::Many(records.to_vec());
        };

        if let Some(id) = filter.fields.get(ID) {
            let found = records.iter().find(|r| id_of(r) == Some(id.as_str()));
            return Selection::One(found.cloned());
        }

        Selection::Many(
            records
                .iter()
                .filter(|r| filter.matches_any(r))
                .cloned()
                .collect(),
        )
    }

    /// Appends `record` to `table`, creating the table if needed.
    ///
    /// The caller assigns the `id`; the store does not check uniqueness.
    pub fn insert(&self, table: &str, record: Record) {
        let mut document = self.lock();
        document.entry(table.to_owned()).or_default().push(record);
        debug!(table, "record inserted");
        self.persist(&document);
    }

    /// Replaces the record with `id` by `{id, ..patch}`.
    ///
    /// Non-id fields not present in `patch` are dropped; an `id` inside
    /// `patch` is ignored. Unknown `id` or table is a silent no-op.
    pub fn update(&self, table: &str, id: &str, patch: Record) {
        let mut document = self.lock();
        let Some(slot) = document
            .get_mut(table)
            .and_then(|records| records.iter_mut().find(|r| id_of(r) == Some(id)))
        else {
            debug!(table, id, "update skipped, no such record");
            return;
        };

        let mut replacement = Record::new();
        replacement.insert(ID.to_owned(), Value::String(id.to_owned()));
        replacement.extend(patch.into_iter().filter(|(k, _)| k != ID));
        *slot = replacement;

        debug!(table, id, "record updated");
        self.persist(&document);
    }

    /// Removes the record with `id`. Unknown `id` or table is a silent no-op.
    pub fn delete(&self, table: &str, id: &str) {
        let mut document = self.lock();
        let Some(records) = document.get_mut(table) else {
            return;
        };
        let Some(index) = records.iter().position(|r| id_of(r) == Some(id)) else {
            debug!(table, id, "delete skipped, no such record");
            return;
        };

        records.remove(index);
        debug!(table, id, "record deleted");
        self.persist(&document);
    }

    /// Number of records in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.lock().get(table).map_or(0, Vec::len)
    }

    /// Snapshots `document` and spawns its write. Never reports back.
    fn persist(&self, document: &Document) {
        let bytes = match serde_json::to_vec(document) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "failed to encode document");
                return;
            }
        };

        let persistence = Arc::clone(&self.persistence);
        tokio::spawn(async move {
            if let Err(e) = persistence.write(bytes).await {
                error!(error = %e, "failed to persist document");
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
