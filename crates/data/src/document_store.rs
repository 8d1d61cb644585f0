//! Document-style journal storage.
//!
//! Trades live in collections addressed by a hierarchical path,
//! `artifacts/{app_id}/users/{user_id}/trades`, one document per trade.
//! Documents can be replaced or deleted, and each collection broadcasts a
//! [`StoreEvent`] after every write so open views can refresh.
//!
//! The database is in-memory, optionally mirrored to a JSON snapshot file
//! that is rewritten after each mutation.

use async_trait::async_trait;
use parking_lot::{Mutex as SyncMutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use trade_journal_core::{
    Identity, JournalProvider, NewTrade, StoreCapabilities, StoreError, StoreEvent, TradeRecord,
    TradeStore,
};
use tracing::{debug, error, info};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 256;

/// Collection path holding one user's trades.
#[must_use]
pub fn trades_path(app_id: &str, user_id: &str) -> String {
    format!("artifacts/{app_id}/users/{user_id}/trades")
}

/// Persisted state of one collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CollectionState {
    /// Highest sequence number ever assigned; never decreases.
    last_sequence: u64,
    documents: Vec<TradeRecord>,
}

/// On-disk format of the whole database.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    collections: BTreeMap<String, CollectionState>,
}

fn json_error(err: serde_json::Error) -> StoreError {
    StoreError::Json(err.to_string())
}

/// Writes `bytes` to a sibling temp file, then renames it over `path`.
fn write_snapshot(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

pub struct DocumentDatabase {
    collections: RwLock<HashMap<String, CollectionState>>,
    channels: SyncMutex<HashMap<String, broadcast::Sender<StoreEvent>>>,
    /// Serialises writers so snapshots reach disk in commit order.
    write_lock: Mutex<()>,
    snapshot_path: Option<PathBuf>,
}

impl DocumentDatabase {
    /// Creates an empty database that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_state(HashMap::new(), None)
    }

    /// Opens a database mirrored to the JSON snapshot at `path`.
    ///
    /// A missing file starts an empty database.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            info!(path = %path.display(), "No document snapshot found, starting empty");
            return Ok(Self::with_state(HashMap::new(), Some(path)));
        }

        let reader = BufReader::new(File::open(&path)?);
        let snapshot: Snapshot = serde_json::from_reader(reader).map_err(json_error)?;
        info!(
            path = %path.display(),
            collections = snapshot.collections.len(),
            "Loaded document snapshot"
        );
        Ok(Self::with_state(
            snapshot.collections.into_iter().collect(),
            Some(path),
        ))
    }

    fn with_state(collections: HashMap<String, CollectionState>, path: Option<PathBuf>) -> Self {
        Self {
            collections: RwLock::new(collections),
            channels: SyncMutex::new(HashMap::new()),
            write_lock: Mutex::new(()),
            snapshot_path: path,
        }
    }

    /// Returns a store handle for the collection at `path`.
    ///
    /// Collections are created lazily on first write.
    #[must_use]
    pub fn collection(self: &Arc<Self>, path: impl Into<String>) -> DocumentTradeStore {
        let path = path.into();
        let events = self.channel(&path);
        DocumentTradeStore {
            db: Arc::clone(self),
            path,
            events,
        }
    }

    /// Paths of every collection holding at least one document.
    #[must_use]
    pub fn collection_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .collections
            .read()
            .iter()
            .filter(|(_, state)| !state.documents.is_empty())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    fn channel(&self, path: &str) -> broadcast::Sender<StoreEvent> {
        self.channels
            .lock()
            .entry(path.to_string())
            .or_insert_with(|| broadcast::channel(EVENT_CAPACITY).0)
            .clone()
    }

    fn documents(&self, path: &str) -> Vec<TradeRecord> {
        self.collections
            .read()
            .get(path)
            .map(|state| state.documents.clone())
            .unwrap_or_default()
    }

    /// Applies `change` to a copy of the collection, persists the result,
    /// and only then makes it visible to readers.
    async fn mutate<T>(
        &self,
        path: &str,
        change: impl FnOnce(&mut CollectionState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut working = self
            .collections
            .read()
            .get(path)
            .cloned()
            .unwrap_or_default();
        let output = change(&mut working)?;

        if let Some(snapshot_path) = &self.snapshot_path {
            let bytes = {
                let collections = self.collections.read();
                let mut snapshot = Snapshot {
                    collections: collections
                        .iter()
                        .map(|(p, s)| (p.clone(), s.clone()))
                        .collect(),
                };
                snapshot.collections.insert(path.to_string(), working.clone());
                serde_json::to_vec_pretty(&snapshot).map_err(json_error)?
            };

            let snapshot_path = snapshot_path.clone();
            tokio::task::spawn_blocking(move || write_snapshot(&snapshot_path, &bytes))
                .await?
                .inspect_err(|e| error!(path = %path, error = %e, "Failed to persist snapshot"))?;
            debug!(path = %path, "Persisted document snapshot");
        }

        self.collections.write().insert(path.to_string(), working);
        Ok(output)
    }
}

/// One collection of trade documents.
pub struct DocumentTradeStore {
    db: Arc<DocumentDatabase>,
    path: String,
    events: broadcast::Sender<StoreEvent>,
}

impl DocumentTradeStore {
    fn notify(&self, event: StoreEvent) {
        // No receivers is fine; nobody is watching this journal.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl TradeStore for DocumentTradeStore {
    async fn append(&self, trade: NewTrade) -> Result<TradeRecord, StoreError> {
        let record = self
            .db
            .mutate(&self.path, |state| {
                state.last_sequence += 1;
                let record =
                    TradeRecord::new(Uuid::new_v4().to_string(), state.last_sequence, trade);
                state.documents.push(record.clone());
                Ok(record)
            })
            .await?;

        info!(collection = %self.path, id = %record.id, sl_no = record.sl_no, "Added trade document");
        self.notify(StoreEvent::Added(record.clone()));
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<TradeRecord>, StoreError> {
        let mut documents = self.db.documents(&self.path);
        documents.sort_by_key(|r| r.sl_no);
        Ok(documents)
    }

    async fn update(&self, id: &str, trade: NewTrade) -> Result<TradeRecord, StoreError> {
        let record = self
            .db
            .mutate(&self.path, |state| {
                let existing = state
                    .documents
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                existing.trade = trade;
                Ok(existing.clone())
            })
            .await?;

        info!(collection = %self.path, id = %record.id, "Replaced trade document");
        self.notify(StoreEvent::Updated(record.clone()));
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.db
            .mutate(&self.path, |state| {
                let before = state.documents.len();
                state.documents.retain(|r| r.id != id);
                if state.documents.len() == before {
                    return Err(StoreError::NotFound(id.to_string()));
                }
                Ok(())
            })
            .await?;

        info!(collection = %self.path, id = %id, "Deleted trade document");
        self.notify(StoreEvent::Deleted { id: id.to_string() });
        Ok(())
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            update: true,
            delete: true,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

/// Scopes each user to their own collection under one application id.
pub struct DocumentJournalProvider {
    db: Arc<DocumentDatabase>,
    app_id: String,
}

impl DocumentJournalProvider {
    #[must_use]
    pub fn new(db: Arc<DocumentDatabase>, app_id: impl Into<String>) -> Self {
        Self {
            db,
            app_id: app_id.into(),
        }
    }
}

impl JournalProvider for DocumentJournalProvider {
    fn store_for(&self, identity: &Identity) -> Arc<dyn TradeStore> {
        Arc::new(
            self.db
                .collection(trades_path(&self.app_id, &identity.user_id)),
        )
    }
}
