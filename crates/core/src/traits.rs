use crate::error::StoreError;
use crate::events::StoreEvent;
use crate::identity::Identity;
use crate::record::{NewTrade, TradeRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Operations a store supports beyond append and list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreCapabilities {
    pub update: bool,
    pub delete: bool,
}

#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Persists a new trade and returns it with its assigned id and sequence number.
    async fn append(&self, trade: NewTrade) -> Result<TradeRecord, StoreError>;

    /// Returns every trade in ascending sequence order.
    async fn list_all(&self) -> Result<Vec<TradeRecord>, StoreError>;

    /// Replaces all fields of an existing trade.
    async fn update(&self, id: &str, trade: NewTrade) -> Result<TradeRecord, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    fn capabilities(&self) -> StoreCapabilities;

    /// Receives an event for every successful write made through this store.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

/// Resolves which store holds a user's journal.
pub trait JournalProvider: Send + Sync {
    fn store_for(&self, identity: &Identity) -> Arc<dyn TradeStore>;
}
