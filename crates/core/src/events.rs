use crate::record::TradeRecord;
use serde::{Deserialize, Serialize};

/// Change notification emitted by a record store after a successful write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    Added(TradeRecord),
    Updated(TradeRecord),
    Deleted { id: String },
}

impl StoreEvent {
    /// Identifier of the trade this event concerns.
    #[must_use]
    pub fn trade_id(&self) -> &str {
        match self {
            Self::Added(record) | Self::Updated(record) => &record.id,
            Self::Deleted { id } => id,
        }
    }
}
