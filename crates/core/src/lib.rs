pub mod config;
pub mod config_loader;
pub mod error;
pub mod events;
pub mod identity;
pub mod record;
pub mod summary;
pub mod summary_formatter;
pub mod traits;

pub use config::{AppConfig, AuthConfig, ServerConfig, StorageBackend, StorageConfig};
pub use config_loader::{ConfigLoader, DEFAULT_CONFIG_PATH};
pub use error::{StoreError, ValidationError};
pub use events::StoreEvent;
pub use identity::{AuthMethod, Identity, ANONYMOUS_USER};
pub use record::{parse_decimal_lenient, Direction, NewTrade, RuleCompliance, TradeInput, TradeRecord};
pub use summary::{summarize, Summary};
pub use summary_formatter::SummaryFormatter;
pub use traits::{JournalProvider, StoreCapabilities, TradeStore};
