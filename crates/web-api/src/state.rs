use crate::auth::Authenticator;
use std::sync::Arc;
use trade_journal_core::JournalProvider;

/// Shared state for all handlers
pub struct AppState {
    pub journals: Arc<dyn JournalProvider>,
    pub auth: Authenticator,
}

impl AppState {
    #[must_use]
    pub fn new(journals: Arc<dyn JournalProvider>, auth: Authenticator) -> Arc<Self> {
        Arc::new(Self { journals, auth })
    }
}
