//! HTTP surface of the trading journal: server-rendered pages, a JSON API
//! and a WebSocket feed that pushes the journal after every change.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod server;
pub mod state;
pub mod websocket;

pub use auth::Authenticator;
pub use error::ApiError;
pub use handlers::JournalSnapshot;
pub use server::ApiServer;
pub use state::AppState;
