use crate::auth::Authenticator;
use crate::state::AppState;
use crate::{handlers, pages, websocket};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use trade_journal_core::JournalProvider;

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    #[must_use]
    pub fn new(journals: Arc<dyn JournalProvider>, auth: Authenticator) -> Self {
        Self {
            state: AppState::new(journals, auth),
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(pages::journal).post(pages::submit_trade))
            .route("/trades/:trade_id/delete", post(pages::delete_trade))
            .route("/login", get(pages::login_page).post(pages::login))
            .route("/logout", post(pages::logout))
            .route(
                "/api/trades",
                get(handlers::list_trades).post(handlers::create_trade),
            )
            .route(
                "/api/trades/:trade_id",
                put(handlers::update_trade).delete(handlers::delete_trade),
            )
            .route("/api/journal", get(handlers::get_journal))
            .route("/api/summary", get(handlers::get_summary))
            .route("/health", get(handlers::health))
            .route("/ws", get(websocket::websocket_handler))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serves on `listener` until `shutdown` resolves, then drains
    /// in-flight requests.
    ///
    /// # Errors
    /// Returns an error if the server fails while serving requests.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Web API listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Web API stopped");
        Ok(())
    }
}
