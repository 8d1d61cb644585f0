use crate::auth::CurrentUser;
use crate::handlers::JournalSnapshot;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use trade_journal_core::{Identity, TradeStore};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Response {
    let store = state.journals.store_for(&user);
    ws.on_upgrade(move |socket| journal_feed(socket, user, store))
}

/// Pushes a fresh journal snapshot on connect and after every change.
async fn journal_feed(mut socket: WebSocket, user: Identity, store: Arc<dyn TradeStore>) {
    // Subscribe before the first read so no change slips between the two.
    let mut events = store.subscribe();

    if send_snapshot(&mut socket, &user, store.as_ref()).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        tracing::debug!(trade_id = %event.trade_id(), user_id = %user.user_id, "Journal changed");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Journal feed lagged, resending snapshot");
                    }
                    Err(RecvError::Closed) => break,
                }
                if send_snapshot(&mut socket, &user, store.as_ref()).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(user_id = %user.user_id, "WebSocket connection closed");
}

async fn send_snapshot(
    socket: &mut WebSocket,
    user: &Identity,
    store: &dyn TradeStore,
) -> Result<(), axum::Error> {
    let json = match JournalSnapshot::load(user.clone(), store).await {
        Ok(snapshot) => serde_json::to_string(&snapshot).unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.user_id, "Failed to load journal for feed");
            serde_json::json!({ "error": "store_error", "message": e.to_string() }).to_string()
        }
    };
    socket.send(Message::Text(json)).await
}
