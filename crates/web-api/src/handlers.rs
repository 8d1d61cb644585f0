use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use trade_journal_core::{
    summarize, Identity, NewTrade, StoreCapabilities, Summary, TradeRecord, TradeStore,
};

/// Everything a client needs to draw the journal.
#[derive(Debug, Serialize)]
pub struct JournalSnapshot {
    pub user: Identity,
    pub trades: Vec<TradeRecord>,
    pub summary: Summary,
    pub capabilities: StoreCapabilities,
}

impl JournalSnapshot {
    /// Reads the store and computes the summary.
    ///
    /// # Errors
    /// Returns the store error if the trades cannot be listed.
    pub async fn load(
        user: Identity,
        store: &dyn TradeStore,
    ) -> Result<Self, trade_journal_core::StoreError> {
        let trades = store.list_all().await?;
        let summary = summarize(&trades);
        Ok(Self {
            user,
            trades,
            summary,
            capabilities: store.capabilities(),
        })
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Lists the caller's trades.
///
/// # Errors
/// Returns `ApiError::Internal` if the store cannot be read.
pub async fn list_trades(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TradeRecord>>, ApiError> {
    let trades = state.journals.store_for(&user).list_all().await?;
    Ok(Json(trades))
}

/// Returns the caller's trades together with the summary.
///
/// # Errors
/// Returns `ApiError::Internal` if the store cannot be read.
pub async fn get_journal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<JournalSnapshot>, ApiError> {
    let store = state.journals.store_for(&user);
    let snapshot = JournalSnapshot::load(user, store.as_ref()).await?;
    Ok(Json(snapshot))
}

/// Computes summary statistics over the caller's trades.
///
/// # Errors
/// Returns `ApiError::Internal` if the store cannot be read.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Summary>, ApiError> {
    let trades = state.journals.store_for(&user).list_all().await?;
    Ok(Json(summarize(&trades)))
}

/// Appends a trade to the caller's journal.
///
/// # Errors
/// Returns `ApiError::BadRequest` if a required field is missing, or
/// `ApiError::Internal` if the write fails.
pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(trade): Json<NewTrade>,
) -> Result<(StatusCode, Json<TradeRecord>), ApiError> {
    trade.validate()?;
    let record = state.journals.store_for(&user).append(trade).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Replaces every field of an existing trade.
///
/// # Errors
/// Returns `ApiError::NotFound` for an unknown id, `ApiError::NotSupported`
/// when the store is append-only, or `ApiError::BadRequest` on invalid input.
pub async fn update_trade(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(trade_id): Path<String>,
    Json(trade): Json<NewTrade>,
) -> Result<Json<TradeRecord>, ApiError> {
    trade.validate()?;
    let record = state
        .journals
        .store_for(&user)
        .update(&trade_id, trade)
        .await?;
    Ok(Json(record))
}

/// Deletes a trade.
///
/// # Errors
/// Returns `ApiError::NotFound` for an unknown id, or
/// `ApiError::NotSupported` when the store is append-only.
pub async fn delete_trade(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(trade_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.journals.store_for(&user).delete(&trade_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
