//! Server-rendered journal pages.
//!
//! Writes go through plain HTML forms and answer with a `303 See Other`
//! back to `/`, carrying a short notice that the page shows as a toast.

use crate::auth::{clear_session, session_cookie, PageUser};
use crate::state::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use trade_journal_core::{summarize, Summary, TradeInput, TradeRecord};

/// Helper to render templates into axum responses
fn render_template<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template render error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response()
        }
    }
}

fn redirect_with(key: &str, message: &str) -> Redirect {
    Redirect::to(&format!("/?{key}={}", urlencoding::encode(message)))
}

/// Tailwind colour class for a signed amount.
fn pl_class(value: Decimal) -> &'static str {
    if value > Decimal::ZERO {
        "text-green-600"
    } else if value < Decimal::ZERO {
        "text-red-600"
    } else {
        "text-gray-600"
    }
}

fn cell(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// One table row, pre-formatted for the template.
pub struct TradeRow {
    pub id: String,
    pub sl_no: u64,
    pub script_name: String,
    pub time: String,
    pub direction: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub quantity: String,
    pub account_risked: String,
    pub target_price: String,
    pub exit_price: String,
    pub exit_time: String,
    pub risk_reward: String,
    pub pl: String,
    pub pl_class: &'static str,
    pub followed_rules: String,
}

impl From<&TradeRecord> for TradeRow {
    fn from(record: &TradeRecord) -> Self {
        let trade = &record.trade;
        Self {
            id: record.id.clone(),
            sl_no: record.sl_no,
            script_name: trade.script_name.clone(),
            time: trade.time.clone(),
            direction: trade.direction.to_string(),
            entry_price: cell(trade.entry_price),
            stop_loss: cell(trade.stop_loss),
            quantity: cell(trade.quantity),
            account_risked: trade.account_risked.clone().unwrap_or_default(),
            target_price: cell(trade.target_price),
            exit_price: cell(trade.exit_price),
            exit_time: trade.exit_time.clone().unwrap_or_default(),
            risk_reward: trade.risk_reward.clone().unwrap_or_default(),
            pl: cell(trade.pl),
            pl_class: pl_class(record.pl_or_zero()),
            followed_rules: trade.followed_rules.to_string(),
        }
    }
}

pub struct SummaryTiles {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    pub win_rate: String,
    pub lose_rate: String,
    pub total_pl: String,
    pub total_pl_class: &'static str,
    pub largest_win: String,
    pub largest_loss: String,
}

impl From<&Summary> for SummaryTiles {
    fn from(summary: &Summary) -> Self {
        Self {
            total_trades: summary.total_trades,
            winning_trades: summary.winning_trades,
            losing_trades: summary.losing_trades,
            break_even_trades: summary.break_even_trades,
            win_rate: summary.win_rate.clone(),
            lose_rate: summary.lose_rate.clone(),
            total_pl: summary.total_pl.to_string(),
            total_pl_class: pl_class(summary.total_pl),
            largest_win: summary.largest_win.to_string(),
            largest_loss: summary.largest_loss.to_string(),
        }
    }
}

/// GET / - Journal, summary, and entry form
#[derive(Template)]
#[template(path = "journal.html")]
pub struct JournalPage {
    pub user: String,
    pub anonymous: bool,
    pub summary: SummaryTiles,
    pub trades: Vec<TradeRow>,
    pub form: TradeInput,
    pub editing_id: Option<String>,
    pub can_edit: bool,
    pub can_delete: bool,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
    /// Id of the trade to load into the form.
    pub edit: Option<String>,
}

pub async fn journal(
    State(state): State<Arc<AppState>>,
    PageUser(user): PageUser,
    Query(query): Query<JournalQuery>,
) -> Response {
    let store = state.journals.store_for(&user);
    let capabilities = store.capabilities();

    let (trades, mut error) = match store.list_all().await {
        Ok(trades) => (trades, query.error),
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.user_id, "Failed to load journal");
            (
                Vec::new(),
                Some("Error loading data. Please try again.".to_string()),
            )
        }
    };

    let mut editing_id = None;
    let mut form = TradeInput {
        follow_rules: "Yes".to_string(),
        ..TradeInput::default()
    };
    if let Some(edit_id) = query.edit.filter(|_| capabilities.update) {
        match trades.iter().find(|r| r.id == edit_id) {
            Some(record) => {
                form = TradeInput::from_trade(&record.trade);
                editing_id = Some(edit_id);
            }
            None => error = Some("That trade no longer exists.".to_string()),
        }
    }

    let summary = summarize(&trades);
    render_template(&JournalPage {
        user: user.user_id.clone(),
        anonymous: user.is_anonymous(),
        summary: SummaryTiles::from(&summary),
        trades: trades.iter().map(TradeRow::from).collect(),
        form,
        editing_id,
        can_edit: capabilities.update,
        can_delete: capabilities.delete,
        notice: query.notice,
        error,
    })
}

/// POST / - Form submission for a new or edited trade
#[derive(Debug, Deserialize)]
pub struct TradeForm {
    /// Set when editing; the trade is replaced wholesale.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub input: TradeInput,
}

pub async fn submit_trade(
    State(state): State<Arc<AppState>>,
    PageUser(user): PageUser,
    Form(form): Form<TradeForm>,
) -> Redirect {
    let trade = match form.input.parse() {
        Ok(trade) => trade,
        Err(e) => return redirect_with("error", &e.to_string()),
    };

    let store = state.journals.store_for(&user);
    let editing = form.id.filter(|id| !id.trim().is_empty());

    let result = match &editing {
        Some(id) => store.update(id, trade).await.map(|_| "Trade updated successfully!"),
        None => store.append(trade).await.map(|_| "Trade added successfully!"),
    };

    match result {
        Ok(notice) => redirect_with("notice", notice),
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.user_id, "Failed to save trade");
            redirect_with("error", "Failed to save trade. Please try again.")
        }
    }
}

/// POST /trades/:id/delete
pub async fn delete_trade(
    State(state): State<Arc<AppState>>,
    PageUser(user): PageUser,
    Path(trade_id): Path<String>,
) -> Redirect {
    match state.journals.store_for(&user).delete(&trade_id).await {
        Ok(()) => redirect_with("notice", "Trade deleted successfully!"),
        Err(e) => {
            tracing::error!(error = %e, trade_id = %trade_id, "Failed to delete trade");
            redirect_with("error", "Failed to delete trade. Please try again.")
        }
    }
}

/// GET /login - Token sign-in prompt
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
    pub allow_anonymous: bool,
}

pub async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    render_template(&LoginPage {
        error: None,
        allow_anonymous: state.auth.allows_anonymous(),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.sign_in(&form.token) {
        Some(identity) => {
            tracing::info!(user_id = %identity.user_id, "User signed in");
            (jar.add(session_cookie(form.token.trim())), Redirect::to("/")).into_response()
        }
        None => {
            tracing::warn!("Sign-in failed");
            let page = render_template(&LoginPage {
                error: Some("Sign-in failed. Check your token and try again.".to_string()),
                allow_anonymous: state.auth.allows_anonymous(),
            });
            (StatusCode::UNAUTHORIZED, page).into_response()
        }
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (clear_session(jar), Redirect::to("/login"))
}
