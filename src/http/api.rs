//! Axum handlers.
//!
//! Each handler receives [`AppState`] via [`axum::extract::State`]; failures
//! are returned as [`AppError`] and rendered by its `IntoResponse` impl.
//! JSON bodies are taken as `Result<Json<T>, JsonRejection>` so extractor
//! failures go through the same error shape.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::AppError;
use crate::knowledge::graph::{GraphView, NewBook};
use crate::knowledge::BookRecord;
use crate::state::{AppState, Health};

const DEFAULT_CONTEXT: &str = "index";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "default_context")]
    context: String,
    #[serde(default, rename = "bookId")]
    book_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct StartersRequest {
    #[serde(default = "default_context")]
    context: String,
    #[serde(default, rename = "bookId")]
    book_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct SearchRequest {
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// POST /chat
pub(super) async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    let message = req.message.unwrap_or_default();
    debug!(context = %req.context, book = ?req.book_id, "chat request");
    let response = state.chat(&message, req.book_id.as_deref()).await?;
    Ok(Json(json!({ "response": response })))
}

/// POST /conversation-starters
pub(super) async fn conversation_starters(
    State(state): State<AppState>,
    payload: Result<Json<StartersRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    let starters = state.conversation_starters(&req.context, req.book_id.as_deref()).await;
    Ok(Json(json!({ "starters": starters })))
}

/// POST /search-books
pub(super) async fn search_books(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    let theme = req.theme.unwrap_or_default();
    let author = req.author.unwrap_or_default();
    let results = state.search_books(&theme, &author).await;
    Ok(Json(json!({ "results": results })))
}

/// POST /reload. Failures are reported in the body with a 500 status.
pub(super) async fn reload(State(state): State<AppState>) -> Response {
    match state.reload().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": format!(
                    "Knowledge graph reloaded: {} facts, {} subjects",
                    summary.facts, summary.subjects
                ),
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "message": e.to_string() })),
        )
            .into_response(),
    }
}

/// POST /add-book
pub(super) async fn add_book(
    State(state): State<AppState>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(book) = payload?;
    let id = state.add_book(book).await?;
    info!(book = %id, "book added via api");
    Ok(Json(json!({
        "status": "success",
        "message": format!("Book '{id}' added to the knowledge graph."),
    })))
}

/// POST /graph/visualize. The body is an RDF/XML document.
pub(super) async fn visualize(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GraphView>, AppError> {
    Ok(Json(state.visualize(&body)?))
}

/// GET /health
pub(super) async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(state.health().await)
}

/// GET /books
pub(super) async fn books(State(state): State<AppState>) -> Json<Vec<BookRecord>> {
    Json(state.list_books().await)
}

/// GET /books/{id}
pub(super) async fn book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookRecord>, AppError> {
    Ok(Json(state.book(&id).await?))
}

/// GET /graph
pub(super) async fn graph(State(state): State<AppState>) -> Json<GraphView> {
    Json(state.graph_view().await)
}
