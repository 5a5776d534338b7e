//! Axum HTTP surface.
//!
//! ## URL layout
//!
//! ```text
//! POST /chat                     {message, context?, bookId?}  → {response}
//! POST /conversation-starters    {context?, bookId?}           → {starters}
//! POST /search-books             {theme?, author?}             → {results}
//! POST /reload                                                 → {status, message}
//! POST /add-book                 {id, title?, author?, theme?, level?}
//! POST /graph/visualize          raw RDF/XML body              → {nodes, edges}
//! GET  /health
//! GET  /books
//! GET  /books/{id}
//! GET  /graph
//! ```
//!
//! Errors come back as `{"error": code, "message": text}` with a 4xx/5xx
//! status taken from [`AppError`]. Bodies that are missing, not JSON, or of
//! the wrong shape are `bad_request` (400).

mod api;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn serve(
    bind_addr: &str,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("http server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/chat",                  post(api::chat))
        .route("/conversation-starters", post(api::conversation_starters))
        .route("/search-books",          post(api::search_books))
        .route("/reload",                post(api::reload))
        .route("/add-book",              post(api::add_book))
        .route("/graph/visualize",       post(api::visualize))
        .route("/health",                get(api::health))
        .route("/books",                 get(api::books))
        .route("/books/{id}",            get(api::book))
        .route("/graph",                 get(api::graph))
        .route("/favicon.ico",           get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        let body = json!({ "error": self.code(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}
