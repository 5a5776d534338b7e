//! Application-wide error types.

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("graph error: {0}")]
    Graph(String),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("llm error: {0}")]
    Llm(#[from] ProviderError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Llm(_) | AppError::Embedding(_) => "upstream",
            _ => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn graph_error_display() {
        let e = AppError::Graph("unexpected token".into());
        assert!(e.to_string().starts_with("graph error"));
        assert!(e.to_string().contains("unexpected token"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = ProviderError::Request("connection refused".into()).into();
        assert!(e.to_string().contains("connection refused"));
        assert_eq!(e.code(), "upstream");
    }

    #[test]
    fn bad_request_code() {
        assert_eq!(AppError::BadRequest("message required".into()).code(), "bad_request");
        assert_eq!(AppError::NotFound("B9".into()).code(), "not_found");
        assert_eq!(AppError::Server("boom".into()).code(), "internal");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
