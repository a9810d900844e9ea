//! Error types for the content cache
//!
//! Every failure leaving the cache is a [`CacheError`] naming the logical
//! operation that failed. Store and registry errors are kept as the source.

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// == Cache Error ==
/// The single error kind raised by cache operations.
///
/// There is no separate "not found" classification: a missing record and
/// a failed store call are both reported here with a descriptive message.
#[derive(Error, Debug)]
#[error("{operation} failed: {message}")]
pub struct CacheError {
    operation: &'static str,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CacheError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, folding its text into the message.
    pub fn from_source<E>(operation: &'static str, message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            operation,
            message: format!("{}: {}", message.into(), source),
            source: Some(Box::new(source)),
        }
    }

    /// Name of the cache operation that failed.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "operation": self.operation,
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
