use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::time::Duration;
use thiserror::Error;

use crate::types::ErrorResponse;

/// Reasons a request is turned away before it reaches the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,
}

impl AdmissionError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdmissionError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdmissionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

/// Failures of a single raw search. These never leave the gateway.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search backend returned status {0}")]
    Status(u16),

    #[error("failed to parse search response: {0}")]
    Parse(String),

    #[error("search backend unavailable: {0}")]
    Unavailable(String),
}
