//! Error types for backend requests and for the dashboard server.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::render::templates::render_error_page;

/// Errors raised while talking to the observation backend.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid API base URL {0}: {1}")]
    InvalidBase(String, url::ParseError),

    #[error("request to {0} failed: {1}")]
    Request(String, reqwest::Error),

    #[error("request to {0} timed out after {1} seconds")]
    Timeout(String, u64),

    #[error("request to {0} returned status {1}")]
    Status(String, reqwest::StatusCode),

    #[error("could not decode response from {0}: {1}")]
    Decode(String, String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status(_, status) if *status == reqwest::StatusCode::NOT_FOUND)
    }
}

/// Errors surfaced by the dashboard's own handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("upstream unavailable: {0}")]
    Upstream(#[from] FetchError),

    #[error("render failed: {0}")]
    Render(#[from] minijinja::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn headline(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "Cluster not found",
            StatusCode::BAD_GATEWAY => "Data stream unavailable",
            _ => "Rendering failed",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        match render_error_page(status.as_u16(), self.headline(), &self.to_string()) {
            Ok(page) => (status, Html(page)).into_response(),
            Err(err) => {
                error!("Failed to render error page: {}", err);
                (status, self.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = AppError::Upstream(FetchError::Status(
            "http://localhost:8001/api/cluster/9".to_string(),
            reqwest::StatusCode::NOT_FOUND,
        ));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let bad_gateway = AppError::Upstream(FetchError::Timeout(
            "http://localhost:8001/api/clusters".to_string(),
            30,
        ));
        assert_eq!(bad_gateway.status(), StatusCode::BAD_GATEWAY);

        assert_eq!(
            AppError::NotFound("cluster abc".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Status(
            "http://localhost:8001/api/clusters".to_string(),
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        );
        assert_eq!(
            err.to_string(),
            "request to http://localhost:8001/api/clusters returned status 500 Internal Server Error"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_page_response() {
        let response = AppError::NotFound("cluster abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
