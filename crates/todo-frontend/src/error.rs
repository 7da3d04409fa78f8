//! Error types for the todo frontend

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use file_image_cache::ImageCacheError;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum FrontendError {
    Cache(ImageCacheError),
    /// Backend store unreachable or failed to answer
    DownstreamUnavailable(String),
    Config(String),
    Io(Box<std::io::Error>),
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontendError::Cache(err) => write!(f, "Image cache error: {}", err),
            FrontendError::DownstreamUnavailable(msg) => {
                write!(f, "Backend unavailable: {}", msg)
            }
            FrontendError::Config(msg) => write!(f, "Configuration error: {}", msg),
            FrontendError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for FrontendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrontendError::Cache(err) => Some(err),
            FrontendError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ImageCacheError> for FrontendError {
    fn from(err: ImageCacheError) -> Self {
        FrontendError::Cache(err)
    }
}

impl From<reqwest::Error> for FrontendError {
    fn from(err: reqwest::Error) -> Self {
        FrontendError::DownstreamUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for FrontendError {
    fn from(err: std::io::Error) -> Self {
        FrontendError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for FrontendError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        FrontendError::Config(err.to_string())
    }
}

impl IntoResponse for FrontendError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            FrontendError::Cache(err) => {
                tracing::error!(error = %err, "Image unavailable");
                (StatusCode::BAD_GATEWAY, "Image unavailable")
            }
            FrontendError::DownstreamUnavailable(msg) => {
                tracing::error!(error = %msg, "Backend unavailable");
                (StatusCode::BAD_GATEWAY, "Backend unavailable")
            }
            FrontendError::Config(_) | FrontendError::Io(_) => {
                tracing::error!(error = %self, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, FrontendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = FrontendError::Config("invalid IMAGE_URL".to_string());
        assert_eq!(format!("{}", err), "Configuration error: invalid IMAGE_URL");
    }

    #[test]
    fn test_cache_error_wraps_source() {
        let err = FrontendError::from(ImageCacheError::UpstreamFetch("timeout".to_string()));
        assert!(format!("{}", err).contains("timeout"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_cache_error_is_bad_gateway() {
        let err = FrontendError::Cache(ImageCacheError::UpstreamFetch("down".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_downstream_error_is_bad_gateway() {
        let err = FrontendError::DownstreamUnavailable("connection refused".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_io_error_is_internal() {
        let err = FrontendError::from(std::io::Error::other("disk"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
