//! Error types for the image cache

use std::fmt;

#[derive(Debug)]
pub enum ImageCacheError {
    /// Image source unreachable, non-2xx, empty or timed out
    UpstreamFetch(String),
    /// Payload or metadata could not be persisted
    CacheWrite(Box<std::io::Error>),
    Io(Box<std::io::Error>),
}

impl fmt::Display for ImageCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageCacheError::UpstreamFetch(msg) => write!(f, "Upstream fetch error: {}", msg),
            ImageCacheError::CacheWrite(err) => write!(f, "Cache write error: {}", err),
            ImageCacheError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ImageCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageCacheError::CacheWrite(err) => Some(err.as_ref()),
            ImageCacheError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ImageCacheError {
    fn from(err: reqwest::Error) -> Self {
        ImageCacheError::UpstreamFetch(err.to_string())
    }
}

impl From<std::io::Error> for ImageCacheError {
    fn from(err: std::io::Error) -> Self {
        ImageCacheError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ImageCacheError>;
