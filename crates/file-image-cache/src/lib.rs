//! Single-slot file-backed image cache
//!
//! Holds exactly one image fetched from an upstream source, persisted to disk
//! with a JSON metadata sidecar. Entries expire after a TTL; a refetch is
//! single-flight, and a failed refetch falls back to the stale image when one
//! exists.

mod cache;
mod error;
mod source;
mod types;

pub use cache::ImageCache;
pub use error::{ImageCacheError, Result};
pub use source::{HttpImageSource, ImageSource};
pub use types::{CacheEntry, CacheStats, CacheStatus, CachedImage, FetchedImage};
