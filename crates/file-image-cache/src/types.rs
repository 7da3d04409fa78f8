//! Cache types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata for the cached image, persisted as the sidecar file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub image_path: PathBuf,
    pub source_url: String,
    pub content_type: String,
    pub size: u64,
    pub fetched_at: DateTime<Utc>,
}

/// Bytes returned by an [`ImageSource`](crate::ImageSource)
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub data: Vec<u8>,
    pub content_type: String,
    pub source_url: String,
}

/// How a request was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fresh entry, no upstream call
    Hit,
    /// Served from a fetch that completed during this request
    Miss,
    /// Refetch failed, previous entry served
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

/// Image bytes together with the entry they were read from
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub data: Vec<u8>,
    pub content_type: String,
    pub status: CacheStatus,
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stale_served: u64,
    pub fetch_failures: u64,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.stale_served, 0);
        assert_eq!(stats.fetch_failures, 0);
        assert!(stats.fetched_at.is_none());
    }

    #[test]
    fn test_cache_entry_serialization() {
        let entry = CacheEntry {
            image_path: PathBuf::from("/cache/image"),
            source_url: "https://picsum.photos/1200".to_string(),
            content_type: "image/jpeg".to_string(),
            size: 12345,
            fetched_at: Utc::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("image/jpeg"));
        assert!(json.contains("picsum.photos"));

        let deserialized: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, entry);
    }

    #[test]
    fn test_cache_status_header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.as_str(), "MISS");
        assert_eq!(CacheStatus::Stale.as_str(), "STALE");
    }
}
