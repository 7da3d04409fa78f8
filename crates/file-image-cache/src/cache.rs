//! Single-slot image cache with file-based storage

use crate::error::{ImageCacheError, Result};
use crate::source::ImageSource;
use crate::types::{CacheEntry, CacheStats, CacheStatus, CachedImage};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

const IMAGE_FILE: &str = "image";
const METADATA_FILE: &str = "image.json";

/// State guarded by the slot lock
#[derive(Debug, Default)]
struct Slot {
    entry: Option<CacheEntry>,
    /// Completed fetch attempts, successful or not
    attempts: u64,
    /// Error of the most recent attempt, cleared on success
    last_error: Option<String>,
}

enum Lookup {
    Fresh(CachedImage),
    Expired { attempts: u64 },
}

/// A fetched image written to temp files, not yet visible to readers
struct Staged {
    entry: CacheEntry,
    data: Vec<u8>,
}

/// A cache holding one image from one source
pub struct ImageCache {
    slot: RwLock<Slot>,
    /// Held for the whole of a fetch attempt
    fetch_lock: Mutex<()>,
    source: Arc<dyn ImageSource>,
    cache_dir: PathBuf,
    ttl: Duration,
    fetch_timeout: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    stale_served: AtomicU64,
    fetch_failures: AtomicU64,
}

impl ImageCache {
    /// Create a new image cache
    pub fn new(
        cache_dir: PathBuf,
        source: Arc<dyn ImageSource>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            fetch_lock: Mutex::new(()),
            source,
            cache_dir,
            ttl,
            fetch_timeout,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale_served: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
        }
    }

    /// Ensure the cache directory exists and restore a previously persisted entry
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;

        if let Some(entry) = self.load_persisted_entry().await {
            info!(
                fetched_at = %entry.fetched_at,
                size = entry.size,
                source_url = %entry.source_url,
                "Restored cached image"
            );
            self.slot.write().await.entry = Some(entry);
        }

        info!(cache_dir = ?self.cache_dir, "Cache initialized");
        Ok(())
    }

    /// Get the image, refetching it when the entry is missing or expired
    pub async fn get(&self) -> Result<CachedImage> {
        let seen_attempts = match self.lookup().await {
            Lookup::Fresh(image) => return Ok(image),
            Lookup::Expired { attempts } => attempts,
        };

        let _flight = self.fetch_lock.lock().await;

        {
            let slot = self.slot.read().await;
            // Another request ran an attempt while we waited on the lock. If it
            // succeeded but its file is already gone, fetch again below.
            if slot.attempts != seen_attempts
                && (slot.entry.is_some() || slot.last_error.is_some())
            {
                return self.serve_previous_attempt(&slot).await;
            }
        }

        self.refresh().await
    }

    /// Current entry, if any
    pub async fn entry(&self) -> Option<CacheEntry> {
        self.slot.read().await.entry.clone()
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let slot = self.slot.read().await;
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            fetched_at: slot.entry.as_ref().map(|e| e.fetched_at),
        }
    }

    fn image_path(&self) -> PathBuf {
        self.cache_dir.join(IMAGE_FILE)
    }

    fn metadata_path(&self) -> PathBuf {
        self.cache_dir.join(METADATA_FILE)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!(".{}.tmp", name))
    }

    fn is_fresh(&self, fetched_at: DateTime<Utc>) -> bool {
        match (Utc::now() - fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            // fetched_at ahead of the clock
            Err(_) => true,
        }
    }

    async fn lookup(&self) -> Lookup {
        let unreadable = {
            let slot = self.slot.read().await;
            let entry = match slot.entry.as_ref() {
                Some(entry) if self.is_fresh(entry.fetched_at) => entry,
                _ => {
                    return Lookup::Expired {
                        attempts: slot.attempts,
                    }
                }
            };

            match fs::read(&entry.image_path).await {
                Ok(data) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(fetched_at = %entry.fetched_at, "Cache hit");
                    return Lookup::Fresh(CachedImage {
                        data,
                        content_type: entry.content_type.clone(),
                        status: CacheStatus::Hit,
                    });
                }
                Err(e) => {
                    warn!(path = ?entry.image_path, error = %e, "Failed to read cached image, dropping entry");
                    entry.fetched_at
                }
            }
        };

        let mut slot = self.slot.write().await;
        if slot.entry.as_ref().map(|e| e.fetched_at) == Some(unreadable) {
            slot.entry = None;
        }
        Lookup::Expired {
            attempts: slot.attempts,
        }
    }

    async fn serve_previous_attempt(&self, slot: &Slot) -> Result<CachedImage> {
        match (&slot.entry, &slot.last_error) {
            (Some(entry), None) => {
                let data = fs::read(&entry.image_path).await?;
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Served image fetched by a concurrent request");
                Ok(CachedImage {
                    data,
                    content_type: entry.content_type.clone(),
                    status: CacheStatus::Hit,
                })
            }
            (Some(entry), Some(err)) => {
                let data = fs::read(&entry.image_path).await?;
                self.stale_served.fetch_add(1, Ordering::Relaxed);
                debug!(error = %err, "Concurrent refetch failed, serving stale image");
                Ok(CachedImage {
                    data,
                    content_type: entry.content_type.clone(),
                    status: CacheStatus::Stale,
                })
            }
            (None, err) => Err(ImageCacheError::UpstreamFetch(
                err.clone()
                    .unwrap_or_else(|| "no image available".to_string()),
            )),
        }
    }

    /// Run one fetch attempt. Caller holds the fetch lock.
    async fn refresh(&self) -> Result<CachedImage> {
        let staged = self.fetch_and_stage().await;

        let mut slot = self.slot.write().await;
        slot.attempts += 1;

        let committed = match staged {
            Ok(staged) => self.commit(staged).await,
            Err(e) => Err(e),
        };

        match committed {
            Ok(Staged { entry, data }) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                info!(
                    size = entry.size,
                    source_url = %entry.source_url,
                    "Cached new image"
                );
                let content_type = entry.content_type.clone();
                slot.entry = Some(entry);
                slot.last_error = None;
                Ok(CachedImage {
                    data,
                    content_type,
                    status: CacheStatus::Miss,
                })
            }
            Err(err) => {
                self.fetch_failures.fetch_add(1, Ordering::Relaxed);
                slot.last_error = Some(err.to_string());
                let slot = RwLockWriteGuard::downgrade(slot);

                match slot.entry.as_ref() {
                    Some(entry) => {
                        warn!(
                            error = %err,
                            fetched_at = %entry.fetched_at,
                            "Image refetch failed, serving stale image"
                        );
                        let data = fs::read(&entry.image_path).await?;
                        self.stale_served.fetch_add(1, Ordering::Relaxed);
                        Ok(CachedImage {
                            data,
                            content_type: entry.content_type.clone(),
                            status: CacheStatus::Stale,
                        })
                    }
                    None => {
                        error!(error = %err, "Image fetch failed with nothing cached");
                        Err(err)
                    }
                }
            }
        }
    }

    /// Fetch from the source and write the payload and metadata to temp files
    async fn fetch_and_stage(&self) -> Result<Staged> {
        let fetched = tokio::time::timeout(self.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| {
                ImageCacheError::UpstreamFetch(format!(
                    "source timed out after {} ms",
                    self.fetch_timeout.as_millis()
                ))
            })??;

        if fetched.data.is_empty() {
            return Err(ImageCacheError::UpstreamFetch(
                "source returned an empty body".to_string(),
            ));
        }

        let entry = CacheEntry {
            image_path: self.image_path(),
            source_url: fetched.source_url,
            content_type: fetched.content_type,
            size: fetched.data.len() as u64,
            fetched_at: Utc::now(),
        };
        let metadata = serde_json::to_vec_pretty(&entry)
            .map_err(|e| ImageCacheError::CacheWrite(Box::new(e.into())))?;

        let written = match write_synced(&self.temp_path(IMAGE_FILE), &fetched.data).await {
            Ok(()) => write_synced(&self.temp_path(METADATA_FILE), &metadata).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            self.discard_staged().await;
            return Err(ImageCacheError::CacheWrite(Box::new(e)));
        }

        Ok(Staged {
            entry,
            data: fetched.data,
        })
    }

    /// Move staged files into place. Caller holds the slot write lock.
    async fn commit(&self, staged: Staged) -> Result<Staged> {
        if let Err(e) = fs::rename(self.temp_path(IMAGE_FILE), self.image_path()).await {
            self.discard_staged().await;
            return Err(ImageCacheError::CacheWrite(Box::new(e)));
        }

        // The payload is already live; a stale sidecar only affects restore
        if let Err(e) = fs::rename(self.temp_path(METADATA_FILE), self.metadata_path()).await {
            warn!(error = %e, "Failed to persist image metadata");
        }

        Ok(staged)
    }

    async fn discard_staged(&self) {
        let _ = fs::remove_file(self.temp_path(IMAGE_FILE)).await;
        let _ = fs::remove_file(self.temp_path(METADATA_FILE)).await;
    }

    async fn load_persisted_entry(&self) -> Option<CacheEntry> {
        let raw = match fs::read(self.metadata_path()).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read image metadata");
                return None;
            }
        };

        let mut entry: CacheEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Ignoring corrupt image metadata");
                return None;
            }
        };

        match fs::metadata(self.image_path()).await {
            Ok(meta) if meta.len() > 0 => {
                entry.image_path = self.image_path();
                entry.size = meta.len();
                Some(entry)
            }
            _ => {
                warn!("Image metadata present but payload missing or empty");
                None
            }
        }
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}
