use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FrontendError, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IMAGE_URL: &str = "https://picsum.photos/1200";
const DEFAULT_CACHE_DURATION_MS: u64 = 10 * 60 * 1000;
const DEFAULT_IMAGE_DIR: &str = "./cache/image";
const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_READINESS_PROBE_PATH: &str = "/healthz";

/// Frontend configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub port: u16,
    pub image_url: String,
    pub cache_duration: Duration,
    pub image_dir: PathBuf,
    pub backend_url: String,
    pub upstream_timeout: Duration,
    pub readiness_probe_path: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            image_url: DEFAULT_IMAGE_URL.to_string(),
            cache_duration: Duration::from_millis(DEFAULT_CACHE_DURATION_MS),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            readiness_probe_path: DEFAULT_READINESS_PROBE_PATH.to_string(),
        }
    }
}

impl FrontendConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let port = lookup("PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let image_url = lookup("IMAGE_URL").unwrap_or(defaults.image_url);
        validate_url("IMAGE_URL", &image_url)?;

        let backend_url = lookup("BACKEND_URL")
            .unwrap_or(defaults.backend_url)
            .trim_end_matches('/')
            .to_string();
        validate_url("BACKEND_URL", &backend_url)?;

        let image_dir = lookup("IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.image_dir);

        let readiness_probe_path = lookup("READINESS_PROBE_PATH")
            .map(|p| {
                if p.starts_with('/') {
                    p
                } else {
                    format!("/{}", p)
                }
            })
            .unwrap_or(defaults.readiness_probe_path);

        Ok(Self {
            port,
            image_url,
            cache_duration: millis("CACHE_DURATION_MS", defaults.cache_duration),
            image_dir,
            backend_url,
            // A zero timeout would fail every fetch
            upstream_timeout: Some(millis("UPSTREAM_TIMEOUT_MS", defaults.upstream_timeout))
                .filter(|t| !t.is_zero())
                .unwrap_or(defaults.upstream_timeout),
            readiness_probe_path,
        })
    }
}

fn validate_url(key: &str, value: &str) -> Result<()> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(FrontendError::Config(format!(
            "{} must be http or https, got {}",
            key,
            url.scheme()
        ))),
        Err(e) => Err(FrontendError::Config(format!("invalid {}: {}", key, e))),
    }
}
