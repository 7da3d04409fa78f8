//! Response bodies for the probe endpoints

use crate::readiness::Readiness;
use file_image_cache::CacheStats;
use serde::Serialize;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: Readiness,
    pub backend: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            uptime_secs: 3600,
            cache: CacheStats {
                hits: 500,
                misses: 6,
                ..Default::default()
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("3600"));
        assert!(json.contains("\"hits\":500"));
        assert!(json.contains("\"fetched_at\":null"));
    }

    #[test]
    fn test_ready_response_serialization() {
        let response = ReadyResponse {
            status: Readiness::Ready,
            backend: "http://todo-backend:3001".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ready\""));
    }
}
