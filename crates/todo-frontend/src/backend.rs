//! HTTP client for the todo backend store

use crate::error::{FrontendError, Result};
use axum::body::Bytes;
use axum::http::Method;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Response relayed back from the backend
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Forwards todo API calls and runs the readiness probe
pub struct BackendClient {
    client: Client,
    base_url: String,
    probe_path: String,
}

impl BackendClient {
    pub fn new(base_url: &str, probe_path: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FrontendError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            probe_path: probe_path.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request to the backend and return its answer untouched.
    /// Non-2xx statuses are returned, not treated as errors.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> Result<ForwardedResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Forwarding to backend");

        let mut request = self.client.request(method, &url);
        if let Some(ct) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, ct);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        debug!(status, size = body.len(), "Backend responded");

        Ok(ForwardedResponse {
            status,
            content_type,
            body,
        })
    }

    /// Lightweight reachability check against the probe path
    pub async fn probe(&self) -> Result<()> {
        let url = format!("{}{}", self.base_url, self.probe_path);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FrontendError::DownstreamUnavailable(format!(
                "probe {} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str) -> BackendClient {
        BackendClient::new(base, "/healthz", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_forward_relays_status_and_body() {
        let base = serve(Router::new().route(
            "/todos",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
        ))
        .await;

        let response = client(&base)
            .forward(Method::GET, "/todos", None, Bytes::new())
            .await
            .unwrap();

        assert_eq!(response.status, 418);
        assert_eq!(response.body, Bytes::from_static(b"short and stout"));
        assert!(response
            .content_type
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_forward_unreachable_backend() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{}", addr))
            .forward(Method::GET, "/todos", None, Bytes::new())
            .await;

        assert!(matches!(result, Err(FrontendError::DownstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_probe_ok_and_error_status() {
        let healthy = serve(Router::new().route("/healthz", get(|| async { "ok" }))).await;
        assert!(client(&healthy).probe().await.is_ok());

        let failing = serve(Router::new().route(
            "/healthz",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let err = client(&failing).probe().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = client("http://backend:3001/");
        assert_eq!(backend.base_url(), "http://backend:3001");
    }
}
