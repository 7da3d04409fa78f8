//! Upstream image sources

use crate::error::{ImageCacheError, Result};
use crate::types::FetchedImage;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Something the cache can pull a fresh image from
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedImage>;
}

/// Fetches the image over HTTP from a fixed URL
pub struct HttpImageSource {
    client: Client,
    url: String,
}

impl HttpImageSource {
    pub fn new(url: &str) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self) -> Result<FetchedImage> {
        debug!(url = %self.url, "Fetching image from source");

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %self.url, "Image source returned error status");
            return Err(ImageCacheError::UpstreamFetch(format!(
                "source returned status {}",
                response.status()
            )));
        }

        // Redirects (picsum answers with one) resolve to the concrete image
        let source_url = response.url().to_string();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = response.bytes().await?.to_vec();
        if data.is_empty() {
            return Err(ImageCacheError::UpstreamFetch(
                "source returned an empty body".to_string(),
            ));
        }

        debug!(
            size = data.len(),
            content_type = %content_type,
            source_url = %source_url,
            "Fetched image from source"
        );

        Ok(FetchedImage {
            data,
            content_type,
            source_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
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

    #[tokio::test]
    async fn test_fetch_returns_bytes_and_content_type() {
        let base = serve(Router::new().route(
            "/image",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![1u8, 2, 3, 4]) }),
        ))
        .await;

        let source = HttpImageSource::new(&format!("{}/image", base));
        let image = source.fetch().await.unwrap();

        assert_eq!(image.data, vec![1, 2, 3, 4]);
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.source_url, format!("{}/image", base));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let base = serve(Router::new().route(
            "/image",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;

        let source = HttpImageSource::new(&format!("{}/image", base));
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, ImageCacheError::UpstreamFetch(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_empty_body_is_error() {
        let base = serve(Router::new().route("/image", get(|| async { "" }))).await;

        let source = HttpImageSource::new(&format!("{}/image", base));
        let err = source.fetch().await.unwrap_err();

        assert!(err.to_string().contains("empty body"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_source() {
        // Bind then drop so nothing listens on the port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpImageSource::new(&format!("http://{}/image", addr));
        let result = source.fetch().await;

        assert!(matches!(result, Err(ImageCacheError::UpstreamFetch(_))));
    }
}
