use axum::extract::State;
use axum::http::{header, HeaderName};
use axum::response::{IntoResponse, Response};

use crate::error::Result;
use crate::server::SharedState;

/// GET /image
/// Serves the cached image, refetching it from the source once the TTL has passed.
pub async fn get_image(State(state): State<SharedState>) -> Result<Response> {
    let image = state.cache.get().await?;

    Ok((
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::CACHE_CONTROL, "no-cache".to_string()),
            (HeaderName::from_static("x-cache"), image.status.as_str().to_string()),
        ],
        image.data,
    )
        .into_response())
}
