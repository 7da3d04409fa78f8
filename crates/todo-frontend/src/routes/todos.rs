use axum::body::{Body, Bytes};
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::Result;
use crate::server::SharedState;

/// GET /todos
pub async fn list(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let path = match query {
        Some(q) if !q.is_empty() => format!("/todos?{}", q),
        _ => "/todos".to_string(),
    };
    relay(&state, Method::GET, path, &HeaderMap::new(), Bytes::new()).await
}

/// POST /todos
pub async fn create(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    relay(&state, Method::POST, "/todos".to_string(), &headers, body).await
}

/// PUT /todos/{id}
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let path = format!("/todos/{}", urlencoding::encode(&id));
    relay(&state, Method::PUT, path, &headers, body).await
}

/// Forward to the backend, passing its status, Content-Type and body straight back
async fn relay(
    state: &SharedState,
    method: Method,
    path: String,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let forwarded = state
        .backend
        .forward(method, &path, content_type, body)
        .await?;

    let status = StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = Response::builder().status(status);
    if let Some(ct) = forwarded.content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }

    Ok(builder
        .body(Body::from(forwarded.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
