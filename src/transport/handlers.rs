use super::protocol::{CONTENT_TYPE_OCTET_STREAM, ENDPOINT_API, ENDPOINT_API_STATS, encode_response};
use crate::error::CacheError;
use crate::group::group::Group;
use crate::group::registry::GroupRegistry;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

/// Router serving this node's groups to its peers under `base_path`
/// (`{base_path}{group}/{key}`). An empty key (`{base_path}{group}/`) reaches the group
/// and is rejected there.
pub fn peer_router(registry: Arc<GroupRegistry>, base_path: &str) -> Router {
    Router::new()
        .route(&format!("{}:group/*key", base_path), get(handle_peer_get))
        .route(&format!("{}:group/", base_path), get(handle_peer_get_empty_key))
        .layer(Extension(registry))
}

/// Router of the client-facing API bound to a single group.
pub fn api_router(group: Arc<Group>) -> Router {
    Router::new()
        .route(ENDPOINT_API, get(handle_api_get))
        .route(ENDPOINT_API_STATS, get(handle_api_stats))
        .layer(Extension(group))
}

pub async fn handle_peer_get(
    Extension(registry): Extension<Arc<GroupRegistry>>,
    Path((group_name, key)): Path<(String, String)>,
) -> Response {
    serve_peer_get(&registry, group_name, key).await
}

pub async fn handle_peer_get_empty_key(
    Extension(registry): Extension<Arc<GroupRegistry>>,
    Path(group_name): Path<String>,
) -> Response {
    serve_peer_get(&registry, group_name, String::new()).await
}

async fn serve_peer_get(registry: &GroupRegistry, group_name: String, key: String) -> Response {
    tracing::info!("GET {}/{}", group_name, key);

    let Some(group) = registry.get_group(&group_name) else {
        tracing::warn!("Peer asked for unknown group {}", group_name);
        return (
            StatusCode::NOT_FOUND,
            CacheError::NoSuchGroup(group_name).to_string(),
        )
            .into_response();
    };

    match group.get(&key).await {
        Ok(view) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            encode_response(view.byte_slice()),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to get {}/{}: {}", group_name, key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiParams {
    #[serde(default)]
    pub key: String,
}

pub async fn handle_api_get(
    Extension(group): Extension<Arc<Group>>,
    Query(params): Query<ApiParams>,
) -> Response {
    match group.get(&params.key).await {
        Ok(view) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            view.byte_slice(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("API get {:?} failed: {}", params.key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn handle_api_stats(Extension(group): Extension<Arc<Group>>) -> Response {
    Json(group.stats()).into_response()
}
