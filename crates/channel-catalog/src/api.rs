//! HTTP API for the catalog. Read-only: writes go through the admin socket.

use crate::catalog::{Catalog, ChannelFilter, ChannelView, ContentView};
use crate::error::Error;
use crate::models::Group;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

type AppState = Arc<Catalog>;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Contents
        .route("/api/contents", get(list_contents))
        .route("/api/contents/:id", get(get_content))
        // Channels
        .route("/api/channels", get(list_channels))
        .route("/api/channels/:id", get(get_channel))
        // Groups
        .route("/api/groups", get(list_groups))
        .route("/api/groups/:id", get(get_group))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn status_for(err: Error) -> StatusCode {
    match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        e => {
            tracing::error!("API request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// --- Health ---

async fn health() -> &'static str {
    "OK"
}

// --- Content endpoints ---

async fn list_contents(State(catalog): State<AppState>) -> Result<Response, StatusCode> {
    let contents = catalog.content_views().map_err(status_for)?;
    if contents.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(contents).into_response())
}

async fn get_content(
    State(catalog): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ContentView>, StatusCode> {
    catalog.content_view(id).map(Json).map_err(status_for)
}

// --- Channel endpoints ---

async fn list_channels(
    State(catalog): State<AppState>,
    Query(filter): Query<ChannelFilter>,
) -> Result<Json<Vec<ChannelView>>, StatusCode> {
    catalog.channel_views(&filter).map(Json).map_err(status_for)
}

async fn get_channel(
    State(catalog): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ChannelView>, StatusCode> {
    catalog.channel_view(id).map(Json).map_err(status_for)
}

// --- Group endpoints ---

async fn list_groups(State(catalog): State<AppState>) -> Result<Json<Vec<Group>>, StatusCode> {
    catalog.list_groups().map(Json).map_err(status_for)
}

async fn get_group(
    State(catalog): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Group>, StatusCode> {
    catalog.get_group(id).map(Json).map_err(status_for)
}
