//! Handlers for the admin service.
//!
//! This surface binds on its own port and only ever touches the server
//! namespace, where it holds full read/write/delete capability. It is a
//! thin adapter over the same store the general service uses.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::storage::{Namespace, ServiceTier};

use super::dto::{FileEntry, MessageResponse, UpdateFileRequest};
use super::handlers::download_response;
use super::response::ApiError;
use super::router::AppState;

const TIER: ServiceTier = ServiceTier::Admin;
const NS: Namespace = Namespace::Server;

/// GET /api/files/server
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    TIER.require_read(NS)?;

    let files = state.store.list(NS).await?;
    let entries: Vec<FileEntry> = files.into_iter().map(FileEntry::from).collect();
    Ok(Json(entries))
}

/// PUT /api/files/server/{name} — full text replacement of the file.
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<UpdateFileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    TIER.require_write(NS)?;

    state.store.write(NS, &name, req.content.as_bytes()).await?;
    Ok(Json(MessageResponse::new("File updated successfully")))
}

/// DELETE /api/files/server/{name}
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    TIER.require_delete(NS)?;

    state.store.remove(NS, &name).await?;
    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// GET /api/download/server/{name}
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    download_response(&state, TIER, NS, &name).await
}
