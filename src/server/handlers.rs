use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::error::Error;
use crate::storage::archive::{ARCHIVE_CONTENT_TYPE, archive_file_name, stream_namespace_archive};
use crate::storage::classify::extension;
use crate::storage::{Namespace, ServiceTier, ViewMode, classify};

use super::dto::{FileEntry, MessageResponse, UploadFailure, UploadResponse, UploadedFile, ViewResponse};
use super::response::ApiError;
use super::router::AppState;

const TIER: ServiceTier = ServiceTier::General;

fn parse_namespace(raw: &str) -> Result<Namespace, ApiError> {
    raw.parse::<Namespace>().map_err(ApiError::from)
}

/// Builds a `Content-Disposition` value, falling back to a bare disposition
/// when the name cannot be represented in a header.
fn content_disposition(kind: &str, file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    HeaderValue::from_str(&format!("{kind}; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn stream_headers(mime: &str, len: u64, disposition: HeaderValue) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime).map_err(|_| ApiError::internal("invalid content type"))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(headers)
}

/// Shared by the general and admin download endpoints: streams the file as
/// an attachment with its classified content type.
pub(super) async fn download_response(
    state: &AppState,
    tier: ServiceTier,
    namespace: Namespace,
    name: &str,
) -> Result<Response, ApiError> {
    tier.require_read(namespace)?;

    let policy = classify(name);
    let (file, len) = state.store.open_for_read(namespace, name).await?;
    let headers = stream_headers(policy.mime, len, content_disposition("attachment", name))?;

    Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// GET /api/files/{namespace}
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(namespace): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let namespace = parse_namespace(&namespace)?;
    TIER.require_read(namespace)?;

    let files = state.store.list(namespace).await?;
    let entries: Vec<FileEntry> = files.into_iter().map(FileEntry::from).collect();
    Ok(Json(entries))
}

/// POST /api/upload
///
/// Multipart body: an optional `uploadType` text field (client|server,
/// defaults to client) followed by one or more `files` fields. The
/// `uploadType` field must precede the file fields; files seen before it go
/// to the default namespace. Each file streams through the staging dir with
/// the size ceiling enforced chunk by chunk, so an oversized or interrupted
/// upload never leaves a partial file under a namespace root. Outcomes are
/// per file.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut namespace = Namespace::Client;
    let mut files = Vec::new();
    let mut failures = Vec::new();
    let mut saw_file_field = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read multipart: {e}")))?
    {
        match field.name() {
            Some("uploadType") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read uploadType: {e}")))?;
                namespace = parse_namespace(&raw)?;
                TIER.require_write(namespace)?;
            }
            Some("files") => {
                saw_file_field = true;
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    failures.push(UploadFailure {
                        file_name: String::new(),
                        error: "missing file name".to_string(),
                    });
                    continue;
                };

                match store_one_file(&state, namespace, &file_name, &mut field).await {
                    Ok(size) => files.push(UploadedFile { file_name, size }),
                    Err(error) => {
                        tracing::warn!("upload of {file_name} to {namespace} failed: {error}");
                        failures.push(UploadFailure {
                            file_name,
                            error: error.to_string(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    if !saw_file_field {
        return Err(ApiError::bad_request("no files in request"));
    }

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        files,
        failures,
    }))
}

async fn store_one_file(
    state: &AppState,
    namespace: Namespace,
    name: &str,
    field: &mut axum::extract::multipart::Field<'_>,
) -> Result<u64, Error> {
    // Reject unsafe names before any bytes are staged.
    state.store.resolve(namespace, name)?;

    let mut staged = state.store.begin_staged().await?;

    loop {
        let chunk: bytes::Bytes = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                staged.discard().await;
                return Err(Error::Io(std::io::Error::other(e)));
            }
        };
        if let Err(e) = staged.write_chunk(&chunk).await {
            staged.discard().await;
            return Err(e);
        }
    }

    state.store.commit_staged(staged, namespace, name).await
}

/// GET /api/download/{namespace}/{name}
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let namespace = parse_namespace(&namespace)?;
    download_response(&state, TIER, namespace, &name).await
}

/// GET /api/download-all/{namespace}
pub async fn download_all(
    State(state): State<Arc<AppState>>,
    Path(namespace): Path<String>,
) -> Result<Response, ApiError> {
    let namespace = parse_namespace(&namespace)?;
    TIER.require_read(namespace)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(ARCHIVE_CONTENT_TYPE),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition("attachment", &archive_file_name(namespace)),
    );

    let stream = stream_namespace_archive(state.store.clone(), namespace);
    Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(stream))).into_response())
}

/// GET /api/view/{namespace}/{name}
///
/// Text-renderable files are buffered whole and returned inside a JSON
/// envelope; that is the one deliberate full-buffering path. Everything else
/// streams inline with its classified content type.
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let namespace = parse_namespace(&namespace)?;
    TIER.require_read(namespace)?;

    let policy = classify(&name);
    if policy.mode == ViewMode::TextRender {
        let bytes = state.store.read_to_vec(namespace, &name).await?;
        let body = ViewResponse {
            content: String::from_utf8_lossy(&bytes).into_owned(),
            file_type: extension(&name),
            file_name: name,
        };
        return Ok(Json(body).into_response());
    }

    let (file, len) = state.store.open_for_read(namespace, &name).await?;
    let headers = stream_headers(policy.mime, len, content_disposition("inline", &name))?;
    Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// GET /api/preview/{namespace}/{name}
///
/// Strict allow-list: anything outside it is 415, even when the file exists
/// and is readable. Allowed files stream inline; every format except PDF is
/// shown as plain text (.doc/.docx included, raw rather than parsed).
pub async fn preview_file(
    State(state): State<Arc<AppState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let namespace = parse_namespace(&namespace)?;
    TIER.require_read(namespace)?;

    let policy = classify(&name);
    if !policy.previewable() {
        return Err(Error::UnsupportedPreview.into());
    }

    let (file, len) = state.store.open_for_read(namespace, &name).await?;
    let headers = stream_headers(policy.preview_mime(), len, content_disposition("inline", &name))?;
    Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// DELETE /api/files/{namespace}/{name}
///
/// Deleting from the server namespace is forbidden on this surface; the
/// capability check runs before any filesystem access, so the answer is 403
/// whether or not the target exists.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let namespace = parse_namespace(&namespace)?;
    TIER.require_delete(namespace)?;

    state.store.remove(namespace, &name).await?;
    Ok(Json(MessageResponse::new("File deleted successfully")))
}
