use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StoredFile;

/// One directory entry in a namespace listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_directory: bool,
}

impl From<StoredFile> for FileEntry {
    fn from(f: StoredFile) -> Self {
        Self {
            name: f.name,
            size: f.size,
            modified: f.modified,
            is_directory: f.is_directory,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailure {
    pub file_name: String,
    pub error: String,
}

/// Batch upload outcome. Failures are per-file; a failed file never rolls
/// back its siblings.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<UploadedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UploadFailure>,
}

/// Body of the view endpoint for text-renderable files.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub content: String,
    pub file_name: String,
    pub file_type: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Admin overwrite request: the full replacement text.
#[derive(Debug, Deserialize)]
pub struct UpdateFileRequest {
    pub content: String,
}
