use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{default_page, default_page_size, enum_str, PaginationParams};
use crate::domain::StoredFile;

/// Metadata-level upload request; the binary payload travels outside this
/// API (object storage is a non-goal).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFilesRequest {
    pub files: Vec<UploadFileRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: i64,
    pub original_name: String,
    pub file_name: String,
    pub mime_type: String,
    pub category: String,
    pub size_bytes: i64,
    pub url: String,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredFile> for FileResponse {
    fn from(file: &StoredFile) -> Self {
        Self {
            id: file.id,
            original_name: file.original_name.clone(),
            file_name: file.file_name.clone(),
            mime_type: file.mime_type.clone(),
            category: enum_str(&file.category),
            size_bytes: file.size_bytes,
            url: format!("/{}", file.storage_path),
            uploaded_by: file.uploaded_by,
            created_at: file.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDetail {
    pub original_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFilesResponse {
    pub success_count: i64,
    pub failure_count: i64,
    pub details: Vec<UploadDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub category: Option<String>,
}

impl FileListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsageResponse {
    pub used_bytes: i64,
    pub quota_bytes: i64,
    pub file_count: i64,
}
