use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Document,
    Video,
}

impl FileCategory {
    /// Category is derived from the MIME type; unknown types are rejected
    /// upstream before a file record is created.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type {
            "image/jpeg" | "image/png" | "image/gif" | "image/webp" => Some(FileCategory::Image),
            "application/pdf"
            | "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "text/plain" => Some(FileCategory::Document),
            "video/mp4" | "video/quicktime" => Some(FileCategory::Video),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredFile {
    pub id: i64,
    pub original_name: String,
    pub file_name: String,
    pub mime_type: String,
    pub category: FileCategory,
    pub size_bytes: i64,
    pub storage_path: String,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}
