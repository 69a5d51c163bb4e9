use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::api::dtos::{
    FileListQuery, FileResponse, Paged, StorageUsageResponse, UploadDetail, UploadFileRequest,
    UploadFilesRequest, UploadFilesResponse,
};
use crate::config::StorageConfig;
use crate::domain::{FileCategory, Role, StoredFile};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::FileRepository;

#[derive(Clone)]
pub struct FileService {
    file_repo: Arc<dyn FileRepository>,
    config: StorageConfig,
}

impl FileService {
    pub fn new(file_repo: Arc<dyn FileRepository>, config: StorageConfig) -> Self {
        Self { file_repo, config }
    }

    pub async fn upload(
        &self,
        request: UploadFileRequest,
        uploaded_by: i64,
    ) -> AppResult<FileResponse> {
        let (original_name, mime_type, category, size_bytes) = self.validate_upload(&request)?;
        self.ensure_quota(uploaded_by, size_bytes).await?;

        let stored = self
            .store(original_name, mime_type, category, size_bytes, uploaded_by)
            .await?;
        info!(file_id = stored.id, uploaded_by, "file uploaded");
        Ok(FileResponse::from(&stored))
    }

    pub async fn upload_many(
        &self,
        request: UploadFilesRequest,
        uploaded_by: i64,
    ) -> AppResult<UploadFilesResponse> {
        if request.files.is_empty() {
            return Err(AppError::MissingFields("文件列表不能为空".to_string()));
        }
        if request.files.len() > self.config.max_batch_files {
            return Err(AppError::BadRequest(format!(
                "单次最多上传{}个文件",
                self.config.max_batch_files
            )));
        }

        let mut details = Vec::with_capacity(request.files.len());
        let mut success_count = 0i64;
        let mut failure_count = 0i64;

        for file in request.files {
            let original_name = file
                .original_name
                .clone()
                .unwrap_or_else(|| "未命名".to_string());

            let outcome = match self.validate_upload(&file) {
                Ok((name, mime_type, category, size_bytes)) => {
                    match self.ensure_quota(uploaded_by, size_bytes).await {
                        Ok(()) => {
                            self.store(name, mime_type, category, size_bytes, uploaded_by)
                                .await
                        }
                        Err(err) => Err(err),
                    }
                }
                Err(err) => Err(err),
            };

            match outcome {
                Ok(stored) => {
                    success_count += 1;
                    details.push(UploadDetail {
                        original_name,
                        success: true,
                        file: Some(FileResponse::from(&stored)),
                        reason: None,
                    });
                }
                Err(err) => {
                    failure_count += 1;
                    details.push(UploadDetail {
                        original_name,
                        success: false,
                        file: None,
                        reason: Some(err.public_message()),
                    });
                }
            }
        }

        info!(uploaded_by, success_count, failure_count, "batch upload");
        Ok(UploadFilesResponse {
            success_count,
            failure_count,
            details,
        })
    }

    pub async fn get(&self, id: i64) -> AppResult<FileResponse> {
        let file = self.require_file(id).await?;
        Ok(FileResponse::from(&file))
    }

    pub async fn list(
        &self,
        user_id: i64,
        query: &FileListQuery,
    ) -> AppResult<Paged<FileResponse>> {
        let category = match query.category.as_deref() {
            Some(value) => Some(parse_category(value)?),
            None => None,
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let files = self
            .file_repo
            .list_by_user(user_id, category, limit, offset)
            .await?;
        let total = self.file_repo.count_by_user(user_id, category).await?;

        let items = files.iter().map(FileResponse::from).collect();
        Ok(Paged::new(items, total, &pagination))
    }

    /// Owners delete their own files; admins delete anything.
    pub async fn delete(&self, id: i64, user_id: i64, role: Role) -> AppResult<()> {
        let file = self.require_file(id).await?;
        if file.uploaded_by != user_id && role != Role::Admin {
            return Err(AppError::Forbidden("无权删除该文件".to_string()));
        }
        self.file_repo.delete(id).await?;
        info!(file_id = id, user_id, "file deleted");
        Ok(())
    }

    pub async fn usage(&self, user_id: i64) -> AppResult<StorageUsageResponse> {
        let used_bytes = self.file_repo.total_size_for_user(user_id).await?;
        let file_count = self.file_repo.count_by_user(user_id, None).await?;
        Ok(StorageUsageResponse {
            used_bytes,
            quota_bytes: self.config.user_quota_bytes,
            file_count,
        })
    }

    fn validate_upload(
        &self,
        request: &UploadFileRequest,
    ) -> AppResult<(String, String, FileCategory, i64)> {
        let original_name = request
            .original_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("文件名不能为空".to_string()))?;
        let mime_type = request
            .mime_type
            .clone()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| AppError::MissingFields("文件类型不能为空".to_string()))?;
        let category = FileCategory::from_mime(&mime_type)
            .ok_or_else(|| AppError::UnsupportedMediaType("不支持的文件类型".to_string()))?;

        let size_bytes = request.size_bytes.unwrap_or(0);
        if size_bytes <= 0 {
            return Err(AppError::BadRequest("文件大小无效".to_string()));
        }
        if size_bytes > self.config.max_file_size_bytes {
            return Err(AppError::PayloadTooLarge("文件大小超出限制".to_string()));
        }

        Ok((original_name, mime_type, category, size_bytes))
    }

    async fn ensure_quota(&self, user_id: i64, size_bytes: i64) -> AppResult<()> {
        let used = self.file_repo.total_size_for_user(user_id).await?;
        if used + size_bytes > self.config.user_quota_bytes {
            return Err(AppError::InsufficientStorage("存储空间不足".to_string()));
        }
        Ok(())
    }

    async fn store(
        &self,
        original_name: String,
        mime_type: String,
        category: FileCategory,
        size_bytes: i64,
        uploaded_by: i64,
    ) -> AppResult<StoredFile> {
        let extension = std::path::Path::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let file_name = format!("{}{extension}", Uuid::new_v4().simple());
        let storage_path = format!("{}/{file_name}", self.config.upload_dir);

        let file = StoredFile {
            id: 0,
            original_name,
            file_name,
            mime_type,
            category,
            size_bytes,
            storage_path,
            uploaded_by,
            created_at: Utc::now(),
        };
        self.file_repo.create(&file).await
    }

    async fn require_file(&self, id: i64) -> AppResult<StoredFile> {
        self.file_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("文件不存在".to_string()))
    }
}

fn parse_category(value: &str) -> AppResult<FileCategory> {
    match value {
        "image" => Ok(FileCategory::Image),
        "document" => Ok(FileCategory::Document),
        "video" => Ok(FileCategory::Video),
        _ => Err(AppError::BadRequest("文件分类无效".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> FileService {
        struct NoopRepo;

        #[async_trait::async_trait]
        impl FileRepository for NoopRepo {
            async fn create(&self, _file: &StoredFile) -> AppResult<StoredFile> {
                unimplemented!()
            }
            async fn find_by_id(&self, _id: i64) -> AppResult<Option<StoredFile>> {
                unimplemented!()
            }
            async fn delete(&self, _id: i64) -> AppResult<()> {
                unimplemented!()
            }
            async fn list_by_user(
                &self,
                _user_id: i64,
                _category: Option<FileCategory>,
                _limit: i64,
                _offset: i64,
            ) -> AppResult<Vec<StoredFile>> {
                unimplemented!()
            }
            async fn count_by_user(
                &self,
                _user_id: i64,
                _category: Option<FileCategory>,
            ) -> AppResult<i64> {
                unimplemented!()
            }
            async fn total_size_for_user(&self, _user_id: i64) -> AppResult<i64> {
                unimplemented!()
            }
        }

        FileService::new(Arc::new(NoopRepo), StorageConfig::default())
    }

    #[test]
    fn unsupported_mime_type_is_rejected() {
        let result = service().validate_upload(&UploadFileRequest {
            original_name: Some("payload.exe".to_string()),
            mime_type: Some("application/x-msdownload".to_string()),
            size_bytes: Some(1024),
        });
        assert!(matches!(result, Err(AppError::UnsupportedMediaType(_))));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let svc = service();
        let result = svc.validate_upload(&UploadFileRequest {
            original_name: Some("photo.png".to_string()),
            mime_type: Some("image/png".to_string()),
            size_bytes: Some(svc.config.max_file_size_bytes + 1),
        });
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }

    #[test]
    fn valid_upload_passes_validation() {
        let result = service().validate_upload(&UploadFileRequest {
            original_name: Some("合同.pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
            size_bytes: Some(2048),
        });
        let (name, mime, category, size) = result.expect("upload should validate");
        assert_eq!(name, "合同.pdf");
        assert_eq!(mime, "application/pdf");
        assert_eq!(category, FileCategory::Document);
        assert_eq!(size, 2048);
    }
}
