use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::FileRepository;
use crate::domain::{FileCategory, StoredFile};
use crate::error::AppResult;

const FILE_COLUMNS: &str = "id, original_name, file_name, mime_type, category, size_bytes, storage_path, uploaded_by, created_at";

pub struct FileRepositoryImpl {
    pool: PgPool,
}

impl FileRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for FileRepositoryImpl {
    async fn create(&self, file: &StoredFile) -> AppResult<StoredFile> {
        let created = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            INSERT INTO uploaded_files (original_name, file_name, mime_type, category, size_bytes, storage_path, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {FILE_COLUMNS}
            "#
        ))
        .bind(&file.original_name)
        .bind(&file.file_name)
        .bind(&file.mime_type)
        .bind(file.category)
        .bind(file.size_bytes)
        .bind(&file.storage_path)
        .bind(file.uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<StoredFile>> {
        let file = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM uploaded_files WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM uploaded_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        category: Option<FileCategory>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<StoredFile>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {FILE_COLUMNS} FROM uploaded_files WHERE uploaded_by = "
        ));
        builder.push_bind(user_id);
        if let Some(category) = category {
            builder.push(" AND category = ");
            builder.push_bind(category);
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let files = builder
            .build_query_as::<StoredFile>()
            .fetch_all(&self.pool)
            .await?;
        Ok(files)
    }

    async fn count_by_user(&self, user_id: i64, category: Option<FileCategory>) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM uploaded_files WHERE uploaded_by = ");
        builder.push_bind(user_id);
        if let Some(category) = category {
            builder.push(" AND category = ");
            builder.push_bind(category);
        }

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn total_size_for_user(&self, user_id: i64) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(size_bytes), 0)::bigint FROM uploaded_files WHERE uploaded_by = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
