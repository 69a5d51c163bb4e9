use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::{AiModelRepository, SystemConfigRepository};
use crate::domain::{AiModelConfig, SystemConfig};
use crate::error::AppResult;

const CONFIG_COLUMNS: &str = "id, config_key, config_value, value_type, config_group, description, updated_by, created_at, updated_at";

pub struct SystemConfigRepositoryImpl {
    pool: PgPool,
}

impl SystemConfigRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SystemConfigRepository for SystemConfigRepositoryImpl {
    async fn find_by_key(&self, config_key: &str) -> AppResult<Option<SystemConfig>> {
        let config = sqlx::query_as::<_, SystemConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM system_configs WHERE config_key = $1"
        ))
        .bind(config_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    async fn create(&self, config: &SystemConfig) -> AppResult<SystemConfig> {
        let created = sqlx::query_as::<_, SystemConfig>(&format!(
            r#"
            INSERT INTO system_configs (config_key, config_value, value_type, config_group, description, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(&config.config_key)
        .bind(&config.config_value)
        .bind(config.value_type)
        .bind(&config.config_group)
        .bind(&config.description)
        .bind(config.updated_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, config: &SystemConfig) -> AppResult<SystemConfig> {
        let updated = sqlx::query_as::<_, SystemConfig>(&format!(
            r#"
            UPDATE system_configs
            SET config_value = $2, value_type = $3, config_group = $4, description = $5,
                updated_by = $6, updated_at = NOW()
            WHERE config_key = $1
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(&config.config_key)
        .bind(&config.config_value)
        .bind(config.value_type)
        .bind(&config.config_group)
        .bind(&config.description)
        .bind(config.updated_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_by_key(&self, config_key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM system_configs WHERE config_key = $1")
            .bind(config_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, config_group: Option<&str>) -> AppResult<Vec<SystemConfig>> {
        let configs = match config_group {
            Some(group) => {
                sqlx::query_as::<_, SystemConfig>(&format!(
                    "SELECT {CONFIG_COLUMNS} FROM system_configs WHERE config_group = $1 ORDER BY config_key"
                ))
                .bind(group)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SystemConfig>(&format!(
                    "SELECT {CONFIG_COLUMNS} FROM system_configs ORDER BY config_group, config_key"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(configs)
    }
}

const AI_MODEL_COLUMNS: &str = "id, name, provider, model_name, api_key, endpoint_url, max_tokens, temperature, is_default, status, created_at, updated_at";

pub struct AiModelRepositoryImpl {
    pool: PgPool,
}

impl AiModelRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AiModelRepository for AiModelRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<AiModelConfig>> {
        let config = sqlx::query_as::<_, AiModelConfig>(&format!(
            "SELECT {AI_MODEL_COLUMNS} FROM ai_model_configs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    async fn find_default(&self) -> AppResult<Option<AiModelConfig>> {
        let config = sqlx::query_as::<_, AiModelConfig>(&format!(
            "SELECT {AI_MODEL_COLUMNS} FROM ai_model_configs WHERE is_default AND status = 'active' LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    async fn create(&self, config: &AiModelConfig) -> AppResult<AiModelConfig> {
        let created = sqlx::query_as::<_, AiModelConfig>(&format!(
            r#"
            INSERT INTO ai_model_configs (name, provider, model_name, api_key, endpoint_url, max_tokens, temperature, is_default, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {AI_MODEL_COLUMNS}
            "#
        ))
        .bind(&config.name)
        .bind(&config.provider)
        .bind(&config.model_name)
        .bind(&config.api_key)
        .bind(&config.endpoint_url)
        .bind(config.max_tokens)
        .bind(config.temperature)
        .bind(config.is_default)
        .bind(config.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, config: &AiModelConfig) -> AppResult<AiModelConfig> {
        let updated = sqlx::query_as::<_, AiModelConfig>(&format!(
            r#"
            UPDATE ai_model_configs
            SET name = $2, provider = $3, model_name = $4, api_key = $5, endpoint_url = $6,
                max_tokens = $7, temperature = $8, is_default = $9, status = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {AI_MODEL_COLUMNS}
            "#
        ))
        .bind(config.id)
        .bind(&config.name)
        .bind(&config.provider)
        .bind(&config.model_name)
        .bind(&config.api_key)
        .bind(&config.endpoint_url)
        .bind(config.max_tokens)
        .bind(config.temperature)
        .bind(config.is_default)
        .bind(config.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM ai_model_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<AiModelConfig>> {
        let configs = sqlx::query_as::<_, AiModelConfig>(&format!(
            "SELECT {AI_MODEL_COLUMNS} FROM ai_model_configs ORDER BY is_default DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(configs)
    }

    async fn clear_default(&self) -> AppResult<()> {
        sqlx::query("UPDATE ai_model_configs SET is_default = FALSE WHERE is_default")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
