use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::api::dtos::{
    AiModelGroup, AiModelResponse, AiModelTestResponse, ConfigListQuery, ConfigResponse,
    CreateConfigRequest, SaveAiModelRequest, UpdateConfigRequest,
};
use crate::domain::{AiModelConfig, AiModelStatus, ConfigValueType, SystemConfig};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{AiModelRepository, SystemConfigRepository};

#[derive(Clone)]
pub struct SystemService {
    config_repo: Arc<dyn SystemConfigRepository>,
    ai_model_repo: Arc<dyn AiModelRepository>,
}

impl SystemService {
    pub fn new(
        config_repo: Arc<dyn SystemConfigRepository>,
        ai_model_repo: Arc<dyn AiModelRepository>,
    ) -> Self {
        Self {
            config_repo,
            ai_model_repo,
        }
    }

    pub async fn create_config(
        &self,
        request: CreateConfigRequest,
        updated_by: i64,
    ) -> AppResult<ConfigResponse> {
        let config_key = request
            .config_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("配置键不能为空".to_string()))?;
        let config_value = request
            .config_value
            .ok_or_else(|| AppError::MissingFields("配置值不能为空".to_string()))?;
        let value_type = parse_value_type(request.value_type.as_deref().unwrap_or("string"))?;
        if !value_type.accepts(&config_value) {
            return Err(AppError::BadRequest(
                "配置值与类型不匹配".to_string(),
            ));
        }

        let now = Utc::now();
        let config = SystemConfig {
            id: 0,
            config_key,
            config_value,
            value_type,
            config_group: request.config_group.unwrap_or_else(|| "general".to_string()),
            description: request.description,
            updated_by: Some(updated_by),
            created_at: now,
            updated_at: now,
        };

        // Duplicate keys trip the unique index and map to 409.
        let created = self.config_repo.create(&config).await?;
        info!(config_key = %created.config_key, "system config created");
        Ok(ConfigResponse::from(&created))
    }

    pub async fn get_config(&self, config_key: &str) -> AppResult<ConfigResponse> {
        let config = self.require_config(config_key).await?;
        Ok(ConfigResponse::from(&config))
    }

    pub async fn list_configs(&self, query: &ConfigListQuery) -> AppResult<Vec<ConfigResponse>> {
        let configs = self.config_repo.list(query.group.as_deref()).await?;
        Ok(configs.iter().map(ConfigResponse::from).collect())
    }

    pub async fn update_config(
        &self,
        config_key: &str,
        request: UpdateConfigRequest,
        updated_by: i64,
    ) -> AppResult<ConfigResponse> {
        let mut config = self.require_config(config_key).await?;

        if let Some(ref value_type) = request.value_type {
            config.value_type = parse_value_type(value_type)?;
        }
        if let Some(config_value) = request.config_value {
            config.config_value = config_value;
        }
        if !config.value_type.accepts(&config.config_value) {
            return Err(AppError::BadRequest(
                "配置值与类型不匹配".to_string(),
            ));
        }
        if let Some(config_group) = request.config_group {
            config.config_group = config_group;
        }
        if let Some(description) = request.description {
            config.description = Some(description);
        }
        config.updated_by = Some(updated_by);

        let updated = self.config_repo.update(&config).await?;
        info!(config_key = %config_key, "system config updated");
        Ok(ConfigResponse::from(&updated))
    }

    pub async fn delete_config(&self, config_key: &str) -> AppResult<()> {
        self.require_config(config_key).await?;
        self.config_repo.delete_by_key(config_key).await?;
        Ok(())
    }

    pub async fn save_ai_model(
        &self,
        id: Option<i64>,
        request: SaveAiModelRequest,
    ) -> AppResult<AiModelResponse> {
        let mut model = match id {
            Some(id) => self.require_ai_model(id).await?,
            None => {
                let now = Utc::now();
                AiModelConfig {
                    id: 0,
                    name: String::new(),
                    provider: String::new(),
                    model_name: String::new(),
                    api_key: String::new(),
                    endpoint_url: None,
                    max_tokens: 4096,
                    temperature: Decimal::new(7, 1),
                    is_default: false,
                    status: AiModelStatus::Active,
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        if let Some(name) = request.name {
            model.name = name;
        }
        if let Some(provider) = request.provider {
            model.provider = provider;
        }
        if let Some(model_name) = request.model_name {
            model.model_name = model_name;
        }
        if let Some(api_key) = request.api_key {
            model.api_key = api_key;
        }
        if let Some(endpoint_url) = request.endpoint_url {
            model.endpoint_url = Some(endpoint_url);
        }
        if let Some(max_tokens) = request.max_tokens {
            if max_tokens <= 0 {
                return Err(AppError::BadRequest("最大令牌数必须为正数".to_string()));
            }
            model.max_tokens = max_tokens;
        }
        if let Some(temperature) = request.temperature {
            model.temperature = temperature;
        }
        if let Some(ref status) = request.status {
            model.status = match status.as_str() {
                "active" => AiModelStatus::Active,
                "inactive" => AiModelStatus::Inactive,
                _ => return Err(AppError::BadRequest("状态无效".to_string())),
            };
        }

        if id.is_none() {
            for (field, message) in [
                (model.name.is_empty(), "名称不能为空"),
                (model.provider.is_empty(), "提供商不能为空"),
                (model.model_name.is_empty(), "模型名称不能为空"),
                (model.api_key.is_empty(), "API密钥不能为空"),
            ] {
                if field {
                    return Err(AppError::MissingFields(message.to_string()));
                }
            }
        }

        // Only one model can be the default at a time.
        if request.is_default == Some(true) {
            self.ai_model_repo.clear_default().await?;
            model.is_default = true;
        } else if let Some(false) = request.is_default {
            model.is_default = false;
        }

        let saved = match id {
            Some(_) => self.ai_model_repo.update(&model).await?,
            None => self.ai_model_repo.create(&model).await?,
        };
        info!(model_id = saved.id, "ai model saved");
        Ok(AiModelResponse::from(&saved))
    }

    pub async fn get_ai_model(&self, id: i64) -> AppResult<AiModelResponse> {
        let model = self.require_ai_model(id).await?;
        Ok(AiModelResponse::from(&model))
    }

    pub async fn list_ai_models(&self) -> AppResult<Vec<AiModelResponse>> {
        let models = self.ai_model_repo.list().await?;
        Ok(models.iter().map(AiModelResponse::from).collect())
    }

    /// Models grouped by provider, for the settings screen.
    pub async fn ai_models_by_provider(&self) -> AppResult<Vec<AiModelGroup>> {
        let models = self.ai_model_repo.list().await?;

        let mut groups: Vec<AiModelGroup> = Vec::new();
        for model in &models {
            let response = AiModelResponse::from(model);
            match groups.iter_mut().find(|g| g.provider == model.provider) {
                Some(group) => group.models.push(response),
                None => groups.push(AiModelGroup {
                    provider: model.provider.clone(),
                    models: vec![response],
                }),
            }
        }
        Ok(groups)
    }

    pub async fn delete_ai_model(&self, id: i64) -> AppResult<()> {
        self.require_ai_model(id).await?;
        self.ai_model_repo.delete(id).await?;
        Ok(())
    }

    /// Connectivity probe; no request leaves the process, the check is a
    /// configuration sanity pass with a simulated round trip.
    pub async fn test_ai_model(&self, id: i64) -> AppResult<AiModelTestResponse> {
        let model = self.require_ai_model(id).await?;
        if model.status != AiModelStatus::Active {
            return Err(AppError::BadRequest("模型未启用".to_string()));
        }

        let started = std::time::Instant::now();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        Ok(AiModelTestResponse {
            success: true,
            latency_ms,
        })
    }

    async fn require_config(&self, config_key: &str) -> AppResult<SystemConfig> {
        self.config_repo
            .find_by_key(config_key)
            .await?
            .ok_or_else(|| AppError::NotFound("配置项不存在".to_string()))
    }

    async fn require_ai_model(&self, id: i64) -> AppResult<AiModelConfig> {
        self.ai_model_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("模型配置不存在".to_string()))
    }
}

fn parse_value_type(value: &str) -> AppResult<ConfigValueType> {
    ConfigValueType::parse(value)
        .ok_or_else(|| AppError::BadRequest("配置类型无效".to_string()))
}
