use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::enum_str;
use crate::domain::{AiModelConfig, SystemConfig};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigRequest {
    pub config_key: Option<String>,
    pub config_value: Option<String>,
    pub value_type: Option<String>,
    pub config_group: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub config_value: Option<String>,
    pub value_type: Option<String>,
    pub config_group: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigListQuery {
    pub group: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub id: i64,
    pub config_key: String,
    pub config_value: String,
    pub value_type: String,
    pub config_group: String,
    pub description: Option<String>,
    pub updated_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SystemConfig> for ConfigResponse {
    fn from(config: &SystemConfig) -> Self {
        Self {
            id: config.id,
            config_key: config.config_key.clone(),
            config_value: config.config_value.clone(),
            value_type: enum_str(&config.value_type),
            config_group: config.config_group.clone(),
            description: config.description.clone(),
            updated_by: config.updated_by,
            updated_at: config.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAiModelRequest {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub model_name: Option<String>,
    pub api_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub max_tokens: Option<i32>,
    pub temperature: Option<Decimal>,
    pub is_default: Option<bool>,
    pub status: Option<String>,
}

/// The API key is always masked on the way out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModelResponse {
    pub id: i64,
    pub name: String,
    pub provider: String,
    pub model_name: String,
    pub api_key: String,
    pub endpoint_url: Option<String>,
    pub max_tokens: i32,
    pub temperature: Decimal,
    pub is_default: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&AiModelConfig> for AiModelResponse {
    fn from(config: &AiModelConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            provider: config.provider.clone(),
            model_name: config.model_name.clone(),
            api_key: config.masked_api_key(),
            endpoint_url: config.endpoint_url.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            is_default: config.is_default,
            status: enum_str(&config.status),
            created_at: config.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModelGroup {
    pub provider: String,
    pub models: Vec<AiModelResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModelTestResponse {
    pub success: bool,
    pub latency_ms: u64,
}
