use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "config_value_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConfigValueType {
    String,
    Number,
    Boolean,
    Json,
}

impl ConfigValueType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "string" => Some(ConfigValueType::String),
            "number" => Some(ConfigValueType::Number),
            "boolean" => Some(ConfigValueType::Boolean),
            "json" => Some(ConfigValueType::Json),
            _ => None,
        }
    }

    /// Whether `value` is a legal literal for this type.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ConfigValueType::String => true,
            ConfigValueType::Number => value.parse::<f64>().is_ok(),
            ConfigValueType::Boolean => matches!(value, "true" | "false"),
            ConfigValueType::Json => serde_json::from_str::<serde_json::Value>(value).is_ok(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SystemConfig {
    pub id: i64,
    pub config_key: String,
    pub config_value: String,
    pub value_type: ConfigValueType,
    pub config_group: String,
    pub description: Option<String>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ai_model_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AiModelStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiModelConfig {
    pub id: i64,
    pub name: String,
    pub provider: String,
    pub model_name: String,
    pub api_key: String,
    pub endpoint_url: Option<String>,
    pub max_tokens: i32,
    pub temperature: Decimal,
    pub is_default: bool,
    pub status: AiModelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AiModelConfig {
    /// API keys never leave the service unmasked.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "***".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("***{tail}")
    }
}
