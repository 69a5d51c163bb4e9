use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "class_grade", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Junior,
    Middle,
    Senior,
}

impl Grade {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "junior" => Some(Grade::Junior),
            "middle" => Some(Grade::Middle),
            "senior" => Some(Grade::Senior),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClassUnit {
    pub id: i64,
    pub name: String,
    pub grade: Grade,
    pub capacity: i32,
    pub head_teacher_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const MAX_CLASS_CAPACITY: i32 = 50;
pub const MAX_CLASS_NAME_CHARS: usize = 50;
