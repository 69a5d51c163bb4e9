use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{default_page, default_page_size, enum_str, PaginationParams};
use crate::domain::ClassUnit;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub capacity: Option<i32>,
    pub head_teacher_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub capacity: Option<i32>,
    pub head_teacher_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl ClassListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: i64,
    pub name: String,
    pub grade: String,
    pub capacity: i32,
    pub head_teacher_id: Option<i64>,
    pub description: Option<String>,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassResponse {
    pub fn from_domain(class: &ClassUnit, student_count: i64) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            grade: enum_str(&class.grade),
            capacity: class.capacity,
            head_teacher_id: class.head_teacher_id,
            description: class.description.clone(),
            student_count,
            created_at: class.created_at,
            updated_at: class.updated_at,
        }
    }
}
