use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{default_page, default_page_size, enum_str, PaginationParams};
use crate::domain::Student;

/// Presence and format checks happen in the service so each failure carries
/// its contractual Chinese message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub class_id: Option<i64>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub class_id: Option<i64>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub search: Option<String>,
    pub class_id: Option<i64>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub status: Option<String>,
}

impl StudentListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: i64,
    pub name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub age: i32,
    pub class_id: Option<i64>,
    pub parent_name: String,
    pub parent_phone: String,
    pub parent_email: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentResponse {
    pub fn from_domain(student: &Student, today: NaiveDate) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            gender: enum_str(&student.gender),
            birth_date: student.birth_date,
            age: student.age_on(today),
            class_id: student.class_id,
            parent_name: student.parent_name.clone(),
            parent_phone: student.parent_phone.clone(),
            parent_email: student.parent_email.clone(),
            address: student.address.clone(),
            status: enum_str(&student.status),
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

impl From<&Student> for StudentResponse {
    fn from(student: &Student) -> Self {
        Self::from_domain(student, Utc::now().date_naive())
    }
}
