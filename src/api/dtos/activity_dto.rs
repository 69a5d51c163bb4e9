use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{default_page, default_page_size, enum_str, PaginationParams};
use crate::domain::{Activity, ActivityCheckIn, ActivityEvaluation, ActivityRegistration};
use crate::infrastructure::repositories::EvaluationSummary;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    pub title: Option<String>,
    pub activity_type: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub fee: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    pub title: Option<String>,
    pub activity_type: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub fee: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ActivityListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: i64,
    pub title: String,
    pub activity_type: String,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    pub fee: Decimal,
    pub description: Option<String>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Activity> for ActivityResponse {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            title: activity.title.clone(),
            activity_type: activity.activity_type.clone(),
            location: activity.location.clone(),
            start_time: activity.start_time,
            end_time: activity.end_time,
            capacity: activity.capacity,
            fee: activity.fee,
            description: activity.description.clone(),
            status: enum_str(&activity.status),
            created_by: activity.created_by,
            created_at: activity.created_at,
            updated_at: activity.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationRequest {
    pub student_id: Option<i64>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRegistrationRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: i64,
    pub activity_id: i64,
    pub student_id: i64,
    pub contact_phone: Option<String>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&ActivityRegistration> for RegistrationResponse {
    fn from(registration: &ActivityRegistration) -> Self {
        Self {
            id: registration.id,
            activity_id: registration.activity_id,
            student_id: registration.student_id,
            contact_phone: registration.contact_phone.clone(),
            status: enum_str(&registration.status),
            created_by: registration.created_by,
            created_at: registration.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatsResponse {
    pub activity_id: i64,
    pub capacity: i32,
    pub registered: i64,
    pub checked_in: i64,
    pub remaining: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCheckInRequest {
    pub student_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInDetail {
    pub student_id: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCheckInResponse {
    pub success_count: i64,
    pub failure_count: i64,
    pub details: Vec<CheckInDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub id: i64,
    pub activity_id: i64,
    pub student_id: i64,
    pub check_in_time: DateTime<Utc>,
    pub method: String,
    pub operator_id: i64,
}

impl From<&ActivityCheckIn> for CheckInResponse {
    fn from(checkin: &ActivityCheckIn) -> Self {
        Self {
            id: checkin.id,
            activity_id: checkin.activity_id,
            student_id: checkin.student_id,
            check_in_time: checkin.check_in_time,
            method: enum_str(&checkin.method),
            operator_id: checkin.operator_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvaluationRequest {
    pub activity_id: Option<i64>,
    pub evaluator_type: Option<String>,
    pub evaluator_name: Option<String>,
    pub overall_rating: Option<i32>,
    pub content_rating: Option<i32>,
    pub organization_rating: Option<i32>,
    pub environment_rating: Option<i32>,
    pub service_rating: Option<i32>,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvaluationRequest {
    pub overall_rating: Option<i32>,
    pub content_rating: Option<i32>,
    pub organization_rating: Option<i32>,
    pub environment_rating: Option<i32>,
    pub service_rating: Option<i32>,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEvaluationRequest {
    pub reply: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationListQuery {
    pub evaluator_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub id: i64,
    pub activity_id: i64,
    pub evaluator_type: String,
    pub evaluator_name: String,
    pub overall_rating: i32,
    pub content_rating: Option<i32>,
    pub organization_rating: Option<i32>,
    pub environment_rating: Option<i32>,
    pub service_rating: Option<i32>,
    pub comments: Option<String>,
    pub reply: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&ActivityEvaluation> for EvaluationResponse {
    fn from(evaluation: &ActivityEvaluation) -> Self {
        Self {
            id: evaluation.id,
            activity_id: evaluation.activity_id,
            evaluator_type: enum_str(&evaluation.evaluator_type),
            evaluator_name: evaluation.evaluator_name.clone(),
            overall_rating: evaluation.overall_rating,
            content_rating: evaluation.content_rating,
            organization_rating: evaluation.organization_rating,
            environment_rating: evaluation.environment_rating,
            service_rating: evaluation.service_rating,
            comments: evaluation.comments.clone(),
            reply: evaluation.reply.clone(),
            created_by: evaluation.created_by,
            created_at: evaluation.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationStatsResponse {
    pub evaluation_count: i64,
    pub average_overall: Option<Decimal>,
    pub average_content: Option<Decimal>,
    pub average_organization: Option<Decimal>,
    pub average_environment: Option<Decimal>,
    pub average_service: Option<Decimal>,
    pub rating_distribution: Vec<RatingBucket>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
}

impl EvaluationStatsResponse {
    pub fn from_parts(summary: &EvaluationSummary, distribution: &[(i32, i64)]) -> Self {
        Self {
            evaluation_count: summary.evaluation_count,
            average_overall: summary.average_overall,
            average_content: summary.average_content,
            average_organization: summary.average_organization,
            average_environment: summary.average_environment,
            average_service: summary.average_service,
            rating_distribution: distribution
                .iter()
                .map(|&(rating, count)| RatingBucket { rating, count })
                .collect(),
        }
    }
}
