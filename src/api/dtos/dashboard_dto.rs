use rust_decimal::Decimal;
use serde::Serialize;

use super::activity_dto::ActivityResponse;
use super::enrollment_dto::MonthBucket;
use crate::infrastructure::repositories::{
    ActivityParticipation, CampaignFunnel, ClassOccupancy, DashboardCounts,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub student_count: i64,
    pub class_count: i64,
    pub teacher_count: i64,
    pub activity_count: i64,
    pub pending_application_count: i64,
    pub recent_activities: Vec<ActivityResponse>,
}

impl DashboardResponse {
    pub fn from_parts(counts: &DashboardCounts, recent_activities: Vec<ActivityResponse>) -> Self {
        Self {
            student_count: counts.student_count,
            class_count: counts.class_count,
            teacher_count: counts.teacher_count,
            activity_count: counts.activity_count,
            pending_application_count: counts.pending_application_count,
            recent_activities,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentTrendResponse {
    pub months: Vec<MonthBucket>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOccupancyResponse {
    pub class_id: i64,
    pub name: String,
    pub capacity: i32,
    pub student_count: i64,
    pub occupancy_rate: f64,
}

impl From<&ClassOccupancy> for ClassOccupancyResponse {
    fn from(row: &ClassOccupancy) -> Self {
        let occupancy_rate = if row.capacity > 0 {
            row.student_count as f64 / f64::from(row.capacity)
        } else {
            0.0
        };
        Self {
            class_id: row.class_id,
            name: row.name.clone(),
            capacity: row.capacity,
            student_count: row.student_count,
            occupancy_rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAttendanceResponse {
    pub activity_id: i64,
    pub title: String,
    pub capacity: i32,
    pub registration_count: i64,
    pub checkin_count: i64,
    pub attendance_rate: f64,
    pub average_rating: Option<Decimal>,
}

impl From<&ActivityParticipation> for ActivityAttendanceResponse {
    fn from(row: &ActivityParticipation) -> Self {
        let attendance_rate = if row.registration_count > 0 {
            row.checkin_count as f64 / row.registration_count as f64
        } else {
            0.0
        };
        Self {
            activity_id: row.activity_id,
            title: row.title.clone(),
            capacity: row.capacity,
            registration_count: row.registration_count,
            checkin_count: row.checkin_count,
            attendance_rate,
            average_rating: row.average_rating,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformanceResponse {
    pub campaign_id: i64,
    pub name: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub lead_count: i64,
    pub converted_count: i64,
    pub conversion_rate: f64,
}

impl From<&CampaignFunnel> for CampaignPerformanceResponse {
    fn from(row: &CampaignFunnel) -> Self {
        let conversion_rate = if row.lead_count > 0 {
            row.converted_count as f64 / row.lead_count as f64
        } else {
            0.0
        };
        Self {
            campaign_id: row.campaign_id,
            name: row.name.clone(),
            budget: row.budget,
            spent: row.spent,
            lead_count: row.lead_count,
            converted_count: row.converted_count,
            conversion_rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub student_count: i64,
    pub class_count: i64,
    pub teacher_count: i64,
    pub activity_count: i64,
    pub pending_application_count: i64,
    pub enrollment_trend: Vec<MonthBucket>,
    pub class_occupancy: Vec<ClassOccupancyResponse>,
}
