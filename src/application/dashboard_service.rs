use std::sync::Arc;

use crate::api::dtos::{
    ActivityAttendanceResponse, ActivityResponse, CampaignPerformanceResponse,
    ClassOccupancyResponse, DashboardResponse, EnrollmentTrendResponse, MonthBucket,
    OverviewResponse,
};
use crate::error::AppResult;
use crate::infrastructure::repositories::{
    ActivityRepository, ActivitySearchParams, StatsRepository,
};

const RECENT_ACTIVITY_LIMIT: i64 = 5;
const TREND_MONTHS: i64 = 6;
const PARTICIPATION_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    stats_repo: Arc<dyn StatsRepository>,
    activity_repo: Arc<dyn ActivityRepository>,
}

impl DashboardService {
    pub fn new(
        stats_repo: Arc<dyn StatsRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            stats_repo,
            activity_repo,
        }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardResponse> {
        let counts = self.stats_repo.dashboard_counts().await?;
        let recent = self
            .activity_repo
            .list(&ActivitySearchParams::default(), RECENT_ACTIVITY_LIMIT, 0)
            .await?;
        let recent_activities = recent.iter().map(ActivityResponse::from).collect();
        Ok(DashboardResponse::from_parts(&counts, recent_activities))
    }

    pub async fn enrollment_trend(&self) -> AppResult<EnrollmentTrendResponse> {
        let months = self
            .stats_repo
            .enrollment_trend(TREND_MONTHS)
            .await?
            .iter()
            .map(MonthBucket::from)
            .collect();
        Ok(EnrollmentTrendResponse { months })
    }

    pub async fn class_occupancy(&self) -> AppResult<Vec<ClassOccupancyResponse>> {
        let rows = self.stats_repo.class_occupancy().await?;
        Ok(rows.iter().map(ClassOccupancyResponse::from).collect())
    }

    pub async fn activity_attendance(&self) -> AppResult<Vec<ActivityAttendanceResponse>> {
        let rows = self
            .stats_repo
            .activity_participation(PARTICIPATION_LIMIT)
            .await?;
        Ok(rows.iter().map(ActivityAttendanceResponse::from).collect())
    }

    pub async fn campaign_performance(&self) -> AppResult<Vec<CampaignPerformanceResponse>> {
        let rows = self.stats_repo.campaign_funnel().await?;
        Ok(rows.iter().map(CampaignPerformanceResponse::from).collect())
    }

    pub async fn overview(&self) -> AppResult<OverviewResponse> {
        let counts = self.stats_repo.dashboard_counts().await?;
        let enrollment_trend = self
            .stats_repo
            .enrollment_trend(TREND_MONTHS)
            .await?
            .iter()
            .map(MonthBucket::from)
            .collect();
        let class_occupancy = self
            .stats_repo
            .class_occupancy()
            .await?
            .iter()
            .map(ClassOccupancyResponse::from)
            .collect();

        Ok(OverviewResponse {
            student_count: counts.student_count,
            class_count: counts.class_count,
            teacher_count: counts.teacher_count,
            activity_count: counts.activity_count,
            pending_application_count: counts.pending_application_count,
            enrollment_trend,
            class_occupancy,
        })
    }
}
