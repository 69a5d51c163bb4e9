use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::{
    ActivityParticipation, CampaignFunnel, ClassOccupancy, DashboardCounts, MonthlyCount,
    StatsRepository,
};
use crate::error::AppResult;

pub struct StatsRepositoryImpl {
    pool: PgPool,
}

impl StatsRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for StatsRepositoryImpl {
    async fn dashboard_counts(&self) -> AppResult<DashboardCounts> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students WHERE status = 'active') AS student_count,
                (SELECT COUNT(*) FROM classes) AS class_count,
                (SELECT COUNT(*) FROM users WHERE role = 'teacher' AND status = 'active') AS teacher_count,
                (SELECT COUNT(*) FROM activities WHERE status IN ('published', 'ongoing')) AS activity_count,
                (SELECT COUNT(*) FROM enrollment_applications WHERE status = 'pending') AS pending_application_count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn enrollment_trend(&self, months: i64) -> AppResult<Vec<MonthlyCount>> {
        let rows = sqlx::query_as::<_, MonthlyCount>(
            r#"
            SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month,
                   COUNT(*) AS count
            FROM students
            WHERE created_at >= date_trunc('month', NOW()) - make_interval(months => $1::int)
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(months)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn class_occupancy(&self) -> AppResult<Vec<ClassOccupancy>> {
        let rows = sqlx::query_as::<_, ClassOccupancy>(
            r#"
            SELECT c.id AS class_id, c.name, c.capacity,
                   COUNT(s.id) FILTER (WHERE s.status = 'active') AS student_count
            FROM classes c
            LEFT JOIN students s ON s.class_id = c.id
            GROUP BY c.id, c.name, c.capacity
            ORDER BY c.grade, c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn activity_participation(&self, limit: i64) -> AppResult<Vec<ActivityParticipation>> {
        let rows = sqlx::query_as::<_, ActivityParticipation>(
            r#"
            SELECT a.id AS activity_id, a.title, a.capacity,
                   (SELECT COUNT(*) FROM activity_registrations r
                    WHERE r.activity_id = a.id
                      AND r.status IN ('pending', 'confirmed', 'attended')) AS registration_count,
                   (SELECT COUNT(*) FROM activity_checkins c
                    WHERE c.activity_id = a.id) AS checkin_count,
                   (SELECT AVG(e.overall_rating)::numeric(3,2) FROM activity_evaluations e
                    WHERE e.activity_id = a.id) AS average_rating
            FROM activities a
            WHERE a.status <> 'draft'
            ORDER BY a.start_time DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn campaign_funnel(&self) -> AppResult<Vec<CampaignFunnel>> {
        let rows = sqlx::query_as::<_, CampaignFunnel>(
            r#"
            SELECT c.id AS campaign_id, c.name, c.budget, c.spent,
                   COUNT(l.id) AS lead_count,
                   COUNT(l.id) FILTER (WHERE l.status = 'converted') AS converted_count
            FROM marketing_campaigns c
            LEFT JOIN marketing_leads l ON l.campaign_id = c.id
            GROUP BY c.id, c.name, c.budget, c.spent
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
