use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::{
    ActivityRepository, ActivitySearchParams, CheckInRepository, EvaluationRepository,
    EvaluationSummary, RegistrationRepository,
};
use super::utils::escape_like_pattern;
use crate::domain::{
    Activity, ActivityCheckIn, ActivityEvaluation, ActivityRegistration, EvaluatorType,
    RegistrationStatus,
};
use crate::error::AppResult;

const ACTIVITY_COLUMNS: &str = "id, title, activity_type, location, start_time, end_time, capacity, fee, description, status, created_by, created_at, updated_at";

pub struct ActivityRepositoryImpl {
    pool: PgPool,
}

impl ActivityRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_activity_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &ActivitySearchParams) {
    if let Some(ref search) = params.search {
        let pattern = format!("%{}%", escape_like_pattern(search));
        builder.push(" AND title ILIKE ");
        builder.push_bind(pattern);
    }
    if let Some(status) = params.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    if let Some(starts_after) = params.starts_after {
        builder.push(" AND start_time >= ");
        builder.push_bind(starts_after);
    }
    if let Some(ends_before) = params.ends_before {
        builder.push(" AND end_time <= ");
        builder.push_bind(ends_before);
    }
}

#[async_trait]
impl ActivityRepository for ActivityRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Activity>> {
        let activity = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(activity)
    }

    async fn create(&self, activity: &Activity) -> AppResult<Activity> {
        let created = sqlx::query_as::<_, Activity>(&format!(
            r#"
            INSERT INTO activities (title, activity_type, location, start_time, end_time, capacity, fee, description, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ACTIVITY_COLUMNS}
            "#
        ))
        .bind(&activity.title)
        .bind(&activity.activity_type)
        .bind(&activity.location)
        .bind(activity.start_time)
        .bind(activity.end_time)
        .bind(activity.capacity)
        .bind(activity.fee)
        .bind(&activity.description)
        .bind(activity.status)
        .bind(activity.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, activity: &Activity) -> AppResult<Activity> {
        let updated = sqlx::query_as::<_, Activity>(&format!(
            r#"
            UPDATE activities
            SET title = $2, activity_type = $3, location = $4, start_time = $5, end_time = $6,
                capacity = $7, fee = $8, description = $9, status = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACTIVITY_COLUMNS}
            "#
        ))
        .bind(activity.id)
        .bind(&activity.title)
        .bind(&activity.activity_type)
        .bind(&activity.location)
        .bind(activity.start_time)
        .bind(activity.end_time)
        .bind(activity.capacity)
        .bind(activity.fee)
        .bind(&activity.description)
        .bind(activity.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        params: &ActivitySearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Activity>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE 1=1"
        ));
        push_activity_filters(&mut builder, params);
        builder.push(" ORDER BY start_time DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let activities = builder
            .build_query_as::<Activity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }

    async fn count(&self, params: &ActivitySearchParams) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM activities WHERE 1=1");
        push_activity_filters(&mut builder, params);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

const REGISTRATION_COLUMNS: &str =
    "id, activity_id, student_id, contact_phone, status, created_by, created_at, updated_at";

pub struct RegistrationRepositoryImpl {
    pool: PgPool,
}

impl RegistrationRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for RegistrationRepositoryImpl {
    async fn create(&self, registration: &ActivityRegistration) -> AppResult<ActivityRegistration> {
        let created = sqlx::query_as::<_, ActivityRegistration>(&format!(
            r#"
            INSERT INTO activity_registrations (activity_id, student_id, contact_phone, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(registration.activity_id)
        .bind(registration.student_id)
        .bind(&registration.contact_phone)
        .bind(registration.status)
        .bind(registration.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ActivityRegistration>> {
        let registration = sqlx::query_as::<_, ActivityRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM activity_registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    async fn find_by_activity_and_student(
        &self,
        activity_id: i64,
        student_id: i64,
    ) -> AppResult<Option<ActivityRegistration>> {
        let registration = sqlx::query_as::<_, ActivityRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM activity_registrations WHERE activity_id = $1 AND student_id = $2"
        ))
        .bind(activity_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    async fn list_by_activity(&self, activity_id: i64) -> AppResult<Vec<ActivityRegistration>> {
        let registrations = sqlx::query_as::<_, ActivityRegistration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM activity_registrations WHERE activity_id = $1 ORDER BY created_at"
        ))
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }

    async fn update_status(&self, id: i64, status: RegistrationStatus) -> AppResult<()> {
        sqlx::query(
            "UPDATE activity_registrations SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_active(&self, activity_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_registrations WHERE activity_id = $1 AND status IN ('pending', 'confirmed', 'attended')",
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

const CHECKIN_COLUMNS: &str =
    "id, activity_id, student_id, check_in_time, method, operator_id, created_at";

pub struct CheckInRepositoryImpl {
    pool: PgPool,
}

impl CheckInRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository for CheckInRepositoryImpl {
    async fn create(&self, checkin: &ActivityCheckIn) -> AppResult<ActivityCheckIn> {
        let created = sqlx::query_as::<_, ActivityCheckIn>(&format!(
            r#"
            INSERT INTO activity_checkins (activity_id, student_id, check_in_time, method, operator_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CHECKIN_COLUMNS}
            "#
        ))
        .bind(checkin.activity_id)
        .bind(checkin.student_id)
        .bind(checkin.check_in_time)
        .bind(checkin.method)
        .bind(checkin.operator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn exists(&self, activity_id: i64, student_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM activity_checkins WHERE activity_id = $1 AND student_id = $2)",
        )
        .bind(activity_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_by_activity(&self, activity_id: i64) -> AppResult<Vec<ActivityCheckIn>> {
        let checkins = sqlx::query_as::<_, ActivityCheckIn>(&format!(
            "SELECT {CHECKIN_COLUMNS} FROM activity_checkins WHERE activity_id = $1 ORDER BY check_in_time"
        ))
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(checkins)
    }

    async fn count_by_activity(&self, activity_id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM activity_checkins WHERE activity_id = $1")
                .bind(activity_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

const EVALUATION_COLUMNS: &str = "id, activity_id, evaluator_type, evaluator_name, overall_rating, content_rating, organization_rating, environment_rating, service_rating, comments, reply, created_by, created_at, updated_at";

pub struct EvaluationRepositoryImpl {
    pool: PgPool,
}

impl EvaluationRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationRepository for EvaluationRepositoryImpl {
    async fn create(&self, evaluation: &ActivityEvaluation) -> AppResult<ActivityEvaluation> {
        let created = sqlx::query_as::<_, ActivityEvaluation>(&format!(
            r#"
            INSERT INTO activity_evaluations (activity_id, evaluator_type, evaluator_name, overall_rating, content_rating, organization_rating, environment_rating, service_rating, comments, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {EVALUATION_COLUMNS}
            "#
        ))
        .bind(evaluation.activity_id)
        .bind(evaluation.evaluator_type)
        .bind(&evaluation.evaluator_name)
        .bind(evaluation.overall_rating)
        .bind(evaluation.content_rating)
        .bind(evaluation.organization_rating)
        .bind(evaluation.environment_rating)
        .bind(evaluation.service_rating)
        .bind(&evaluation.comments)
        .bind(evaluation.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ActivityEvaluation>> {
        let evaluation = sqlx::query_as::<_, ActivityEvaluation>(&format!(
            "SELECT {EVALUATION_COLUMNS} FROM activity_evaluations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(evaluation)
    }

    async fn update(&self, evaluation: &ActivityEvaluation) -> AppResult<ActivityEvaluation> {
        let updated = sqlx::query_as::<_, ActivityEvaluation>(&format!(
            r#"
            UPDATE activity_evaluations
            SET overall_rating = $2, content_rating = $3, organization_rating = $4,
                environment_rating = $5, service_rating = $6, comments = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {EVALUATION_COLUMNS}
            "#
        ))
        .bind(evaluation.id)
        .bind(evaluation.overall_rating)
        .bind(evaluation.content_rating)
        .bind(evaluation.organization_rating)
        .bind(evaluation.environment_rating)
        .bind(evaluation.service_rating)
        .bind(&evaluation.comments)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM activity_evaluations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_by_activity(
        &self,
        activity_id: i64,
        evaluator_type: Option<EvaluatorType>,
    ) -> AppResult<Vec<ActivityEvaluation>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {EVALUATION_COLUMNS} FROM activity_evaluations WHERE activity_id = "
        ));
        builder.push_bind(activity_id);
        if let Some(evaluator_type) = evaluator_type {
            builder.push(" AND evaluator_type = ");
            builder.push_bind(evaluator_type);
        }
        builder.push(" ORDER BY created_at DESC");

        let evaluations = builder
            .build_query_as::<ActivityEvaluation>()
            .fetch_all(&self.pool)
            .await?;
        Ok(evaluations)
    }

    async fn update_reply(&self, id: i64, reply: &str) -> AppResult<ActivityEvaluation> {
        let updated = sqlx::query_as::<_, ActivityEvaluation>(&format!(
            r#"
            UPDATE activity_evaluations
            SET reply = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {EVALUATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reply)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn summary(&self, activity_id: i64) -> AppResult<EvaluationSummary> {
        let summary = sqlx::query_as::<_, EvaluationSummary>(
            r#"
            SELECT COUNT(*) AS evaluation_count,
                   AVG(overall_rating)::numeric(3,2) AS average_overall,
                   AVG(content_rating)::numeric(3,2) AS average_content,
                   AVG(organization_rating)::numeric(3,2) AS average_organization,
                   AVG(environment_rating)::numeric(3,2) AS average_environment,
                   AVG(service_rating)::numeric(3,2) AS average_service
            FROM activity_evaluations
            WHERE activity_id = $1
            "#,
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    async fn rating_distribution(&self, activity_id: i64) -> AppResult<Vec<(i32, i64)>> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT overall_rating, COUNT(*)
            FROM activity_evaluations
            WHERE activity_id = $1
            GROUP BY overall_rating
            ORDER BY overall_rating
            "#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
