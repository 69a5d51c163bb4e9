use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::{ApplicationSearchParams, EnrollmentRepository, MonthlyCount};
use super::utils::escape_like_pattern;
use crate::domain::{ApplicationStatus, EnrollmentApplication};
use crate::error::AppResult;

const APPLICATION_COLUMNS: &str = "id, student_name, gender, birth_date, parent_name, parent_phone, parent_email, address, preferred_class_id, status, review_comment, reviewed_by, reviewed_at, student_id, reminder_sent_at, created_at, updated_at";

pub struct EnrollmentRepositoryImpl {
    pool: PgPool,
}

impl EnrollmentRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_application_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    params: &ApplicationSearchParams,
) {
    if let Some(ref search) = params.search {
        let pattern = format!("%{}%", escape_like_pattern(search));
        builder.push(" AND (student_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR parent_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR parent_phone LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(status) = params.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<EnrollmentApplication>> {
        let application = sqlx::query_as::<_, EnrollmentApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM enrollment_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    async fn create(
        &self,
        application: &EnrollmentApplication,
    ) -> AppResult<EnrollmentApplication> {
        let created = sqlx::query_as::<_, EnrollmentApplication>(&format!(
            r#"
            INSERT INTO enrollment_applications (student_name, gender, birth_date, parent_name, parent_phone, parent_email, address, preferred_class_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(&application.student_name)
        .bind(application.gender)
        .bind(application.birth_date)
        .bind(&application.parent_name)
        .bind(&application.parent_phone)
        .bind(&application.parent_email)
        .bind(&application.address)
        .bind(application.preferred_class_id)
        .bind(application.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(
        &self,
        application: &EnrollmentApplication,
    ) -> AppResult<EnrollmentApplication> {
        let updated = sqlx::query_as::<_, EnrollmentApplication>(&format!(
            r#"
            UPDATE enrollment_applications
            SET status = $2, review_comment = $3, reviewed_by = $4, reviewed_at = $5,
                student_id = $6, reminder_sent_at = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application.id)
        .bind(application.status)
        .bind(&application.review_comment)
        .bind(application.reviewed_by)
        .bind(application.reviewed_at)
        .bind(application.student_id)
        .bind(application.reminder_sent_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn list(
        &self,
        params: &ApplicationSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<EnrollmentApplication>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {APPLICATION_COLUMNS} FROM enrollment_applications WHERE 1=1"
        ));
        push_application_filters(&mut builder, params);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let applications = builder
            .build_query_as::<EnrollmentApplication>()
            .fetch_all(&self.pool)
            .await?;
        Ok(applications)
    }

    async fn count(&self, params: &ApplicationSearchParams) -> AppResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM enrollment_applications WHERE 1=1",
        );
        push_application_filters(&mut builder, params);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: ApplicationStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollment_applications WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn monthly_totals(&self, months: i64) -> AppResult<Vec<MonthlyCount>> {
        let rows = sqlx::query_as::<_, MonthlyCount>(
            r#"
            SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month,
                   COUNT(*) AS count
            FROM enrollment_applications
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
}
