use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::{StudentRepository, StudentSearchParams};
use super::utils::escape_like_pattern;
use crate::domain::Student;
use crate::error::AppResult;

const STUDENT_COLUMNS: &str = "id, name, gender, birth_date, class_id, parent_name, parent_phone, parent_email, address, status, created_at, updated_at";

pub struct StudentRepositoryImpl {
    pool: PgPool,
}

impl StudentRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_student_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &StudentSearchParams) {
    if let Some(ref search) = params.search {
        let pattern = format!("%{}%", escape_like_pattern(search));
        builder.push(" AND (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR parent_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR parent_phone LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(class_id) = params.class_id {
        builder.push(" AND class_id = ");
        builder.push_bind(class_id);
    }
    if let Some(date) = params.born_on_or_before {
        builder.push(" AND birth_date <= ");
        builder.push_bind(date);
    }
    if let Some(date) = params.born_after {
        builder.push(" AND birth_date > ");
        builder.push_bind(date);
    }
    if let Some(status) = params.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}

#[async_trait]
impl StudentRepository for StudentRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn create(&self, student: &Student) -> AppResult<Student> {
        let created = sqlx::query_as::<_, Student>(&format!(
            r#"
            INSERT INTO students (name, gender, birth_date, class_id, parent_name, parent_phone, parent_email, address, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(&student.name)
        .bind(student.gender)
        .bind(student.birth_date)
        .bind(student.class_id)
        .bind(&student.parent_name)
        .bind(&student.parent_phone)
        .bind(&student.parent_email)
        .bind(&student.address)
        .bind(student.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, student: &Student) -> AppResult<Student> {
        let updated = sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students
            SET name = $2, gender = $3, birth_date = $4, class_id = $5, parent_name = $6,
                parent_phone = $7, parent_email = $8, address = $9, status = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(student.id)
        .bind(&student.name)
        .bind(student.gender)
        .bind(student.birth_date)
        .bind(student.class_id)
        .bind(&student.parent_name)
        .bind(&student.parent_phone)
        .bind(&student.parent_email)
        .bind(&student.address)
        .bind(student.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(
        &self,
        params: &StudentSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Student>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE 1=1"
        ));
        push_student_filters(&mut builder, params);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let students = builder
            .build_query_as::<Student>()
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    async fn count(&self, params: &StudentSearchParams) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students WHERE 1=1");
        push_student_filters(&mut builder, params);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn count_in_class(&self, class_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM students WHERE class_id = $1 AND status = 'active'",
        )
        .bind(class_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
