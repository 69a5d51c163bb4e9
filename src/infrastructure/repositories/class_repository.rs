use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::{ClassOccupancy, ClassRepository};
use crate::domain::ClassUnit;
use crate::error::AppResult;

const CLASS_COLUMNS: &str =
    "id, name, grade, capacity, head_teacher_id, description, created_at, updated_at";

pub struct ClassRepositoryImpl {
    pool: PgPool,
}

impl ClassRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassRepository for ClassRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ClassUnit>> {
        let class = sqlx::query_as::<_, ClassUnit>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(class)
    }

    async fn create(&self, class: &ClassUnit) -> AppResult<ClassUnit> {
        let created = sqlx::query_as::<_, ClassUnit>(&format!(
            r#"
            INSERT INTO classes (name, grade, capacity, head_teacher_id, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(&class.name)
        .bind(class.grade)
        .bind(class.capacity)
        .bind(class.head_teacher_id)
        .bind(&class.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, class: &ClassUnit) -> AppResult<ClassUnit> {
        let updated = sqlx::query_as::<_, ClassUnit>(&format!(
            r#"
            UPDATE classes
            SET name = $2, grade = $3, capacity = $4, head_teacher_id = $5, description = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(class.id)
        .bind(&class.name)
        .bind(class.grade)
        .bind(class.capacity)
        .bind(class.head_teacher_id)
        .bind(&class.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<ClassUnit>> {
        let classes = sqlx::query_as::<_, ClassUnit>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes ORDER BY grade, name LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(classes)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn occupancy(&self) -> AppResult<Vec<ClassOccupancy>> {
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
}
