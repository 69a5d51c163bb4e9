use std::sync::Arc;

use chrono::Utc;

use crate::api::dtos::{ClassListQuery, ClassResponse, CreateClassRequest, Paged, UpdateClassRequest};
use crate::domain::{ClassUnit, Grade, MAX_CLASS_CAPACITY, MAX_CLASS_NAME_CHARS};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{ClassRepository, StudentRepository};

#[derive(Clone)]
pub struct ClassService {
    class_repo: Arc<dyn ClassRepository>,
    student_repo: Arc<dyn StudentRepository>,
}

impl ClassService {
    pub fn new(class_repo: Arc<dyn ClassRepository>, student_repo: Arc<dyn StudentRepository>) -> Self {
        Self {
            class_repo,
            student_repo,
        }
    }

    pub async fn create(&self, request: CreateClassRequest) -> AppResult<ClassResponse> {
        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("班级名称不能为空".to_string()))?;
        validate_name(&name)?;

        let grade = parse_grade(
            request
                .grade
                .as_deref()
                .ok_or_else(|| AppError::MissingFields("年级不能为空".to_string()))?,
        )?;
        let capacity = request.capacity.unwrap_or(30);
        validate_capacity(capacity)?;

        let now = Utc::now();
        let class = ClassUnit {
            id: 0,
            name,
            grade,
            capacity,
            head_teacher_id: request.head_teacher_id,
            description: request.description,
            created_at: now,
            updated_at: now,
        };

        let created = self.class_repo.create(&class).await?;
        Ok(ClassResponse::from_domain(&created, 0))
    }

    pub async fn get(&self, id: i64) -> AppResult<ClassResponse> {
        let class = self
            .class_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("班级不存在".to_string()))?;
        let student_count = self.student_repo.count_in_class(id).await?;
        Ok(ClassResponse::from_domain(&class, student_count))
    }

    pub async fn list(&self, query: &ClassListQuery) -> AppResult<Paged<ClassResponse>> {
        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let classes = self.class_repo.list(limit, offset).await?;
        let total = self.class_repo.count().await?;

        let mut items = Vec::with_capacity(classes.len());
        for class in &classes {
            let student_count = self.student_repo.count_in_class(class.id).await?;
            items.push(ClassResponse::from_domain(class, student_count));
        }
        Ok(Paged::new(items, total, &pagination))
    }

    pub async fn update(&self, id: i64, request: UpdateClassRequest) -> AppResult<ClassResponse> {
        let mut class = self
            .class_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("班级不存在".to_string()))?;

        if let Some(name) = request.name {
            validate_name(&name)?;
            class.name = name;
        }
        if let Some(ref grade) = request.grade {
            class.grade = parse_grade(grade)?;
        }
        if let Some(capacity) = request.capacity {
            validate_capacity(capacity)?;
            class.capacity = capacity;
        }
        if let Some(head_teacher_id) = request.head_teacher_id {
            class.head_teacher_id = Some(head_teacher_id);
        }
        if let Some(description) = request.description {
            class.description = Some(description);
        }

        let updated = self.class_repo.update(&class).await?;
        let student_count = self.student_repo.count_in_class(id).await?;
        Ok(ClassResponse::from_domain(&updated, student_count))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.class_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("班级不存在".to_string()));
        }
        if self.student_repo.count_in_class(id).await? > 0 {
            return Err(AppError::BadRequest(
                "班级内仍有学生，无法删除".to_string(),
            ));
        }
        self.class_repo.delete(id).await?;
        Ok(())
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("班级名称不能为空".to_string()));
    }
    if name.chars().count() > MAX_CLASS_NAME_CHARS {
        return Err(AppError::BadRequest(
            "班级名称不能超过50个字符".to_string(),
        ));
    }
    Ok(())
}

fn validate_capacity(capacity: i32) -> AppResult<()> {
    if !(1..=MAX_CLASS_CAPACITY).contains(&capacity) {
        return Err(AppError::InvalidCapacity(
            "班级容量必须在1-50之间".to_string(),
        ));
    }
    Ok(())
}

fn parse_grade(value: &str) -> AppResult<Grade> {
    Grade::parse(value)
        .ok_or_else(|| AppError::BadRequest("年级必须是junior、middle或senior".to_string()))
}
