use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::api::dtos::{
    CreateStudentRequest, Paged, StudentListQuery, StudentResponse, UpdateStudentRequest,
};
use crate::domain::{is_valid_cn_mobile, Gender, Student, StudentStatus};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{
    ClassRepository, StudentRepository, StudentSearchParams,
};

#[derive(Clone)]
pub struct StudentService {
    student_repo: Arc<dyn StudentRepository>,
    class_repo: Arc<dyn ClassRepository>,
}

impl StudentService {
    pub fn new(student_repo: Arc<dyn StudentRepository>, class_repo: Arc<dyn ClassRepository>) -> Self {
        Self {
            student_repo,
            class_repo,
        }
    }

    pub async fn create(&self, request: CreateStudentRequest) -> AppResult<StudentResponse> {
        let name = required_text(request.name, "姓名不能为空")?;
        let gender = parse_gender(required_text(request.gender, "性别不能为空")?.as_str())?;
        let birth_date =
            parse_birth_date(&required_text(request.birth_date, "出生日期不能为空")?)?;
        let parent_name = required_text(request.parent_name, "家长姓名不能为空")?;
        let parent_phone = required_text(request.parent_phone, "家长电话不能为空")?;
        if !is_valid_cn_mobile(&parent_phone) {
            return Err(AppError::BadRequest("家长手机号格式无效".to_string()));
        }

        if let Some(class_id) = request.class_id {
            self.ensure_class_exists(class_id).await?;
        }

        let now = Utc::now();
        let student = Student {
            id: 0,
            name,
            gender,
            birth_date,
            class_id: request.class_id,
            parent_name,
            parent_phone,
            parent_email: request.parent_email,
            address: request.address,
            status: StudentStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let created = self.student_repo.create(&student).await?;
        Ok(StudentResponse::from(&created))
    }

    pub async fn get(&self, id: i64) -> AppResult<StudentResponse> {
        let student = self
            .student_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("学生不存在".to_string()))?;
        Ok(StudentResponse::from(&student))
    }

    pub async fn list(&self, query: &StudentListQuery) -> AppResult<Paged<StudentResponse>> {
        if query.min_age.is_some_and(|age| age < 0) || query.max_age.is_some_and(|age| age < 0) {
            return Err(AppError::BadRequest("年龄无效".to_string()));
        }

        let today = Utc::now().date_naive();
        let params = StudentSearchParams {
            search: query.search.clone().filter(|s| !s.is_empty()),
            class_id: query.class_id,
            // A child of age N was born at most N years ago, and more than
            // N+1 years ago means the child is older than N.
            born_on_or_before: query.min_age.map(|age| years_before(today, age)),
            born_after: query.max_age.map(|age| years_before(today, age + 1)),
            status: match query.status.as_deref() {
                Some("active") => Some(StudentStatus::Active),
                Some("graduated") => Some(StudentStatus::Graduated),
                Some("transferred") => Some(StudentStatus::Transferred),
                Some(_) => return Err(AppError::BadRequest("状态无效".to_string())),
                None => None,
            },
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let students = self.student_repo.list(&params, limit, offset).await?;
        let total = self.student_repo.count(&params).await?;

        let items = students
            .iter()
            .map(|s| StudentResponse::from_domain(s, today))
            .collect();
        Ok(Paged::new(items, total, &pagination))
    }

    pub async fn update(&self, id: i64, request: UpdateStudentRequest) -> AppResult<StudentResponse> {
        let mut student = self
            .student_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("学生不存在".to_string()))?;

        if let Some(name) = request.name {
            if name.is_empty() {
                return Err(AppError::BadRequest("姓名不能为空".to_string()));
            }
            student.name = name;
        }
        if let Some(ref gender) = request.gender {
            student.gender = parse_gender(gender)?;
        }
        if let Some(ref birth_date) = request.birth_date {
            student.birth_date = parse_birth_date(birth_date)?;
        }
        if let Some(ref parent_phone) = request.parent_phone {
            if !is_valid_cn_mobile(parent_phone) {
                return Err(AppError::BadRequest("家长手机号格式无效".to_string()));
            }
            student.parent_phone = parent_phone.clone();
        }
        if let Some(parent_name) = request.parent_name {
            student.parent_name = parent_name;
        }
        if let Some(parent_email) = request.parent_email {
            student.parent_email = Some(parent_email);
        }
        if let Some(address) = request.address {
            student.address = Some(address);
        }
        if let Some(class_id) = request.class_id {
            self.ensure_class_exists(class_id).await?;
            student.class_id = Some(class_id);
        }
        if let Some(ref status) = request.status {
            student.status = match status.as_str() {
                "active" => StudentStatus::Active,
                "graduated" => StudentStatus::Graduated,
                "transferred" => StudentStatus::Transferred,
                _ => return Err(AppError::BadRequest("状态无效".to_string())),
            };
        }

        let updated = self.student_repo.update(&student).await?;
        Ok(StudentResponse::from(&updated))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.student_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("学生不存在".to_string()));
        }
        self.student_repo.delete(id).await?;
        Ok(())
    }

    async fn ensure_class_exists(&self, class_id: i64) -> AppResult<()> {
        if self.class_repo.find_by_id(class_id).await?.is_none() {
            return Err(AppError::BadRequest("班级不存在".to_string()));
        }
        Ok(())
    }
}

fn years_before(today: NaiveDate, years: i32) -> NaiveDate {
    today - chrono::Months::new(years.max(0) as u32 * 12)
}

fn required_text(value: Option<String>, message: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::MissingFields(message.to_string()))
}

fn parse_gender(value: &str) -> AppResult<Gender> {
    Gender::parse(value).ok_or_else(|| AppError::BadRequest("性别必须是male或female".to_string()))
}

fn parse_birth_date(value: &str) -> AppResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("出生日期格式无效".to_string()))?;
    if date > Utc::now().date_naive() {
        return Err(AppError::BadRequest("出生日期不能是未来时间".to_string()));
    }
    Ok(date)
}
