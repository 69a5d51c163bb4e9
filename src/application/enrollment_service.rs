use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::api::dtos::{
    ApplicationListQuery, ApplicationResponse, ApplicationStatsResponse, CreateApplicationRequest,
    MonthBucket, Paged, ReminderResponse, ReviewApplicationRequest,
};
use crate::domain::{
    is_valid_cn_mobile, ApplicationStatus, EnrollmentApplication, Gender, Student, StudentStatus,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{
    ApplicationSearchParams, ClassRepository, EnrollmentRepository, StudentRepository,
    SystemConfigRepository,
};

/// Toggles read from the system configuration table on every application.
const CONFIG_ENROLLMENT_OPEN: &str = "enrollment.open";
const CONFIG_ENROLLMENT_QUOTA: &str = "enrollment.quota";

const TREND_MONTHS: i64 = 6;

#[derive(Clone)]
pub struct EnrollmentService {
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    student_repo: Arc<dyn StudentRepository>,
    class_repo: Arc<dyn ClassRepository>,
    config_repo: Arc<dyn SystemConfigRepository>,
}

impl EnrollmentService {
    pub fn new(
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        student_repo: Arc<dyn StudentRepository>,
        class_repo: Arc<dyn ClassRepository>,
        config_repo: Arc<dyn SystemConfigRepository>,
    ) -> Self {
        Self {
            enrollment_repo,
            student_repo,
            class_repo,
            config_repo,
        }
    }

    pub async fn apply(&self, request: CreateApplicationRequest) -> AppResult<ApplicationResponse> {
        self.ensure_enrollment_open().await?;

        let student_name = required_text(request.student_name, "学生姓名不能为空")?;
        let gender = Gender::parse(
            &required_text(request.gender, "性别不能为空")?,
        )
        .ok_or_else(|| AppError::BadRequest("性别必须是male或female".to_string()))?;
        let birth_date = parse_birth_date(&required_text(request.birth_date, "出生日期不能为空")?)?;
        let parent_name = required_text(request.parent_name, "家长姓名不能为空")?;
        let parent_phone = required_text(request.parent_phone, "家长电话不能为空")?;
        if !is_valid_cn_mobile(&parent_phone) {
            return Err(AppError::BadRequest("家长手机号格式无效".to_string()));
        }

        if let Some(class_id) = request.preferred_class_id {
            if self.class_repo.find_by_id(class_id).await?.is_none() {
                return Err(AppError::BadRequest("班级不存在".to_string()));
            }
        }

        self.ensure_quota_not_exhausted().await?;

        let now = Utc::now();
        let application = EnrollmentApplication {
            id: 0,
            student_name,
            gender,
            birth_date,
            parent_name,
            parent_phone,
            parent_email: request.parent_email,
            address: request.address,
            preferred_class_id: request.preferred_class_id,
            status: ApplicationStatus::Pending,
            review_comment: None,
            reviewed_by: None,
            reviewed_at: None,
            student_id: None,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        };

        // Re-submission for the same child and phone trips the unique index.
        let created = self.enrollment_repo.create(&application).await?;
        info!(application_id = created.id, "enrollment application submitted");
        Ok(ApplicationResponse::from(&created))
    }

    pub async fn get(&self, id: i64) -> AppResult<ApplicationResponse> {
        let application = self.require_application(id).await?;
        Ok(ApplicationResponse::from(&application))
    }

    pub async fn list(&self, query: &ApplicationListQuery) -> AppResult<Paged<ApplicationResponse>> {
        let params = ApplicationSearchParams {
            search: query.search.clone().filter(|s| !s.is_empty()),
            status: match query.status.as_deref() {
                Some(value) => Some(
                    ApplicationStatus::parse(value)
                        .ok_or_else(|| AppError::BadRequest("状态无效".to_string()))?,
                ),
                None => None,
            },
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let applications = self.enrollment_repo.list(&params, limit, offset).await?;
        let total = self.enrollment_repo.count(&params).await?;

        let items = applications.iter().map(ApplicationResponse::from).collect();
        Ok(Paged::new(items, total, &pagination))
    }

    pub async fn review(
        &self,
        id: i64,
        request: ReviewApplicationRequest,
        reviewer_id: i64,
    ) -> AppResult<ApplicationResponse> {
        let mut application = self.require_application(id).await?;
        if application.is_reviewed() {
            return Err(AppError::Conflict(
                "申请已审核，不能重复审核".to_string(),
            ));
        }

        let status = match request.status.as_deref() {
            Some("approved") => ApplicationStatus::Approved,
            Some("rejected") => ApplicationStatus::Rejected,
            Some(_) | None => {
                return Err(AppError::BadRequest(
                    "审核状态必须是approved或rejected".to_string(),
                ))
            }
        };

        application.status = status;
        application.review_comment = request.review_comment;
        application.reviewed_by = Some(reviewer_id);
        application.reviewed_at = Some(Utc::now());

        let updated = self.enrollment_repo.update(&application).await?;
        info!(application_id = id, status = ?status, "application reviewed");
        Ok(ApplicationResponse::from(&updated))
    }

    /// Materializes a student record from an approved application.
    pub async fn create_student(&self, id: i64) -> AppResult<ApplicationResponse> {
        let mut application = self.require_application(id).await?;

        if application.status != ApplicationStatus::Approved {
            return Err(AppError::BadRequest(
                "申请未通过审核，无法创建学生记录".to_string(),
            ));
        }
        if application.student_id.is_some() {
            return Err(AppError::Conflict(
                "该申请已创建学生记录".to_string(),
            ));
        }

        if let Some(class_id) = application.preferred_class_id {
            let class = self
                .class_repo
                .find_by_id(class_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("班级不存在".to_string()))?;
            let occupied = self.student_repo.count_in_class(class_id).await?;
            if occupied >= class.capacity as i64 {
                return Err(AppError::BadRequest("班级容量不足".to_string()));
            }
        }

        let now = Utc::now();
        let student = Student {
            id: 0,
            name: application.student_name.clone(),
            gender: application.gender,
            birth_date: application.birth_date,
            class_id: application.preferred_class_id,
            parent_name: application.parent_name.clone(),
            parent_phone: application.parent_phone.clone(),
            parent_email: application.parent_email.clone(),
            address: application.address.clone(),
            status: StudentStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let created = self.student_repo.create(&student).await?;

        application.student_id = Some(created.id);
        let updated = self.enrollment_repo.update(&application).await?;
        info!(
            application_id = id,
            student_id = created.id,
            "student created from application"
        );
        Ok(ApplicationResponse::from(&updated))
    }

    pub async fn stats(&self) -> AppResult<ApplicationStatsResponse> {
        let pending = self
            .enrollment_repo
            .count_by_status(ApplicationStatus::Pending)
            .await?;
        let approved = self
            .enrollment_repo
            .count_by_status(ApplicationStatus::Approved)
            .await?;
        let rejected = self
            .enrollment_repo
            .count_by_status(ApplicationStatus::Rejected)
            .await?;
        let by_month = self
            .enrollment_repo
            .monthly_totals(TREND_MONTHS)
            .await?
            .iter()
            .map(MonthBucket::from)
            .collect();

        Ok(ApplicationStatsResponse {
            total: pending + approved + rejected,
            pending,
            approved,
            rejected,
            by_month,
        })
    }

    /// Marks unreviewed applications as reminded and reports how many were hit.
    pub async fn send_reminders(&self) -> AppResult<ReminderResponse> {
        let params = ApplicationSearchParams {
            search: None,
            status: Some(ApplicationStatus::Pending),
        };
        let pending = self.enrollment_repo.list(&params, i64::MAX, 0).await?;

        let mut sent_count = 0i64;
        for mut application in pending {
            if application.reminder_sent_at.is_some() {
                continue;
            }
            application.reminder_sent_at = Some(Utc::now());
            self.enrollment_repo.update(&application).await?;
            sent_count += 1;
        }

        info!(sent_count, "enrollment reminders sent");
        Ok(ReminderResponse { sent_count })
    }

    async fn require_application(&self, id: i64) -> AppResult<EnrollmentApplication> {
        self.enrollment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("申请不存在".to_string()))
    }

    async fn ensure_enrollment_open(&self) -> AppResult<()> {
        let open = match self.config_repo.find_by_key(CONFIG_ENROLLMENT_OPEN).await? {
            Some(config) => config.config_value == "true",
            None => false,
        };
        if !open {
            return Err(AppError::BadRequest("当前未开放报名".to_string()));
        }
        Ok(())
    }

    async fn ensure_quota_not_exhausted(&self) -> AppResult<()> {
        let quota = match self.config_repo.find_by_key(CONFIG_ENROLLMENT_QUOTA).await? {
            Some(config) => config.config_value.parse::<i64>().ok(),
            None => None,
        };
        // A missing or unparsable quota means unlimited.
        let Some(quota) = quota else {
            return Ok(());
        };

        let pending = self
            .enrollment_repo
            .count_by_status(ApplicationStatus::Pending)
            .await?;
        let approved = self
            .enrollment_repo
            .count_by_status(ApplicationStatus::Approved)
            .await?;
        if pending + approved >= quota {
            return Err(AppError::BadRequest("报名名额已满".to_string()));
        }
        Ok(())
    }
}

fn required_text(value: Option<String>, message: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::MissingFields(message.to_string()))
}

fn parse_birth_date(value: &str) -> AppResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("出生日期格式无效".to_string()))?;
    if date > Utc::now().date_naive() {
        return Err(AppError::BadRequest("出生日期不能是未来时间".to_string()));
    }
    Ok(date)
}
