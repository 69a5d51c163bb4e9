use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::api::dtos::{
    ActivityListQuery, ActivityResponse, BatchCheckInRequest, BatchCheckInResponse,
    CheckInDetail, CheckInResponse, CreateActivityRequest, CreateEvaluationRequest,
    CreateRegistrationRequest, EvaluationListQuery, EvaluationResponse, EvaluationStatsResponse,
    Paged, RegistrationResponse, RegistrationStatsResponse, ReplyEvaluationRequest,
    ReviewRegistrationRequest, UpdateActivityRequest, UpdateEvaluationRequest,
};
use crate::domain::{
    is_valid_rating, Activity, ActivityCheckIn, ActivityEvaluation, ActivityRegistration,
    ActivityStatus, CheckInMethod, EvaluatorType, RegistrationStatus,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{
    ActivityRepository, ActivitySearchParams, CheckInRepository, EvaluationRepository,
    RegistrationRepository, StudentRepository,
};

#[derive(Clone)]
pub struct ActivityService {
    activity_repo: Arc<dyn ActivityRepository>,
    registration_repo: Arc<dyn RegistrationRepository>,
    checkin_repo: Arc<dyn CheckInRepository>,
    evaluation_repo: Arc<dyn EvaluationRepository>,
    student_repo: Arc<dyn StudentRepository>,
}

impl ActivityService {
    pub fn new(
        activity_repo: Arc<dyn ActivityRepository>,
        registration_repo: Arc<dyn RegistrationRepository>,
        checkin_repo: Arc<dyn CheckInRepository>,
        evaluation_repo: Arc<dyn EvaluationRepository>,
        student_repo: Arc<dyn StudentRepository>,
    ) -> Self {
        Self {
            activity_repo,
            registration_repo,
            checkin_repo,
            evaluation_repo,
            student_repo,
        }
    }

    pub async fn create(
        &self,
        request: CreateActivityRequest,
        created_by: i64,
    ) -> AppResult<ActivityResponse> {
        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("活动标题不能为空".to_string()))?;
        let activity_type = request
            .activity_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("活动类型不能为空".to_string()))?;
        let start_time = request
            .start_time
            .ok_or_else(|| AppError::MissingFields("开始时间不能为空".to_string()))?;
        let end_time = request
            .end_time
            .ok_or_else(|| AppError::MissingFields("结束时间不能为空".to_string()))?;
        if end_time <= start_time {
            return Err(AppError::BadRequest(
                "结束时间必须晚于开始时间".to_string(),
            ));
        }
        let capacity = request.capacity.unwrap_or(0);
        if capacity < 0 {
            return Err(AppError::BadRequest("活动容量不能为负数".to_string()));
        }

        let now = Utc::now();
        let activity = Activity {
            id: 0,
            title,
            activity_type,
            location: request.location,
            start_time,
            end_time,
            capacity,
            fee: request.fee.unwrap_or(Decimal::ZERO),
            description: request.description,
            status: ActivityStatus::Draft,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let created = self.activity_repo.create(&activity).await?;
        info!(activity_id = created.id, "activity created");
        Ok(ActivityResponse::from(&created))
    }

    pub async fn get(&self, id: i64) -> AppResult<ActivityResponse> {
        let activity = self.require_activity(id).await?;
        Ok(ActivityResponse::from(&activity))
    }

    pub async fn list(&self, query: &ActivityListQuery) -> AppResult<Paged<ActivityResponse>> {
        let params = ActivitySearchParams {
            search: query.search.clone().filter(|s| !s.is_empty()),
            status: match query.status.as_deref() {
                Some(value) => Some(parse_activity_status(value)?),
                None => None,
            },
            starts_after: None,
            ends_before: None,
        };

        let pagination = query.pagination();
        let (limit, offset) = pagination.limit_offset();
        let activities = self.activity_repo.list(&params, limit, offset).await?;
        let total = self.activity_repo.count(&params).await?;

        let items = activities.iter().map(ActivityResponse::from).collect();
        Ok(Paged::new(items, total, &pagination))
    }

    pub async fn update(&self, id: i64, request: UpdateActivityRequest) -> AppResult<ActivityResponse> {
        let mut activity = self.require_activity(id).await?;

        if let Some(title) = request.title {
            if title.trim().is_empty() {
                return Err(AppError::BadRequest("活动标题不能为空".to_string()));
            }
            activity.title = title;
        }
        if let Some(activity_type) = request.activity_type {
            activity.activity_type = activity_type;
        }
        if let Some(location) = request.location {
            activity.location = Some(location);
        }
        if let Some(start_time) = request.start_time {
            activity.start_time = start_time;
        }
        if let Some(end_time) = request.end_time {
            activity.end_time = end_time;
        }
        if activity.end_time <= activity.start_time {
            return Err(AppError::BadRequest(
                "结束时间必须晚于开始时间".to_string(),
            ));
        }
        if let Some(capacity) = request.capacity {
            if capacity < 0 {
                return Err(AppError::BadRequest("活动容量不能为负数".to_string()));
            }
            activity.capacity = capacity;
        }
        if let Some(fee) = request.fee {
            activity.fee = fee;
        }
        if let Some(description) = request.description {
            activity.description = Some(description);
        }

        let updated = self.activity_repo.update(&activity).await?;
        Ok(ActivityResponse::from(&updated))
    }

    pub async fn update_status(&self, id: i64, status: &str) -> AppResult<ActivityResponse> {
        let mut activity = self.require_activity(id).await?;
        let next = parse_activity_status(status)?;
        if !status_transition_allowed(activity.status, next) {
            return Err(AppError::BadRequest("活动状态流转无效".to_string()));
        }
        activity.status = next;
        let updated = self.activity_repo.update(&activity).await?;
        info!(activity_id = id, status = %status, "activity status changed");
        Ok(ActivityResponse::from(&updated))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.require_activity(id).await?;
        self.activity_repo.delete(id).await?;
        Ok(())
    }

    pub async fn register(
        &self,
        activity_id: i64,
        request: CreateRegistrationRequest,
        created_by: i64,
    ) -> AppResult<RegistrationResponse> {
        let activity = self.require_activity(activity_id).await?;
        if !activity.accepts_registrations() {
            return Err(AppError::BadRequest("当前活动不可报名".to_string()));
        }

        let student_id = request
            .student_id
            .ok_or_else(|| AppError::MissingFields("学生ID不能为空".to_string()))?;
        if self.student_repo.find_by_id(student_id).await?.is_none() {
            return Err(AppError::BadRequest("学生不存在".to_string()));
        }

        // Capacity zero means unlimited.
        if activity.capacity > 0 {
            let registered = self.registration_repo.count_active(activity_id).await?;
            if registered >= activity.capacity as i64 {
                return Err(AppError::BadRequest("活动名额已满".to_string()));
            }
        }

        let now = Utc::now();
        let registration = ActivityRegistration {
            id: 0,
            activity_id,
            student_id,
            contact_phone: request.contact_phone,
            status: RegistrationStatus::Pending,
            created_by,
            created_at: now,
            updated_at: now,
        };

        // Duplicate registrations trip the unique index and map to 409.
        let created = self.registration_repo.create(&registration).await?;
        info!(activity_id, student_id, "registration created");
        Ok(RegistrationResponse::from(&created))
    }

    pub async fn review_registration(
        &self,
        registration_id: i64,
        request: ReviewRegistrationRequest,
    ) -> AppResult<RegistrationResponse> {
        let registration = self
            .registration_repo
            .find_by_id(registration_id)
            .await?
            .ok_or_else(|| AppError::NotFound("报名记录不存在".to_string()))?;

        let status = match request.status.as_deref() {
            Some("confirmed") => RegistrationStatus::Confirmed,
            Some("cancelled") => RegistrationStatus::Cancelled,
            Some(_) | None => {
                return Err(AppError::BadRequest(
                    "审核状态必须是confirmed或cancelled".to_string(),
                ))
            }
        };

        self.registration_repo
            .update_status(registration_id, status)
            .await?;
        let mut updated = registration;
        updated.status = status;
        Ok(RegistrationResponse::from(&updated))
    }

    pub async fn list_registrations(
        &self,
        activity_id: i64,
    ) -> AppResult<Vec<RegistrationResponse>> {
        self.require_activity(activity_id).await?;
        let registrations = self.registration_repo.list_by_activity(activity_id).await?;
        Ok(registrations.iter().map(RegistrationResponse::from).collect())
    }

    pub async fn registration_stats(&self, activity_id: i64) -> AppResult<RegistrationStatsResponse> {
        let activity = self.require_activity(activity_id).await?;
        let registered = self.registration_repo.count_active(activity_id).await?;
        let checked_in = self.checkin_repo.count_by_activity(activity_id).await?;
        let remaining = if activity.capacity > 0 {
            (activity.capacity as i64 - registered).max(0)
        } else {
            0
        };
        Ok(RegistrationStatsResponse {
            activity_id,
            capacity: activity.capacity,
            registered,
            checked_in,
            remaining,
        })
    }

    pub async fn check_in(
        &self,
        activity_id: i64,
        student_id: i64,
        operator_id: i64,
    ) -> AppResult<CheckInResponse> {
        self.require_activity(activity_id).await?;

        if self
            .registration_repo
            .find_by_activity_and_student(activity_id, student_id)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest("该学生未报名此活动".to_string()));
        }
        if self.checkin_repo.exists(activity_id, student_id).await? {
            return Err(AppError::Conflict("该学生已签到".to_string()));
        }

        let checkin = self
            .record_checkin(activity_id, student_id, operator_id, CheckInMethod::Manual)
            .await?;
        Ok(CheckInResponse::from(&checkin))
    }

    pub async fn batch_check_in(
        &self,
        activity_id: i64,
        request: BatchCheckInRequest,
        operator_id: i64,
    ) -> AppResult<BatchCheckInResponse> {
        self.require_activity(activity_id).await?;
        if request.student_ids.is_empty() {
            return Err(AppError::MissingFields("学生ID列表不能为空".to_string()));
        }

        let mut details = Vec::with_capacity(request.student_ids.len());
        let mut success_count = 0i64;
        let mut failure_count = 0i64;

        for student_id in request.student_ids {
            let registered = self
                .registration_repo
                .find_by_activity_and_student(activity_id, student_id)
                .await?
                .is_some();
            if !registered {
                failure_count += 1;
                details.push(CheckInDetail {
                    student_id,
                    success: false,
                    reason: Some("Not registered for this activity".to_string()),
                });
                continue;
            }
            if self.checkin_repo.exists(activity_id, student_id).await? {
                failure_count += 1;
                details.push(CheckInDetail {
                    student_id,
                    success: false,
                    reason: Some("Already checked in".to_string()),
                });
                continue;
            }

            self.record_checkin(
                activity_id,
                student_id,
                operator_id,
                CheckInMethod::BulkManual,
            )
            .await?;
            success_count += 1;
            details.push(CheckInDetail {
                student_id,
                success: true,
                reason: None,
            });
        }

        info!(activity_id, success_count, failure_count, "batch check-in");
        Ok(BatchCheckInResponse {
            success_count,
            failure_count,
            details,
        })
    }

    pub async fn list_check_ins(&self, activity_id: i64) -> AppResult<Vec<CheckInResponse>> {
        self.require_activity(activity_id).await?;
        let checkins = self.checkin_repo.list_by_activity(activity_id).await?;
        Ok(checkins.iter().map(CheckInResponse::from).collect())
    }

    pub async fn create_evaluation(
        &self,
        request: CreateEvaluationRequest,
        created_by: i64,
    ) -> AppResult<EvaluationResponse> {
        let activity_id = request
            .activity_id
            .ok_or_else(|| AppError::MissingFields("活动ID不能为空".to_string()))?;
        let evaluator_type = request
            .evaluator_type
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::MissingFields("评价者类型不能为空".to_string()))
            .and_then(parse_evaluator_type)?;
        let evaluator_name = request
            .evaluator_name
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("评价者姓名不能为空".to_string()))?;
        let overall_rating = request
            .overall_rating
            .ok_or_else(|| AppError::MissingFields("总体评分不能为空".to_string()))?;
        if !is_valid_rating(overall_rating) {
            return Err(AppError::BadRequest("总体评分必须在1-5之间".to_string()));
        }
        for rating in [
            request.content_rating,
            request.organization_rating,
            request.environment_rating,
            request.service_rating,
        ]
        .into_iter()
        .flatten()
        {
            if !is_valid_rating(rating) {
                return Err(AppError::BadRequest("评分必须在1-5之间".to_string()));
            }
        }

        self.require_activity(activity_id).await?;

        let now = Utc::now();
        let evaluation = ActivityEvaluation {
            id: 0,
            activity_id,
            evaluator_type,
            evaluator_name,
            overall_rating,
            content_rating: request.content_rating,
            organization_rating: request.organization_rating,
            environment_rating: request.environment_rating,
            service_rating: request.service_rating,
            comments: request.comments,
            reply: None,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let created = self.evaluation_repo.create(&evaluation).await?;
        Ok(EvaluationResponse::from(&created))
    }

    pub async fn update_evaluation(
        &self,
        id: i64,
        request: UpdateEvaluationRequest,
        user_id: i64,
        is_admin: bool,
    ) -> AppResult<EvaluationResponse> {
        let mut evaluation = self.require_evaluation(id).await?;
        if evaluation.created_by != user_id && !is_admin {
            return Err(AppError::Forbidden("无权修改该评价".to_string()));
        }

        if let Some(overall_rating) = request.overall_rating {
            if !is_valid_rating(overall_rating) {
                return Err(AppError::BadRequest("总体评分必须在1-5之间".to_string()));
            }
            evaluation.overall_rating = overall_rating;
        }
        for (slot, value) in [
            (&mut evaluation.content_rating, request.content_rating),
            (
                &mut evaluation.organization_rating,
                request.organization_rating,
            ),
            (
                &mut evaluation.environment_rating,
                request.environment_rating,
            ),
            (&mut evaluation.service_rating, request.service_rating),
        ] {
            if let Some(rating) = value {
                if !is_valid_rating(rating) {
                    return Err(AppError::BadRequest("评分必须在1-5之间".to_string()));
                }
                *slot = Some(rating);
            }
        }
        if let Some(comments) = request.comments {
            evaluation.comments = Some(comments);
        }

        let updated = self.evaluation_repo.update(&evaluation).await?;
        Ok(EvaluationResponse::from(&updated))
    }

    pub async fn delete_evaluation(&self, id: i64, user_id: i64, is_admin: bool) -> AppResult<()> {
        let evaluation = self.require_evaluation(id).await?;
        if evaluation.created_by != user_id && !is_admin {
            return Err(AppError::Forbidden("无权删除该评价".to_string()));
        }
        self.evaluation_repo.delete(id).await?;
        Ok(())
    }

    pub async fn reply_evaluation(
        &self,
        id: i64,
        request: ReplyEvaluationRequest,
    ) -> AppResult<EvaluationResponse> {
        self.require_evaluation(id).await?;
        let reply = request
            .reply
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| AppError::MissingFields("回复内容不能为空".to_string()))?;
        let updated = self.evaluation_repo.update_reply(id, &reply).await?;
        Ok(EvaluationResponse::from(&updated))
    }

    pub async fn list_evaluations(
        &self,
        activity_id: i64,
        query: &EvaluationListQuery,
    ) -> AppResult<Vec<EvaluationResponse>> {
        self.require_activity(activity_id).await?;
        let evaluator_type = match query.evaluator_type.as_deref() {
            Some(value) => Some(parse_evaluator_type(value)?),
            None => None,
        };
        let evaluations = self
            .evaluation_repo
            .list_by_activity(activity_id, evaluator_type)
            .await?;
        Ok(evaluations.iter().map(EvaluationResponse::from).collect())
    }

    pub async fn evaluation_stats(&self, activity_id: i64) -> AppResult<EvaluationStatsResponse> {
        self.require_activity(activity_id).await?;
        let summary = self.evaluation_repo.summary(activity_id).await?;
        let distribution = self.evaluation_repo.rating_distribution(activity_id).await?;
        Ok(EvaluationStatsResponse::from_parts(&summary, &distribution))
    }

    async fn require_activity(&self, id: i64) -> AppResult<Activity> {
        self.activity_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("活动不存在".to_string()))
    }

    async fn require_evaluation(&self, id: i64) -> AppResult<ActivityEvaluation> {
        self.evaluation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("评价不存在".to_string()))
    }

    async fn record_checkin(
        &self,
        activity_id: i64,
        student_id: i64,
        operator_id: i64,
        method: CheckInMethod,
    ) -> AppResult<ActivityCheckIn> {
        let now = Utc::now();
        let checkin = ActivityCheckIn {
            id: 0,
            activity_id,
            student_id,
            check_in_time: now,
            method,
            operator_id,
            created_at: now,
        };
        self.checkin_repo.create(&checkin).await
    }
}

fn parse_activity_status(value: &str) -> AppResult<ActivityStatus> {
    match value {
        "draft" => Ok(ActivityStatus::Draft),
        "published" => Ok(ActivityStatus::Published),
        "ongoing" => Ok(ActivityStatus::Ongoing),
        "finished" => Ok(ActivityStatus::Finished),
        "cancelled" => Ok(ActivityStatus::Cancelled),
        _ => Err(AppError::BadRequest("活动状态无效".to_string())),
    }
}

fn parse_evaluator_type(value: &str) -> AppResult<EvaluatorType> {
    EvaluatorType::parse(value)
        .ok_or_else(|| AppError::BadRequest("评价者类型必须是parent或teacher".to_string()))
}

fn status_transition_allowed(from: ActivityStatus, to: ActivityStatus) -> bool {
    use ActivityStatus::*;
    matches!(
        (from, to),
        (Draft, Published)
            | (Published, Ongoing)
            | (Ongoing, Finished)
            | (Draft, Cancelled)
            | (Published, Cancelled)
            | (Ongoing, Cancelled)
    )
}
