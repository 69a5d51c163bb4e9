use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    Activity, ActivityCheckIn, ActivityEvaluation, ActivityRegistration, ActivityStatus,
    AdPosition, AdStatus, Advertisement, AiModelConfig, ApplicationStatus, Campaign,
    CampaignStatus, ClassUnit, EnrollmentApplication, EvaluatorType, FileCategory, Lead,
    LeadStatus, RegistrationStatus, Role, StoredFile, Student, StudentStatus, SystemConfig, User,
    UserSession, UserStatus,
};
use crate::error::AppResult;

#[derive(Debug, Clone, Default)]
pub struct UserSearchParams {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Age filters arrive as years and are translated to birth-date bounds before
/// they reach the repository.
#[derive(Debug, Clone, Default)]
pub struct StudentSearchParams {
    pub search: Option<String>,
    pub class_id: Option<i64>,
    pub born_on_or_before: Option<NaiveDate>,
    pub born_after: Option<NaiveDate>,
    pub status: Option<StudentStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivitySearchParams {
    pub search: Option<String>,
    pub status: Option<ActivityStatus>,
    pub starts_after: Option<DateTime<Utc>>,
    pub ends_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationSearchParams {
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadSearchParams {
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub campaign_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClassOccupancy {
    pub class_id: i64,
    pub name: String,
    pub capacity: i32,
    pub student_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct MonthlyCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DashboardCounts {
    pub student_count: i64,
    pub class_count: i64,
    pub teacher_count: i64,
    pub activity_count: i64,
    pub pending_application_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityParticipation {
    pub activity_id: i64,
    pub title: String,
    pub capacity: i32,
    pub registration_count: i64,
    pub checkin_count: i64,
    pub average_rating: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CampaignFunnel {
    pub campaign_id: i64,
    pub name: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub lead_count: i64,
    pub converted_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EvaluationSummary {
    pub evaluation_count: i64,
    pub average_overall: Option<Decimal>,
    pub average_content: Option<Decimal>,
    pub average_organization: Option<Decimal>,
    pub average_environment: Option<Decimal>,
    pub average_service: Option<Decimal>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn create(&self, user: &User) -> AppResult<User>;
    async fn update(&self, user: &User) -> AppResult<User>;
    async fn update_password(&self, id: i64, password_hash: &str) -> AppResult<()>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(
        &self,
        params: &UserSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<User>>;
    async fn count(&self, params: &UserSearchParams) -> AppResult<i64>;
}

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn codes_for_role(&self, role: Role) -> AppResult<Vec<String>>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &UserSession) -> AppResult<UserSession>;
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<UserSession>>;
    async fn touch(&self, id: Uuid) -> AppResult<()>;
    async fn revoke(
        &self,
        id: Uuid,
        reason: &str,
        replaced_by: Option<Uuid>,
    ) -> AppResult<()>;
    async fn revoke_family(&self, family_id: Uuid, reason: &str) -> AppResult<u64>;
    async fn revoke_all_for_user(&self, user_id: i64, reason: &str) -> AppResult<u64>;
    async fn delete_expired(&self) -> AppResult<u64>;
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Student>>;
    async fn create(&self, student: &Student) -> AppResult<Student>;
    async fn update(&self, student: &Student) -> AppResult<Student>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(
        &self,
        params: &StudentSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Student>>;
    async fn count(&self, params: &StudentSearchParams) -> AppResult<i64>;
    async fn count_in_class(&self, class_id: i64) -> AppResult<i64>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ClassUnit>>;
    async fn create(&self, class: &ClassUnit) -> AppResult<ClassUnit>;
    async fn update(&self, class: &ClassUnit) -> AppResult<ClassUnit>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<ClassUnit>>;
    async fn count(&self) -> AppResult<i64>;
    async fn occupancy(&self) -> AppResult<Vec<ClassOccupancy>>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Activity>>;
    async fn create(&self, activity: &Activity) -> AppResult<Activity>;
    async fn update(&self, activity: &Activity) -> AppResult<Activity>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(
        &self,
        params: &ActivitySearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Activity>>;
    async fn count(&self, params: &ActivitySearchParams) -> AppResult<i64>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn create(&self, registration: &ActivityRegistration) -> AppResult<ActivityRegistration>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ActivityRegistration>>;
    async fn find_by_activity_and_student(
        &self,
        activity_id: i64,
        student_id: i64,
    ) -> AppResult<Option<ActivityRegistration>>;
    async fn list_by_activity(&self, activity_id: i64) -> AppResult<Vec<ActivityRegistration>>;
    async fn update_status(&self, id: i64, status: RegistrationStatus) -> AppResult<()>;
    async fn count_active(&self, activity_id: i64) -> AppResult<i64>;
}

#[async_trait]
pub trait CheckInRepository: Send + Sync {
    async fn create(&self, checkin: &ActivityCheckIn) -> AppResult<ActivityCheckIn>;
    async fn exists(&self, activity_id: i64, student_id: i64) -> AppResult<bool>;
    async fn list_by_activity(&self, activity_id: i64) -> AppResult<Vec<ActivityCheckIn>>;
    async fn count_by_activity(&self, activity_id: i64) -> AppResult<i64>;
}

#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    async fn create(&self, evaluation: &ActivityEvaluation) -> AppResult<ActivityEvaluation>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ActivityEvaluation>>;
    async fn update(&self, evaluation: &ActivityEvaluation) -> AppResult<ActivityEvaluation>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list_by_activity(
        &self,
        activity_id: i64,
        evaluator_type: Option<EvaluatorType>,
    ) -> AppResult<Vec<ActivityEvaluation>>;
    async fn update_reply(&self, id: i64, reply: &str) -> AppResult<ActivityEvaluation>;
    async fn summary(&self, activity_id: i64) -> AppResult<EvaluationSummary>;
    async fn rating_distribution(&self, activity_id: i64) -> AppResult<Vec<(i32, i64)>>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<EnrollmentApplication>>;
    async fn create(&self, application: &EnrollmentApplication)
        -> AppResult<EnrollmentApplication>;
    async fn update(&self, application: &EnrollmentApplication)
        -> AppResult<EnrollmentApplication>;
    async fn list(
        &self,
        params: &ApplicationSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<EnrollmentApplication>>;
    async fn count(&self, params: &ApplicationSearchParams) -> AppResult<i64>;
    async fn count_by_status(&self, status: ApplicationStatus) -> AppResult<i64>;
    async fn monthly_totals(&self, months: i64) -> AppResult<Vec<MonthlyCount>>;
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Campaign>>;
    async fn create(&self, campaign: &Campaign) -> AppResult<Campaign>;
    async fn update(&self, campaign: &Campaign) -> AppResult<Campaign>;
    async fn update_status(&self, id: i64, status: CampaignStatus) -> AppResult<()>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(&self, status: Option<CampaignStatus>, limit: i64, offset: i64)
        -> AppResult<Vec<Campaign>>;
    async fn count(&self, status: Option<CampaignStatus>) -> AppResult<i64>;
    async fn funnel(&self) -> AppResult<Vec<CampaignFunnel>>;
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Lead>>;
    async fn create(&self, lead: &Lead) -> AppResult<Lead>;
    async fn update(&self, lead: &Lead) -> AppResult<Lead>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(
        &self,
        params: &LeadSearchParams,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Lead>>;
    async fn count(&self, params: &LeadSearchParams) -> AppResult<i64>;
}

#[async_trait]
pub trait AdvertisementRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Advertisement>>;
    async fn create(&self, ad: &Advertisement) -> AppResult<Advertisement>;
    async fn update(&self, ad: &Advertisement) -> AppResult<Advertisement>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(
        &self,
        position: Option<AdPosition>,
        status: Option<AdStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Advertisement>>;
    async fn count(&self, position: Option<AdPosition>, status: Option<AdStatus>)
        -> AppResult<i64>;
    async fn list_live(&self, position: AdPosition, now: DateTime<Utc>)
        -> AppResult<Vec<Advertisement>>;
}

#[async_trait]
pub trait SystemConfigRepository: Send + Sync {
    async fn find_by_key(&self, config_key: &str) -> AppResult<Option<SystemConfig>>;
    async fn create(&self, config: &SystemConfig) -> AppResult<SystemConfig>;
    async fn update(&self, config: &SystemConfig) -> AppResult<SystemConfig>;
    async fn delete_by_key(&self, config_key: &str) -> AppResult<()>;
    async fn list(&self, config_group: Option<&str>) -> AppResult<Vec<SystemConfig>>;
}

#[async_trait]
pub trait AiModelRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<AiModelConfig>>;
    async fn find_default(&self) -> AppResult<Option<AiModelConfig>>;
    async fn create(&self, config: &AiModelConfig) -> AppResult<AiModelConfig>;
    async fn update(&self, config: &AiModelConfig) -> AppResult<AiModelConfig>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list(&self) -> AppResult<Vec<AiModelConfig>>;
    async fn clear_default(&self) -> AppResult<()>;
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, file: &StoredFile) -> AppResult<StoredFile>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<StoredFile>>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn list_by_user(
        &self,
        user_id: i64,
        category: Option<FileCategory>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<StoredFile>>;
    async fn count_by_user(&self, user_id: i64, category: Option<FileCategory>) -> AppResult<i64>;
    async fn total_size_for_user(&self, user_id: i64) -> AppResult<i64>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn dashboard_counts(&self) -> AppResult<DashboardCounts>;
    async fn enrollment_trend(&self, months: i64) -> AppResult<Vec<MonthlyCount>>;
    async fn class_occupancy(&self) -> AppResult<Vec<ClassOccupancy>>;
    async fn activity_participation(&self, limit: i64) -> AppResult<Vec<ActivityParticipation>>;
    async fn campaign_funnel(&self) -> AppResult<Vec<CampaignFunnel>>;
}
