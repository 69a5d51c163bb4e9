mod activity_repository;
mod class_repository;
mod enrollment_repository;
mod file_repository;
mod marketing_repository;
mod stats_repository;
mod student_repository;
mod system_repository;
mod traits;
mod user_repository;
mod utils;

pub use activity_repository::{
    ActivityRepositoryImpl, CheckInRepositoryImpl, EvaluationRepositoryImpl,
    RegistrationRepositoryImpl,
};
pub use class_repository::ClassRepositoryImpl;
pub use enrollment_repository::EnrollmentRepositoryImpl;
pub use file_repository::FileRepositoryImpl;
pub use marketing_repository::{
    AdvertisementRepositoryImpl, CampaignRepositoryImpl, LeadRepositoryImpl,
};
pub use stats_repository::StatsRepositoryImpl;
pub use student_repository::StudentRepositoryImpl;
pub use system_repository::{AiModelRepositoryImpl, SystemConfigRepositoryImpl};
pub use traits::{
    ActivityParticipation, ActivityRepository, ActivitySearchParams, AdvertisementRepository,
    AiModelRepository, ApplicationSearchParams, CampaignFunnel, CampaignRepository,
    CheckInRepository, ClassOccupancy, ClassRepository, DashboardCounts, EnrollmentRepository,
    EvaluationRepository, EvaluationSummary, FileRepository, LeadRepository, LeadSearchParams,
    MonthlyCount, PermissionRepository, RegistrationRepository, SessionRepository,
    StatsRepository, StudentRepository, StudentSearchParams, SystemConfigRepository,
    UserRepository, UserSearchParams,
};
pub use user_repository::{PermissionRepositoryImpl, SessionRepositoryImpl, UserRepositoryImpl};
