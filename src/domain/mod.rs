pub mod activity;
pub mod class_unit;
pub mod enrollment;
pub mod errors;
pub mod file;
pub mod marketing;
pub mod student;
pub mod system;
pub mod user;

pub use activity::{
    is_valid_rating, Activity, ActivityCheckIn, ActivityEvaluation, ActivityRegistration,
    ActivityStatus, CheckInMethod, EvaluatorType, RegistrationStatus,
};
pub use class_unit::{ClassUnit, Grade, MAX_CLASS_CAPACITY, MAX_CLASS_NAME_CHARS};
pub use enrollment::{ApplicationStatus, EnrollmentApplication};
pub use errors::DomainError;
pub use file::{FileCategory, StoredFile};
pub use marketing::{
    AdPosition, AdStatus, Advertisement, Campaign, CampaignStatus, Lead, LeadStatus,
};
pub use student::{is_valid_cn_mobile, Gender, Student, StudentStatus};
pub use system::{AiModelConfig, AiModelStatus, ConfigValueType, SystemConfig};
pub use user::{Role, User, UserSession, UserStatus};
