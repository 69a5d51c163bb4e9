pub mod activity_service;
pub mod auth_service;
pub mod class_service;
pub mod dashboard_service;
pub mod enrollment_service;
pub mod file_service;
pub mod marketing_service;
pub mod student_service;
pub mod system_service;
pub mod user_service;

pub use activity_service::ActivityService;
pub use auth_service::AuthService;
pub use class_service::ClassService;
pub use dashboard_service::DashboardService;
pub use enrollment_service::EnrollmentService;
pub use file_service::FileService;
pub use marketing_service::MarketingService;
pub use student_service::StudentService;
pub use system_service::SystemService;
pub use user_service::UserService;
