pub mod activity_dto;
pub mod auth_dto;
pub mod class_dto;
pub mod common;
pub mod dashboard_dto;
pub mod enrollment_dto;
pub mod file_dto;
pub mod marketing_dto;
pub mod student_dto;
pub mod system_dto;
pub mod user_dto;

pub use activity_dto::*;
pub use auth_dto::*;
pub use class_dto::*;
pub use common::*;
pub use dashboard_dto::*;
pub use enrollment_dto::*;
pub use file_dto::*;
pub use marketing_dto::*;
pub use student_dto::*;
pub use system_dto::*;
pub use user_dto::*;
