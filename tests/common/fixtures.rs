use chrono::{Duration, NaiveDate, Utc};
use kindergarten_backend::domain::{
    Activity, ActivityRegistration, ActivityStatus, AiModelConfig, AiModelStatus,
    ApplicationStatus, Campaign, CampaignStatus, ClassUnit, ConfigValueType,
    EnrollmentApplication, FileCategory, Gender, Grade, Lead, LeadStatus, RegistrationStatus,
    StoredFile, Student, StudentStatus, SystemConfig, User, UserStatus,
};
use kindergarten_backend::domain::Role;
use kindergarten_backend::utils::hash::hash_password;
use rust_decimal::Decimal;

pub fn user(id: i64, role: Role, password: &str) -> User {
    let now = Utc::now();
    User {
        id,
        username: format!("user{id}"),
        email: Some(format!("user{id}@example.com")),
        password_hash: hash_password(password).expect("hashing succeeds"),
        real_name: Some("测试用户".to_string()),
        phone: None,
        role,
        status: UserStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn student(id: i64, class_id: Option<i64>) -> Student {
    let now = Utc::now();
    Student {
        id,
        name: format!("学生{id}"),
        gender: Gender::Male,
        birth_date: NaiveDate::from_ymd_opt(2020, 6, 1).expect("valid date"),
        class_id,
        parent_name: "家长".to_string(),
        parent_phone: "13800138000".to_string(),
        parent_email: None,
        address: None,
        status: StudentStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn class_unit(id: i64, capacity: i32) -> ClassUnit {
    let now = Utc::now();
    ClassUnit {
        id,
        name: format!("小{id}班"),
        grade: Grade::Junior,
        capacity,
        head_teacher_id: None,
        description: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn activity(id: i64, status: ActivityStatus, capacity: i32) -> Activity {
    let now = Utc::now();
    Activity {
        id,
        title: format!("活动{id}"),
        activity_type: "outdoor".to_string(),
        location: Some("操场".to_string()),
        start_time: now + Duration::days(1),
        end_time: now + Duration::days(2),
        capacity,
        fee: Decimal::ZERO,
        description: None,
        status,
        created_by: 1,
        created_at: now,
        updated_at: now,
    }
}

pub fn registration(
    id: i64,
    activity_id: i64,
    student_id: i64,
    status: RegistrationStatus,
) -> ActivityRegistration {
    let now = Utc::now();
    ActivityRegistration {
        id,
        activity_id,
        student_id,
        contact_phone: None,
        status,
        created_by: 1,
        created_at: now,
        updated_at: now,
    }
}

pub fn application(id: i64, status: ApplicationStatus) -> EnrollmentApplication {
    let now = Utc::now();
    EnrollmentApplication {
        id,
        student_name: format!("申请学生{id}"),
        gender: Gender::Female,
        birth_date: NaiveDate::from_ymd_opt(2021, 3, 15).expect("valid date"),
        parent_name: "李强".to_string(),
        parent_phone: format!("1390000{id:04}"),
        parent_email: None,
        address: None,
        preferred_class_id: None,
        status,
        review_comment: None,
        reviewed_by: None,
        reviewed_at: None,
        student_id: None,
        reminder_sent_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn campaign(id: i64, status: CampaignStatus) -> Campaign {
    let now = Utc::now();
    Campaign {
        id,
        name: format!("春季招生活动{id}"),
        campaign_type: "online".to_string(),
        channel: Some("wechat".to_string()),
        budget: Decimal::new(10_000, 0),
        spent: Decimal::ZERO,
        start_time: Some(now),
        end_time: Some(now + Duration::days(30)),
        description: None,
        status,
        created_by: 1,
        created_at: now,
        updated_at: now,
    }
}

pub fn lead(id: i64, status: LeadStatus) -> Lead {
    let now = Utc::now();
    Lead {
        id,
        name: format!("线索{id}"),
        phone: "13900139000".to_string(),
        source: Some("wechat".to_string()),
        campaign_id: None,
        status,
        converted_student_id: None,
        note: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn system_config(key: &str, value: &str, value_type: ConfigValueType) -> SystemConfig {
    let now = Utc::now();
    SystemConfig {
        id: 0,
        config_key: key.to_string(),
        config_value: value.to_string(),
        value_type,
        config_group: "general".to_string(),
        description: None,
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn ai_model(id: i64, status: AiModelStatus) -> AiModelConfig {
    let now = Utc::now();
    AiModelConfig {
        id,
        name: format!("模型{id}"),
        provider: "openai".to_string(),
        model_name: "gpt-4o-mini".to_string(),
        api_key: "sk-test1234567890".to_string(),
        endpoint_url: None,
        max_tokens: 4096,
        temperature: Decimal::new(7, 1),
        is_default: false,
        status,
        created_at: now,
        updated_at: now,
    }
}

pub fn stored_file(id: i64, uploaded_by: i64, category: FileCategory) -> StoredFile {
    let (mime_type, extension) = match category {
        FileCategory::Image => ("image/png", "png"),
        FileCategory::Document => ("application/pdf", "pdf"),
        FileCategory::Video => ("video/mp4", "mp4"),
    };
    StoredFile {
        id,
        original_name: format!("文件{id}.{extension}"),
        file_name: format!("{id:08}.{extension}"),
        mime_type: mime_type.to_string(),
        category,
        size_bytes: 2048,
        storage_path: format!("uploads/{id:08}.{extension}"),
        uploaded_by,
        created_at: Utc::now(),
    }
}
