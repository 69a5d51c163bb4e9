mod common;

use std::sync::Arc;

use kindergarten_backend::api::dtos::{CreateApplicationRequest, ReviewApplicationRequest};
use kindergarten_backend::application::EnrollmentService;
use kindergarten_backend::domain::{ApplicationStatus, ConfigValueType};
use kindergarten_backend::error::AppError;

use common::fixtures;
use common::mocks::{MockClassRepo, MockConfigRepo, MockEnrollmentRepo, MockStudentRepo};

struct Repos {
    applications: Arc<MockEnrollmentRepo>,
    students: Arc<MockStudentRepo>,
    classes: Arc<MockClassRepo>,
    configs: Arc<MockConfigRepo>,
}

impl Repos {
    fn new() -> Self {
        Self {
            applications: Arc::new(MockEnrollmentRepo::default()),
            students: Arc::new(MockStudentRepo::default()),
            classes: Arc::new(MockClassRepo::default()),
            configs: Arc::new(MockConfigRepo::default()),
        }
    }

    fn open_enrollment(&self) {
        self.configs.push(fixtures::system_config(
            "enrollment.open",
            "true",
            ConfigValueType::Boolean,
        ));
    }

    fn set_quota(&self, quota: &str) {
        self.configs.push(fixtures::system_config(
            "enrollment.quota",
            quota,
            ConfigValueType::Number,
        ));
    }

    fn service(&self) -> EnrollmentService {
        EnrollmentService::new(
            self.applications.clone(),
            self.students.clone(),
            self.classes.clone(),
            self.configs.clone(),
        )
    }
}

fn apply_request() -> CreateApplicationRequest {
    CreateApplicationRequest {
        student_name: Some("王小明".to_string()),
        gender: Some("male".to_string()),
        birth_date: Some("2021-05-20".to_string()),
        parent_name: Some("王强".to_string()),
        parent_phone: Some("13912345678".to_string()),
        parent_email: None,
        address: None,
        preferred_class_id: None,
    }
}

#[actix_rt::test]
async fn apply_requires_open_enrollment() {
    let repos = Repos::new();

    let err = repos
        .service()
        .apply(apply_request())
        .await
        .expect_err("enrollment is closed when no config exists");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn apply_rejects_invalid_phone() {
    let repos = Repos::new();
    repos.open_enrollment();

    let mut request = apply_request();
    request.parent_phone = Some("12345".to_string());
    let err = repos
        .service()
        .apply(request)
        .await
        .expect_err("short phone must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn apply_rejects_future_birth_date() {
    let repos = Repos::new();
    repos.open_enrollment();

    let mut request = apply_request();
    request.birth_date = Some("2099-01-01".to_string());
    let err = repos
        .service()
        .apply(request)
        .await
        .expect_err("future birth date must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn apply_enforces_quota() {
    let repos = Repos::new();
    repos.open_enrollment();
    repos.set_quota("1");
    repos
        .applications
        .push(fixtures::application(1, ApplicationStatus::Pending));

    let err = repos
        .service()
        .apply(apply_request())
        .await
        .expect_err("quota of one is already consumed");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn apply_treats_unparsable_quota_as_unlimited() {
    let repos = Repos::new();
    repos.open_enrollment();
    repos.set_quota("plenty");
    repos
        .applications
        .push(fixtures::application(1, ApplicationStatus::Pending));

    let created = repos
        .service()
        .apply(apply_request())
        .await
        .expect("unparsable quota must not block applications");
    assert_eq!(created.status, "pending");
}

#[actix_rt::test]
async fn duplicate_application_conflicts() {
    let repos = Repos::new();
    repos.open_enrollment();

    let svc = repos.service();
    svc.apply(apply_request()).await.expect("first application");
    let err = svc
        .apply(apply_request())
        .await
        .expect_err("same student and phone must conflict");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[actix_rt::test]
async fn review_rejects_second_pass() {
    let repos = Repos::new();
    repos
        .applications
        .push(fixtures::application(1, ApplicationStatus::Approved));

    let request = ReviewApplicationRequest {
        status: Some("rejected".to_string()),
        review_comment: None,
    };
    let err = repos
        .service()
        .review(1, request, 1)
        .await
        .expect_err("already-reviewed application cannot be reviewed again");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[actix_rt::test]
async fn review_requires_known_status() {
    let repos = Repos::new();
    repos
        .applications
        .push(fixtures::application(1, ApplicationStatus::Pending));

    let request = ReviewApplicationRequest {
        status: Some("maybe".to_string()),
        review_comment: None,
    };
    let err = repos
        .service()
        .review(1, request, 1)
        .await
        .expect_err("only approved or rejected are valid");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn create_student_requires_approved_application() {
    let repos = Repos::new();
    repos
        .applications
        .push(fixtures::application(1, ApplicationStatus::Pending));

    let err = repos
        .service()
        .create_student(1)
        .await
        .expect_err("pending application cannot become a student");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn create_student_runs_once_per_application() {
    let repos = Repos::new();
    let mut approved = fixtures::application(1, ApplicationStatus::Approved);
    approved.student_id = Some(9);
    repos.applications.push(approved);

    let err = repos
        .service()
        .create_student(1)
        .await
        .expect_err("application already has a student record");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[actix_rt::test]
async fn create_student_checks_class_capacity() {
    let repos = Repos::new();
    repos.classes.push(fixtures::class_unit(1, 1));
    repos.students.push(fixtures::student(1, Some(1)));
    let mut approved = fixtures::application(1, ApplicationStatus::Approved);
    approved.preferred_class_id = Some(1);
    repos.applications.push(approved);

    let err = repos
        .service()
        .create_student(1)
        .await
        .expect_err("full class cannot take another student");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn send_reminders_skips_already_notified() {
    let repos = Repos::new();
    let mut notified = fixtures::application(1, ApplicationStatus::Pending);
    notified.reminder_sent_at = Some(chrono::Utc::now());
    repos.applications.push(notified);

    let result = repos
        .service()
        .send_reminders()
        .await
        .expect("no eligible applications is not an error");
    assert_eq!(result.sent_count, 0);
}

#[actix_rt::test]
async fn send_reminders_counts_unnotified_pending() {
    let repos = Repos::new();
    repos
        .applications
        .push(fixtures::application(1, ApplicationStatus::Pending));
    let mut notified = fixtures::application(2, ApplicationStatus::Pending);
    notified.reminder_sent_at = Some(chrono::Utc::now());
    repos.applications.push(notified);
    repos
        .applications
        .push(fixtures::application(3, ApplicationStatus::Approved));

    let result = repos
        .service()
        .send_reminders()
        .await
        .expect("reminders should be sent");
    assert_eq!(result.sent_count, 1);
}
