mod common;

use std::sync::Arc;

use chrono::{Months, Utc};
use kindergarten_backend::api::dtos::{CreateStudentRequest, StudentListQuery};
use kindergarten_backend::application::StudentService;
use kindergarten_backend::error::AppError;

use common::fixtures;
use common::mocks::{MockClassRepo, MockStudentRepo};

struct Repos {
    students: Arc<MockStudentRepo>,
    classes: Arc<MockClassRepo>,
}

impl Repos {
    fn new() -> Self {
        Self {
            students: Arc::new(MockStudentRepo::default()),
            classes: Arc::new(MockClassRepo::default()),
        }
    }

    fn service(&self) -> StudentService {
        StudentService::new(self.students.clone(), self.classes.clone())
    }

    fn push_student_aged_months(&self, id: i64, months: u32) {
        let mut student = fixtures::student(id, None);
        student.birth_date = Utc::now().date_naive() - Months::new(months);
        self.students.push(student);
    }
}

fn list_query(min_age: Option<i32>, max_age: Option<i32>) -> StudentListQuery {
    StudentListQuery {
        page: 1,
        page_size: 20,
        search: None,
        class_id: None,
        min_age,
        max_age,
        status: None,
    }
}

fn create_request() -> CreateStudentRequest {
    CreateStudentRequest {
        name: Some("王小明".to_string()),
        gender: Some("male".to_string()),
        birth_date: Some("2021-05-20".to_string()),
        class_id: None,
        parent_name: Some("王强".to_string()),
        parent_phone: Some("13912345678".to_string()),
        parent_email: None,
        address: None,
    }
}

#[actix_rt::test]
async fn create_rejects_invalid_phone() {
    let repos = Repos::new();

    let mut request = create_request();
    request.parent_phone = Some("0571-1234567".to_string());
    let err = repos
        .service()
        .create(request)
        .await
        .expect_err("landline format must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn create_requires_existing_class() {
    let repos = Repos::new();

    let mut request = create_request();
    request.class_id = Some(42);
    let err = repos
        .service()
        .create(request)
        .await
        .expect_err("unknown class must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[actix_rt::test]
async fn list_filters_by_age_range() {
    let repos = Repos::new();
    repos.push_student_aged_months(1, 66); // five and a half
    repos.push_student_aged_months(2, 30); // two and a half
    repos.push_student_aged_months(3, 100); // past eight

    let result = repos
        .service()
        .list(&list_query(Some(4), Some(6)))
        .await
        .expect("list should succeed");

    assert_eq!(result.total, 1);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].id, 1);
}

#[actix_rt::test]
async fn age_filter_counts_match_the_page() {
    let repos = Repos::new();
    repos.push_student_aged_months(1, 66);
    repos.push_student_aged_months(2, 70);
    repos.push_student_aged_months(3, 30);

    let mut query = list_query(Some(5), None);
    query.page_size = 1;
    let result = repos
        .service()
        .list(&query)
        .await
        .expect("list should succeed");

    assert_eq!(result.total, 2);
    assert_eq!(result.items.len(), 1);
}

#[actix_rt::test]
async fn negative_age_is_rejected() {
    let repos = Repos::new();

    let err = repos
        .service()
        .list(&list_query(Some(-1), None))
        .await
        .expect_err("negative age makes no sense");
    assert!(matches!(err, AppError::BadRequest(_)));
}
