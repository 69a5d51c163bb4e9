mod common;

use std::sync::Arc;

use kindergarten_backend::api::dtos::LoginRequest;
use kindergarten_backend::application::AuthService;
use kindergarten_backend::config::AuthConfig;
use kindergarten_backend::domain::{Role, UserStatus};
use kindergarten_backend::error::AppError;

use common::fixtures;
use common::mocks::{MockPermissionRepo, MockSessionRepo, MockUserRepo};

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-not-for-production".to_string(),
        jwt_kid: "v1".to_string(),
        previous_jwt_secrets: vec![],
        previous_jwt_kids: vec![],
        jwt_expiration_seconds: 3600,
        refresh_token_expiration_days: 30,
        issuer: "kindergarten-backend".to_string(),
        audience: "kindergarten-clients".to_string(),
    }
}

struct Repos {
    users: Arc<MockUserRepo>,
    sessions: Arc<MockSessionRepo>,
    permissions: Arc<MockPermissionRepo>,
}

impl Repos {
    fn new() -> Self {
        Self {
            users: Arc::new(MockUserRepo::default()),
            sessions: Arc::new(MockSessionRepo::default()),
            permissions: Arc::new(MockPermissionRepo::default()),
        }
    }

    fn service(&self) -> AuthService {
        AuthService::new(
            self.users.clone(),
            self.sessions.clone(),
            self.permissions.clone(),
            auth_config(),
        )
    }
}

fn login_request(username: Option<&str>, email: Option<&str>, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.map(String::from),
        email: email.map(String::from),
        password: Some(password.to_string()),
    }
}

#[actix_rt::test]
async fn login_requires_account_field() {
    let repos = Repos::new();

    let err = repos
        .service()
        .login(login_request(None, None, "secret123"), None)
        .await
        .expect_err("no username or email");
    assert!(matches!(err, AppError::MissingFields(_)));
}

#[actix_rt::test]
async fn login_rejects_malformed_email() {
    let repos = Repos::new();

    let err = repos
        .service()
        .login(login_request(None, Some("not-an-email"), "secret123"), None)
        .await
        .expect_err("bad email shape");
    assert!(matches!(err, AppError::InvalidEmailFormat));
}

#[actix_rt::test]
async fn login_rejects_short_password() {
    let repos = Repos::new();

    let err = repos
        .service()
        .login(login_request(Some("user1"), None, "12345"), None)
        .await
        .expect_err("five chars is too short");
    assert!(matches!(err, AppError::PasswordTooShort));
}

#[actix_rt::test]
async fn login_with_wrong_password_is_unauthorized() {
    let repos = Repos::new();
    repos.users.push(fixtures::user(1, Role::Teacher, "secret123"));

    let err = repos
        .service()
        .login(login_request(Some("user1"), None, "wrong-pass"), None)
        .await
        .expect_err("wrong password");
    assert!(matches!(err, AppError::Unauthorized));
}

#[actix_rt::test]
async fn login_rejects_disabled_account() {
    let repos = Repos::new();
    let mut user = fixtures::user(1, Role::Teacher, "secret123");
    user.status = UserStatus::Disabled;
    repos.users.push(user);

    let err = repos
        .service()
        .login(login_request(Some("user1"), None, "secret123"), None)
        .await
        .expect_err("disabled account");
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[actix_rt::test]
async fn login_returns_tokens_and_permissions() {
    let repos = Repos::new();
    repos.users.push(fixtures::user(1, Role::Teacher, "secret123"));

    let response = repos
        .service()
        .login(login_request(Some("user1"), None, "secret123"), None)
        .await
        .expect("login should succeed");

    assert!(!response.token.is_empty());
    assert!(!response.refresh_token.is_empty());
    assert_eq!(response.user.id, 1);
    assert!(response.permissions.contains(&"student:read".to_string()));
    assert_eq!(repos.sessions.sessions.lock().unwrap().len(), 1);
}

#[actix_rt::test]
async fn login_by_email_works() {
    let repos = Repos::new();
    repos.users.push(fixtures::user(1, Role::Parent, "secret123"));

    let response = repos
        .service()
        .login(
            login_request(None, Some("user1@example.com"), "secret123"),
            None,
        )
        .await
        .expect("email login should succeed");
    assert_eq!(response.user.username, "user1");
}

#[actix_rt::test]
async fn refresh_rotates_the_session() {
    let repos = Repos::new();
    repos.users.push(fixtures::user(1, Role::Teacher, "secret123"));
    let svc = repos.service();

    let login = svc
        .login(login_request(Some("user1"), None, "secret123"), None)
        .await
        .expect("login");

    let refreshed = svc
        .refresh(&login.refresh_token, None)
        .await
        .expect("refresh should succeed");
    assert_ne!(refreshed.refresh_token, login.refresh_token);

    let sessions = repos.sessions.sessions.lock().unwrap();
    assert_eq!(sessions.len(), 2);
    let old = sessions.iter().find(|s| s.revoked_at.is_some()).expect("rotated session");
    assert_eq!(old.revoked_reason.as_deref(), Some("rotated"));
    assert!(old.replaced_by.is_some());
}

#[actix_rt::test]
async fn replayed_refresh_token_kills_the_family() {
    let repos = Repos::new();
    repos.users.push(fixtures::user(1, Role::Teacher, "secret123"));
    let svc = repos.service();

    let login = svc
        .login(login_request(Some("user1"), None, "secret123"), None)
        .await
        .expect("login");
    svc.refresh(&login.refresh_token, None).await.expect("first refresh");

    let err = svc
        .refresh(&login.refresh_token, None)
        .await
        .expect_err("replay must be rejected");
    assert!(matches!(err, AppError::Unauthorized));

    let sessions = repos.sessions.sessions.lock().unwrap();
    assert!(sessions.iter().all(|s| s.revoked_at.is_some()));
}

#[actix_rt::test]
async fn logout_revokes_the_session() {
    let repos = Repos::new();
    repos.users.push(fixtures::user(1, Role::Teacher, "secret123"));
    let svc = repos.service();

    let login = svc
        .login(login_request(Some("user1"), None, "secret123"), None)
        .await
        .expect("login");
    svc.logout(&login.refresh_token).await.expect("logout");

    let err = svc
        .refresh(&login.refresh_token, None)
        .await
        .expect_err("revoked token cannot refresh");
    assert!(matches!(err, AppError::Unauthorized));
}
