//! Integration tests for the authentication service using in-memory
//! SurrealDB repositories.

use std::sync::Arc;

use chrono::{Duration, Utc};
use domus_auth::config::AuthConfig;
use domus_auth::service::{AuthService, LoginInput, RegisterInput};
use domus_core::clock::{Clock, FixedClock};
use domus_core::error::DomusError;
use domus_core::models::user::Role;
use domus_db::repository::{SurrealSessionRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

type TestAuthService =
    AuthService<SurrealUserRepository<Db>, SurrealSessionRepository<Db>, FixedClock>;

fn test_config() -> AuthConfig {
    AuthConfig {
        session_lifetime_secs: 3600,
        pepper: None,
        min_password_length: 8,
    }
}

async fn setup() -> TestAuthService {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domus_db::run_migrations(&db).await.unwrap();

    AuthService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealSessionRepository::new(db),
        FixedClock::at(Utc::now()),
        test_config(),
    )
}

fn registration(email: &str) -> RegisterInput {
    RegisterInput {
        name: "Ada".into(),
        surname: "Lovelace".into(),
        email: email.into(),
        password: "correct horse".into(),
        role: Role::User,
    }
}

#[tokio::test]
async fn register_and_login() {
    let auth = setup().await;

    let user = auth.register(registration("ada@example.com")).await.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_ne!(user.password_hash, "correct horse");

    let out = auth
        .login(LoginInput {
            email: "ada@example.com".into(),
            password: "correct horse".into(),
            ip: None,
            device_info: None,
        })
        .await
        .unwrap();
    assert!(!out.token.is_empty());
    assert_eq!(out.expires_in, 3600);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let auth = setup().await;

    auth.register(registration("dup@example.com")).await.unwrap();
    let result = auth.register(registration("dup@example.com")).await;
    assert!(matches!(result, Err(DomusError::Conflict { .. })));
}

#[tokio::test]
async fn register_rejects_short_password() {
    let auth = setup().await;

    let mut input = registration("short@example.com");
    input.password = "short".into();
    let result = auth.register(input).await;
    assert!(matches!(result, Err(DomusError::InvalidInput { .. })));
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let auth = setup().await;
    auth.register(registration("pw@example.com")).await.unwrap();

    let result = auth
        .login(LoginInput {
            email: "pw@example.com".into(),
            password: "not the password".into(),
            ip: None,
            device_info: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(DomusError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn login_rejects_unknown_email() {
    let auth = setup().await;

    let result = auth
        .login(LoginInput {
            email: "nobody@example.com".into(),
            password: "whatever!".into(),
            ip: None,
            device_info: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(DomusError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn authenticate_resolves_principal() {
    let auth = setup().await;
    let user = auth.register(registration("who@example.com")).await.unwrap();

    let out = auth
        .login(LoginInput {
            email: "who@example.com".into(),
            password: "correct horse".into(),
            ip: None,
            device_info: None,
        })
        .await
        .unwrap();

    let principal = auth.authenticate(&out.token).await.unwrap();
    assert_eq!(principal.user_id, user.id);
    assert_eq!(principal.role, Role::User);
}

#[tokio::test]
async fn authenticate_rejects_garbage_token() {
    let auth = setup().await;

    let result = auth.authenticate("not-a-real-token").await;
    assert!(matches!(
        result,
        Err(DomusError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn expired_session_is_rejected_and_removed() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domus_db::run_migrations(&db).await.unwrap();

    let clock = Arc::new(FixedClock::at(Utc::now()));
    let session_repo = SurrealSessionRepository::new(db.clone());
    let auth = AuthService::new(
        SurrealUserRepository::new(db),
        session_repo.clone(),
        Arc::clone(&clock),
        test_config(),
    );

    auth.register(registration("exp@example.com")).await.unwrap();
    let out = auth
        .login(LoginInput {
            email: "exp@example.com".into(),
            password: "correct horse".into(),
            ip: None,
            device_info: None,
        })
        .await
        .unwrap();

    // Two hours past a one-hour lifetime.
    clock.set(Utc::now() + Duration::hours(2));

    let result = auth.authenticate(&out.token).await;
    assert!(matches!(
        result,
        Err(DomusError::AuthenticationFailed { .. })
    ));

    // The expired session was deleted, not merely rejected.
    use domus_auth::token::hash_session_token;
    use domus_core::repository::SessionRepository;
    assert!(
        session_repo
            .get_by_token_hash(&hash_session_token(&out.token))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn logout_closes_the_session() {
    let auth = setup().await;
    auth.register(registration("out@example.com")).await.unwrap();

    let out = auth
        .login(LoginInput {
            email: "out@example.com".into(),
            password: "correct horse".into(),
            ip: None,
            device_info: None,
        })
        .await
        .unwrap();

    auth.authenticate(&out.token).await.unwrap();
    auth.logout(&out.token).await.unwrap();

    let result = auth.authenticate(&out.token).await;
    assert!(matches!(
        result,
        Err(DomusError::AuthenticationFailed { .. })
    ));
}

#[tokio::test]
async fn change_password_invalidates_sessions() {
    let auth = setup().await;
    let user = auth.register(registration("cp@example.com")).await.unwrap();

    let out = auth
        .login(LoginInput {
            email: "cp@example.com".into(),
            password: "correct horse".into(),
            ip: None,
            device_info: None,
        })
        .await
        .unwrap();

    auth.change_password(user.id, "correct horse", "battery staple")
        .await
        .unwrap();

    // Old session is gone.
    let result = auth.authenticate(&out.token).await;
    assert!(matches!(
        result,
        Err(DomusError::AuthenticationFailed { .. })
    ));

    // Old password no longer works, new one does.
    assert!(
        auth.login(LoginInput {
            email: "cp@example.com".into(),
            password: "correct horse".into(),
            ip: None,
            device_info: None,
        })
        .await
        .is_err()
    );
    auth.login(LoginInput {
        email: "cp@example.com".into(),
        password: "battery staple".into(),
        ip: None,
        device_info: None,
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn logout_all_counts_sessions() {
    let auth = setup().await;
    let user = auth.register(registration("all@example.com")).await.unwrap();

    for _ in 0..3 {
        auth.login(LoginInput {
            email: "all@example.com".into(),
            password: "correct horse".into(),
            ip: None,
            device_info: None,
        })
        .await
        .unwrap();
    }

    let closed = auth.logout_all(user.id).await.unwrap();
    assert_eq!(closed, 3);
}
