//! Registration and login through the service layer.
//!
//! Run with: `cargo test --test accounts_test`
mod common;

use std::time::Duration;

use gigboard_backend::AppError;
use gigboard_backend::auth::jwt::AuthSettings;
use gigboard_backend::models::users::{LoginUser, RegisterUser};
use gigboard_backend::services::accounts;

fn settings() -> AuthSettings {
    AuthSettings::new(common::TEST_SECRET, Duration::from_secs(3600), false)
}

fn registration(name: &str, email: &str) -> RegisterUser {
    RegisterUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
    }
}

fn login(email: &str, password: &str) -> LoginUser {
    LoginUser {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn registered_user_can_log_in() {
    let store = common::store().await;

    let user = accounts::register(&store, registration("  Hana  ", "Hana@Example.com"))
        .await
        .unwrap();
    assert_eq!(user.name, "Hana");
    assert_eq!(user.email, "hana@example.com");

    let session = accounts::login(&store, &settings(), login(" HANA@example.com ", "hunter22"))
        .await
        .unwrap();
    assert_eq!(session.user.id, user.id);
    assert_eq!(
        settings().validate(&session.token).unwrap().user_id().unwrap(),
        user.id
    );
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_alike() {
    let store = common::store().await;
    accounts::register(&store, registration("Ivo", "ivo@example.com"))
        .await
        .unwrap();

    for attempt in [
        login("ivo@example.com", "not-the-password"),
        login("nobody@example.com", "hunter22"),
    ] {
        let err = accounts::login(&store, &settings(), attempt).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(ref m) if m == "Invalid email or password"));
    }
}

#[tokio::test]
async fn email_can_only_be_registered_once() {
    let store = common::store().await;
    accounts::register(&store, registration("Jo", "jo@example.com"))
        .await
        .unwrap();

    let err = accounts::register(&store, registration("Jo Again", "JO@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn invalid_registration_is_rejected_before_any_write() {
    let store = common::store().await;

    let err = accounts::register(&store, registration("", "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref errors) if errors.len() == 2));

    let err = accounts::login(&store, &settings(), login("not-an-email", "hunter22"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));

    let err = accounts::login(&store, &settings(), login("", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref errors) if errors.len() == 2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parallel_registrations_all_succeed() {
    let (store, _dir) = common::shared_store(4).await;

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let input = registration(&format!("User{i}"), &format!("user{i}@example.com"));
                accounts::register(&store, input).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    for i in 0..4 {
        accounts::login(
            &store,
            &settings(),
            login(&format!("user{i}@example.com"), "hunter22"),
        )
        .await
        .unwrap();
    }
}
