use tracing::instrument;

use crate::auth::jwt::AuthSettings;
use crate::auth::passwords::{hash_password, verify_password};
use crate::db::users as user_db;
use crate::db::{Store, is_unique_violation};
use crate::error::AppError;
use crate::models::users::{LoginUser, RegisterUser, UserResponse};
use crate::services::ensure_valid;

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginSession {
    pub user: UserResponse,
    pub token: String,
}

const BAD_LOGIN: &str = "Invalid email or password";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Run Argon2 work on tokio's blocking pool.
async fn off_runtime<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {e}")))?
}

/// Create an account. The email is stored lower-cased and must be unused.
#[instrument(skip_all, fields(email = %input.email.trim()))]
pub async fn register(store: &Store, input: RegisterUser) -> Result<UserResponse, AppError> {
    ensure_valid(&input)?;

    let email = normalize_email(&input.email);
    let name = input.name.trim().to_string();
    let password = input.password;
    let password_hash = off_runtime(move || hash_password(&password)).await?;

    let user = store
        .run(async {
            if user_db::get_user_by_email(store.conn(), &email).await?.is_some() {
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
            user_db::insert_user(store.conn(), name, email.clone(), password_hash)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::Conflict("Email is already registered".to_string())
                    } else {
                        AppError::from(e)
                    }
                })
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(UserResponse::from(user))
}

/// Check credentials and issue a session token. Unknown email and wrong
/// password fail identically.
#[instrument(skip_all, fields(email = %input.email.trim()))]
pub async fn login(
    store: &Store,
    settings: &AuthSettings,
    input: LoginUser,
) -> Result<LoginSession, AppError> {
    ensure_valid(&input)?;

    let email = normalize_email(&input.email);
    let user = store
        .run(async {
            user_db::get_user_by_email(store.conn(), &email)
                .await
                .map_err(AppError::from)
        })
        .await?
        .ok_or_else(|| AppError::Unauthenticated(BAD_LOGIN.to_string()))?;

    let stored_hash = user.password_hash.clone();
    let candidate = input.password;
    if !off_runtime(move || verify_password(&stored_hash, &candidate)).await? {
        return Err(AppError::Unauthenticated(BAD_LOGIN.to_string()));
    }

    let token = settings.issue(user.id).map_err(AppError::Internal)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(LoginSession {
        user: UserResponse::from(user),
        token,
    })
}
