use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{HttpResponse, web};

use crate::auth::jwt::AuthSettings;
use crate::auth::middleware::{AuthenticatedUser, TOKEN_COOKIE};
use crate::db::Store;
use crate::error::AppError;
use crate::models::users::{LoginUser, RegisterUser};
use crate::services::accounts;

fn session_cookie(settings: &AuthSettings, token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(settings.ttl.as_secs() as i64))
        .finish()
}

/// POST /auth/register: create an account.
pub async fn register(
    store: web::Data<Store>,
    body: web::Json<RegisterUser>,
) -> Result<HttpResponse, AppError> {
    let user = accounts::register(store.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "User registered successfully",
        "user": user,
    })))
}

/// POST /auth/login: verify credentials and set the session cookie.
pub async fn login(
    store: web::Data<Store>,
    settings: web::Data<AuthSettings>,
    body: web::Json<LoginUser>,
) -> Result<HttpResponse, AppError> {
    let session = accounts::login(store.get_ref(), settings.get_ref(), body.into_inner()).await?;
    let cookie = session_cookie(settings.get_ref(), session.token.clone());

    Ok(HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "success": true,
        "message": "Login successful",
        "user": session.user,
        "token": session.token,
    })))
}

/// POST /auth/logout: clear the session cookie.
pub async fn logout(settings: web::Data<AuthSettings>) -> HttpResponse {
    let mut cookie = session_cookie(settings.get_ref(), String::new());
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}

/// GET /auth/me: the currently authenticated user.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user.0,
    }))
}
