use actix_web::FromRequest;
use actix_web::{HttpRequest, dev::Payload, web};
use std::future::Future;
use std::pin::Pin;

use crate::auth::authorization::Caller;
use crate::auth::jwt::AuthSettings;
use crate::db::Store;
use crate::db::users::get_user_by_id;
use crate::error::AppError;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Extractor that fails closed with 401 unless the request carries a valid
/// token for an existing user.
pub struct AuthenticatedUser(pub Caller);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Cookie first, then the Authorization header.
            let token = request_token(&req).ok_or_else(|| {
                AppError::Unauthenticated("Not authorized, no token provided".to_string())
            })?;

            // 2. Shared state.
            let settings = req.app_data::<web::Data<AuthSettings>>().ok_or_else(|| {
                AppError::Internal("Auth settings not configured".to_string())
            })?;
            let store = req
                .app_data::<web::Data<Store>>()
                .ok_or_else(|| AppError::Internal("Store not configured".to_string()))?;

            // 3. Verify and resolve.
            let caller = resolve_caller(store.get_ref(), settings.get_ref(), &token).await?;
            Ok(AuthenticatedUser(caller))
        })
    }
}

/// Pull the raw token from the `token` cookie or a `Bearer` header.
pub fn request_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Verify `token` and load the user it names.
pub async fn resolve_caller(
    store: &Store,
    settings: &AuthSettings,
    token: &str,
) -> Result<Caller, AppError> {
    let claims = settings.validate(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected credential");
        AppError::Unauthenticated("Not authorized, token invalid".to_string())
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Unauthenticated("Not authorized, token invalid".to_string()))?;

    let user = store
        .run(async { get_user_by_id(store.conn(), user_id).await.map_err(AppError::from) })
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, user not found".to_string()))?;

    Ok(Caller::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn cookie_takes_precedence_over_header() {
        let req = TestRequest::default()
            .cookie(Cookie::new(TOKEN_COOKIE, "from-cookie"))
            .insert_header(("Authorization", "Bearer from-header"))
            .to_http_request();
        assert_eq!(request_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(request_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn ignores_other_schemes_and_empty_values() {
        let req = TestRequest::default()
            .cookie(Cookie::new(TOKEN_COOKIE, ""))
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(request_token(&req), None);
    }
}
