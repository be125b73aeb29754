/// Authentication Routes
///
/// Thin HTTP wrappers over `AuthService`; status codes come from the
/// `ResponseError` impl of `AppError`.

use actix_web::{web, HttpResponse};

use crate::auth::{AuthService, LoginRequest, RefreshRequest, RegisterRequest};
use crate::error::AppError;
use crate::users::{User, UserProfile};

/// POST /auth/register
///
/// # Errors
/// - 400: invalid email, weak password or bad name
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let profile = service.register(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// POST /auth/login
///
/// # Errors
/// - 401: invalid credentials (unknown email or wrong password)
/// - 403: account is inactive
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = service.login(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// POST /auth/refresh
///
/// # Errors
/// - 401: invalid or expired token, or an access token was sent
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = service.refresh(&form.refresh_token)?;
    Ok(HttpResponse::Ok().json(pair))
}

/// GET /auth/me
///
/// **Requires a valid access token**; the user is injected by
/// `JwtMiddleware`.
pub async fn current_user(user: web::ReqData<User>) -> HttpResponse {
    HttpResponse::Ok().json(UserProfile::from(user.into_inner()))
}
