use actix_web::{get, post, web, Responder};
use validator::Validate;

use crate::{
    auth::{AuthResponse, AuthenticatedUser, LoginRequest, RegisterRequest},
    error::AppError,
    services::IdentityService,
};

use super::ApiResponse;

/// Register a new user
///
/// Creates the account and returns its public view. No token is issued; the client
/// logs in separately.
///
/// ## Responses:
/// - `201 Created`: `{ id, name, username }`.
/// - `409 Conflict`: The username is already registered.
/// - `422 Unprocessable Entity`: Field validation failed.
#[post("/register")]
pub async fn register(
    identity: web::Data<IdentityService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = identity
        .register(
            &register_data.name,
            &register_data.username,
            &register_data.password,
        )
        .await?;

    Ok(ApiResponse::created(user))
}

/// Login user
///
/// Verifies the credentials and returns a bearer token plus the public user view.
/// An unknown username and a wrong password produce the same `401`.
#[post("/login")]
pub async fn login(
    identity: web::Data<IdentityService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let (token, user) = identity
        .login(&login_data.username, &login_data.password)
        .await?;

    Ok(ApiResponse::ok(AuthResponse { token, user }))
}

/// The caller's own public profile.
#[get("/profile")]
pub async fn profile(
    identity: web::Data<IdentityService>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = identity.who_am_i(caller.user_id).await?;
    Ok(ApiResponse::ok(user))
}
