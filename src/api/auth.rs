//! Authentication endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    error::AppResult,
    models::user::{AuthPayload, LoginUser, RegisterUser, User},
    AppState,
};

use super::{bearer_token, extract::AppJson, AuthenticatedUser};

/// Register a new account.
///
/// Anonymous callers may register Members. Registering an Admin needs an admin
/// token unless `auth.allow_admin_registration` is set.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = AuthPayload),
        (status = 400, description = "Invalid input or email already in use", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role requested by a non-admin", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<RegisterUser>,
) -> AppResult<(StatusCode, Json<AuthPayload>)> {
    let identity = state.services.auth.identify(bearer_token(&headers)).await?;
    let payload = state.services.auth.register(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Login successful", body = AuthPayload),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginUser>,
) -> AppResult<Json<AuthPayload>> {
    let payload = state.services.auth.login(request).await?;
    Ok(Json(payload))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.me(&identity).await?;
    Ok(Json(user))
}
