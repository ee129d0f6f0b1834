//! Registration, login and current-user handlers

use crate::domain::{AuthResponse, LoginInput, RegisterUserInput, UserDto};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::state::HasServices;
use axum::{extract::State, response::IntoResponse, Json};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserInput,
    responses(
        (status = 200, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failure, duplicate email or invalid role")
    )
)]
pub async fn register<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<RegisterUserInput>,
) -> Result<impl IntoResponse> {
    let response = state.auth_service().register(input).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse> {
    let response = state.auth_service().login(input).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn me<S: HasServices>(
    State(state): State<S>,
    auth: AuthUser,
) -> Result<impl IntoResponse> {
    let user = state
        .auth_service()
        .get_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
