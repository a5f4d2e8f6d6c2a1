//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        permission::Permission,
        user::{Role, User},
    },
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: User,
}

/// Permissions of the current user
#[derive(Serialize, ToSchema)]
pub struct PermissionsResponse {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Log in with e-mail and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .auth
        .authenticate(&request.email, &request.password)?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours * 3600,
        user,
    }))
}

/// Get the current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.get_user(&claims.user_id)?;
    Ok(Json(user))
}

/// Get the role and permissions of the current user
#[utoipa::path(
    get,
    path = "/auth/permissions",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Granted permissions", body = PermissionsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn permissions(
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<PermissionsResponse>> {
    Ok(Json(PermissionsResponse {
        role: claims.role,
        permissions: claims.permissions().list(),
    }))
}
