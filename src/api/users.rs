//! User listing endpoint

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{permission::Permission, user::User},
};

use super::AuthenticatedUser;

/// List portal users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing users.view")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require(Permission::UsersView)?;

    let users = state.services.auth.list_users()?;
    Ok(Json(users))
}
