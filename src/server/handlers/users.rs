//! HTTP handlers for staff accounts and authentication

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::core::auth::AuthUser;
use crate::core::error::ApiError;
use crate::core::extractors::ValidatedJson;
use crate::domain::user::{
    ChangePasswordRequest, CreateUserRequest, LoginRequest, LoginResponse, UpdateProfileRequest,
    UpdateUserRequest, User, UserView,
};
use crate::server::AppState;
use crate::storage::UserStore;

/// POST /api/users/login — public
///
/// Verifies credentials, rejects inactive accounts, and issues a bearer
/// token. Unknown emails and wrong passwords get the same answer.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !user.verify_password(&payload.password) {
        return Err(ApiError::unauthorized("invalid credentials"));
    }
    if !user.active {
        return Err(ApiError::unauthorized("inactive user"));
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(LoginResponse {
        user: user.into(),
        token,
    }))
}

/// GET /api/users/profile
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserView>, ApiError> {
    let user = state
        .users
        .get(&auth.id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", auth.id))?;
    Ok(Json(user.into()))
}

/// PUT /api/users/profile
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserView>, ApiError> {
    let mut user = state
        .users
        .get(&auth.id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", auth.id))?;
    user.apply_profile(payload);

    let updated = state
        .users
        .update(&auth.id, user)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", auth.id))?;
    Ok(Json(updated.into()))
}

/// PATCH /api/users/profile/password
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut user = state
        .users
        .get(&auth.id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", auth.id))?;

    if !user.verify_password(&payload.current_password) {
        return Err(ApiError::unauthorized("current password is incorrect"));
    }

    user.set_password(&payload.new_password)
        .map_err(ApiError::from)?;
    state
        .users
        .update(&auth.id, user)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", auth.id))?;

    Ok(Json(json!({ "message": "password updated" })))
}

/// POST /api/users — admin only
pub async fn create_user(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    auth.require_admin()?;

    let user = User::new(payload).map_err(ApiError::from)?;
    let created = state.users.create(user).await.map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/users — admin only
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    auth.require_admin()?;

    let users = state.users.list().await.map_err(ApiError::from)?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// GET /api/users/{id} — self or admin
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    auth.require_self_or_admin(id)?;

    let user = state
        .users
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    Ok(Json(user.into()))
}

/// PUT /api/users/{id} — admin only
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    auth.require_admin()?;

    let mut user = state
        .users
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    user.apply(payload).map_err(ApiError::from)?;

    let updated = state
        .users
        .update(&id, user)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    Ok(Json(updated.into()))
}

/// PATCH /api/users/{id}/toggle-active — admin only
pub async fn toggle_active(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    auth.require_admin()?;

    let mut user = state
        .users
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    user.toggle_active();

    let updated = state
        .users
        .update(&id, user)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    Ok(Json(updated.into()))
}

/// DELETE /api/users/{id} — admin only
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    if state.users.delete(&id).await.map_err(ApiError::from)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("user", id))
    }
}
