/*
 * Responsibility
 * - register / login / 公開プロフィール
 * - どれも認証不要 (access middleware の外)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::dto::users::{
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse,
    },
    error::AppError,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let input = req.into_new_user().map_err(AppError::validation)?;
    let row = state.users.register(input).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;
    let issued = state.users.login(&req.username, &req.password).await?;

    Ok(Json(issued.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let row = state.users.profile(&username).await?;
    Ok(Json(row.into()))
}
