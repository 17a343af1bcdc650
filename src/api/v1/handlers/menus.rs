/*
 * Responsibility
 * - menu CRUD handler
 * - 書き込みは /m/{username}/menus 配下 (merchant 本人のみ)
 * - 読み取りは /menus/{menu_id} (公開)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::menus::{CreateMenuRequest, MenuResponse, UpdateMenuRequest},
        extractors::CurrentPrincipal,
    },
    error::AppError,
    state::AppState,
};

pub async fn get_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<MenuResponse>, AppError> {
    let row = state.menus.get(menu_id).await?;
    Ok(Json(row.into()))
}

pub async fn create_menu(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(username): Path<String>,
    Json(req): Json<CreateMenuRequest>,
) -> Result<(StatusCode, Json<MenuResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state.menus.create(&principal, &username, req.into()).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_menu(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path((username, menu_id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateMenuRequest>,
) -> Result<Json<MenuResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .menus
        .update(&principal, &username, menu_id, req.into())
        .await?;

    Ok(Json(row.into()))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path((username, menu_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.menus.delete(&principal, &username, menu_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
