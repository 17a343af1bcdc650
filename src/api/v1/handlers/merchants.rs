/*
 * Responsibility
 * - /m/{username} の merchant profile
 * - POST / PATCH は access middleware 配下。Principal を明示的に service へ渡す
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::merchants::{CreateMerchantRequest, MerchantResponse, UpdateMerchantRequest},
        extractors::CurrentPrincipal,
    },
    error::AppError,
    state::AppState,
};

pub async fn get_merchant(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MerchantResponse>, AppError> {
    let row = state.merchants.get(&username).await?;
    Ok(Json(row.into()))
}

pub async fn create_merchant(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(username): Path<String>,
    Json(req): Json<CreateMerchantRequest>,
) -> Result<(StatusCode, Json<MerchantResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .merchants
        .create(&principal, &username, req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_merchant(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(username): Path<String>,
    Json(req): Json<UpdateMerchantRequest>,
) -> Result<Json<MerchantResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .merchants
        .update(&principal, &username, req.into())
        .await?;

    Ok(Json(row.into()))
}
