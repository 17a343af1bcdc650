use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::drivers::{CreateDriverRequest, DriverResponse, UpdateDriverRequest},
        extractors::CurrentPrincipal,
    },
    error::AppError,
    state::AppState,
};

pub async fn get_driver(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DriverResponse>, AppError> {
    let row = state.drivers.get(&username).await?;
    Ok(Json(row.into()))
}

pub async fn create_driver(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(username): Path<String>,
    Json(req): Json<CreateDriverRequest>,
) -> Result<(StatusCode, Json<DriverResponse>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .drivers
        .create(&principal, &username, req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_driver(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(username): Path<String>,
    Json(req): Json<UpdateDriverRequest>,
) -> Result<Json<DriverResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let row = state
        .drivers
        .update(&principal, &username, req.into())
        .await?;

    Ok(Json(row.into()))
}
