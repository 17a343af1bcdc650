/*
 * Responsibility
 * - driver profile の作成 / 取得 / 部分更新
 * - merchants と同じ認可順序 (role -> path username -> DB)
 */
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::{DriverRepo, DriverRow};
use crate::services::auth::{Principal, Role};
use crate::services::authz;
use crate::services::patch::{PatchError, UpdateBuilder, UpdateCommand};

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub license: String,
    pub area: String,
}

#[derive(Debug, Clone, Default)]
pub struct DriverPatch {
    pub name: Option<String>,
    pub license: Option<String>,
    pub area: Option<String>,
}

impl DriverPatch {
    pub fn into_command(self, driver_id: Uuid, user_id: Uuid) -> Result<UpdateCommand, PatchError> {
        UpdateBuilder::new("drivers")
            .set("name", self.name)
            .set("license", self.license)
            .set("area", self.area)
            .filter("driver_id", driver_id)
            .owned_by("user_id", user_id)
    }
}

#[derive(Clone)]
pub struct DriverService {
    drivers: Arc<dyn DriverRepo>,
}

impl DriverService {
    pub fn new(drivers: Arc<dyn DriverRepo>) -> Self {
        Self { drivers }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        path_username: &str,
        input: NewDriver,
    ) -> Result<DriverRow, AppError> {
        authz::require_role(principal, Role::Driver)?;
        authz::require_same_user(principal, path_username)?;

        let exists = self
            .drivers
            .exists_for(principal.user_id(), principal.username())
            .await?;
        authz::ensure_absent(exists, "driver")?;

        let row = DriverRow {
            driver_id: Uuid::new_v4(),
            name: input.name,
            rating: 0.0,
            license: input.license,
            area: input.area,
            income: 0,
            user_id: principal.user_id(),
            username: principal.username().to_string(),
        };
        self.drivers
            .create(&row)
            .await
            .map_err(|e| AppError::from_repo(e, "driver"))?;

        info!(driver_id = %row.driver_id, username = %row.username, "driver created");
        Ok(row)
    }

    pub async fn get(&self, username: &str) -> Result<DriverRow, AppError> {
        self.drivers
            .find_by_username(username)
            .await?
            .ok_or(AppError::not_found("driver"))
    }

    pub async fn update(
        &self,
        principal: &Principal,
        path_username: &str,
        patch: DriverPatch,
    ) -> Result<DriverRow, AppError> {
        authz::require_role(principal, Role::Driver)?;
        authz::require_same_user(principal, path_username)?;

        let linked = self.drivers.find_id_by_user(principal.user_id()).await?;
        let driver_id = authz::require_owned(linked, principal, "driver")?;

        let cmd = patch.into_command(driver_id, principal.user_id())?;
        self.drivers
            .update(&cmd)
            .await
            .map_err(|e| AppError::from_repo(e, "driver"))?
            .ok_or(AppError::not_found("driver"))
    }
}

impl std::fmt::Debug for DriverService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverService").finish_non_exhaustive()
    }
}
