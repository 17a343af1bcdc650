/*
 * Responsibility
 * - menu の作成 / 取得 / 部分更新 / 削除
 * - 所有者キーは caller の merchant_id (user_id から解決)
 * - 更新/削除は menu_id AND merchant_id で絞る (他人の menu には触れない)
 */
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::{MenuRepo, MenuRow, MerchantRepo};
use crate::services::auth::{Principal, Role};
use crate::services::authz;
use crate::services::patch::{PatchError, UpdateBuilder, UpdateCommand};

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub name: String,
    pub price: i64,
    pub description: String,
    pub category: String,
    pub stock: i32,
}

#[derive(Debug, Clone, Default)]
pub struct MenuPatch {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
}

impl MenuPatch {
    pub fn into_command(self, menu_id: Uuid, merchant_id: Uuid) -> Result<UpdateCommand, PatchError> {
        UpdateBuilder::new("menus")
            .set("name", self.name)
            .set("price", self.price)
            .set("category", self.category)
            .set("description", self.description)
            .set("stock", self.stock)
            .filter("menu_id", menu_id)
            .owned_by("merchant_id", merchant_id)
    }
}

#[derive(Clone)]
pub struct MenuService {
    menus: Arc<dyn MenuRepo>,
    merchants: Arc<dyn MerchantRepo>,
}

impl MenuService {
    pub fn new(menus: Arc<dyn MenuRepo>, merchants: Arc<dyn MerchantRepo>) -> Self {
        Self { menus, merchants }
    }

    /// role -> path username -> linked merchant profile.
    async fn owning_merchant(
        &self,
        principal: &Principal,
        path_username: &str,
    ) -> Result<Uuid, AppError> {
        authz::require_role(principal, Role::Merchant)?;
        authz::require_same_user(principal, path_username)?;

        let linked = self.merchants.find_id_by_user(principal.user_id()).await?;
        authz::require_owned(linked, principal, "merchant")
    }

    pub async fn create(
        &self,
        principal: &Principal,
        path_username: &str,
        input: NewMenu,
    ) -> Result<MenuRow, AppError> {
        let merchant_id = self.owning_merchant(principal, path_username).await?;

        let row = MenuRow {
            menu_id: Uuid::new_v4(),
            name: input.name,
            price: input.price,
            description: input.description,
            category: input.category,
            rating: 0.0,
            stock: input.stock,
            merchant_id,
        };
        self.menus
            .create(&row)
            .await
            .map_err(|e| AppError::from_repo(e, "menu"))?;

        info!(menu_id = %row.menu_id, %merchant_id, "menu created");
        Ok(row)
    }

    pub async fn get(&self, menu_id: Uuid) -> Result<MenuRow, AppError> {
        self.menus
            .find(menu_id)
            .await?
            .ok_or(AppError::not_found("menu"))
    }

    pub async fn update(
        &self,
        principal: &Principal,
        path_username: &str,
        menu_id: Uuid,
        patch: MenuPatch,
    ) -> Result<MenuRow, AppError> {
        let merchant_id = self.owning_merchant(principal, path_username).await?;

        let cmd = patch.into_command(menu_id, merchant_id)?;
        self.menus
            .update(&cmd)
            .await?
            .ok_or(AppError::not_found("menu"))
    }

    pub async fn delete(
        &self,
        principal: &Principal,
        path_username: &str,
        menu_id: Uuid,
    ) -> Result<(), AppError> {
        let merchant_id = self.owning_merchant(principal, path_username).await?;

        if !self.menus.delete(menu_id, merchant_id).await? {
            return Err(AppError::not_found("menu"));
        }
        info!(%menu_id, %merchant_id, "menu deleted");
        Ok(())
    }
}

impl std::fmt::Debug for MenuService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuService").finish_non_exhaustive()
    }
}
