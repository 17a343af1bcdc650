/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: TokenService (署名鍵は起動時に一度だけ注入)
 *   - リソース別 service (repository trait 越しに永続層へ)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::Repositories;
use crate::services::{
    auth::TokenService, drivers::DriverService, menus::MenuService, merchants::MerchantService,
    users::UserService,
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<TokenService>,
    pub users: UserService,
    pub merchants: MerchantService,
    pub drivers: DriverService,
    pub menus: MenuService,
}

impl AppState {
    pub fn new(auth: Arc<TokenService>, repos: Repositories) -> Self {
        Self {
            users: UserService::new(repos.users, auth.clone()),
            merchants: MerchantService::new(repos.merchants.clone()),
            drivers: DriverService::new(repos.drivers),
            menus: MenuService::new(repos.menus, repos.merchants),
            auth,
        }
    }
}
