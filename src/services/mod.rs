/*
 * Responsibility
 * - アクセス制御コア (auth / authz / patch) と、それを使うリソース別 service
 */
pub mod auth;
pub mod authz;
pub mod drivers;
pub mod menus;
pub mod merchants;
pub mod password;
pub mod patch;
pub mod users;
