/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 公開ルート (GET / register / login) と認証必須ルート (POST / PATCH / DELETE) を分け、
 *   後者にだけ access middleware を route_layer で掛ける
 * - 同じ path の GET と POST は merge 時に 1 つの MethodRouter にまとまる
 */
use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::v1::handlers::{
    drivers::{create_driver, get_driver, update_driver},
    health::health,
    menus::{create_menu, delete_menu, get_menu, update_menu},
    merchants::{create_merchant, get_merchant, update_merchant},
    users::{get_user, login, register},
};

fn public() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/u/{username}", get(get_user))
        .route("/m/{username}", get(get_merchant))
        .route("/d/{username}", get(get_driver))
        .route("/menus/{menu_id}", get(get_menu))
}

fn protected() -> Router<AppState> {
    Router::new()
        .route("/m/{username}", post(create_merchant).patch(update_merchant))
        .route("/d/{username}", post(create_driver).patch(update_driver))
        .route("/m/{username}/menus", post(create_menu))
        .route(
            "/m/{username}/menus/{menu_id}",
            patch(update_menu).delete(delete_menu),
        )
}

pub fn routes(state: AppState) -> Router<AppState> {
    public().merge(access::apply(protected(), state))
}
