/*
 * Responsibility
 * - リソースごとの repository trait と Postgres 実装
 * - service 層は trait 越しにしか触らない (テストでは memory 実装に差し替え)
 */
use std::sync::Arc;

use sqlx::{PgPool, Postgres, postgres::PgArguments, query::QueryAs};

use crate::services::patch::{PatchValue, UpdateCommand};

pub mod driver_repo;
pub mod error;
pub mod memory;
pub mod menu_repo;
pub mod merchant_repo;
pub mod user_repo;

pub use driver_repo::{DriverRepo, DriverRow, PgDriverRepo};
pub use menu_repo::{MenuRepo, MenuRow, PgMenuRepo};
pub use merchant_repo::{MerchantRepo, MerchantRow, PgMerchantRepo};
pub use user_repo::{PgUserRepo, UserRepo, UserRow};

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepo>,
    pub merchants: Arc<dyn MerchantRepo>,
    pub drivers: Arc<dyn DriverRepo>,
    pub menus: Arc<dyn MenuRepo>,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            merchants: Arc::new(PgMerchantRepo::new(db.clone())),
            drivers: Arc::new(PgDriverRepo::new(db.clone())),
            menus: Arc::new(PgMenuRepo::new(db)),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// Bind every argument of an `UpdateCommand` in placeholder order.
pub(crate) fn bind_update<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    cmd: &'q UpdateCommand,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for arg in cmd.arguments() {
        query = match arg {
            PatchValue::Text(v) => query.bind(v.as_str()),
            PatchValue::Int(v) => query.bind(*v),
            PatchValue::BigInt(v) => query.bind(*v),
            PatchValue::Uuid(v) => query.bind(*v),
        };
    }
    query
}
