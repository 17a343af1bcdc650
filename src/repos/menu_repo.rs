/*
 * Responsibility
 * - menus CRUD
 * - 更新/削除は必ず merchant_id (所有者キー) で絞る
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::{bind_update, error::RepoError};
use crate::services::patch::UpdateCommand;

const MENU_COLUMNS: &str =
    "menu_id, name, price, description, category, rating, stock, merchant_id";

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MenuRow {
    pub menu_id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub category: String,
    pub rating: f64,
    pub stock: i32,
    pub merchant_id: Uuid,
}

#[async_trait]
pub trait MenuRepo: Send + Sync {
    async fn create(&self, menu: &MenuRow) -> Result<(), RepoError>;

    async fn find(&self, menu_id: Uuid) -> Result<Option<MenuRow>, RepoError>;

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<MenuRow>, RepoError>;

    /// Returns whether a row owned by `merchant_id` was deleted.
    async fn delete(&self, menu_id: Uuid, merchant_id: Uuid) -> Result<bool, RepoError>;
}

#[derive(Clone, Debug)]
pub struct PgMenuRepo {
    db: PgPool,
}

impl PgMenuRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MenuRepo for PgMenuRepo {
    async fn create(&self, menu: &MenuRow) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO menus
                (menu_id, name, price, description, category, rating, stock, merchant_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(menu.menu_id)
        .bind(&menu.name)
        .bind(menu.price)
        .bind(&menu.description)
        .bind(&menu.category)
        .bind(menu.rating)
        .bind(menu.stock)
        .bind(menu.merchant_id)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }

    async fn find(&self, menu_id: Uuid) -> Result<Option<MenuRow>, RepoError> {
        let sql = format!("SELECT {MENU_COLUMNS} FROM menus WHERE menu_id = $1");
        let row = sqlx::query_as::<_, MenuRow>(&sql)
            .bind(menu_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<MenuRow>, RepoError> {
        let sql = format!("{} RETURNING {MENU_COLUMNS}", cmd.to_sql());
        let row = bind_update(sqlx::query_as::<_, MenuRow>(&sql), cmd)
            .fetch_optional(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, menu_id: Uuid, merchant_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM menus
            WHERE menu_id = $1 AND merchant_id = $2
            "#,
        )
        .bind(menu_id)
        .bind(merchant_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
