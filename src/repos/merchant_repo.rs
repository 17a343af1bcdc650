/*
 * Responsibility
 * - merchants CRUD (delete なし)
 * - 1 user につき merchant は最大 1 件 (user_id / owner に unique index)
 * - 部分更新は UpdateCommand をそのまま bind して実行する
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::{bind_update, error::RepoError};
use crate::services::patch::UpdateCommand;

const MERCHANT_COLUMNS: &str =
    "merchant_id, name, rating, address, category, description, user_id, owner";

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MerchantRow {
    pub merchant_id: Uuid,
    pub name: String,
    pub rating: f64,
    pub address: String,
    pub category: String,
    pub description: String,
    pub user_id: Uuid,
    pub owner: String,
}

#[async_trait]
pub trait MerchantRepo: Send + Sync {
    async fn exists_for(&self, user_id: Uuid, owner: &str) -> Result<bool, RepoError>;

    async fn create(&self, merchant: &MerchantRow) -> Result<(), RepoError>;

    async fn find_by_owner(&self, owner: &str) -> Result<Option<MerchantRow>, RepoError>;

    /// Ownership key lookup: the merchant profile linked to `user_id`.
    async fn find_id_by_user(&self, user_id: Uuid) -> Result<Option<Uuid>, RepoError>;

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<MerchantRow>, RepoError>;
}

#[derive(Clone, Debug)]
pub struct PgMerchantRepo {
    db: PgPool,
}

impl PgMerchantRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MerchantRepo for PgMerchantRepo {
    async fn exists_for(&self, user_id: Uuid, owner: &str) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM merchants WHERE user_id = $1 OR owner = $2)
            "#,
        )
        .bind(user_id)
        .bind(owner)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn create(&self, merchant: &MerchantRow) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO merchants
                (merchant_id, name, rating, address, category, description, user_id, owner)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(merchant.merchant_id)
        .bind(&merchant.name)
        .bind(merchant.rating)
        .bind(&merchant.address)
        .bind(&merchant.category)
        .bind(&merchant.description)
        .bind(merchant.user_id)
        .bind(&merchant.owner)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Option<MerchantRow>, RepoError> {
        let sql = format!("SELECT {MERCHANT_COLUMNS} FROM merchants WHERE owner = $1");
        let row = sqlx::query_as::<_, MerchantRow>(&sql)
            .bind(owner)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }

    async fn find_id_by_user(&self, user_id: Uuid) -> Result<Option<Uuid>, RepoError> {
        let id: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT merchant_id FROM merchants WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(id)
    }

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<MerchantRow>, RepoError> {
        let sql = format!("{} RETURNING {MERCHANT_COLUMNS}", cmd.to_sql());
        let row = bind_update(sqlx::query_as::<_, MerchantRow>(&sql), cmd)
            .fetch_optional(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }
}
