/*
 * Responsibility
 * - drivers CRUD (delete なし)
 * - 1 user につき driver は最大 1 件
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::{bind_update, error::RepoError};
use crate::services::patch::UpdateCommand;

const DRIVER_COLUMNS: &str = "driver_id, name, rating, license, area, income, user_id, username";

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DriverRow {
    pub driver_id: Uuid,
    pub name: String,
    pub rating: f64,
    pub license: String,
    pub area: String,
    pub income: i64,
    pub user_id: Uuid,
    pub username: String,
}

#[async_trait]
pub trait DriverRepo: Send + Sync {
    async fn exists_for(&self, user_id: Uuid, username: &str) -> Result<bool, RepoError>;

    async fn create(&self, driver: &DriverRow) -> Result<(), RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<DriverRow>, RepoError>;

    /// Ownership key lookup: the driver profile linked to `user_id`.
    async fn find_id_by_user(&self, user_id: Uuid) -> Result<Option<Uuid>, RepoError>;

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<DriverRow>, RepoError>;
}

#[derive(Clone, Debug)]
pub struct PgDriverRepo {
    db: PgPool,
}

impl PgDriverRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DriverRepo for PgDriverRepo {
    async fn exists_for(&self, user_id: Uuid, username: &str) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM drivers WHERE user_id = $1 OR username = $2)
            "#,
        )
        .bind(user_id)
        .bind(username)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn create(&self, driver: &DriverRow) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO drivers
                (driver_id, name, rating, license, area, income, user_id, username)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(driver.driver_id)
        .bind(&driver.name)
        .bind(driver.rating)
        .bind(&driver.license)
        .bind(&driver.area)
        .bind(driver.income)
        .bind(driver.user_id)
        .bind(&driver.username)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<DriverRow>, RepoError> {
        let sql = format!("SELECT {DRIVER_COLUMNS} FROM drivers WHERE username = $1");
        let row = sqlx::query_as::<_, DriverRow>(&sql)
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }

    async fn find_id_by_user(&self, user_id: Uuid) -> Result<Option<Uuid>, RepoError> {
        let id: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT driver_id FROM drivers WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(id)
    }

    async fn update(&self, cmd: &UpdateCommand) -> Result<Option<DriverRow>, RepoError> {
        let sql = format!("{} RETURNING {DRIVER_COLUMNS}", cmd.to_sql());
        let row = bind_update(sqlx::query_as::<_, DriverRow>(&sql), cmd)
            .fetch_optional(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }
}
