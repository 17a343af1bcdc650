/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - PgPool を受け取り register / login / profile 参照を提供
 * - DB エラーは RepoError に変換して返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    // Argon2 PHC string, never the raw password
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub is_online: bool,
    pub phone: String,
    pub balance: i64,
    pub name: String,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Whether a user with this username *or* email already exists.
    async fn exists(&self, username: &str, email: &str) -> Result<bool, RepoError>;

    async fn create(&self, user: &UserRow) -> Result<(), RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn exists(&self, username: &str, email: &str) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn create(&self, user: &UserRow) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (user_id, username, email, password_hash, role, created_at, is_online, phone, balance, name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.is_online)
        .bind(&user.phone)
        .bind(user.balance)
        .bind(&user.name)
        .execute(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, email, password_hash, role, created_at,
                   is_online, phone, balance, name
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }
}
