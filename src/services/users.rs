/*
 * Responsibility
 * - register / login / 公開プロフィール取得
 * - login 成功時に TokenService で access token を発行
 * - 未登録ユーザーとパスワード不一致は同じ InvalidCredentials にする
 *   (未登録でも dummy hash を verify して同じ時間をかける)
 * - Argon2 は spawn_blocking で tokio worker の外に出す
 */
use std::{fmt, sync::Arc};

use chrono::Utc;
use tokio::task;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::{UserRepo, UserRow};
use crate::services::auth::{Principal, Role, TokenService};
use crate::services::authz;
use crate::services::password::{Argon2Scheme, DUMMY_PASSWORD_HASH, PasswordScheme};

#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: String,
    pub name: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("phone", &self.phone)
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub username: String,
    pub token: String,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepo>,
    tokens: Arc<TokenService>,
    passwords: Arc<dyn PasswordScheme>,
}

fn blocking_task_failed(err: task::JoinError) -> AppError {
    error!(error = %err, "password task failed");
    AppError::Internal
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepo>, tokens: Arc<TokenService>) -> Self {
        Self::with_passwords(users, tokens, Arc::new(Argon2Scheme))
    }

    pub fn with_passwords(
        users: Arc<dyn UserRepo>,
        tokens: Arc<TokenService>,
        passwords: Arc<dyn PasswordScheme>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    async fn hash(&self, password: String) -> Result<String, AppError> {
        let passwords = Arc::clone(&self.passwords);
        task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(blocking_task_failed)?
    }

    async fn verify(&self, password: &str, stored: String) -> Result<bool, AppError> {
        let passwords = Arc::clone(&self.passwords);
        let password = password.to_owned();
        task::spawn_blocking(move || passwords.verify(&password, &stored))
            .await
            .map_err(blocking_task_failed)
    }

    pub async fn register(&self, input: NewUser) -> Result<UserRow, AppError> {
        let exists = self.users.exists(&input.username, &input.email).await?;
        authz::ensure_absent(exists, "user")?;

        let NewUser {
            username,
            email,
            password,
            role,
            phone,
            name,
        } = input;

        let row = UserRow {
            user_id: Uuid::new_v4(),
            password_hash: self.hash(password).await?,
            username,
            email,
            role: role.as_str().to_string(),
            created_at: Utc::now(),
            is_online: false,
            phone,
            balance: 0,
            name,
        };

        self.users
            .create(&row)
            .await
            .map_err(|e| AppError::from_repo(e, "user"))?;

        info!(user_id = %row.user_id, username = %row.username, role = %row.role, "user registered");
        Ok(row)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        let user = self.users.find_by_username(username).await?;

        // Every attempt runs exactly one verification; unknown users hit the dummy hash.
        let stored = user
            .as_ref()
            .map_or(DUMMY_PASSWORD_HASH, |u| u.password_hash.as_str())
            .to_string();
        let matched = self.verify(password, stored).await?;

        let Some(user) = user else {
            warn!(username, "login failed: unknown user");
            return Err(AppError::InvalidCredentials);
        };
        if !matched {
            warn!(username, "login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let role: Role = user.role.parse().map_err(|e| {
            error!(user_id = %user.user_id, error = %e, "stored role is invalid");
            AppError::Internal
        })?;
        let principal = Principal::new(user.user_id, user.username, role).map_err(|e| {
            error!(error = %e, "stored user cannot form a principal");
            AppError::Internal
        })?;

        let token = self.tokens.issue(&principal)?;

        Ok(IssuedToken {
            username: principal.username().to_string(),
            token,
            expires_in: self.tokens.ttl_seconds(),
        })
    }

    pub async fn profile(&self, username: &str) -> Result<UserRow, AppError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or(AppError::not_found("user"))
    }
}

impl fmt::Debug for UserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::repos::memory::MemoryUserRepo;
    use crate::services::auth::SigningKey;

    fn tokens() -> Arc<TokenService> {
        let key = SigningKey::new("users-test-secret-users-test-secret").unwrap();
        Arc::new(TokenService::new(&key, 3600))
    }

    fn service() -> (UserService, Arc<MemoryUserRepo>) {
        let repo = Arc::new(MemoryUserRepo::default());
        (UserService::new(repo.clone(), tokens()), repo)
    }

    /// Argon2 with a record of every stored hash it was asked to check.
    #[derive(Default)]
    struct RecordingScheme {
        verified: AtomicUsize,
        checked_against: Mutex<Vec<String>>,
    }

    impl PasswordScheme for RecordingScheme {
        fn hash(&self, password: &str) -> Result<String, AppError> {
            Argon2Scheme.hash(password)
        }

        fn verify(&self, password: &str, stored: &str) -> bool {
            self.verified.fetch_add(1, Ordering::SeqCst);
            self.checked_against.lock().unwrap().push(stored.to_string());
            Argon2Scheme.verify(password, stored)
        }
    }

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "s3cret-pass".into(),
            role: Role::Merchant,
            phone: "+628123456789".into(),
            name: "Alice".into(),
        }
    }

    #[tokio::test]
    async fn register_stores_hash_not_password() {
        let (svc, repo) = service();
        let row = svc.register(alice()).await.unwrap();
        assert_ne!(row.password_hash, "s3cret-pass");
        assert_eq!(row.role, "merchant");
        let stored = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.user_id, row.user_id);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_unique_constraint() {
        let (svc, _) = service();
        svc.register(alice()).await.unwrap();

        let mut same_email = alice();
        same_email.username = "alice2".into();
        let err = svc.register(same_email).await.unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraint { resource: "user" }));
    }

    #[tokio::test]
    async fn login_issues_token_for_stored_identity() {
        let (svc, _) = service();
        let row = svc.register(alice()).await.unwrap();

        let issued = svc.login("alice", "s3cret-pass").await.unwrap();
        assert_eq!(issued.username, "alice");
        assert_eq!(issued.expires_in, 3600);

        let principal = svc.tokens.validate(&issued.token).unwrap();
        assert_eq!(principal.user_id(), row.user_id);
        assert_eq!(principal.role(), Role::Merchant);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let (svc, _) = service();
        svc.register(alice()).await.unwrap();

        let unknown = svc.login("bob", "s3cret-pass").await.unwrap_err();
        let wrong = svc.login("alice", "not-it").await.unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_user_still_pays_for_a_verification() {
        let repo = Arc::new(MemoryUserRepo::default());
        let scheme = Arc::new(RecordingScheme::default());
        let svc = UserService::with_passwords(repo, tokens(), scheme.clone());
        let stored = svc.register(alice()).await.unwrap().password_hash;
        assert_eq!(scheme.verified.load(Ordering::SeqCst), 0);

        let err = svc.login("bob", "s3cret-pass").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(scheme.verified.load(Ordering::SeqCst), 1);

        let err = svc.login("alice", "not-it").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(scheme.verified.load(Ordering::SeqCst), 2);

        svc.login("alice", "s3cret-pass").await.unwrap();
        assert_eq!(
            *scheme.checked_against.lock().unwrap(),
            vec![DUMMY_PASSWORD_HASH.to_string(), stored.clone(), stored]
        );
    }

    #[test]
    fn new_user_debug_hides_the_password() {
        let out = format!("{:?}", alice());
        assert!(!out.contains("s3cret-pass"));
        assert!(out.contains("alice@example.com"));
    }

    #[tokio::test]
    async fn profile_of_unknown_user_is_not_found() {
        let (svc, _) = service();
        let err = svc.profile("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "user" }));
    }
}
