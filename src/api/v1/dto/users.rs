/*
 * Responsibility
 * - register / login / user 取得の request/response DTO
 * - 形式チェック (validate) は DTO 側、存在チェックは service 側
 */
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::UserRow;
use crate::services::auth::Role;
use crate::services::users::{IssuedToken, NewUser};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub phone: String,
    #[serde(default)]
    pub name: String,
}

// Plaintext password は Debug に出さない
impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("phone", &self.phone)
            .field("name", &self.name)
            .finish()
    }
}

fn valid_username(s: &str) -> bool {
    (3..=24).contains(&s.len())
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

fn valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

// E.164: '+' then 8..=15 digits
fn valid_phone(s: &str) -> bool {
    match s.strip_prefix('+') {
        Some(digits) => {
            (8..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

impl RegisterRequest {
    pub fn into_new_user(self) -> Result<NewUser, &'static str> {
        if !valid_username(&self.username) {
            return Err("username must be 3-24 chars of a-z, 0-9 or _");
        }
        if !valid_email(&self.email) {
            return Err("email is invalid");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("password must be at least 8 characters");
        }
        let role: Role = self
            .role
            .parse()
            .map_err(|_| "role must be one of user, merchant, driver")?;
        if !valid_phone(&self.phone) {
            return Err("phone must be in E.164 format");
        }

        Ok(NewUser {
            username: self.username,
            email: self.email,
            password: self.password,
            role,
            phone: self.phone,
            name: self.name.trim().to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
    pub role: String,
    pub phone: String,
    pub name: String,
}

impl From<UserRow> for RegisterResponse {
    fn from(u: UserRow) -> Self {
        Self {
            username: u.username,
            email: u.email,
            role: u.role,
            phone: u.phone,
            name: u.name,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err("username and password are required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    pub expires_in: u64,
}

impl From<IssuedToken> for LoginResponse {
    fn from(t: IssuedToken) -> Self {
        Self {
            username: t.username,
            token: t.token,
            expires_in: t.expires_in,
        }
    }
}

// password_hash / balance は公開しない
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub phone: String,
    pub name: String,
}

impl From<UserRow> for UserResponse {
    fn from(u: UserRow) -> Self {
        Self {
            username: u.username,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            phone: u.phone,
            name: u.name,
        }
    }
}
