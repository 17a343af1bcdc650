/*
 * Responsibility
 * - 認証済み主体 (Principal) と Role の型定義
 * - Principal は検証済み claims からのみ組み立てられ、以降は不変
 * - Role は閉じた enum (文字列比較を散らばらせない)
 */
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Merchant,
    Driver,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Merchant, Role::Driver];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Merchant => "merchant",
            Role::Driver => "driver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    // Exact match only: "Merchant" is not "merchant".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "merchant" => Ok(Role::Merchant),
            "driver" => Ok(Role::Driver),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    #[error("user_id must not be nil")]
    NilUserId,
    #[error("username must not be empty")]
    EmptyUsername,
}

/// The verified identity attached to one authenticated request.
///
/// Fields are private: a `Principal` can only be built through [`Principal::new`],
/// which rejects a nil user id or a blank username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: Uuid,
    username: String,
    role: Role,
}

impl Principal {
    pub fn new(
        user_id: Uuid,
        username: impl Into<String>,
        role: Role,
    ) -> Result<Self, PrincipalError> {
        let username = username.into();
        if user_id.is_nil() {
            return Err(PrincipalError::NilUserId);
        }
        if username.trim().is_empty() {
            return Err(PrincipalError::EmptyUsername);
        }

        Ok(Self {
            user_id,
            username,
            role,
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_only_exact_lowercase_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("Merchant".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn principal_rejects_nil_id_and_blank_username() {
        assert_eq!(
            Principal::new(Uuid::nil(), "alice", Role::User),
            Err(PrincipalError::NilUserId)
        );
        assert_eq!(
            Principal::new(Uuid::new_v4(), "  ", Role::User),
            Err(PrincipalError::EmptyUsername)
        );
    }

    #[test]
    fn principal_exposes_its_fields() {
        let id = Uuid::new_v4();
        let p = Principal::new(id, "alice", Role::Merchant).unwrap();
        assert_eq!(p.user_id(), id);
        assert_eq!(p.username(), "alice");
        assert_eq!(p.role(), Role::Merchant);
    }
}
