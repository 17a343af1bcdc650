/*
 * Responsibility
 * - Argon2id による password の hash / verify
 * - PasswordScheme: 同期 (CPU bound) 処理の差し替え口。呼び出し側が spawn_blocking で回す
 * - 未登録ユーザーの login でも同じコストを払うための dummy hash
 */
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::error::AppError;

/// Well-formed Argon2id PHC string with the default cost parameters.
/// No password verifies against it.
pub const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$bWFya2V0cGxhY2VzYWx0IQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Blocking password work. Implementations must not be called on an async worker.
pub trait PasswordScheme: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, AppError>;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Scheme;

impl PasswordScheme for Argon2Scheme {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_password(password)
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        verify_password(password, stored)
    }
}

/// Argon2id PHC string for a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!(error = %err, "failed to hash password");
            AppError::Internal
        })
}

/// A stored hash that does not parse is treated as a mismatch.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::error!(error = %err, "stored password hash is not a valid PHC string");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use argon2::Params;

    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn salts_differ() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plaintext_in_store_never_matches() {
        assert!(!verify_password("hunter22", "hunter22"));
    }

    #[test]
    fn dummy_hash_costs_as_much_as_a_real_one() {
        let dummy = PasswordHash::new(DUMMY_PASSWORD_HASH).unwrap();
        let real_hash = hash_password("anything").unwrap();
        let real = PasswordHash::new(&real_hash).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(
            Params::try_from(&dummy).unwrap(),
            Params::try_from(&real).unwrap()
        );
        for candidate in ["", "anything", "s3cret-pass"] {
            assert!(!Argon2Scheme.verify(candidate, DUMMY_PASSWORD_HASH));
        }
    }
}
