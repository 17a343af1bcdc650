//! Access token (HMAC-signed JWT) issuance and verification.
//!
//! Responsibility:
//! - Claims codec: `{user_id, username, role, exp}` <-> compact JWT string
//! - Issuer: sign claims for a freshly authenticated principal (fixed TTL)
//! - Validator: header algorithm check -> signature -> `exp` -> required claims
//!
//! Notes:
//! - The signing key is a single process-wide symmetric secret, injected at
//!   construction time and never mutated afterwards.
//! - Only the HMAC family is accepted. The header is inspected *before* decoding so
//!   that `none` / asymmetric algorithms are rejected up front.
use std::{error::Error as StdError, fmt};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::services::auth::principal::{Principal, Role};

/// 24 hours.
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

/// 365 days. Config rejects anything longer.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug)]
pub enum TokenError {
    EmptySecret,
    Malformed(jsonwebtoken::errors::Error),
    AlgorithmNotAllowed(Algorithm),
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
    UnknownRole(String),
    Sign(jsonwebtoken::errors::Error),
    ExpiryOutOfRange(u64),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "signing secret must not be empty"),
            Self::Malformed(e) => write!(f, "malformed token header: {}", e),
            Self::AlgorithmNotAllowed(alg) => write!(f, "algorithm {:?} is not allowed", alg),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::UnknownRole(role) => write!(f, "unknown role '{}'", role),
            Self::Sign(e) => write!(f, "failed to sign token: {}", e),
            Self::ExpiryOutOfRange(ttl) => write!(f, "ttl of {}s overflows the expiry", ttl),
        }
    }
}

impl StdError for TokenError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Malformed(e) | Self::Jwt(e) | Self::Sign(e) => Some(e),
            _ => None,
        }
    }
}

/// Process-wide HMAC secret.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct SigningKey {
    secret: Vec<u8>,
}

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self { secret })
    }

    pub fn len(&self) -> usize {
        self.secret.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Wire claims.
///
/// Identity fields default to their zero value when absent so that a token missing
/// them fails with `EmptyClaim` instead of a generic decode error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(key: &SigningKey, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(&key.secret),
            decoding_key: DecodingKey::from_secret(&key.secret),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token valid for the configured TTL.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let expires_at = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                error!(ttl_seconds = self.ttl_seconds, "token ttl overflows the expiry");
                TokenError::ExpiryOutOfRange(self.ttl_seconds)
            })?;
        self.issue_until(principal, expires_at)
    }

    /// Issue a token with an explicit expiry.
    pub fn issue_until(
        &self,
        principal: &Principal,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            user_id: principal.user_id(),
            username: principal.username().to_string(),
            role: principal.role().as_str().to_string(),
            exp: expires_at.timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::Sign(e)
        })
    }

    /// Verify a token and promote its claims to a [`Principal`].
    ///
    /// Order of checks:
    /// 1. header parses and `alg` is HS256/HS384/HS512
    /// 2. signature and `exp` (no leeway)
    /// 3. `user_id`, `username`, `role` present and non-empty; role is known
    pub fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        let header = jsonwebtoken::decode_header(token).map_err(TokenError::Malformed)?;
        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::AlgorithmNotAllowed(header.alg));
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Jwt)?;
        let claims = data.claims;

        if claims.user_id.is_nil() {
            return Err(TokenError::EmptyClaim("user_id"));
        }
        if claims.username.trim().is_empty() {
            return Err(TokenError::EmptyClaim("username"));
        }
        if claims.role.is_empty() {
            return Err(TokenError::EmptyClaim("role"));
        }
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| TokenError::UnknownRole(claims.role.clone()))?;

        Principal::new(claims.user_id, claims.username, role)
            .map_err(|_| TokenError::EmptyClaim("username"))
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    use super::*;

    fn service() -> TokenService {
        let key = SigningKey::new("test-secret-test-secret-test-secret").unwrap();
        TokenService::new(&key, DEFAULT_TOKEN_TTL_SECONDS)
    }

    fn alice(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), "alice", role).unwrap()
    }

    fn future_exp() -> i64 {
        (Utc::now() + Duration::hours(1)).timestamp()
    }

    #[test]
    fn issue_then_validate_returns_the_same_principal() {
        let svc = service();
        for role in Role::ALL {
            let p = alice(role);
            let token = svc.issue(&p).unwrap();
            assert_eq!(token.split('.').count(), 3);
            assert_eq!(svc.validate(&token).unwrap(), p);
        }
    }

    #[test]
    fn issued_token_expires_after_ttl() {
        let svc = service();
        let token = svc.issue(&alice(Role::User)).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

        let exp = claims["exp"].as_i64().unwrap();
        let expected = Utc::now().timestamp() + DEFAULT_TOKEN_TTL_SECONDS as i64;
        assert!((expected - exp).abs() <= 5);
        assert_eq!(claims["username"], "alice");
        assert_eq!(claims["role"], "user");
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let token = svc
            .issue_until(&alice(Role::Merchant), Utc::now() - Duration::seconds(1))
            .unwrap();
        assert!(matches!(svc.validate(&token), Err(TokenError::Jwt(_))));
    }

    #[test]
    fn any_flipped_signature_byte_is_rejected() {
        let svc = service();
        let token = svc.issue(&alice(Role::Driver)).unwrap();
        let (signing_input, signature) = token.rsplit_once('.').unwrap();
        let sig_bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for i in 0..sig_bytes.len() {
            let mut tampered = sig_bytes.clone();
            tampered[i] ^= 0x01;
            let forged = format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(&tampered));
            assert!(svc.validate(&forged).is_err(), "byte {} flip accepted", i);
        }
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let other = TokenService::new(&SigningKey::new("another-secret").unwrap(), 60);
        let token = other.issue(&alice(Role::User)).unwrap();
        assert!(matches!(service().validate(&token), Err(TokenError::Jwt(_))));
    }

    fn forge_with_header(svc: &TokenService, header_json: &str) -> String {
        let token = svc.issue(&alice(Role::Merchant)).unwrap();
        let mut parts = token.split('.');
        let _ = parts.next();
        let payload = parts.next().unwrap();
        let signature = parts.next().unwrap();
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            payload,
            signature
        )
    }

    #[test]
    fn none_algorithm_is_rejected() {
        let svc = service();
        let forged = forge_with_header(&svc, r#"{"alg":"none","typ":"JWT"}"#);
        assert!(matches!(svc.validate(&forged), Err(TokenError::Malformed(_))));

        let unsigned = {
            let (input, _) = forged.rsplit_once('.').unwrap();
            format!("{}.", input)
        };
        assert!(svc.validate(&unsigned).is_err());
    }

    #[test]
    fn asymmetric_algorithm_header_is_rejected() {
        let svc = service();
        for alg in ["RS256", "ES256", "EdDSA", "PS256"] {
            let forged = forge_with_header(&svc, &format!(r#"{{"alg":"{}","typ":"JWT"}}"#, alg));
            assert!(
                matches!(svc.validate(&forged), Err(TokenError::AlgorithmNotAllowed(_))),
                "{} accepted",
                alg
            );
        }
    }

    #[test]
    fn empty_identity_claims_are_rejected() {
        let svc = service();
        let base = TokenClaims {
            user_id: Uuid::new_v4(),
            username: "alice".into(),
            role: "merchant".into(),
            exp: future_exp(),
        };

        let nil_id = TokenClaims {
            user_id: Uuid::nil(),
            ..base.clone()
        };
        let token = svc.sign(&nil_id).unwrap();
        assert!(matches!(
            svc.validate(&token),
            Err(TokenError::EmptyClaim("user_id"))
        ));

        let no_name = TokenClaims {
            username: String::new(),
            ..base.clone()
        };
        let token = svc.sign(&no_name).unwrap();
        assert!(matches!(
            svc.validate(&token),
            Err(TokenError::EmptyClaim("username"))
        ));

        let no_role = TokenClaims {
            role: String::new(),
            ..base.clone()
        };
        let token = svc.sign(&no_role).unwrap();
        assert!(matches!(
            svc.validate(&token),
            Err(TokenError::EmptyClaim("role"))
        ));

        let bad_role = TokenClaims {
            role: "admin".into(),
            ..base
        };
        let token = svc.sign(&bad_role).unwrap();
        assert!(matches!(
            svc.validate(&token),
            Err(TokenError::UnknownRole(_))
        ));
    }

    #[test]
    fn missing_identity_fields_default_to_empty_and_fail() {
        let svc = service();
        let claims: TokenClaims =
            serde_json::from_str(&format!(r#"{{"exp":{}}}"#, future_exp())).unwrap();
        assert!(claims.user_id.is_nil());
        assert!(claims.username.is_empty() && claims.role.is_empty());

        let token = svc.sign(&claims).unwrap();
        assert!(matches!(
            svc.validate(&token),
            Err(TokenError::EmptyClaim("user_id"))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let svc = service();
        for token in ["", "abc", "a.b.c", "Bearer x.y.z"] {
            assert!(svc.validate(token).is_err());
        }
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let key = SigningKey::new("test-secret-test-secret-test-secret").unwrap();
        for ttl in [u64::MAX, i64::MAX as u64, 100_000_000_000_000_000, 9_000_000_000_000_000] {
            let svc = TokenService::new(&key, ttl);
            assert!(
                matches!(
                    svc.issue(&alice(Role::User)),
                    Err(TokenError::ExpiryOutOfRange(t)) if t == ttl
                ),
                "ttl {} issued",
                ttl
            );
        }
    }

    #[test]
    fn longest_allowed_ttl_still_validates() {
        let key = SigningKey::new("test-secret-test-secret-test-secret").unwrap();
        let svc = TokenService::new(&key, MAX_TOKEN_TTL_SECONDS);
        let p = alice(Role::Driver);
        let token = svc.issue(&p).unwrap();
        assert_eq!(svc.validate(&token).unwrap(), p);
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(SigningKey::new(""), Err(TokenError::EmptySecret)));
    }

    #[test]
    fn debug_output_does_not_leak_the_secret() {
        let key = SigningKey::new("super-secret-value").unwrap();
        assert!(!format!("{:?}", key).contains("super-secret-value"));
    }
}
