/// Factory: build `TokenService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenService;

pub fn build_token_service(config: &Config) -> Arc<TokenService> {
    if config.jwt_secret.len() < 32 {
        tracing::warn!(
            length = config.jwt_secret.len(),
            "JWT_SECRET is shorter than 32 bytes; use a longer random secret in production"
        );
    }

    Arc::new(TokenService::new(
        &config.jwt_secret,
        config.token_ttl_seconds,
    ))
}
