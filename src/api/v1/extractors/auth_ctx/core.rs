use axum::extract::FromRequestParts;
use axum::http::{Extensions, request::Parts};
use tracing::warn;

use crate::error::AppError;
use crate::services::auth::Principal;

use super::{CtxRole, CtxUserId, CtxUsername};

/// Store a verified identity as three independent typed entries.
pub fn insert(extensions: &mut Extensions, principal: &Principal) {
    extensions.insert(CtxUserId(principal.user_id()));
    extensions.insert(CtxUsername(principal.username().to_string()));
    extensions.insert(CtxRole(principal.role()));
}

fn missing(entry: &'static str) -> AppError {
    warn!(entry, "request context is missing identity entry");
    AppError::Unauthorized
}

/// All-or-nothing read of the identity entries.
///
/// A missing entry, nil user id or blank username rejects the whole identity;
/// callers never see a partially populated `Principal`.
pub fn extract(extensions: &Extensions) -> Result<Principal, AppError> {
    let CtxUserId(user_id) = *extensions
        .get::<CtxUserId>()
        .ok_or_else(|| missing("user_id"))?;
    let CtxUsername(username) = extensions
        .get::<CtxUsername>()
        .ok_or_else(|| missing("username"))?;
    let CtxRole(role) = *extensions
        .get::<CtxRole>()
        .ok_or_else(|| missing("role"))?;

    Principal::new(user_id, username.clone(), role).map_err(|e| {
        warn!(error = %e, "request context holds an empty identity entry");
        AppError::Unauthorized
    })
}

/// Handler で Principal を受け取るための extractor
/// access middleware が extensions に insert 済みである前提
/// 見つからない場合は 401 (middleware 未適用のルートでも通さない)
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract(&parts.extensions).map(CurrentPrincipal)
    }
}
