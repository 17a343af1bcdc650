/*
 * Responsibility
 * - 操作ごとの認可チェック (role / path の本人確認 / ownership 解決 / 重複作成)
 * - どれも失敗したら AppError を返すだけで、回復はしない (fail-closed)
 *
 * Order used by every mutating service call:
 *   require_role -> require_same_user -> (persistence) require_owned / ensure_absent
 * The first two never touch persistence.
 */
use tracing::warn;

use crate::error::AppError;
use crate::services::auth::{Principal, Role};

pub fn require_role(principal: &Principal, required: Role) -> Result<(), AppError> {
    if principal.role() == required {
        return Ok(());
    }
    warn!(
        user_id = %principal.user_id(),
        required = %required,
        actual = %principal.role(),
        "role check failed"
    );
    Err(AppError::Unauthorized)
}

/// Routes scoped by `{username}` may only be used by that user.
pub fn require_same_user(principal: &Principal, path_username: &str) -> Result<(), AppError> {
    if principal.username() == path_username {
        return Ok(());
    }
    warn!(
        user_id = %principal.user_id(),
        path_username,
        "path username does not match principal"
    );
    Err(AppError::Forbidden)
}

/// Resolved ownership key, or `Forbidden` when the principal owns no such resource.
///
/// Deliberately not `NotFound`: callers must not learn whether someone else's
/// resource exists.
pub fn require_owned<T>(
    resolved: Option<T>,
    principal: &Principal,
    resource: &'static str,
) -> Result<T, AppError> {
    resolved.ok_or_else(|| {
        warn!(
            user_id = %principal.user_id(),
            resource,
            "principal owns no linked resource"
        );
        AppError::Forbidden
    })
}

/// Pre-insert existence check.
pub fn ensure_absent(exists: bool, resource: &'static str) -> Result<(), AppError> {
    if exists {
        warn!(resource, "resource already exists");
        return Err(AppError::unique(resource));
    }
    Ok(())
}
