/*!
 * Authentication context
 *
 * Responsibility:
 * - middleware が検証済みの identity を request extensions に書き込む
 * - handler は CurrentPrincipal extractor 経由でのみ読み出す (fail-closed)
 *
 * Public API:
 * - insert / extract
 * - CurrentPrincipal
 */

mod core;
mod types;

pub use self::core::{CurrentPrincipal, extract, insert};
pub use types::{CtxRole, CtxUserId, CtxUsername};
