/*
 * Responsibility
 * - request extensions に格納する identity の型 (1 項目 = 1 型)
 * - 文字列キーではなく型で引くので、取り違えや衝突が起きない
 *
 * Notes
 * - 3 つは独立に格納される。読み出し側 (core::extract) は全部揃っていなければ拒否する
 */

use uuid::Uuid;

use crate::services::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtxUserId(pub Uuid);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtxUsername(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtxRole(pub Role);
