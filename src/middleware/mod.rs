/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: mutating route 用の bearer 検証
 * - cors / http / security_headers: 全ルート共通の transport 層
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
