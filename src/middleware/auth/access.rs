//! access token (HMAC JWT) 検証 → Principal を extensions に入れる
//!
//! - `Authorization` header が無ければ validator を呼ばずに 401
//! - `Bearer ` prefix は剥がす。無くてもそのまま validator に渡す (そこで失敗する)
//! - 成功時のみ identity を 3 つの型付き entry として格納し、後段へ流す
//!
//! mutating route にだけ `route_layer` で掛ける (GET / register / login は素通し)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::auth_ctx;
use crate::error::AppError;
use crate::state::AppState;

/// `router` に登録済みの全ルートへ認証を掛ける。
///
/// `route_layer` なので、マッチしなかったリクエスト (404/405) は認証を経由しない。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    Some(raw.strip_prefix("Bearer ").unwrap_or(raw))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(&req) else {
        tracing::debug!("request without authorization header");
        return Err(AppError::Unauthorized);
    };

    let principal = match state.auth.validate(token) {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!(error = %err, "access token validation failed");
            return Err(AppError::Unauthorized);
        }
    };

    // middleware → extractor への受け渡し
    auth_ctx::insert(req.extensions_mut(), &principal);

    Ok(next.run(req).await)
}
