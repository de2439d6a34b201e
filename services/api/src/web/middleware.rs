//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use painting_order_core::{SessionContext, SessionGate};
use std::sync::Arc;
use tracing::warn;

use crate::accounts::{session_id_from_cookie, CookieSession};
use crate::web::state::AppState;

/// Builds the session context for a request from its `session` cookie.
pub fn session_context(state: &AppState, headers: &axum::http::HeaderMap) -> SessionContext {
    let session_id = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_id_from_cookie)
        .map(str::to_string);
    SessionContext::new(Arc::new(CookieSession::new(
        state.accounts.clone(),
        session_id,
    )))
}

/// Middleware that runs the session gate on every protected request.
///
/// If admitted, inserts the `Identity` and the `SessionContext` into request
/// extensions for handlers to use. Otherwise returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let context = session_context(&state, req.headers());

    let identity = SessionGate::admit(&context).await.map_err(|e| {
        warn!("Rejected request to {}: {}", req.uri().path(), e);
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
