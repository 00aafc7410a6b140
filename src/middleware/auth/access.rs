//! Bearer credential -> Authorizer decision -> AuthCtx in request extensions.
//!
//! This middleware is the gateway's authorizer hook: it runs before every
//! handler, and on deny the handler is never invoked. Handlers do no further
//! authorization of their own.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// Put the authorizer in front of every route of `router`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8's from_fn cannot take a State extractor; pass state explicitly
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // A missing header or a non-Bearer scheme is an ordinary malformed
    // credential; the authorizer owns the deny, not this layer.
    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let decision = state.authorizer.authorize(credential).await;

    let Some(context) = decision.into_context() else {
        return Err(AppError::Unauthorized);
    };

    // middleware -> extractor handoff
    req.extensions_mut().insert(AuthCtx::from(context));

    Ok(next.run(req).await)
}
