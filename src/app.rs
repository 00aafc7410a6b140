/*
 * Responsibility
 * - Config load → dependency construction → Router assembly
 * - Middleware application (authorizer, request tracing)
 * - Start serving via axum::serve()
 */
use anyhow::Result;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::{
    api,
    config::{AppEnv, Config},
    middleware,
    services::auth::build_authorizer,
    state::AppState,
};

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.app_env);

    let authorizer = build_authorizer(&config)?;
    let state = AppState::new(authorizer);

    let app = build_router(state);

    tracing::info!(
        addr = %config.addr,
        jwks_url = %config.jwks_url,
        env = ?config.app_env,
        "listening"
    );
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Every route sits behind the authorizer middleware; there is no
/// unauthenticated surface.
pub fn build_router(state: AppState) -> Router {
    let routes = middleware::auth::access::apply(api::routes(), state.clone());

    routes.layer(TraceLayer::new_for_http()).with_state(state)
}

fn init_tracing(app_env: AppEnv) {
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins; otherwise development gets the deny-reason debug logs.
    let default_filter = if app_env.is_production() {
        "info"
    } else {
        "hello_authz=debug,info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
