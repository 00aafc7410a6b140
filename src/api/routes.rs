/*
 * Responsibility
 * - URL structure: one $default route (any path, any method)
 */
use axum::Router;

use crate::api::handlers::hello::hello;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().fallback(hello)
}
