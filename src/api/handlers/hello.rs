/*
 * Responsibility
 * - The $default handler: 200 + timestamped greeting, echoing the scopes and
 *   roles the authorizer attached
 * - Only ever reached post-authorization; performs no checks of its own
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::api::extractors::AuthCtxExtractor;

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: String,
    // Always arrays, never null: empty contexts serialize as [].
    pub scopes: Vec<String>,
    pub roles: Vec<String>,
}

pub async fn hello(AuthCtxExtractor(ctx): AuthCtxExtractor) -> impl IntoResponse {
    let body = HelloResponse {
        message: format!(
            "Hello world. The time is {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        scopes: ctx.scopes,
        roles: ctx.roles,
    };

    (StatusCode::OK, Json(body))
}
