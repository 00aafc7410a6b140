/// Factory: build the `Authorizer` from application `Config`.
use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::services::auth::authorizer::{AuthPolicy, Authorizer};
use crate::services::auth::jwks::JwksValidator;

pub fn build_authorizer(config: &Config) -> anyhow::Result<Arc<Authorizer>> {
    let validator = JwksValidator::new(
        config.jwks_url.clone(),
        config.issuer.as_deref(),
        config.leeway_seconds,
        config.validation_timeout,
    )
    .context("building jwks validator")?;

    let policy = AuthPolicy {
        user_pool: config.user_pool_id.clone(),
        client_ids: config.client_ids.clone(),
        allowed_scopes: config.allowed_scopes.clone(),
        allowed_roles: config.allowed_roles.clone(),
    };

    Ok(Arc::new(Authorizer::new(Arc::new(validator), policy)))
}
