/*
 * JWKS-backed identity-provider validation
 * - fetch + cache the pool's JWKS document, refetching once on unknown kid
 *   (key rotation)
 * - verify RS256 signature, exp/nbf (with leeway) and issuer via jsonwebtoken
 * - network failures surface as Unavailable so the authorizer fails closed
 */
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use tokio::sync::RwLock;
use url::Url;

use crate::services::auth::claims::AccessTokenClaims;
use crate::services::auth::provider::{IdentityProvider, ValidationFailure};

#[derive(Debug)]
pub struct JwksValidator {
    http: reqwest::Client,
    jwks_url: Url,
    validation: Validation,
    cached_keys: RwLock<Option<JwkSet>>,
}

impl JwksValidator {
    /// `timeout` bounds the whole JWKS round trip; requests never block past it.
    pub fn new(
        jwks_url: Url,
        issuer: Option<&str>,
        leeway_seconds: u64,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        let mut validation = Validation::new(Algorithm::RS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        // Cognito access tokens carry `client_id` instead of `aud`; the client
        // check is part of the authorizer policy.
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Ok(Self {
            http,
            jwks_url,
            validation,
            cached_keys: RwLock::new(None),
        })
    }

    async fn fetch_keys(&self) -> Result<JwkSet, ValidationFailure> {
        let response = self
            .http
            .get(self.jwks_url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!(url = %self.jwks_url, error = %e, "jwks fetch failed");
                ValidationFailure::Unavailable(e.to_string())
            })?;

        response.json::<JwkSet>().await.map_err(|e| {
            tracing::error!(url = %self.jwks_url, error = %e, "jwks response unreadable");
            ValidationFailure::Unavailable(e.to_string())
        })
    }

    /// Cached key lookup with a single refetch when the kid is unknown.
    async fn key_for(&self, kid: &str) -> Result<Jwk, ValidationFailure> {
        if let Some(keys) = self.cached_keys.read().await.as_ref() {
            if let Some(jwk) = keys.find(kid) {
                return Ok(jwk.clone());
            }
        }

        let fresh = self.fetch_keys().await?;
        let found = fresh.find(kid).cloned();
        *self.cached_keys.write().await = Some(fresh);

        found.ok_or_else(|| ValidationFailure::Invalid(format!("no jwks key matches kid {kid}")))
    }
}

#[async_trait]
impl IdentityProvider for JwksValidator {
    async fn validate(&self, token: &str) -> Result<AccessTokenClaims, ValidationFailure> {
        // Anything that is not even a JWT header is malformed, not invalid.
        let header = decode_header(token).map_err(|_| ValidationFailure::Malformed)?;
        let kid = header
            .kid
            .ok_or_else(|| ValidationFailure::Invalid("token header has no kid".to_string()))?;

        let jwk = self.key_for(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| ValidationFailure::Invalid(format!("unusable jwks key: {e}")))?;

        let data = decode::<AccessTokenClaims>(token, &key, &self.validation)
            .map_err(|e| ValidationFailure::Invalid(e.to_string()))?;

        Ok(data.claims)
    }
}
