use async_trait::async_trait;
use thiserror::Error;

use crate::services::auth::claims::AccessTokenClaims;

/// How a credential fails at the identity-provider seam.
///
/// `Unavailable` is the one transient case: the provider could not be asked,
/// which the authorizer must treat as deny (fail-closed), never as a hang.
#[derive(Debug, Error)]
pub enum ValidationFailure {
    #[error("malformed credential")]
    Malformed,
    #[error("invalid credential: {0}")]
    Invalid(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// External identity provider: `validate(token) -> claims | failure`.
///
/// Implementations own signature/expiry/issuer checks; allow-list and client
/// policy live in the `Authorizer` so the seam stays a pure validator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn validate(&self, token: &str) -> Result<AccessTokenClaims, ValidationFailure>;
}
