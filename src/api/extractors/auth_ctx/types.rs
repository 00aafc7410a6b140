use crate::services::auth::IdentityContext;

/// Context attached to a request the authorizer allowed.
///
/// - `scopes` / `roles` are exactly the validated token's values, normalized
///   to empty vecs (handlers never branch on absence)
/// - created by the auth middleware, consumed read-only by handlers
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub scopes: Vec<String>,
    pub roles: Vec<String>,
}

impl From<IdentityContext> for AuthCtx {
    fn from(context: IdentityContext) -> Self {
        Self {
            scopes: context.scopes,
            roles: context.roles,
        }
    }
}
