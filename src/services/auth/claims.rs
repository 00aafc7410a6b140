use serde::Deserialize;

/// Access token (JWT) claims.
///
/// NOTE:
/// - `scope` is the OAuth space-separated string; `scopes()` splits it.
/// - user-pool tokens carry group membership under `cognito:groups`, client
///   tokens may carry an explicit `roles` list; both land in `roles`.
/// - `exp`/`iss`/signature enforcement happens in the provider, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub exp: u64,

    /// Subject, kept for log correlation on the allow path.
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default, alias = "cognito:groups")]
    pub roles: Option<Vec<String>>,
}

impl AccessTokenClaims {
    /// Token scopes, normalized: absent or blank claim becomes an empty set.
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Token roles, normalized to an empty set when the claim is absent.
    pub fn roles(&self) -> Vec<String> {
        self.roles.clone().unwrap_or_default()
    }
}

/// Validated identity attached to an allowed request.
///
/// Produced only by the authorizer from a credential that passed validation;
/// read-only from then on. `scopes`/`roles` are exactly the token's values
/// (no filtering), empty rather than absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub scopes: Vec<String>,
    pub roles: Vec<String>,
    pub user_pool: Option<String>,
    pub client_id: Option<String>,
}
