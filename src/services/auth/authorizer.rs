/*
 * The authorization decision core
 * - credential -> identity-provider validation -> client/allow-list policy
 * - every failure collapses to one external outcome (deny); the reason
 *   survives only in logs
 */
use std::fmt;
use std::sync::Arc;

use crate::services::auth::claims::IdentityContext;
use crate::services::auth::provider::{IdentityProvider, ValidationFailure};

/// Internal deny taxonomy. Callers never see which one fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DenyReason {
    MalformedCredential,
    InvalidCredential,
    PolicyDenied,
    UpstreamUnavailable,
}

/// Immutable allow-list policy, built once from `Config` at startup.
///
/// Empty `client_ids` / `allowed_scopes` / `allowed_roles` mean "no
/// restriction of this kind".
#[derive(Debug, Clone, Default)]
pub struct AuthPolicy {
    pub user_pool: Option<String>,
    pub client_ids: Vec<String>,
    pub allowed_scopes: Vec<String>,
    pub allowed_roles: Vec<String>,
}

/// Outcome of one authorization check.
///
/// Fields are private so the invariant holds by construction: a context
/// exists if and only if the request was allowed.
#[derive(Debug, Clone)]
pub struct AuthorizationDecision {
    allowed: bool,
    context: Option<IdentityContext>,
}

impl AuthorizationDecision {
    fn allow(context: IdentityContext) -> Self {
        Self {
            allowed: true,
            context: Some(context),
        }
    }

    fn deny() -> Self {
        Self {
            allowed: false,
            context: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn context(&self) -> Option<&IdentityContext> {
        self.context.as_ref()
    }

    pub fn into_context(self) -> Option<IdentityContext> {
        self.context
    }
}

pub struct Authorizer {
    provider: Arc<dyn IdentityProvider>,
    policy: AuthPolicy,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("policy", &self.policy)
            .finish()
    }
}

impl Authorizer {
    pub fn new(provider: Arc<dyn IdentityProvider>, policy: AuthPolicy) -> Self {
        Self { provider, policy }
    }

    /// Decide one request. `credential` is the raw bearer token, if the caller
    /// sent one; absence is an ordinary deny, not an error.
    pub async fn authorize(&self, credential: Option<&str>) -> AuthorizationDecision {
        match self.evaluate(credential).await {
            Ok(context) => AuthorizationDecision::allow(context),
            Err(reason) => {
                match reason {
                    DenyReason::MalformedCredential => {
                        tracing::debug!("denied: absent or malformed credential");
                    }
                    DenyReason::InvalidCredential => {
                        tracing::info!("denied: credential failed validation");
                    }
                    DenyReason::PolicyDenied => {
                        tracing::info!("denied: scopes/roles outside the configured allow-lists");
                    }
                    DenyReason::UpstreamUnavailable => {
                        tracing::error!("denied: identity provider unreachable (fail-closed)");
                    }
                }
                AuthorizationDecision::deny()
            }
        }
    }

    async fn evaluate(&self, credential: Option<&str>) -> Result<IdentityContext, DenyReason> {
        let token = credential
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DenyReason::MalformedCredential)?;

        let claims = self.provider.validate(token).await.map_err(|f| match f {
            ValidationFailure::Malformed => DenyReason::MalformedCredential,
            ValidationFailure::Invalid(_) => DenyReason::InvalidCredential,
            ValidationFailure::Unavailable(_) => DenyReason::UpstreamUnavailable,
        })?;

        if !self.policy.client_ids.is_empty() {
            let known_client = claims
                .client_id
                .as_deref()
                .is_some_and(|id| self.policy.client_ids.iter().any(|c| c == id));
            if !known_client {
                return Err(DenyReason::InvalidCredential);
            }
        }

        let scopes = claims.scopes();
        let roles = claims.roles();

        // At-least-one-match policy, applied symmetrically (each configured
        // list must intersect the token's values).
        if !allow_list_satisfied(&scopes, &self.policy.allowed_scopes)
            || !allow_list_satisfied(&roles, &self.policy.allowed_roles)
        {
            return Err(DenyReason::PolicyDenied);
        }

        tracing::debug!(
            sub = claims.sub.as_deref().unwrap_or("<none>"),
            "request authorized"
        );

        Ok(IdentityContext {
            scopes,
            roles,
            user_pool: self.policy.user_pool.clone(),
            client_id: claims.client_id.clone(),
        })
    }
}

fn allow_list_satisfied(values: &[String], allowed: &[String]) -> bool {
    allowed.is_empty() || values.iter().any(|v| allowed.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::services::auth::claims::AccessTokenClaims;

    fn claims(scope: &str, roles: Option<Vec<&str>>, client_id: Option<&str>) -> AccessTokenClaims {
        serde_json::from_value(json!({
            "exp": 4_102_444_800u64,
            "scope": scope,
            "roles": roles,
            "client_id": client_id,
        }))
        .unwrap()
    }

    struct FakeProvider(Result<AccessTokenClaims, fn() -> ValidationFailure>);

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn validate(&self, _token: &str) -> Result<AccessTokenClaims, ValidationFailure> {
            match &self.0 {
                Ok(claims) => Ok(claims.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    /// Provider that must never be reached.
    struct PanicProvider;

    #[async_trait]
    impl IdentityProvider for PanicProvider {
        async fn validate(&self, _token: &str) -> Result<AccessTokenClaims, ValidationFailure> {
            panic!("provider called for a credential that should fast-deny");
        }
    }

    fn authorizer_with(
        outcome: Result<AccessTokenClaims, fn() -> ValidationFailure>,
        policy: AuthPolicy,
    ) -> Authorizer {
        Authorizer::new(Arc::new(FakeProvider(outcome)), policy)
    }

    fn strs(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn absent_credential_denies_without_calling_provider() {
        let authorizer = Authorizer::new(Arc::new(PanicProvider), AuthPolicy::default());
        assert!(!authorizer.authorize(None).await.is_allowed());
        assert!(!authorizer.authorize(Some("")).await.is_allowed());
        assert!(!authorizer.authorize(Some("   ")).await.is_allowed());
    }

    #[tokio::test]
    async fn deny_carries_no_context() {
        let authorizer = Authorizer::new(Arc::new(PanicProvider), AuthPolicy::default());
        let decision = authorizer.authorize(None).await;
        assert!(decision.context().is_none());
        assert!(decision.into_context().is_none());
    }

    #[tokio::test]
    async fn invalid_credential_denies() {
        let authorizer = authorizer_with(
            Err(|| ValidationFailure::Invalid("bad signature".into())),
            AuthPolicy::default(),
        );
        assert!(!authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn provider_outage_denies() {
        let authorizer = authorizer_with(
            Err(|| ValidationFailure::Unavailable("timeout".into())),
            AuthPolicy::default(),
        );
        assert!(!authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn valid_credential_with_no_allow_lists_is_allowed() {
        let authorizer = authorizer_with(
            Ok(claims("orders/read", None, Some("client-abc"))),
            AuthPolicy::default(),
        );

        let decision = authorizer.authorize(Some("token")).await;
        assert!(decision.is_allowed());

        let context = decision.context().unwrap();
        assert_eq!(context.scopes, vec!["orders/read"]);
        assert!(context.roles.is_empty());
        assert_eq!(context.client_id.as_deref(), Some("client-abc"));
    }

    #[tokio::test]
    async fn context_echoes_token_values_unfiltered() {
        let policy = AuthPolicy {
            allowed_scopes: strs(&["orders/read"]),
            ..AuthPolicy::default()
        };
        let authorizer = authorizer_with(
            Ok(claims("orders/read orders/write", Some(vec!["dev"]), None)),
            policy,
        );

        let decision = authorizer.authorize(Some("token")).await;
        let context = decision.context().unwrap();
        // The full token scope set is attached, not just the matching entry.
        assert_eq!(context.scopes, vec!["orders/read", "orders/write"]);
        assert_eq!(context.roles, vec!["dev"]);
    }

    #[tokio::test]
    async fn scope_allow_list_requires_an_intersection() {
        let policy = AuthPolicy {
            allowed_scopes: strs(&["admin/write"]),
            ..AuthPolicy::default()
        };
        let authorizer = authorizer_with(Ok(claims("orders/read", None, None)), policy);
        assert!(!authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn role_allow_list_applies_even_when_scopes_match() {
        let policy = AuthPolicy {
            allowed_scopes: strs(&["orders/read"]),
            allowed_roles: strs(&["admin"]),
            ..AuthPolicy::default()
        };
        let authorizer =
            authorizer_with(Ok(claims("orders/read", Some(vec!["viewer"]), None)), policy);
        assert!(!authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn both_allow_lists_matching_allows() {
        let policy = AuthPolicy {
            allowed_scopes: strs(&["orders/read", "orders/write"]),
            allowed_roles: strs(&["admin", "dev"]),
            ..AuthPolicy::default()
        };
        let authorizer =
            authorizer_with(Ok(claims("orders/read", Some(vec!["dev"]), None)), policy);
        assert!(authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn unknown_client_id_denies_when_restricted() {
        let policy = AuthPolicy {
            client_ids: strs(&["client-abc"]),
            ..AuthPolicy::default()
        };
        let authorizer =
            authorizer_with(Ok(claims("orders/read", None, Some("client-zzz"))), policy);
        assert!(!authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn missing_client_id_denies_when_restricted() {
        let policy = AuthPolicy {
            client_ids: strs(&["client-abc"]),
            ..AuthPolicy::default()
        };
        let authorizer = authorizer_with(Ok(claims("orders/read", None, None)), policy);
        assert!(!authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn matching_client_id_allows() {
        let policy = AuthPolicy {
            client_ids: strs(&["client-abc", "client-def"]),
            ..AuthPolicy::default()
        };
        let authorizer =
            authorizer_with(Ok(claims("orders/read", None, Some("client-def"))), policy);
        assert!(authorizer.authorize(Some("token")).await.is_allowed());
    }

    #[tokio::test]
    async fn same_inputs_yield_same_decision() {
        let policy = AuthPolicy {
            allowed_scopes: strs(&["orders/read"]),
            ..AuthPolicy::default()
        };
        let authorizer = authorizer_with(Ok(claims("orders/read", None, None)), policy);

        let first = authorizer.authorize(Some("token")).await;
        let second = authorizer.authorize(Some("token")).await;
        assert_eq!(first.is_allowed(), second.is_allowed());
        assert_eq!(first.context(), second.context());
    }
}
