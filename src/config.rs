/*
 * Responsibility
 * - Load environment configuration (listen address, identity pool, allow-lists)
 * - Validate at startup: an authorizer with no key source can only ever deny,
 *   so refuse to start instead
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable process-wide configuration. Built once in `app::run` and never
/// mutated afterwards; the authorizer receives its policy by value from here.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    /// Identity pool the tokens must come from. Optional when `JWKS_URL` is
    /// given explicitly.
    pub user_pool_id: Option<String>,
    /// Accepted `client_id` claim values. Empty means no client restriction.
    pub client_ids: Vec<String>,
    /// Scope/role allow-lists. Empty means no restriction of that kind.
    pub allowed_scopes: Vec<String>,
    pub allowed_roles: Vec<String>,

    pub jwks_url: Url,
    pub issuer: Option<String>,

    /// Hard bound on the identity-provider round trip (fail-closed on expiry).
    pub validation_timeout: Duration,
    pub leeway_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let region = opt_var("AWS_REGION");
        let user_pool_id = opt_var("AWS_USER_POOL");

        // Explicit JWKS_URL wins; otherwise derive the pool's well-known URL.
        let jwks_url = match opt_var("JWKS_URL") {
            Some(raw) => raw,
            None => match (region.as_deref(), user_pool_id.as_deref()) {
                (Some(region), Some(pool)) => derive_jwks_url(region, pool),
                _ => return Err(ConfigError::Missing("JWKS_URL")),
            },
        };
        let jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("JWKS_URL"))?;

        let issuer = opt_var("AUTH_ISSUER").or_else(|| {
            match (region.as_deref(), user_pool_id.as_deref()) {
                (Some(region), Some(pool)) => Some(derive_issuer(region, pool)),
                _ => None,
            }
        });

        let client_ids = split_csv(&std::env::var("AWS_CLIENT_ID").unwrap_or_default());
        let allowed_scopes = split_csv(&std::env::var("ALLOWED_SCOPES").unwrap_or_default());
        let allowed_roles = split_csv(&std::env::var("ALLOWED_ROLES").unwrap_or_default());

        let validation_timeout_ms: u64 = std::env::var("VALIDATION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let leeway_seconds: u64 = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            addr,
            app_env,
            user_pool_id,
            client_ids,
            allowed_scopes,
            allowed_roles,
            jwks_url,
            issuer,
            validation_timeout: Duration::from_millis(validation_timeout_ms),
            leeway_seconds,
        })
    }
}

fn opt_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn derive_jwks_url(region: &str, pool: &str) -> String {
    format!("https://cognito-idp.{region}.amazonaws.com/{pool}/.well-known/jwks.json")
}

fn derive_issuer(region: &str, pool: &str) -> String {
    format!("https://cognito-idp.{region}.amazonaws.com/{pool}")
}
