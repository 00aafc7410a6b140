pub mod authorizer;
pub mod claims;
pub mod factory;
pub mod jwks;
pub mod provider;

pub use authorizer::{AuthPolicy, AuthorizationDecision, Authorizer};
pub use claims::{AccessTokenClaims, IdentityContext};
pub use factory::build_authorizer;
pub use jwks::JwksValidator;
pub use provider::{IdentityProvider, ValidationFailure};
