/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - hand handlers the context of a request the authorizer allowed
 * - HTTP / axum specifics stay in core, the type contract in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
