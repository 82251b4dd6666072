//! Request rewriting
//!
//! - `headers`: the reserved `Domain-Name` tag
//! - `url_resolver`: base URL matching and prefix substitution
//! - `rewriter`: the per-request algorithm
//! - `layer`: tower integration

pub mod headers;
pub mod layer;
pub mod rewriter;
pub mod url_resolver;

pub use headers::{DomainTag, DOMAIN_NAME};
pub use layer::{DomainLayer, DomainService};
pub use rewriter::{RequestRewriter, RewriteOutcome};
