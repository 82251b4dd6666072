//! Domain Rewrite - dynamic base URL switching for HTTP clients
//!
//! Requests name the domain they want with a `Domain-Name` header. The
//! rewriter resolves that name to the domain's current base URL, retargets the
//! request (including requests built against a base URL that has since been
//! replaced) and merges in the domain's default headers.

pub mod config;
pub mod domain;
pub mod error;
pub mod rewrite;

pub use config::Settings;
pub use domain::{ConflictPolicy, DefaultHeader, DomainName, DomainRegistry, DomainSnapshot};
pub use error::{Error, Result};
pub use rewrite::{DomainLayer, DomainService, RequestRewriter, RewriteOutcome, DOMAIN_NAME};
