//! Domain configuration model
//!
//! Leaves first: header conflict policies, validated names and base URLs, the
//! per-domain record, and the registry that owns the records.

pub mod policy;
pub mod record;
pub mod registry;
pub mod types;

pub use policy::{ConflictPolicy, DefaultHeader};
pub use record::{DomainRecord, DomainSnapshot};
pub use registry::{DomainRegistry, SharedRecord};
pub use types::{BaseUrl, DomainName, MAIN_DOMAIN};
