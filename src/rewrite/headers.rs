//! The reserved domain tag header
//!
//! A request names the domain it wants with a single `Domain-Name` header.
//! Requests without one belong to the main domain.

use crate::domain::types::DomainName;
use crate::error::{Error, Result};
use http::header::HeaderMap;

/// Reserved header naming the domain a request targets
pub const DOMAIN_NAME: &str = "Domain-Name";

/// Domain requested by an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainTag {
    /// No tag (or an empty one); the main domain applies
    Untagged,
    Named(DomainName),
}

impl DomainTag {
    /// Read the domain tag from request headers
    ///
    /// More than one tag is [`Error::AmbiguousDomainTag`]. A value that is not
    /// visible ASCII can never name a configured domain and is reported as
    /// [`Error::DomainNotFound`].
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let mut values = headers.get_all(DOMAIN_NAME).iter();
        let Some(value) = values.next() else {
            return Ok(Self::Untagged);
        };
        let extra = values.count();
        if extra > 0 {
            return Err(Error::AmbiguousDomainTag { count: extra + 1 });
        }

        let name = value.to_str().map_err(|_| {
            Error::DomainNotFound(String::from_utf8_lossy(value.as_bytes()).into_owned())
        })?;
        Ok(match DomainName::parse(name) {
            Ok(name) if name.is_main() => Self::Untagged,
            Ok(name) => Self::Named(name),
            Err(_) => Self::Untagged,
        })
    }
}
