//! Validated newtypes for domain identifiers and base URLs

use crate::error::{Error, Result};
use nutype::nutype;

/// Reserved name of the main (default) domain
pub const MAIN_DOMAIN: &str = "_MAIN_";

/// Name identifying a configured domain
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Deref,
        Display
    )
)]
pub struct DomainName(String);

impl DomainName {
    /// The reserved main domain name
    pub fn main() -> Self {
        Self::try_new(MAIN_DOMAIN.to_string()).expect("MAIN_DOMAIN is a valid domain name")
    }

    /// Parse a caller supplied name
    pub fn parse(name: &str) -> Result<Self> {
        Self::try_new(name.to_string()).map_err(|_| Error::InvalidDomainName(name.to_string()))
    }

    pub fn is_main(&self) -> bool {
        self.as_str() == MAIN_DOMAIN
    }
}

/// URL prefix identifying a domain; requests are matched and rewritten by it
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Deref,
        Display
    )
)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Parse a caller supplied base URL, rejecting blank input
    pub fn parse(url: &str) -> Result<Self> {
        Self::try_new(url.to_string()).map_err(|_| Error::EmptyBaseUrl)
    }

    /// Whether `url` begins with this base
    pub fn is_prefix_of(&self, url: &str) -> bool {
        url.starts_with(self.as_str())
    }
}
