//! Per-domain state: current base URL, superseded base URLs and default headers

use crate::domain::policy::{ConflictPolicy, DefaultHeader};
use crate::domain::types::{BaseUrl, DomainName};
use http::header::HeaderName;
use serde::Serialize;
use std::collections::HashMap;

/// Mutable state of one named domain
///
/// Records are owned by the registry and always accessed through the record's
/// own lock, so every method here assumes exclusive (or shared read) access.
#[derive(Debug, Clone)]
pub struct DomainRecord {
    name: DomainName,
    current_base_url: BaseUrl,
    /// Oldest first; never contains `current_base_url` or duplicates
    prior_base_urls: Vec<BaseUrl>,
    default_headers: HashMap<HeaderName, DefaultHeader>,
}

impl DomainRecord {
    pub fn new(name: DomainName, base_url: BaseUrl) -> Self {
        Self {
            name,
            current_base_url: base_url,
            prior_base_urls: Vec::new(),
            default_headers: HashMap::new(),
        }
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn current_base_url(&self) -> &BaseUrl {
        &self.current_base_url
    }

    pub fn prior_base_urls(&self) -> &[BaseUrl] {
        &self.prior_base_urls
    }

    pub fn default_headers(&self) -> impl Iterator<Item = &DefaultHeader> {
        self.default_headers.values()
    }

    pub fn has_default_headers(&self) -> bool {
        !self.default_headers.is_empty()
    }

    /// Make `url` current, pushing the previous base onto the history
    ///
    /// Returns the superseded base URL, or `None` when `url` already is current.
    /// Moving back to a URL held earlier reclaims it from the history instead of
    /// duplicating it.
    pub fn update_base_url(&mut self, url: BaseUrl) -> Option<BaseUrl> {
        if url == self.current_base_url {
            return None;
        }
        let previous = std::mem::replace(&mut self.current_base_url, url);
        self.prior_base_urls.push(previous.clone());
        let current = &self.current_base_url;
        self.prior_base_urls.retain(|prior| prior != current);
        Some(previous)
    }

    /// Insert a default header, returning the entry it replaced
    pub fn add_header(&mut self, header: DefaultHeader) -> Option<DefaultHeader> {
        self.default_headers.insert(header.name.clone(), header)
    }

    pub fn remove_header(&mut self, name: &HeaderName) -> Option<DefaultHeader> {
        self.default_headers.remove(name)
    }

    /// Find the base URL `url` was built against
    ///
    /// The current base wins; otherwise the most recently superseded base that
    /// prefixes `url`.
    pub fn match_base_url(&self, url: &str) -> Option<&BaseUrl> {
        if self.current_base_url.is_prefix_of(url) {
            return Some(&self.current_base_url);
        }
        self.prior_base_urls
            .iter()
            .rev()
            .find(|prior| prior.is_prefix_of(url))
    }

    pub fn snapshot(&self) -> DomainSnapshot {
        let mut headers: Vec<(String, String, ConflictPolicy)> = self
            .default_headers
            .values()
            .map(|header| {
                (
                    header.name.to_string(),
                    String::from_utf8_lossy(header.value.as_bytes()).into_owned(),
                    header.policy,
                )
            })
            .collect();
        headers.sort();
        DomainSnapshot {
            name: self.name.clone(),
            current_base_url: self.current_base_url.clone(),
            prior_base_urls: self.prior_base_urls.clone(),
            headers,
        }
    }
}

/// Point-in-time copy of a [`DomainRecord`], taken under its lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSnapshot {
    pub name: DomainName,
    pub current_base_url: BaseUrl,
    pub prior_base_urls: Vec<BaseUrl>,
    /// `(name, value, policy)` sorted by header name
    pub headers: Vec<(String, String, ConflictPolicy)>,
}
