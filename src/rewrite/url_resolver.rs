//! Base URL resolution and prefix substitution for outgoing requests

use crate::domain::record::DomainRecord;
use crate::domain::types::BaseUrl;
use crate::error::{Error, Result};
use http::Uri;
use parking_lot::RwLock;
use tracing::debug;

/// Strategy for finding the base URL a request was built against
pub struct UrlResolver;

impl UrlResolver {
    /// Find the base URL that prefixes `url`
    ///
    /// The source record is searched first (current base, then history from
    /// the most recently superseded entry). If nothing matches, `fallback`
    /// (the main record, when the source is some other domain) is searched the
    /// same way. There is no further fallback.
    pub fn resolve(
        url: &str,
        source: &DomainRecord,
        fallback: Option<&RwLock<DomainRecord>>,
    ) -> Option<BaseUrl> {
        if let Some(matched) = source.match_base_url(url) {
            return Some(matched.clone());
        }
        let fallback = fallback?;
        debug!(
            domain = %source.name(),
            "No base URL of the domain matches, trying the main domain"
        );
        fallback.read().match_base_url(url).cloned()
    }

    /// Replace the `matched` prefix of `url` with `current`
    ///
    /// Only the prefix is substituted; the rest of the URL is kept verbatim.
    pub fn retarget(url: &str, matched: &BaseUrl, current: &BaseUrl) -> Result<Uri> {
        let rest = url
            .strip_prefix(matched.as_str())
            .ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
        let rewritten = format!("{current}{rest}");
        rewritten.parse().map_err(|_| Error::InvalidUrl(rewritten))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DomainName;

    fn url(s: &str) -> BaseUrl {
        BaseUrl::parse(s).unwrap()
    }

    fn record(name: &str, base: &str) -> DomainRecord {
        DomainRecord::new(DomainName::parse(name).unwrap(), url(base))
    }

    #[test]
    fn test_resolve_matches_source_before_fallback() {
        let source = record("search", "https://s.test/");
        let main = RwLock::new(record("_MAIN_", "https://s.test/"));

        assert_eq!(
            UrlResolver::resolve("https://s.test/q", &source, Some(&main)),
            Some(url("https://s.test/"))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_main_history() {
        let source = record("search", "https://s.test/");
        let mut main = record("_MAIN_", "https://a.test/");
        main.update_base_url(url("https://b.test/"));
        let main = RwLock::new(main);

        assert_eq!(
            UrlResolver::resolve("https://a.test/q", &source, Some(&main)),
            Some(url("https://a.test/"))
        );
    }

    #[test]
    fn test_resolve_without_match_is_none() {
        let source = record("search", "https://s.test/");
        let main = RwLock::new(record("_MAIN_", "https://a.test/"));

        assert_eq!(
            UrlResolver::resolve("https://unrelated.test/y", &source, Some(&main)),
            None
        );
        assert_eq!(UrlResolver::resolve("https://a.test/y", &source, None), None);
    }

    #[test]
    fn test_retarget_replaces_prefix_only() {
        let uri = UrlResolver::retarget(
            "https://a.test/api/items?next=https://a.test/api/",
            &url("https://a.test/api/"),
            &url("https://b.test/v2/"),
        )
        .unwrap();

        assert_eq!(
            uri.to_string(),
            "https://b.test/v2/items?next=https://a.test/api/"
        );
    }

    #[test]
    fn test_retarget_to_invalid_uri_fails() {
        let result = UrlResolver::retarget(
            "https://a.test/x",
            &url("https://a.test/"),
            &url("not a url/"),
        );

        assert_eq!(result, Err(Error::InvalidUrl("not a url/x".to_string())));
    }
}
