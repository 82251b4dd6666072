//! Property-based tests for rewrite invariants
//!
//! These verify the fast-path, reclaim and replay guarantees across generated
//! base URLs, paths and base URL histories.

use domain_rewrite::{ConflictPolicy, DomainRegistry, Error, RequestRewriter, DOMAIN_NAME};
use http::Request;
use proptest::prelude::*;
use std::sync::Arc;

pub mod generators {
    use super::*;
    use proptest::collection::vec;
    use proptest::string::string_regex;

    /// Base URLs on distinct hosts, always ending in `/`
    pub fn base_url() -> impl Strategy<Value = String> {
        let host = string_regex("[a-z]{1,8}").unwrap();
        let segment = prop::option::of(string_regex("[a-z0-9]{1,6}").unwrap());
        (host, segment).prop_map(|(host, segment)| match segment {
            Some(segment) => format!("https://{host}.test/{segment}/"),
            None => format!("https://{host}.test/"),
        })
    }

    pub fn path_and_query() -> impl Strategy<Value = String> {
        string_regex("[a-z0-9]{0,12}(\\?[a-z]{1,4}=[a-z0-9]{1,6})?").unwrap()
    }

    pub fn domain_name() -> impl Strategy<Value = String> {
        string_regex("[a-z][a-z0-9-]{0,11}").unwrap()
    }

    pub fn history() -> impl Strategy<Value = Vec<String>> {
        vec(base_url(), 1..8)
    }
}

fn registry(main: &str) -> Arc<DomainRegistry> {
    let registry = Arc::new(DomainRegistry::new());
    registry.initialize(main).unwrap();
    registry
}

fn tagged(uri: &str, domain: &str) -> Request<()> {
    Request::builder()
        .uri(uri)
        .header(DOMAIN_NAME, domain)
        .header("accept", "application/json")
        .body(())
        .unwrap()
}

proptest! {
    #[test]
    fn prop_current_base_without_headers_is_identity(
        main in generators::base_url(),
        name in generators::domain_name(),
        base in generators::base_url(),
        suffix in generators::path_and_query(),
    ) {
        let registry = registry(&main);
        registry.set_domain(&name, &base).unwrap();
        let rewriter = RequestRewriter::new(registry);
        let uri = format!("{base}{suffix}");
        let original = tagged(&uri, &name);
        let expected_uri = original.uri().clone();
        let expected_headers = original.headers().clone();

        let rewritten = rewriter.rewrite(original).unwrap();

        prop_assert_eq!(rewritten.uri(), &expected_uri);
        prop_assert_eq!(rewritten.headers(), &expected_headers);
    }

    #[test]
    fn prop_history_never_holds_current_or_duplicates(
        main in generators::base_url(),
        urls in generators::history(),
    ) {
        let registry = registry(&main);
        for url in &urls {
            registry.set_main_domain(url).unwrap();
        }
        // Go back to the very first URL
        registry.set_main_domain(&main).unwrap();

        let snapshot = registry.main_snapshot().unwrap();
        prop_assert_eq!(snapshot.current_base_url.as_str(), main.as_str());
        prop_assert!(!snapshot.prior_base_urls.contains(&snapshot.current_base_url));
        let mut seen = std::collections::HashSet::new();
        for prior in &snapshot.prior_base_urls {
            prop_assert!(seen.insert(prior.as_str()), "duplicate history entry {}", prior);
        }
    }

    #[test]
    fn prop_replayed_request_targets_current_base(
        main in generators::base_url(),
        name in generators::domain_name(),
        urls in generators::history(),
        suffix in generators::path_and_query(),
    ) {
        let registry = registry(&main);
        registry.set_domain(&name, &urls[0]).unwrap();
        let built_before_change = tagged(&format!("{}{suffix}", urls[0]), &name);
        for url in &urls[1..] {
            registry.set_domain(&name, url).unwrap();
        }
        let current = registry.snapshot(&name).unwrap().current_base_url;
        let rewriter = RequestRewriter::new(registry);

        let rewritten = rewriter.rewrite(built_before_change).unwrap();

        prop_assert!(
            rewritten.uri().to_string().starts_with(current.as_str()),
            "{} does not start with {}",
            rewritten.uri(),
            current
        );
    }

    #[test]
    fn prop_abort_conflict_never_mutates_request(
        main in generators::base_url(),
        moved in generators::base_url(),
        suffix in generators::path_and_query(),
    ) {
        let registry = registry(&main);
        registry.set_main_domain(&moved).unwrap();
        registry.add_main_header("x-extra", "1", ConflictPolicy::Add).unwrap();
        registry.add_main_header("x-guard", "ours", ConflictPolicy::Abort).unwrap();
        let rewriter = RequestRewriter::new(registry);
        let mut request = Request::builder()
            .uri(format!("{main}{suffix}"))
            .header("x-guard", "theirs")
            .body(())
            .unwrap();
        let before_uri = request.uri().clone();
        let before_headers = request.headers().clone();

        let result = rewriter.rewrite_in_place(&mut request);

        prop_assert_eq!(
            result,
            Err(Error::HeaderConflict { key: "x-guard".to_string(), value: "ours".to_string() })
        );
        prop_assert_eq!(request.uri(), &before_uri);
        prop_assert_eq!(request.headers(), &before_headers);
    }
}

#[test]
fn test_policies_produce_distinct_header_sets() {
    let outcomes: Vec<Vec<String>> = [
        ConflictPolicy::Ignore,
        ConflictPolicy::Replace,
        ConflictPolicy::Add,
    ]
    .into_iter()
    .map(|policy| {
        let registry = registry("https://a.test/");
        registry.add_main_header("k", "new", policy).unwrap();
        let request = Request::builder()
            .uri("https://a.test/x")
            .header("k", "orig")
            .body(())
            .unwrap();
        let request = RequestRewriter::new(registry).rewrite(request).unwrap();
        request
            .headers()
            .get_all("k")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    })
    .collect();

    assert_eq!(
        outcomes,
        vec![
            vec!["orig".to_string()],
            vec!["new".to_string()],
            vec!["orig".to_string(), "new".to_string()],
        ]
    );
}
