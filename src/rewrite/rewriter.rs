//! The request rewriter
//!
//! For every outgoing request the rewriter reads the domain tag, finds the
//! base URL the request was built against, retargets it to the tagged domain's
//! current base URL and merges in that domain's default headers.
//!
//! ```rust
//! use domain_rewrite::{DomainRegistry, RequestRewriter, DOMAIN_NAME};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(DomainRegistry::new());
//! registry.initialize("https://api.example.com/")?;
//! registry.set_domain("search", "https://search.example.com/v2/")?;
//!
//! let rewriter = RequestRewriter::new(registry);
//! let request = http::Request::builder()
//!     .uri("https://api.example.com/query?q=rust")
//!     .header(DOMAIN_NAME, "search")
//!     .body(())
//!     .unwrap();
//!
//! let request = rewriter.rewrite(request)?;
//! assert_eq!(request.uri(), "https://search.example.com/v2/query?q=rust");
//! # Ok::<(), domain_rewrite::Error>(())
//! ```

use crate::domain::registry::DomainRegistry;
use crate::domain::types::DomainName;
use crate::error::{Error, Result};
use crate::rewrite::headers::DomainTag;
use crate::rewrite::url_resolver::UrlResolver;
use http::Request;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// What a rewrite did to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Rewriting is switched off
    Disabled,
    /// The URL belongs to no known base URL and was left alone
    Unmatched,
    /// The URL already targets the current base and there are no default headers
    Unchanged,
    Rewritten {
        domain: DomainName,
        /// Whether the URL was moved to a different base
        retargeted: bool,
    },
}

/// Rewrites outgoing requests against a shared [`DomainRegistry`]
#[derive(Debug, Clone)]
pub struct RequestRewriter {
    registry: Arc<DomainRegistry>,
}

impl RequestRewriter {
    pub fn new(registry: Arc<DomainRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<DomainRegistry> {
        &self.registry
    }

    /// Rewrite `request`, returning the (possibly) new request
    pub fn rewrite<B>(&self, mut request: Request<B>) -> Result<Request<B>> {
        self.rewrite_in_place(&mut request)?;
        Ok(request)
    }

    /// Rewrite `request` in place
    ///
    /// The whole rewrite is computed before the request is touched, so on
    /// error the request is left exactly as it was.
    pub fn rewrite_in_place<B>(&self, request: &mut Request<B>) -> Result<RewriteOutcome> {
        if !self.registry.is_enabled() {
            return Ok(RewriteOutcome::Disabled);
        }

        let tag = DomainTag::from_headers(request.headers()).inspect_err(|e| {
            warn!(uri = %request.uri(), error = %e, "Rejecting request domain tag");
        })?;
        let main = self.registry.main_record()?;
        let source = match &tag {
            DomainTag::Untagged => Arc::clone(&main),
            DomainTag::Named(name) => self.registry.record(name).ok_or_else(|| {
                warn!(domain = %name, uri = %request.uri(), "Request tagged with unknown domain");
                Error::DomainNotFound(name.to_string())
            })?,
        };
        let fallback = (!Arc::ptr_eq(&source, &main)).then_some(&*main);

        let url = request.uri().to_string();
        let (uri, headers, domain) = {
            let source = source.read();
            let Some(matched) = UrlResolver::resolve(&url, &source, fallback) else {
                debug!(
                    domain = %source.name(),
                    url = %url,
                    "URL matches no known base URL, passing through"
                );
                return Ok(RewriteOutcome::Unmatched);
            };

            let current = source.current_base_url();
            if matched == *current && !source.has_default_headers() {
                trace!(domain = %source.name(), url = %url, "Request already targets current base URL");
                return Ok(RewriteOutcome::Unchanged);
            }

            let uri = if matched == *current {
                None
            } else {
                let uri = UrlResolver::retarget(&url, &matched, current)?;
                debug!(
                    domain = %source.name(),
                    from = %matched,
                    to = %current,
                    uri = %uri,
                    "Request retargeted"
                );
                Some(uri)
            };

            let original = request.headers();
            let mut headers = original.clone();
            for header in source.default_headers() {
                header.apply(original, &mut headers).inspect_err(|e| {
                    warn!(domain = %source.name(), url = %url, error = %e, "Default header conflict");
                })?;
            }
            (uri, headers, source.name().clone())
        };

        let retargeted = uri.is_some();
        if let Some(uri) = uri {
            *request.uri_mut() = uri;
        }
        *request.headers_mut() = headers;
        Ok(RewriteOutcome::Rewritten { domain, retargeted })
    }
}
