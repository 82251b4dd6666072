//! Tower integration
//!
//! [`DomainLayer`] installs the rewriter into a client's request pipeline.
//! Rewrite failures fail only the request being rewritten; the inner service
//! is not called for it.
//!
//! ```rust,ignore
//! use domain_rewrite::{DomainLayer, DomainRegistry};
//! use std::sync::Arc;
//! use tower::ServiceBuilder;
//!
//! let registry = Arc::new(DomainRegistry::new());
//! let client = ServiceBuilder::new()
//!     .layer(DomainLayer::bind(registry.clone(), "https://api.example.com/")?)
//!     .service(http_client);
//!
//! registry.set_domain("search", "https://search.example.com/v2/")?;
//! ```

use crate::domain::registry::DomainRegistry;
use crate::error::Result;
use crate::rewrite::rewriter::RequestRewriter;
use futures_util::future::{self, Either, ErrInto, Ready, TryFutureExt};
use http::Request;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{BoxError, Layer, Service};
use tracing::trace;

/// Request extension recording which registry already rewrote the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RewrittenBy(u64);

/// Layer that rewrites requests against a [`DomainRegistry`]
#[derive(Debug, Clone)]
pub struct DomainLayer {
    rewriter: RequestRewriter,
}

impl DomainLayer {
    pub fn new(registry: Arc<DomainRegistry>) -> Self {
        Self {
            rewriter: RequestRewriter::new(registry),
        }
    }

    /// Bind `registry` to a client whose main base URL is `base_url`
    ///
    /// See [`DomainRegistry::bind`]: binding twice with the same URL is fine,
    /// binding with another URL fails.
    pub fn bind(registry: Arc<DomainRegistry>, base_url: &str) -> Result<Self> {
        registry.bind(base_url)?;
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &Arc<DomainRegistry> {
        self.rewriter.registry()
    }
}

impl<S> Layer<S> for DomainLayer {
    type Service = DomainService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DomainService {
            inner,
            rewriter: self.rewriter.clone(),
        }
    }
}

/// Service produced by [`DomainLayer`]
#[derive(Debug, Clone)]
pub struct DomainService<S> {
    inner: S,
    rewriter: RequestRewriter,
}

impl<S> DomainService<S> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, B> Service<Request<B>> for DomainService<S>
where
    S: Service<Request<B>>,
    S::Error: Into<BoxError>,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = Either<
        Ready<std::result::Result<S::Response, BoxError>>,
        ErrInto<S::Future, BoxError>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let marker = RewrittenBy(self.rewriter.registry().id());
        if request.extensions().get::<RewrittenBy>() == Some(&marker) {
            trace!("Request already rewritten by this registry");
        } else {
            match self.rewriter.rewrite_in_place(&mut request) {
                Ok(_) => {
                    request.extensions_mut().insert(marker);
                }
                Err(err) => return Either::Left(future::ready(Err(err.into()))),
            }
        }
        Either::Right(self.inner.call(request).err_into())
    }
}
