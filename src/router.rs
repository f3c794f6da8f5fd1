//! Radix-tree request router, exposed as middleware.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. Build
//! the router, then mount it on the app with [`Router::routes`] — matched
//! requests go to their endpoint, everything else falls through to the next
//! middleware (so a static-file layer behind the router still gets a shot):
//!
//! ```rust
//! use shallot::{App, Context, Error, Router};
//!
//! async fn get_user(mut ctx: Context) -> Result<Context, Error> {
//!     let id = ctx.param("id").unwrap_or("unknown").to_owned();
//!     ctx.json(format!(r#"{{"id":"{id}"}}"#).into_bytes());
//!     Ok(ctx)
//! }
//!
//! let app = App::new().with(
//!     Router::new()
//!         .get("/users/{id}", get_user)
//!         .routes(),
//! );
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::context::Context;
use crate::error::Error;
use crate::middleware::{BoxFuture, Middleware, Next};

// ── Endpoint trait and type erasure ──────────────────────────────────────────
//
// The router stores endpoints of different concrete types in one map, so
// each is hidden behind a trait object. The only per-request cost is an Arc
// clone and a single virtual call.

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Endpoint` trait's method.
#[doc(hidden)]
pub trait ErasedEndpoint {
    fn call(&self, ctx: Context) -> BoxFuture<Result<Context, Error>>;
}

#[doc(hidden)]
pub type BoxedEndpoint = Arc<dyn ErasedEndpoint + Send + Sync + 'static>;

/// Implemented for every valid route endpoint.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(ctx: Context) -> Result<Context, Error>
/// ```
///
/// Unlike [`Middleware`], an endpoint takes no continuation — it is the
/// center of the onion.
pub trait Endpoint: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_endpoint(self) -> BoxedEndpoint;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
}

impl<F, Fut> Endpoint for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn into_boxed_endpoint(self) -> BoxedEndpoint {
        Arc::new(FnEndpoint(self))
    }
}

struct FnEndpoint<F>(F);

impl<F, Fut> ErasedEndpoint for FnEndpoint<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture<Result<Context, Error>> {
        Box::pin((self.0)(ctx))
    }
}

// ── Router ───────────────────────────────────────────────────────────────────

/// The application router.
///
/// Registration panics on an invalid or conflicting path — that is a
/// programming error caught at startup, not a runtime condition.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedEndpoint>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register an endpoint for a method + path pair. Returns `self` so
    /// registrations chain. Path parameters use `{name}` syntax and are
    /// retrieved with [`Context::param`].
    pub fn on(mut self, method: Method, path: &str, endpoint: impl Endpoint) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, endpoint.into_boxed_endpoint())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, endpoint: impl Endpoint) -> Self {
        self.on(Method::GET, path, endpoint)
    }

    pub fn post(self, path: &str, endpoint: impl Endpoint) -> Self {
        self.on(Method::POST, path, endpoint)
    }

    pub fn put(self, path: &str, endpoint: impl Endpoint) -> Self {
        self.on(Method::PUT, path, endpoint)
    }

    pub fn patch(self, path: &str, endpoint: impl Endpoint) -> Self {
        self.on(Method::PATCH, path, endpoint)
    }

    pub fn delete(self, path: &str, endpoint: impl Endpoint) -> Self {
        self.on(Method::DELETE, path, endpoint)
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedEndpoint, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let endpoint = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((endpoint, params))
    }

    /// Converts the router into middleware for [`App::with`](crate::App::with).
    ///
    /// A matched request is dispatched to its endpoint with path parameters
    /// set; an unmatched one is handed to `next` untouched, so layers mounted
    /// after the router still see it.
    pub fn routes(self) -> impl Middleware {
        let router = Arc::new(self);
        move |mut ctx: Context, next: Next| {
            let router = Arc::clone(&router);
            async move {
                match router.lookup(ctx.method(), ctx.path()) {
                    Some((endpoint, params)) => {
                        ctx.set_params(params);
                        endpoint.call(ctx).await
                    }
                    None => next.run(ctx).await,
                }
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
