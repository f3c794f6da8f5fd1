//! The middleware chain — onion-model request processing.
//!
//! A [`Chain`] is an ordered, immutable stack of middleware shared by every
//! request. Each middleware receives the per-request [`Context`] and a
//! [`Next`] continuation; code before `next.run(ctx).await` executes in
//! registration order, code after it in reverse order:
//!
//! ```text
//! A in → B in → C in → C out → B out → A out
//! ```
//!
//! That nesting is what makes cross-cutting concerns composable: a tracing
//! middleware registered first sees the final status and total latency of
//! everything underneath it, an auth middleware can refuse to call `next` at
//! all, and a router is just the innermost layer.
//!
//! # Writing middleware
//!
//! Any `async fn (Context, Next) -> Result<Context, Error>` is middleware:
//!
//! ```rust
//! use shallot::{App, Context, Error, Next};
//!
//! async fn greeter(mut ctx: Context, next: Next) -> Result<Context, Error> {
//!     if ctx.path() == "/hello" {
//!         ctx.text("Hello World");
//!         return Ok(ctx);           // don't call next — short-circuit
//!     }
//!     next.run(ctx).await           // pass the context downstream
//! }
//!
//! let chain = App::new().with(greeter).into_chain();
//! ```
//!
//! # The continuation is single-use
//!
//! [`Next::run`] takes `self` by value. A middleware that tries to invoke
//! its continuation twice does not get undefined behavior or a runtime
//! check — it gets a borrow-checker error. Skipping the call entirely is
//! fine and short-circuits the rest of the chain.
//!
//! # Failures unwind
//!
//! A middleware that returns `Err` halts forward progress. The error
//! surfaces as the return value of each enclosing `next.run(ctx).await`, in
//! reverse registration order, so outer middleware can run cleanup before
//! propagating with `?` — the same shape as exception unwinding through
//! nested scopes. The chain itself never catches, retries, or re-enters
//! anything; translating an unhandled error into a client-visible `500` is
//! the server's job.

pub mod serve;
pub mod trace;
pub mod upload;

pub use serve::serve_static;
pub use trace::trace;
pub use upload::{UploadConfig, UploadedFile, multipart};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future. `Pin<Box<…>>` because the runtime
/// polls it in place; `Send + 'static` so tokio may move it across threads.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Middleware` trait's `into_boxed_middleware`
/// method. External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, ctx: Context, next: Next) -> BoxFuture<Result<Context, Error>>;
}

/// A heap-allocated, type-erased middleware shared across concurrent
/// requests. One atomic reference-count increment per invocation.
#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

// ── Public Middleware trait ───────────────────────────────────────────────────

/// Implemented for every valid middleware.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a `Send` future) with the signature:
///
/// ```text
/// async fn name(ctx: Context, next: Next) -> Result<Context, Error>
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it, which keeps the API surface stable.
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
}

impl<F, Fut> Middleware for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

/// Newtype bridging a concrete `F` into the trait-object world.
struct FnMiddleware<F>(F);

impl<F, Fut> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn call(&self, ctx: Context, next: Next) -> BoxFuture<Result<Context, Error>> {
        Box::pin((self.0)(ctx, next))
    }
}

// ── Next ─────────────────────────────────────────────────────────────────────

/// The continuation handed to each middleware: "the rest of the chain".
///
/// Holds the shared stack and the position of the next middleware to run.
/// [`run`](Next::run) consumes `self`, so each middleware invocation can use
/// its continuation at most once — enforced at compile time.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    index: usize,
}

impl Next {
    /// Runs the remainder of the chain over `ctx`.
    ///
    /// Invoking this past the last middleware is a no-op that completes the
    /// pipeline and yields the context back unchanged.
    pub async fn run(self, ctx: Context) -> Result<Context, Error> {
        let mw = match self.stack.get(self.index) {
            Some(mw) => Arc::clone(mw),
            None => return Ok(ctx),
        };
        let next = Next { stack: self.stack, index: self.index + 1 };
        mw.call(ctx, next).await
    }
}

// ── Chain ────────────────────────────────────────────────────────────────────

/// An immutable, ordered middleware stack.
///
/// Built once at startup via [`App`](crate::App), then shared read-only
/// across every concurrent request. Only the per-request [`Context`] varies;
/// the ordering is fixed for the lifetime of the chain.
pub struct Chain {
    stack: Arc<[BoxedMiddleware]>,
}

impl Chain {
    pub(crate) fn new(stack: Vec<BoxedMiddleware>) -> Self {
        Self { stack: stack.into() }
    }

    /// Executes the whole chain over one context.
    ///
    /// Each middleware runs at most once. An empty chain cannot produce a
    /// response and yields [`Error::NoMiddleware`] without touching the
    /// context; any middleware failure propagates out unchanged.
    pub async fn run(&self, ctx: Context) -> Result<Context, Error> {
        if self.stack.is_empty() {
            return Err(Error::NoMiddleware);
        }
        let next = Next { stack: Arc::clone(&self.stack), index: 0 };
        next.run(ctx).await
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
