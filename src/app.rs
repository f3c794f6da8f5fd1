//! Application object: composes the middleware chain.
//!
//! There is no global app instance and no ambient state — you construct an
//! [`App`], register middleware on it, and hand it to the server (or seal it
//! into a [`Chain`] yourself for tests). Registration order is execution
//! order, and it is frozen the moment the chain is built.

use crate::middleware::{BoxedMiddleware, Chain, Middleware};

/// A shallot application under composition.
///
/// ```rust
/// use shallot::{App, Router, middleware};
///
/// let app = App::new()
///     .with(middleware::trace())
///     .with(middleware::serve_static("./public"))
///     .with(Router::new().routes());
/// ```
pub struct App {
    stack: Vec<BoxedMiddleware>,
}

impl App {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Appends a middleware. Koa's `app.use(...)`; returns `self` so
    /// registrations chain.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(middleware.into_boxed_middleware());
        self
    }

    /// Seals the stack into an immutable, shareable [`Chain`].
    ///
    /// [`Server::serve`](crate::Server::serve) calls this for you; call it
    /// directly to drive the chain without a listening socket.
    pub fn into_chain(self) -> Chain {
        Chain::new(self.stack)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
