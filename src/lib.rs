//! # shallot
//!
//! A small onion-model middleware framework. Koa's shape, Rust's rules.
//!
//! ## The onion
//!
//! Everything in shallot is middleware: an `async fn` that receives the
//! per-request [`Context`] and a [`Next`] continuation. Code before
//! `next.run(ctx).await` runs outside-in, code after it runs inside-out:
//!
//! ```text
//! A in → B in → C in → C out → B out → A out
//! ```
//!
//! Routing, static files, uploads, tracing — all just layers on that one
//! primitive. The chain is composed once at startup and immutable after;
//! each request gets its own context and never sees another's.
//!
//! What the reverse proxy in front of you already owns, shallot skips on
//! purpose: TLS termination, rate limiting, body-size limits, slow-client
//! protection.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use shallot::{App, Context, Error, Next, Router, Server, middleware};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .get("/users/{id}", get_user);
//!
//!     let app = App::new()
//!         .with(middleware::trace())
//!         .with(router.routes());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(mut ctx: Context) -> Result<Context, Error> {
//!     let id = ctx.param("id").unwrap_or("unknown").to_owned();
//!     // shallot sends bytes — it doesn't care how you build them:
//!     //   serde_json::to_vec(&user)?
//!     //   format!(r#"{{"id":"{id}"}}"#).into_bytes()
//!     ctx.json(format!(r#"{{"id":"{id}"}}"#).into_bytes());
//!     Ok(ctx)
//! }
//! ```
//!
//! ## Writing middleware
//!
//! ```rust
//! use shallot::{App, Context, Error, Next};
//!
//! async fn request_id(ctx: Context, next: Next) -> Result<Context, Error> {
//!     // before: outside-in
//!     let id = ctx.header("x-request-id").unwrap_or("-").to_owned();
//!     let mut ctx = next.run(ctx).await?;
//!     // after: inside-out — echo the id on the response
//!     ctx.response.set_header("x-request-id", &id);
//!     Ok(ctx)
//! }
//!
//! let app = App::new().with(request_id);
//! ```
//!
//! Call `next.run(ctx)` zero times to short-circuit, or once to continue.
//! Twice is not a bug you can write: `Next` is consumed by value.

mod app;
mod context;
mod error;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use app::App;
pub use context::Context;
pub use error::{BoxError, Error};
pub use middleware::{Chain, Middleware, Next};
pub use request::Request;
pub use response::{ContentType, Response, ResponseBuilder};
pub use router::{Endpoint, Router};
pub use server::Server;

// Method and status types come straight from the `http` crate — the rest of
// the ecosystem speaks them already.
pub use http::{Method, StatusCode};
