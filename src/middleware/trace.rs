//! Per-request tracing middleware.
//!
//! Register it first so the recorded latency and status cover everything
//! underneath it — the onion ordering guarantees its post-continuation code
//! runs last:
//!
//! ```rust
//! use shallot::{App, middleware};
//!
//! let app = App::new().with(middleware::trace());
//! ```

use std::time::Instant;

use tracing::{error, info};

use crate::context::Context;
use crate::middleware::{Middleware, Next};

/// Logs method, path, status, and latency for every request.
///
/// Failures are logged at `error` level and re-propagated untouched — this
/// middleware observes the pipeline, it never alters its outcome.
pub fn trace() -> impl Middleware {
    |ctx: Context, next: Next| async move {
        let method = ctx.method().clone();
        let path = ctx.path().to_owned();
        let start = Instant::now();

        let result = next.run(ctx).await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(ctx) => info!(
                %method,
                %path,
                status = ctx.response.status_code().as_u16(),
                elapsed_ms,
                "request"
            ),
            Err(e) => error!(%method, %path, error = %e, elapsed_ms, "request failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::error::Error;
    use crate::request::Request;

    #[tokio::test]
    async fn passes_results_through_unchanged() {
        let chain = App::new()
            .with(trace())
            .with(|mut ctx: Context, _next: Next| async move {
                ctx.text("ok");
                Ok::<Context, Error>(ctx)
            })
            .into_chain();

        let ctx = chain.run(Context::new(Request::get("/traced"))).await.unwrap();
        assert_eq!(ctx.response.body(), b"ok");
    }

    #[tokio::test]
    async fn propagates_failures() {
        let chain = App::new()
            .with(trace())
            .with(|_ctx: Context, _next: Next| async move {
                Err::<Context, Error>(Error::handler("downstream broke"))
            })
            .into_chain();

        let result = chain.run(Context::new(Request::get("/traced"))).await;
        assert!(matches!(result, Err(Error::Handler(_))));
    }
}
