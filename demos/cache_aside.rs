//! Cache-aside over an opaque key-value store.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example cache_aside
//!
//! Try:
//!   curl http://localhost:3000/users     # first hit: slow "database" query
//!   curl http://localhost:3000/users     # second hit: served from the store
//!
//! The framework knows nothing about the store — it is an external
//! collaborator owned entirely by the endpoint, exactly like a redis client
//! would be. Swap `MemoryStore` for one backed by redis without touching
//! anything else.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shallot::{App, Context, Error, Next, Router, Server, middleware};
use tokio::sync::RwLock;

/// The slice of a KV client this demo needs: `get` and `set`.
trait Store: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String);
}

#[derive(Default)]
struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        self.inner.write().await.insert(key.to_owned(), value);
    }
}

/// Pretends to be an expensive database query.
async fn query_users_from_database() -> String {
    tokio::time::sleep(Duration::from_millis(500)).await;
    r#"[{"id":1,"name":"tom","age":20},{"id":2,"name":"tom1","age":21}]"#.to_owned()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = Arc::new(MemoryStore::default());

    let list_users = move |mut ctx: Context| {
        let store = Arc::clone(&store);
        async move {
            // Cache-aside: check the store first, fall back to the slow
            // source on a miss, and populate the store for next time.
            let users = match store.get("users").await {
                Some(cached) => {
                    ctx.response.set_header("x-cache", "hit");
                    cached
                }
                None => {
                    let fresh = query_users_from_database().await;
                    store.set("users", fresh.clone()).await;
                    fresh
                }
            };
            ctx.json(users.into_bytes());
            Ok::<Context, Error>(ctx)
        }
    };

    let app = App::new()
        .with(middleware::trace())
        .with(Router::new().get("/users", list_users).routes())
        .with(not_found);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// Innermost layer: anything the router didn't match ends here.
async fn not_found(mut ctx: Context, _next: Next) -> Result<Context, Error> {
    ctx.text("nothing here — try /users");
    ctx.response.set_header("x-fallback", "1");
    Ok(ctx)
}
