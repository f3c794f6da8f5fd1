//! Minimal shallot app — onion ordering, query strings, and a router.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl 'http://localhost:3000/greet?name=tom&age=26'
//!   curl http://localhost:3000/users/42
//!
//! Watch the log: each request prints `outer in`, `inner in`, `inner out`,
//! `outer out` — pre-continuation code runs outside-in, post-continuation
//! code inside-out.

use shallot::{App, Context, Error, Next, Router, Server, middleware};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = Router::new()
        .get("/", hello)
        .get("/greet", greet)
        .get("/users/{id}", get_user);

    let app = App::new()
        .with(middleware::trace())
        .with(onion("outer"))
        .with(onion("inner"))
        .with(router.routes());

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// A labelled layer that shows the onion in action.
fn onion(name: &'static str) -> impl shallot::Middleware {
    move |ctx: Context, next: Next| async move {
        println!("{name} in");
        let result = next.run(ctx).await;
        println!("{name} out");
        result
    }
}

// GET /
async fn hello(mut ctx: Context) -> Result<Context, Error> {
    ctx.text("Hello World");
    Ok(ctx)
}

// GET /greet?name=tom&age=26
async fn greet(mut ctx: Context) -> Result<Context, Error> {
    let q = ctx.request.query_pairs();
    let name = q.get("name").map(String::as_str).unwrap_or("stranger");
    let reply = format!("hello {name} (raw query: {})", ctx.request.query_raw());
    ctx.text(reply);
    Ok(ctx)
}

// GET /users/{id}
async fn get_user(mut ctx: Context) -> Result<Context, Error> {
    let id = ctx.param("id").unwrap_or("unknown").to_owned();
    ctx.json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes());
    Ok(ctx)
}
