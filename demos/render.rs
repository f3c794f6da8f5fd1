//! Server-side rendering with a compile-time template engine.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example render
//!
//! Try:
//!   curl http://localhost:3000/users
//!
//! shallot itself only knows how to send `text/html` bytes
//! ([`Context::html`]); the template engine is an ordinary application
//! dependency, the way an Ejs view layer sits next to a Koa app.

use askama::Template;
use shallot::{App, Context, Error, Router, Server, StatusCode, middleware};

#[derive(Template)]
#[template(path = "users.html")]
struct UsersPage {
    title: &'static str,
    users: Vec<User>,
}

struct User {
    name: &'static str,
    age: u32,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = App::new()
        .with(middleware::trace())
        .with(Router::new().get("/users", users_page).routes());

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users — rendered HTML
async fn users_page(mut ctx: Context) -> Result<Context, Error> {
    let page = UsersPage {
        title: "Users",
        users: vec![
            User { name: "tom", age: 20 },
            User { name: "tom1", age: 21 },
            User { name: "tom2", age: 22 },
        ],
    };

    match page.render() {
        Ok(html) => ctx.html(html),
        Err(e) => {
            tracing::error!("template render failed: {e}");
            ctx.status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
    Ok(ctx)
}
