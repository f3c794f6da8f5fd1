//! File uploads and form handling — the `koa-body` + `koa-static` setup.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example upload
//!
//! Try:
//!   curl -X POST http://localhost:3000/login \
//!        -d 'username=tom&password=123'
//!   curl -X POST http://localhost:3000/upload \
//!        -F 'avatar=@some-image.png'
//!   curl http://localhost:3000/uploads/<saved-name>   # served back from disk

use shallot::{App, Context, Error, Router, Server, StatusCode, middleware};
use shallot::middleware::UploadConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = Router::new()
        .post("/login", login)
        .post("/upload", upload);

    let app = App::new()
        .with(middleware::trace())
        // Open the upload directory to GETs, like koa-static over uploadFiles.
        .with(middleware::serve_static("./uploadFiles"))
        // Parse multipart bodies; files land under ./uploadFiles/uploads.
        .with(middleware::multipart(UploadConfig::new("./uploadFiles/uploads")))
        .with(router.routes());

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// POST /login — urlencoded body
async fn login(mut ctx: Context) -> Result<Context, Error> {
    #[derive(serde::Deserialize)]
    struct Login {
        username: String,
        password: String,
    }

    match ctx.request.form::<Login>() {
        Ok(form) if form.username == "tom" && form.password == "123" => {
            ctx.json(br#"{"status":200,"message":"ok!"}"#.to_vec());
        }
        Ok(_) => {
            ctx.json(br#"{"status":401,"message":"error!"}"#.to_vec());
        }
        Err(_) => ctx.status(StatusCode::BAD_REQUEST),
    }
    Ok(ctx)
}

// POST /upload — multipart body, already parsed by the middleware
async fn upload(mut ctx: Context) -> Result<Context, Error> {
    match ctx.file("avatar") {
        Some(file) => {
            // Return the path relative to the directory serve_static opens,
            // so the client can fetch the file straight back.
            let name = file.path.file_name().unwrap_or_default().to_string_lossy();
            let body = format!(
                r#"{{"status":200,"message":"ok!","imageUrl":"/uploads/{name}"}}"#
            );
            ctx.json(body.into_bytes());
        }
        None => ctx.status(StatusCode::UNPROCESSABLE_ENTITY),
    }
    Ok(ctx)
}
