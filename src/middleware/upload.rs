//! Multipart form / file-upload middleware.
//!
//! The Koa equivalent is `koa-body` with `multipart: true` and a formidable
//! `uploadDir`: file parts are persisted to a configured directory, text
//! parts become form fields, and downstream middleware reads both off the
//! context.
//!
//! ```rust
//! use shallot::{App, middleware::{UploadConfig, multipart}};
//!
//! let app = App::new()
//!     .with(multipart(UploadConfig::new("./uploads")));
//! ```
//!
//! Requests without a `multipart/form-data` content type pass through
//! untouched. A malformed multipart body is answered with `400 Bad Request`
//! on the spot — that is client error, not a pipeline failure. I/O errors
//! while persisting a file *are* pipeline failures and propagate as
//! [`Error::Io`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http::StatusCode;
use tracing::warn;

use crate::context::Context;
use crate::error::Error;
use crate::middleware::{Middleware, Next};

/// Where and how uploaded files are persisted.
pub struct UploadConfig {
    /// Directory files are written into. Created on first upload if missing.
    pub dir: PathBuf,
    /// Keep the original file extension on the saved name (formidable's
    /// `keepExtensions`). On by default; the extension is dropped anyway if
    /// it contains anything but ASCII alphanumerics.
    pub keep_extensions: bool,
}

impl UploadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), keep_extensions: true }
    }
}

/// Record of one file part persisted to disk.
#[derive(Debug)]
pub struct UploadedFile {
    /// Form field name the file arrived under (e.g. `avatar`).
    pub field: String,
    /// Client-supplied file name, verbatim. Never used for the saved path.
    pub file_name: Option<String>,
    /// Where the bytes were written.
    pub path: PathBuf,
    pub size: usize,
}

/// Parses `multipart/form-data` bodies, saving file parts under the
/// configured directory and exposing text parts via
/// [`Context::fields`](crate::Context::fields).
pub fn multipart(config: UploadConfig) -> impl Middleware {
    let config = Arc::new(config);
    move |mut ctx: Context, next: Next| {
        let config = Arc::clone(&config);
        async move {
            let boundary = ctx
                .header("content-type")
                .and_then(|ct| multer::parse_boundary(ct).ok());
            let Some(boundary) = boundary else {
                return next.run(ctx).await;
            };

            let body = ctx.request.take_body();
            match parse_into(&mut ctx, body, boundary, &config).await {
                Ok(()) => next.run(ctx).await,
                Err(Error::Io(e)) => Err(Error::Io(e)),
                Err(e) => {
                    warn!(path = ctx.path(), error = %e, "rejecting malformed multipart body");
                    ctx.status(StatusCode::BAD_REQUEST);
                    Ok(ctx)
                }
            }
        }
    }
}

async fn parse_into(
    ctx: &mut Context,
    body: Bytes,
    boundary: String,
    config: &UploadConfig,
) -> Result<(), Error> {
    let stream = futures_util::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut parts = multer::Multipart::new(stream, boundary);

    while let Some(field) = parts.next_field().await.map_err(Error::handler)? {
        let name = field.name().unwrap_or("").to_owned();

        if let Some(file_name) = field.file_name().map(str::to_owned) {
            let data = field.bytes().await.map_err(Error::handler)?;
            let dest = destination(config, &file_name);
            tokio::fs::create_dir_all(&config.dir).await?;
            tokio::fs::write(&dest, &data).await?;
            ctx.push_file(UploadedFile {
                field: name,
                file_name: Some(file_name),
                path: dest,
                size: data.len(),
            });
        } else {
            let value = field.text().await.map_err(Error::handler)?;
            ctx.insert_field(name, value);
        }
    }
    Ok(())
}

static UPLOAD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Picks a fresh server-side name. The client's file name never reaches the
/// filesystem — only its extension, and only when it is plain alphanumeric.
fn destination(config: &UploadConfig, original: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let n = UPLOAD_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = format!("upload_{nanos:x}_{n}");

    if config.keep_extensions {
        let ext = Path::new(original).extension().and_then(|e| e.to_str());
        if let Some(ext) = ext.filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric())) {
            name.push('.');
            name.push_str(ext);
        }
    }
    config.dir.join(name)
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, Method};

    use super::*;
    use crate::app::App;
    use crate::request::Request;

    const BOUNDARY: &str = "XshallotBoundaryX";

    fn multipart_request(body: Vec<u8>) -> Request {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}").parse().unwrap(),
        );
        Request::new(Method::POST, "/upload", headers, body)
    }

    fn form_body() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"username\"\r\n\r\n\
                 tom\r\n\
                 --{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"avatar\"; filename=\"cat.png\"\r\n\
                 Content-Type: image/png\r\n\r\n",
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"not-really-a-png");
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn temp_upload_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shallot-upload-{tag}-{}", std::process::id()))
    }

    #[tokio::test]
    async fn saves_files_and_collects_fields() {
        let dir = temp_upload_dir("save");
        let chain = App::new()
            .with(multipart(UploadConfig::new(dir.clone())))
            .with(|mut ctx: Context, _next: Next| async move {
                ctx.text("uploaded");
                Ok::<Context, Error>(ctx)
            })
            .into_chain();

        let ctx = chain
            .run(Context::new(multipart_request(form_body())))
            .await
            .unwrap();

        assert_eq!(ctx.fields()["username"], "tom");

        let file = ctx.file("avatar").expect("avatar file recorded");
        assert_eq!(file.file_name.as_deref(), Some("cat.png"));
        assert_eq!(file.size, b"not-really-a-png".len());
        assert_eq!(file.path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(&file.path).unwrap(), b"not-really-a-png");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn non_multipart_requests_pass_through() {
        let dir = temp_upload_dir("pass");
        let chain = App::new()
            .with(multipart(UploadConfig::new(dir)))
            .with(|mut ctx: Context, _next: Next| async move {
                assert!(ctx.fields().is_empty());
                assert!(ctx.files().is_empty());
                ctx.text("plain");
                Ok::<Context, Error>(ctx)
            })
            .into_chain();

        let ctx = chain
            .run(Context::new(Request::post("/upload", &b"just text"[..])))
            .await
            .unwrap();
        assert_eq!(ctx.response.body(), b"plain");
    }

    #[tokio::test]
    async fn malformed_multipart_is_rejected_with_400() {
        let dir = temp_upload_dir("reject");
        let chain = App::new()
            .with(multipart(UploadConfig::new(dir)))
            .with(|mut ctx: Context, _next: Next| async move {
                ctx.text("downstream ran");
                Ok::<Context, Error>(ctx)
            })
            .into_chain();

        let ctx = chain
            .run(Context::new(multipart_request(b"--not-the-boundary garbage".to_vec())))
            .await
            .unwrap();
        // 400 from the upload middleware itself; downstream never overwrote it.
        assert_eq!(ctx.response.status_code(), StatusCode::BAD_REQUEST);
        assert!(ctx.response.body().is_empty());
    }

    #[test]
    fn destination_drops_suspicious_extensions() {
        let config = UploadConfig::new("/tmp/uploads");
        let clean = destination(&config, "photo.jpeg");
        assert_eq!(clean.extension().unwrap(), "jpeg");

        let weird = destination(&config, "escape.sh/../../x");
        assert!(weird.to_string_lossy().starts_with("/tmp/uploads/upload_"));
        let no_ext = destination(&config, "no-dot");
        assert!(no_ext.extension().is_none());
    }
}
