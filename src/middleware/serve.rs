//! Static file middleware.
//!
//! Opens a directory to the outside world, the way `koa-static` opens
//! `./public`: a `GET` or `HEAD` whose path maps to a file under the root
//! is answered with that file's bytes (headers only for `HEAD`) and a
//! content-type derived from its extension; everything else falls through
//! to the next middleware.
//!
//! ```rust
//! use shallot::{App, middleware};
//!
//! let app = App::new().with(middleware::serve_static("./public"));
//! ```
//!
//! URL paths are percent-decoded before they touch the filesystem, so
//! `/a%20b.txt` finds `a b.txt`. Directory paths (`/` or anything ending
//! in `/`) are answered with the directory's `index.html`, if present.
//! Paths with `..` components — encoded or not — never touch the
//! filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use http::Method;

use crate::context::Context;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

/// Serves files under `root` for `GET` and `HEAD` requests; misses fall
/// through.
pub fn serve_static(root: impl Into<PathBuf>) -> impl Middleware {
    let root = Arc::new(root.into());
    move |mut ctx: Context, next: Next| {
        let root = Arc::clone(&root);
        async move {
            if ctx.method() != Method::GET && ctx.method() != Method::HEAD {
                return next.run(ctx).await;
            }
            let Some(path) = resolve(&root, ctx.path()) else {
                return next.run(ctx).await;
            };

            // HEAD gets the same dispatch as GET minus the body — checking
            // metadata avoids reading bytes we would only throw away.
            if ctx.method() == Method::HEAD {
                return match tokio::fs::metadata(&path).await {
                    Ok(meta) if meta.is_file() => {
                        ctx.response = Response::builder()
                            .bytes_with(content_type_for(&path), Vec::new());
                        Ok(ctx)
                    }
                    _ => next.run(ctx).await,
                };
            }

            match tokio::fs::read(&path).await {
                Ok(body) => {
                    ctx.response = Response::builder()
                        .bytes_with(content_type_for(&path), body);
                    Ok(ctx)
                }
                // Not found, not a file, no permission — not ours to answer.
                Err(_) => next.run(ctx).await,
            }
        }
    }
}

/// Maps a URL path to a file path under `root`.
///
/// The path is percent-decoded first, then split; `..` components are
/// rejected *after* decoding so `%2e%2e` cannot sneak past. Returns `None`
/// for anything that would escape the root or does not decode to UTF-8.
/// `/` and paths ending in `/` resolve to `index.html` in that directory.
fn resolve(root: &Path, url_path: &str) -> Option<PathBuf> {
    let url_path = urlencoding::decode(url_path).ok()?;
    let mut path = root.to_path_buf();
    for component in url_path.split('/') {
        match component {
            "" | "." => continue,
            ".." => return None,
            c => path.push(c),
        }
    }
    if url_path.ends_with('/') {
        path.push("index.html");
    }
    Some(path)
}

/// Content-type from file extension. Browsers render an image only when the
/// header says it is one; without this they offer a download instead.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "css" => "text/css",
        "csv" => "text/csv",
        "gif" => "image/gif",
        "htm" | "html" => "text/html; charset=utf-8",
        "ico" => "image/x-icon",
        "jpeg" | "jpg" => "image/jpeg",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "txt" => "text/plain; charset=utf-8",
        "wasm" => "application/wasm",
        "webp" => "image/webp",
        "woff2" => "font/woff2",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::request::Request;

    #[test]
    fn resolve_rejects_parent_traversal() {
        let root = Path::new("/srv/public");
        assert!(resolve(root, "/../etc/passwd").is_none());
        assert!(resolve(root, "/a/../../b").is_none());
        // Encoded traversal decodes to `..` and is rejected the same way.
        assert!(resolve(root, "/%2e%2e/etc/passwd").is_none());
        assert!(resolve(root, "/a/%2E%2E/b").is_none());
    }

    #[test]
    fn resolve_percent_decodes_before_splitting() {
        let root = Path::new("/srv/public");
        assert_eq!(
            resolve(root, "/a%20b.txt"),
            Some(PathBuf::from("/srv/public/a b.txt")),
        );
        // Not valid UTF-8 once decoded — nothing on disk can match it.
        assert!(resolve(root, "/%ff.txt").is_none());
    }

    #[test]
    fn resolve_maps_directories_to_index() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/"), Some(PathBuf::from("/srv/public/index.html")));
        assert_eq!(
            resolve(root, "/docs/"),
            Some(PathBuf::from("/srv/public/docs/index.html")),
        );
        assert_eq!(
            resolve(root, "/img/logo.png"),
            Some(PathBuf::from("/srv/public/img/logo.png")),
        );
    }

    #[test]
    fn content_types_cover_the_usual_suspects() {
        assert_eq!(content_type_for(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.bin")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("no_extension")), "application/octet-stream");
    }

    #[tokio::test]
    async fn serves_a_file_and_falls_through_on_miss() {
        let root = std::env::temp_dir().join(format!("shallot-serve-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"hello from disk").unwrap();

        let chain = App::new().with(serve_static(root.clone())).into_chain();

        let hit = chain.run(Context::new(Request::get("/hello.txt"))).await.unwrap();
        assert_eq!(hit.response.body(), b"hello from disk");
        assert_eq!(hit.response.header("content-type"), Some("text/plain; charset=utf-8"));

        // Miss: nothing downstream, so the default 404 response survives.
        let miss = chain.run(Context::new(Request::get("/missing.txt"))).await.unwrap();
        assert_eq!(miss.response.status_code(), http::StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn head_gets_headers_without_a_body() {
        use http::{HeaderMap, Method};

        let root = std::env::temp_dir().join(format!("shallot-head-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"hello from disk").unwrap();

        let chain = App::new().with(serve_static(root.clone())).into_chain();

        let head = Request::new(Method::HEAD, "/hello.txt", HeaderMap::new(), "");
        let hit = chain.run(Context::new(head)).await.unwrap();
        assert_eq!(hit.response.status_code(), http::StatusCode::OK);
        assert_eq!(hit.response.header("content-type"), Some("text/plain; charset=utf-8"));
        assert!(hit.response.body().is_empty());

        // HEAD for a missing file falls through like a GET miss.
        let miss = Request::new(Method::HEAD, "/missing.txt", HeaderMap::new(), "");
        let miss = chain.run(Context::new(miss)).await.unwrap();
        assert_eq!(miss.response.status_code(), http::StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn serves_files_with_encoded_names() {
        let root = std::env::temp_dir().join(format!("shallot-enc-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("a b.txt"), b"spaced out").unwrap();

        let chain = App::new().with(serve_static(root.clone())).into_chain();

        let hit = chain.run(Context::new(Request::get("/a%20b.txt"))).await.unwrap();
        assert_eq!(hit.response.body(), b"spaced out");

        std::fs::remove_dir_all(&root).ok();
    }
}
