//! Per-request context: one inbound [`Request`], one outbound [`Response`].
//!
//! A `Context` is created by the server for each incoming request, threaded
//! through the middleware chain by value, and turned into the wire response
//! when the chain returns. Exactly one pipeline execution owns it at any
//! moment — concurrent requests never share one.
//!
//! `request` and `response` are public fields on purpose: middleware reads
//! one side and writes the other. The shorthands ([`Context::text`],
//! [`Context::json`], …) exist because "set a 200 with this body" is what
//! most endpoints do.

use std::collections::HashMap;

use http::{Method, StatusCode};

use crate::middleware::upload::UploadedFile;
use crate::request::Request;
use crate::response::Response;

/// The per-request pipeline context.
#[derive(Debug)]
pub struct Context {
    pub request: Request,
    pub response: Response,
    params: HashMap<String, String>,
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl Context {
    /// Wraps a request with an untouched (`404`, empty) response.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::default(),
            params: HashMap::new(),
            fields: HashMap::new(),
            files: Vec::new(),
        }
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.path()
    }

    /// Case-insensitive request-header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// Returns a named path parameter captured by the router.
    ///
    /// For a route `/users/{id}`, `ctx.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    // ── Response shorthands ──────────────────────────────────────────────────

    /// `200 OK` with a plain-text body.
    pub fn text(&mut self, body: impl Into<String>) {
        self.response = Response::text(body);
    }

    /// `200 OK` with a JSON body.
    pub fn json(&mut self, body: Vec<u8>) {
        self.response = Response::json(body);
    }

    /// `200 OK` with an HTML body.
    pub fn html(&mut self, body: impl Into<String>) {
        self.response = Response::html(body);
    }

    /// Replaces the response with a bare status code.
    pub fn status(&mut self, code: StatusCode) {
        self.response = Response::status(code);
    }

    // ── Multipart results ────────────────────────────────────────────────────

    /// Text fields parsed by the [`multipart`](crate::middleware::multipart)
    /// middleware. Empty unless that middleware ran.
    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Files saved by the [`multipart`](crate::middleware::multipart)
    /// middleware, in the order they appeared in the body.
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// The first saved file for a given form field name.
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    pub(crate) fn insert_field(&mut self, name: String, value: String) {
        self.fields.insert(name, value);
    }

    pub(crate) fn push_file(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_renders_not_found() {
        let ctx = Context::new(Request::get("/nowhere"));
        assert_eq!(ctx.response.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn shorthands_replace_the_response() {
        let mut ctx = Context::new(Request::get("/"));
        ctx.text("hello");
        assert_eq!(ctx.response.status_code(), StatusCode::OK);
        assert_eq!(ctx.response.body(), b"hello");

        ctx.status(StatusCode::UNAUTHORIZED);
        assert_eq!(ctx.response.status_code(), StatusCode::UNAUTHORIZED);
        assert!(ctx.response.body().is_empty());
    }
}
