//! Incoming HTTP request type.
//!
//! The server collects the full body before the chain runs, so everything
//! here is borrow-and-parse: no streaming state, no pending I/O. Query
//! strings and bodies are parsed lazily — ask for them typed when a
//! middleware actually needs them.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::error::Error;

/// An incoming HTTP request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: String,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Builds a request from raw components.
    ///
    /// `path_and_query` is split on the first `?` — `"/search?q=eva"` gives
    /// path `/search` and query `q=eva`. Mostly useful in tests and demos;
    /// the server builds requests from the wire itself.
    pub fn new(
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: impl Into<Bytes>,
    ) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((p, q)) => (p.to_owned(), q.to_owned()),
            None => (path_and_query.to_owned(), String::new()),
        };
        Self { method, path, query, headers, body: body.into() }
    }

    /// Shorthand for a bodyless `GET` request.
    pub fn get(path_and_query: &str) -> Self {
        Self::new(Method::GET, path_and_query, HeaderMap::new(), Bytes::new())
    }

    /// Shorthand for a `POST` request with a body.
    pub fn post(path_and_query: &str, body: impl Into<Bytes>) -> Self {
        Self::new(Method::POST, path_and_query, HeaderMap::new(), body)
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().unwrap_or("").to_owned(),
            headers: parts.headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The raw query string, without the leading `?`. Empty if none was sent.
    pub fn query_raw(&self) -> &str {
        &self.query
    }

    /// Deserializes the query string into `T`.
    ///
    /// ```rust
    /// # use shallot::Request;
    /// # use std::collections::HashMap;
    /// let req = Request::get("/users?age=26&name=tom");
    /// let q: HashMap<String, String> = req.query().unwrap();
    /// assert_eq!(q["name"], "tom");
    /// ```
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_urlencoded::from_str(&self.query)?)
    }

    /// The query string as a key/value map. Later duplicates win.
    pub fn query_pairs(&self) -> HashMap<String, String> {
        serde_urlencoded::from_str(&self.query).unwrap_or_default()
    }

    /// Deserializes an `application/x-www-form-urlencoded` body into `T`.
    pub fn form<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_urlencoded::from_bytes(&self.body)?)
    }

    /// Deserializes a JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Takes the body out, leaving it empty. The multipart middleware uses
    /// this to hand the bytes to the parser without copying.
    pub(crate) fn take_body(&mut self) -> Bytes {
        std::mem::take(&mut self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_path_and_query() {
        let req = Request::get("/search?q=hello+world&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query_raw(), "q=hello+world&page=2");

        let pairs = req.query_pairs();
        assert_eq!(pairs["q"], "hello world");
        assert_eq!(pairs["page"], "2");
    }

    #[test]
    fn no_query_is_empty() {
        let req = Request::get("/users");
        assert_eq!(req.path(), "/users");
        assert_eq!(req.query_raw(), "");
        assert!(req.query_pairs().is_empty());
    }

    #[test]
    fn parses_urlencoded_form_body() {
        let req = Request::post("/login", &b"username=tom&password=123"[..]);
        let form: HashMap<String, String> = req.form().unwrap();
        assert_eq!(form["username"], "tom");
        assert_eq!(form["password"], "123");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "application/json".parse().unwrap());
        let req = Request::new(Method::POST, "/", headers, &b"{}"[..]);
        assert_eq!(req.header("content-type"), Some("application/json"));
    }
}
