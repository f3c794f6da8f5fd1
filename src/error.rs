//! Unified error type.

use std::fmt;

/// Boxed error produced by application middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by shallot's fallible operations.
///
/// Application-level outcomes (404, 422, etc.) are expressed by setting the
/// [`Response`](crate::Response) on the context, not as `Error`s. This type
/// carries the three things that can actually go wrong:
///
/// - [`Error::Io`] — infrastructure failures: binding a port, accepting a
///   connection.
/// - [`Error::NoMiddleware`] — [`Chain::run`](crate::Chain::run) was called
///   on an empty chain; nothing could have produced a response.
/// - [`Error::Handler`] — a middleware or endpoint failed instead of
///   completing. The failure unwinds through the chain like any `Err`
///   propagated with `?`; the server translates whatever reaches it into a
///   `500` so the client never hangs.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    NoMiddleware,
    Handler(BoxError),
}

impl Error {
    /// Wraps any error value as a middleware failure.
    ///
    /// ```rust
    /// use shallot::Error;
    /// let e = Error::handler("the downstream service said no");
    /// assert!(matches!(e, Error::Handler(_)));
    /// ```
    pub fn handler(e: impl Into<BoxError>) -> Self {
        Self::Handler(e.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::NoMiddleware => write!(f, "empty middleware chain"),
            Self::Handler(e) => write!(f, "handler: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::NoMiddleware => None,
            Self::Handler(e) => Some(e.as_ref()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Handler(Box::new(e))
    }
}

impl From<serde_urlencoded::de::Error> for Error {
    fn from(e: serde_urlencoded::de::Error) -> Self {
        Self::Handler(Box::new(e))
    }
}
