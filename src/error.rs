//! Error types and result handling for Mangaka operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Remote**: [`Error::NotFound`] for a 404 from the catalog, [`Error::Request`]
//!   for any other non-success status, [`Error::Network`] for transport failures
//! - **Decode**: malformed JSON from the catalog or in the favorites file
//! - **Local**: filesystem ([`Error::Io`]) and archive ([`Error::Zip`]) failures
//! - **Pipeline**: [`Error::NoPages`], [`Error::ExternalChapter`], [`Error::Viewer`]
//! - **Benign**: [`Error::AlreadyDownloaded`] signals a request that is already
//!   satisfied rather than a fault
//!
//! # Examples
//!
//! ```rust
//! use mangaka::{Error, Result};
//! use std::path::PathBuf;
//!
//! fn report(result: Result<PathBuf>) -> String {
//!     match result {
//!         Ok(path) => format!("Saved to {}", path.display()),
//!         Err(e) if e.is_benign() => format!("Nothing to do: {}", e),
//!         Err(Error::NotFound(what)) => format!("Missing: {}", what),
//!         Err(e) => format!("Failed: {}", e),
//!     }
//! }
//!
//! let msg = report(Err(Error::AlreadyDownloaded(PathBuf::from("a.cbz"))));
//! assert!(msg.starts_with("Nothing to do"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results with Mangaka errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all Mangaka operations.
///
/// None of these are retried automatically. The interactive layer prints the
/// message and returns to the main menu.
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog answered 404 for the requested resource.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mangaka::Error;
    ///
    /// let error = Error::not_found("manga 'abc'");
    /// assert_eq!(error.to_string(), "Not found: manga 'abc'");
    /// ```
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status other than 404.
    #[error("Request to {url} failed with HTTP {status}")]
    Request { status: u16, url: String },

    /// Transport-level failures from the HTTP client.
    ///
    /// Connection refused, DNS failures, TLS errors, the fixed per-request
    /// timeout, and body read errors all land here.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A JSON document could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local filesystem failures (create, read, write, remove).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive writer or reader failed.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The chapter archive already exists in the library.
    ///
    /// This is a benign stop condition: nothing was written.
    #[error("Already downloaded: {}", .0.display())]
    AlreadyDownloaded(PathBuf),

    /// The chapter resolved to zero page images.
    #[error("No pages found for chapter {0}")]
    NoPages(String),

    /// The chapter is hosted outside the catalog and must be read in a browser.
    #[error("Chapter is hosted externally: {url}")]
    ExternalChapter { url: String },

    /// The external viewer could not be launched.
    #[error("Viewer error: {0}")]
    Viewer(String),

    /// A download task panicked or was aborted.
    #[error("Join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Creates a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a request failure for a non-success HTTP status.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mangaka::Error;
    ///
    /// let error = Error::request(503, "https://api.mangadex.org/manga");
    /// assert!(error.to_string().contains("HTTP 503"));
    /// ```
    pub fn request(status: u16, url: impl Into<String>) -> Self {
        Error::Request {
            status,
            url: url.into(),
        }
    }

    /// Creates a viewer launch error.
    pub fn viewer(msg: impl Into<String>) -> Self {
        Error::Viewer(msg.into())
    }

    /// Returns `true` for conditions that mean "nothing to do" rather than failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::AlreadyDownloaded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_already_downloaded_is_benign() {
        assert!(Error::AlreadyDownloaded(PathBuf::from("x.cbz")).is_benign());
        assert!(!Error::NoPages("c1".into()).is_benign());
        assert!(!Error::not_found("manga").is_benign());
        assert!(!Error::request(500, "u").is_benign());
    }

    #[test]
    fn test_messages_carry_context() {
        let e = Error::ExternalChapter {
            url: "https://example.com/read".into(),
        };
        assert!(e.to_string().contains("https://example.com/read"));

        let e = Error::NoPages("chapter-9".into());
        assert!(e.to_string().contains("chapter-9"));
    }
}
