//! The catalog seam.
//!
//! [`Source`] is the interface the orchestrator and the menus talk to. The
//! production implementation is [`MangaDexSource`](crate::sources::MangaDexSource);
//! tests substitute their own.
//!
//! # Examples
//!
//! ```rust
//! use mangaka::prelude::*;
//! use mangaka::Result;
//! use async_trait::async_trait;
//!
//! struct Fixed;
//!
//! #[async_trait]
//! impl Source for Fixed {
//!     fn name(&self) -> &'static str { "fixed" }
//!
//!     async fn search(&self, _params: SearchParams) -> Result<SearchPage> {
//!         Ok(SearchPage::default())
//!     }
//!
//!     async fn get_chapters(&self, _manga_id: &str) -> Result<Vec<Chapter>> {
//!         Ok(vec![Chapter::new("c1", "1", "", 2, None)])
//!     }
//!
//!     async fn get_pages(&self, _chapter_id: &str) -> Result<Vec<String>> {
//!         Ok(vec!["https://example.com/1.png".into()])
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{Chapter, SearchPage, SearchParams},
};

/// A read-only manga catalog.
#[async_trait]
pub trait Source: Send + Sync {
    /// Human-readable name, used in log lines.
    fn name(&self) -> &'static str;

    /// Searches manga by title, one page at a time.
    async fn search(&self, params: SearchParams) -> Result<SearchPage>;

    /// Lists the chapters of a manga, newest first.
    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>>;

    /// Resolves the ordered page image URLs of a chapter.
    ///
    /// The order defines reading order and output file numbering. An empty
    /// list is returned as-is; callers reject it with
    /// [`Error::NoPages`](crate::Error::NoPages).
    async fn get_pages(&self, chapter_id: &str) -> Result<Vec<String>>;
}
