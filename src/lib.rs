//! # Mangaka - browse MangaDex, read chapters, keep a CBZ library
//!
//! Mangaka is a small async client for the MangaDex catalog. It searches manga,
//! lists their English chapters, downloads chapter pages concurrently, and
//! either packages them into a `.cbz` archive for offline reading or streams
//! them into a scratch directory and opens the first page right away.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mangaka::prelude::*;
//! use mangaka::sources::MangaDexSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> mangaka::Result<()> {
//!     let config = Config::from_env();
//!     let favorites = Arc::new(FavoritesStore::load(&config.favorites_path)?);
//!     let library = Library::new(
//!         Arc::new(MangaDexSource::new()),
//!         Arc::new(SystemViewer),
//!         favorites,
//!         config,
//!     );
//!
//!     let page = library.source().search("oneshot".into()).await?;
//!     let manga = &page.manga[0];
//!     let chapters = library.source().get_chapters(&manga.id).await?;
//!
//!     let path = library.download(&manga.title, &chapters[0]).await?;
//!     println!("Saved to {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`source`] / [`sources`]: the catalog seam and its MangaDex implementation
//! - [`download`]: concurrent page fetcher and filename rules
//! - [`archive`]: CBZ writer
//! - [`library`]: the download-to-library and read-online flows
//! - [`favorites`]: JSON-backed favorites behind a read/write lock
//! - [`viewer`]: launching the system viewer
//! - [`scratch`]: staging directories and stale-session cleanup
//! - [`config`], [`net`], [`error`], [`types`]: plumbing

pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod favorites;
pub mod library;
pub mod net;
pub mod scratch;
pub mod source;
pub mod sources;
pub mod types;
pub mod viewer;

#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module for convenient imports.
///
/// ```rust
/// use mangaka::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigBuilder},
        download::{fetch_all, sanitize_filename},
        favorites::FavoritesStore,
        library::{Library, LibraryItem, ReadSession},
        source::Source,
        types::{Chapter, Favorite, Manga, SearchPage, SearchParams},
        viewer::{SystemViewer, Viewer},
    };
}

// Re-export main types at crate root for direct access
pub use error::{Error, Result};
pub use library::Library;
pub use source::Source;
pub use types::{Chapter, Favorite, Manga, SearchPage, SearchParams};
