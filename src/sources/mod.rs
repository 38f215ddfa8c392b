//! Catalog implementations.
//!
//! - [`MangaDexSource`] - the public MangaDex REST API

pub mod mangadex;

pub use mangadex::MangaDexSource;
