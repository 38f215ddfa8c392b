//! Core data types for manga, chapters, favorites, and search parameters.
//!
//! - [`Manga`] - A catalog entry with its resolved display title
//! - [`Chapter`] - A readable unit of a manga
//! - [`Favorite`] - The persisted projection of a manga
//! - [`SearchPage`] - One page of search results plus pagination data
//! - [`SearchParams`] - Parameters for searching the catalog
//!
//! # Examples
//!
//! ```rust
//! use mangaka::types::Chapter;
//!
//! let chapter = Chapter::new("c1", "5", "Arrival", 20, None);
//! assert_eq!(chapter.title, "Ch. 5 - Arrival");
//! assert!(!chapter.is_external());
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder used when a manga carries no usable title.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A manga as returned by the catalog.
///
/// Immutable once fetched. Only the [`Favorite`] projection is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    /// Opaque catalog identifier
    pub id: String,

    /// Display title (English preferred, else the first available)
    pub title: String,

    /// Description in the preferred language
    pub description: Option<String>,

    /// Publication status as reported by the catalog ("ongoing", "completed", ...)
    #[serde(default)]
    pub status: String,

    /// Year of first publication
    pub year: Option<u32>,
}

impl Manga {
    /// Builds the minimal record the catalog needs to list chapters for a favorite.
    pub fn from_favorite(favorite: &Favorite) -> Self {
        Self {
            id: favorite.manga_id.clone(),
            title: favorite.title.clone(),
            description: None,
            status: String::new(),
            year: None,
        }
    }
}

/// Picks the display string from a language-tag map.
///
/// The `en` entry wins when it is non-empty; otherwise the first non-empty entry
/// in key order is used.
///
/// # Examples
///
/// ```rust
/// use mangaka::types::best_localized;
/// use std::collections::BTreeMap;
///
/// let mut titles = BTreeMap::new();
/// titles.insert("ja".to_string(), "ワンピース".to_string());
/// assert_eq!(best_localized(&titles).as_deref(), Some("ワンピース"));
///
/// titles.insert("en".to_string(), "One Piece".to_string());
/// assert_eq!(best_localized(&titles).as_deref(), Some("One Piece"));
/// ```
pub fn best_localized(map: &BTreeMap<String, String>) -> Option<String> {
    map.get("en")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| map.values().find(|s| !s.trim().is_empty()))
        .map(|s| s.trim().to_string())
}

/// A single chapter of a manga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Opaque catalog identifier
    pub id: String,

    /// Composed display title, e.g. `Ch. 5 - Arrival`
    pub title: String,

    /// Raw chapter number string as published (may be empty, may be "10.5")
    pub number: String,

    /// Page count reported by the catalog
    pub pages: u32,

    /// Link to an external host; set when the pages are not served by the catalog
    pub external_url: Option<String>,
}

impl Chapter {
    /// Creates a chapter, composing its display title from number and name.
    ///
    /// An empty `external_url` is treated as absent.
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
        name: &str,
        pages: u32,
        external_url: Option<String>,
    ) -> Self {
        let number = number.into();
        Self {
            id: id.into(),
            title: display_title(&number, name),
            number,
            pages,
            external_url: external_url.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Whether this chapter has to be opened in a browser instead of fetched.
    pub fn is_external(&self) -> bool {
        self.external_url.is_some()
    }
}

/// Composes `Ch. {number}` with an optional ` - {name}` suffix.
pub fn display_title(number: &str, name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("Ch. {}", number)
    } else {
        format!("Ch. {} - {}", number, name)
    }
}

/// A favorited manga. Uniqueness key is `manga_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub manga_id: String,
    pub title: String,
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub manga: Vec<Manga>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl SearchPage {
    /// Whether the catalog holds results past this page.
    pub fn has_next(&self) -> bool {
        self.total > self.offset + self.limit
    }

    /// Offset to request for the following page.
    pub fn next_offset(&self) -> usize {
        self.offset + self.limit
    }
}

/// Search parameters for querying the catalog.
///
/// ```rust
/// use mangaka::types::SearchParamsBuilder;
///
/// let params = SearchParamsBuilder::default()
///     .query("one piece")
///     .offset(20usize)
///     .build()
///     .unwrap();
/// assert_eq!(params.offset, 20);
/// ```
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into))]
pub struct SearchParams {
    pub query: String,
    #[builder(default)]
    pub offset: usize,
}

impl From<String> for SearchParams {
    fn from(query: String) -> Self {
        SearchParams {
            query,
            ..Default::default()
        }
    }
}

impl From<&str> for SearchParams {
    fn from(query: &str) -> Self {
        SearchParams {
            query: query.to_string(),
            ..Default::default()
        }
    }
}
