use crate::{
    config::DEFAULT_API_BASE,
    error::Result,
    net::HttpClient,
    source::Source,
    types::{Chapter, Manga, SearchPage, SearchParams, UNKNOWN_TITLE, best_localized},
};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use tracing::debug;

/// Results per search page.
pub const SEARCH_PAGE_SIZE: usize = 10;

/// Chapters requested from the feed endpoint.
pub const FEED_PAGE_SIZE: usize = 96;

/// MangaDex API search response
#[derive(Debug, Deserialize)]
struct MangaDexSearchResponse {
    data: Vec<MangaDexMangaData>,
    #[serde(default)]
    total: usize,
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

/// MangaDex manga data structure
#[derive(Debug, Deserialize)]
struct MangaDexMangaData {
    id: String,
    attributes: MangaDexMangaAttributes,
}

/// MangaDex manga attributes
#[derive(Debug, Deserialize)]
struct MangaDexMangaAttributes {
    #[serde(default, deserialize_with = "localized_map")]
    title: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "localized_map")]
    description: BTreeMap<String, String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    year: Option<u32>,
}

/// MangaDex chapter feed response
#[derive(Debug, Deserialize)]
struct MangaDexChapterListResponse {
    data: Vec<MangaDexChapterData>,
}

/// MangaDex chapter data structure
#[derive(Debug, Deserialize)]
struct MangaDexChapterData {
    id: String,
    attributes: MangaDexChapterAttributes,
}

/// MangaDex chapter attributes
#[derive(Debug, Deserialize)]
struct MangaDexChapterAttributes {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    pages: u32,
    #[serde(rename = "externalUrl", default)]
    external_url: Option<String>,
}

/// MangaDex pages response (at-home server)
#[derive(Debug, Deserialize)]
struct MangaDexPagesResponse {
    #[serde(rename = "baseUrl")]
    base_url: String,
    chapter: MangaDexChapterPages,
}

/// MangaDex chapter pages structure
#[derive(Debug, Deserialize)]
struct MangaDexChapterPages {
    hash: String,
    #[serde(default)]
    data: Vec<String>,
}

/// Localized maps come back as `[]` instead of `{}` when empty.
fn localized_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList {
        Map(BTreeMap<String, String>),
        List(Vec<serde_json::Value>),
    }

    Ok(match Option::<MapOrList>::deserialize(deserializer)? {
        Some(MapOrList::Map(map)) => map,
        Some(MapOrList::List(_)) | None => BTreeMap::new(),
    })
}

/// Catalog client for the MangaDex REST API.
///
/// Three read-only endpoints are used:
///
/// - `/manga` for title search (content rating fixed to safe + suggestive)
/// - `/manga/{id}/feed` for English chapters, newest first
/// - `/at-home/server/{chapterId}` for page image URLs
///
/// # Examples
///
/// ```rust,no_run
/// use mangaka::prelude::*;
/// use mangaka::sources::MangaDexSource;
///
/// # async fn example() -> mangaka::Result<()> {
/// let source = MangaDexSource::new();
/// let page = source.search("one piece".into()).await?;
/// if let Some(manga) = page.manga.first() {
///     let chapters = source.get_chapters(&manga.id).await?;
///     println!("{} has {} chapters", manga.title, chapters.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct MangaDexSource {
    client: HttpClient,
    api_base: String,
}

impl MangaDexSource {
    /// Create a new MangaDex source against the public API
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Create a source against another deployment of the same API
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, params: &SearchParams) -> String {
        format!(
            "{}/manga?title={}&limit={}&offset={}&contentRating[]=safe&contentRating[]=suggestive",
            self.api_base,
            urlencoding::encode(&params.query),
            SEARCH_PAGE_SIZE,
            params.offset
        )
    }

    fn feed_url(&self, manga_id: &str) -> String {
        format!(
            "{}/manga/{}/feed?translatedLanguage[]=en&limit={}&order[chapter]=desc",
            self.api_base,
            urlencoding::encode(manga_id),
            FEED_PAGE_SIZE
        )
    }

    fn pages_url(&self, chapter_id: &str) -> String {
        format!(
            "{}/at-home/server/{}",
            self.api_base,
            urlencoding::encode(chapter_id)
        )
    }

    /// Map MangaDex manga data to internal Manga structure
    fn map_manga(data: MangaDexMangaData) -> Manga {
        let attrs = data.attributes;
        Manga {
            id: data.id,
            title: best_localized(&attrs.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            description: best_localized(&attrs.description),
            status: attrs.status.unwrap_or_default(),
            year: attrs.year,
        }
    }

    /// Map MangaDex chapter data to internal Chapter structure
    fn map_chapter(data: MangaDexChapterData) -> Chapter {
        let attrs = data.attributes;
        Chapter::new(
            data.id,
            attrs.chapter.unwrap_or_default(),
            attrs.title.as_deref().unwrap_or(""),
            attrs.pages,
            attrs.external_url,
        )
    }

    /// Compose `{base}/data/{hash}/{filename}` for every page, in order
    fn page_urls(response: &MangaDexPagesResponse) -> Vec<String> {
        let base = response.base_url.trim_end_matches('/');
        response
            .chapter
            .data
            .iter()
            .map(|filename| format!("{}/data/{}/{}", base, response.chapter.hash, filename))
            .collect()
    }
}

impl Default for MangaDexSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for MangaDexSource {
    fn name(&self) -> &'static str {
        "MangaDex"
    }

    async fn search(&self, params: SearchParams) -> Result<SearchPage> {
        let response: MangaDexSearchResponse = self.client.get_json(&self.search_url(&params)).await?;

        let limit = if response.limit == 0 {
            SEARCH_PAGE_SIZE
        } else {
            response.limit
        };

        Ok(SearchPage {
            manga: response.data.into_iter().map(Self::map_manga).collect(),
            total: response.total,
            limit,
            offset: response.offset,
        })
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let response: MangaDexChapterListResponse =
            self.client.get_json(&self.feed_url(manga_id)).await?;

        Ok(response.data.into_iter().map(Self::map_chapter).collect())
    }

    async fn get_pages(&self, chapter_id: &str) -> Result<Vec<String>> {
        let response: MangaDexPagesResponse =
            self.client.get_json(&self.pages_url(chapter_id)).await?;

        let urls = Self::page_urls(&response);
        debug!(chapter_id, pages = urls.len(), "resolved page urls");
        Ok(urls)
    }
}
