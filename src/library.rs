//! Chapter acquisition flows.
//!
//! [`Library`] sequences the fetcher, the archive builder and the viewer:
//!
//! - [`Library::download`] saves a chapter as
//!   `<library>/<manga>/<chapter>.cbz` for offline reading
//! - [`Library::read_online`] opens the first page as soon as it lands and
//!   fetches the rest in the background
//!
//! # Examples
//!
//! ```rust,no_run
//! use mangaka::prelude::*;
//! use mangaka::sources::MangaDexSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> mangaka::Result<()> {
//! let config = Config::from_env();
//! let favorites = Arc::new(FavoritesStore::load(&config.favorites_path)?);
//! let library = Library::new(
//!     Arc::new(MangaDexSource::new()),
//!     Arc::new(SystemViewer),
//!     favorites,
//!     config,
//! );
//!
//! let chapters = library.source().get_chapters("manga-id").await?;
//! match library.download("Some Manga", &chapters[0]).await {
//!     Ok(path) => println!("Saved {}", path.display()),
//!     Err(e) if e.is_benign() => println!("{}", e),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    archive::{self, ARCHIVE_EXTENSION},
    config::Config,
    download::{fetch_all, fetch_all_from, sanitize_filename},
    error::{Error, Result},
    favorites::FavoritesStore,
    scratch,
    source::Source,
    types::{Chapter, Manga},
    viewer::Viewer,
};

/// An archive found in the library directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryItem {
    /// Manga directory name
    pub manga: String,
    /// Archive file stem, i.e. the sanitized chapter title
    pub chapter: String,
    pub path: PathBuf,
    /// Entry count, `None` when the archive cannot be read
    pub pages: Option<usize>,
}

/// A read-online session in progress.
///
/// The session directory is left in place when the session is dropped; the
/// viewer may still be reading from it. Old sessions are removed by
/// [`Library::sweep_read_sessions`].
#[derive(Debug)]
pub struct ReadSession {
    pub dir: PathBuf,
    pub first_page: PathBuf,
    pending: Option<JoinHandle<Result<Vec<PathBuf>>>>,
}

impl ReadSession {
    /// Whether the remaining pages are still being fetched.
    pub fn is_loading(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the background batch and returns every page path in order.
    pub async fn wait(self) -> Result<Vec<PathBuf>> {
        let mut pages = vec![self.first_page];
        if let Some(handle) = self.pending {
            pages.extend(handle.await??);
        }
        Ok(pages)
    }
}

/// Orchestrates catalog lookups, downloads, archives and the viewer.
pub struct Library {
    source: Arc<dyn Source>,
    viewer: Arc<dyn Viewer>,
    favorites: Arc<FavoritesStore>,
    config: Config,
}

impl Library {
    pub fn new(
        source: Arc<dyn Source>,
        viewer: Arc<dyn Viewer>,
        favorites: Arc<FavoritesStore>,
        config: Config,
    ) -> Self {
        Self {
            source,
            viewer,
            favorites,
            config,
        }
    }

    pub fn source(&self) -> &dyn Source {
        self.source.as_ref()
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Adds or removes `manga` from the favorites. Returns `true` when added.
    pub fn toggle_favorite(&self, manga: &Manga) -> Result<bool> {
        self.favorites.toggle(&manga.id, &manga.title)
    }

    /// Where the archive for `chapter` of `manga_title` lives in the library.
    pub fn archive_path(&self, manga_title: &str, chapter: &Chapter) -> PathBuf {
        self.config
            .library_dir
            .join(sanitize_filename(manga_title))
            .join(format!(
                "{}.{}",
                sanitize_filename(&chapter.title),
                ARCHIVE_EXTENSION
            ))
    }

    /// Downloads `chapter` into the library and returns the archive path.
    ///
    /// # Errors
    ///
    /// * [`Error::AlreadyDownloaded`] - the archive exists; nothing was fetched or written
    /// * [`Error::ExternalChapter`] - the chapter is not served by the catalog
    /// * [`Error::NoPages`] - the chapter resolved to zero pages
    /// * any fetch or archive error; the staging directory is removed either way
    pub async fn download(&self, manga_title: &str, chapter: &Chapter) -> Result<PathBuf> {
        ensure_hosted(chapter)?;

        let dest = self.archive_path(manga_title, chapter);
        if fs::try_exists(&dest).await? {
            return Err(Error::AlreadyDownloaded(dest));
        }

        let urls = self.resolve_pages(chapter).await?;

        let staging = scratch::download_dir(&self.config.scratch_root, &chapter.id);
        // leftovers from an interrupted run would mix into the archive
        if fs::try_exists(&staging).await? {
            fs::remove_dir_all(&staging).await?;
        }

        let files = match fetch_all(&urls, &staging).await {
            Ok(files) => files,
            Err(e) => {
                remove_dir_quietly(&staging).await;
                return Err(e);
            }
        };

        let built = archive_or_discard(&dest, files).await;
        remove_dir_quietly(&staging).await;
        built?;

        info!(chapter = %chapter.id, path = %dest.display(), "chapter downloaded");
        Ok(dest)
    }

    /// Opens `chapter` in the viewer without archiving it.
    ///
    /// The first page is fetched and handed to the viewer before this returns;
    /// the remaining pages download in the background into the same session
    /// directory, numbered after the first.
    ///
    /// A failure on the first page aborts the whole flow. A failure in the
    /// background batch is logged and reported by [`ReadSession::wait`]; the
    /// viewer stays open either way.
    pub async fn read_online(&self, chapter: &Chapter) -> Result<ReadSession> {
        ensure_hosted(chapter)?;
        let urls = self.resolve_pages(chapter).await?;

        let dir = scratch::read_session_dir(&self.config.scratch_root, &chapter.id);
        let first_page = fetch_all(&urls[..1], &dir)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoPages(chapter.id.clone()))?;

        self.viewer.open(&first_page)?;

        let pending = (urls.len() > 1).then(|| {
            let rest = urls[1..].to_vec();
            let dir = dir.clone();
            let chapter_id = chapter.id.clone();
            tokio::spawn(async move {
                let result = fetch_all_from(&rest, &dir, 1).await;
                match &result {
                    Ok(files) => debug!(chapter = %chapter_id, pages = files.len() + 1, "read session complete"),
                    Err(e) => warn!(chapter = %chapter_id, error = %e, "background page download failed"),
                }
                result
            })
        });

        info!(chapter = %chapter.id, dir = %dir.display(), "read session started");
        Ok(ReadSession {
            dir,
            first_page,
            pending,
        })
    }

    async fn resolve_pages(&self, chapter: &Chapter) -> Result<Vec<String>> {
        let urls = self.source.get_pages(&chapter.id).await?;
        if urls.is_empty() {
            return Err(Error::NoPages(chapter.id.clone()));
        }
        Ok(urls)
    }

    /// Lists every archive in the library, sorted by manga then chapter.
    pub fn downloads(&self) -> Result<Vec<LibraryItem>> {
        let root = &self.config.library_dir;
        let manga_dirs = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        for manga_dir in manga_dirs.flatten() {
            let manga_path = manga_dir.path();
            if !manga_path.is_dir() {
                continue;
            }
            let manga = manga_dir.file_name().to_string_lossy().into_owned();

            let entries = match std::fs::read_dir(&manga_path) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %manga_path.display(), error = %e, "skipping unreadable manga directory");
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                let is_archive = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
                if !is_archive || !path.is_file() {
                    continue;
                }
                let chapter = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();

                items.push(LibraryItem {
                    manga: manga.clone(),
                    chapter,
                    pages: archive::entry_count(&path).ok(),
                    path,
                });
            }
        }

        items.sort_by(|a, b| a.manga.cmp(&b.manga).then_with(|| a.chapter.cmp(&b.chapter)));
        Ok(items)
    }

    /// Hands a library archive (or any path) to the viewer.
    pub fn open(&self, path: &Path) -> Result<()> {
        self.viewer.open(path)
    }

    /// Removes read-online sessions older than the configured maximum age.
    pub fn sweep_read_sessions(&self) -> Result<usize> {
        scratch::sweep_read_sessions(&self.config.scratch_root, self.config.session_max_age)
    }
}

fn ensure_hosted(chapter: &Chapter) -> Result<()> {
    match &chapter.external_url {
        Some(url) => Err(Error::ExternalChapter { url: url.clone() }),
        None => Ok(()),
    }
}

/// Builds the archive at `dest`, removing it again if the build fails.
async fn archive_or_discard(dest: &Path, files: Vec<PathBuf>) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }
    let target = dest.to_path_buf();
    let built = tokio::task::spawn_blocking(move || archive::build_archive(&target, &files)).await;

    match built {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            // a half-written archive would read as "already downloaded" next time
            remove_file_quietly(dest).await;
            Err(e)
        }
        Err(e) => {
            remove_file_quietly(dest).await;
            Err(e.into())
        }
    }
}

async fn remove_file_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "could not remove partial archive");
        }
    }
}

async fn remove_dir_quietly(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(dir = %dir.display(), error = %e, "could not remove staging directory");
        }
    }
}
