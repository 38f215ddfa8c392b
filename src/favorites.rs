//! Favorites persisted as a JSON array.
//!
//! The whole file is read once when the store is created and rewritten in
//! full after every toggle. Readers share a read lock; toggles hold the write
//! lock for the mutation and the rewrite.
//!
//! ```rust,no_run
//! use mangaka::favorites::FavoritesStore;
//!
//! # fn example() -> mangaka::Result<()> {
//! let store = FavoritesStore::load("favorites.json")?;
//! let added = store.toggle("abc", "One Piece")?;
//! assert!(added);
//! assert!(store.contains("abc"));
//! # Ok(())
//! # }
//! ```

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::Favorite;

#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    // insertion order, unique by manga_id
    entries: RwLock<Vec<Favorite>>,
}

impl FavoritesStore {
    /// Loads the store from `path`.
    ///
    /// A missing file yields an empty store. A malformed file is logged and
    /// also yields an empty store; it is overwritten by the next toggle.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Favorite>>(&bytes) {
                Ok(list) => dedupe(list),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable favorites file");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), count = entries.len(), "favorites loaded");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds the manga if absent, removes it if present.
    ///
    /// Returns `true` when added and `false` when removed. If the file cannot
    /// be rewritten the in-memory change is undone and the error returned.
    pub fn toggle(&self, manga_id: &str, title: &str) -> Result<bool> {
        let mut entries = self.entries.write();

        let (added, undo) = match entries.iter().position(|f| f.manga_id == manga_id) {
            Some(pos) => {
                let removed = entries.remove(pos);
                (false, Some((pos, removed)))
            }
            None => {
                entries.push(Favorite {
                    manga_id: manga_id.to_string(),
                    title: title.to_string(),
                });
                (true, None)
            }
        };

        if let Err(e) = self.persist(&entries) {
            match undo {
                Some((pos, removed)) => entries.insert(pos, removed),
                None => {
                    entries.pop();
                }
            }
            return Err(e);
        }

        debug!(manga_id, added, "favorite toggled");
        Ok(added)
    }

    /// Snapshot of all favorites in the order they were added.
    pub fn list(&self) -> Vec<Favorite> {
        self.entries.read().clone()
    }

    pub fn contains(&self, manga_id: &str) -> bool {
        self.entries.read().iter().any(|f| f.manga_id == manga_id)
    }

    fn persist(&self, entries: &[Favorite]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn dedupe(list: Vec<Favorite>) -> Vec<Favorite> {
    let mut unique: Vec<Favorite> = Vec::with_capacity(list.len());
    for fav in list {
        if !unique.iter().any(|f| f.manga_id == fav.manga_id) {
            unique.push(fav);
        }
    }
    unique
}
