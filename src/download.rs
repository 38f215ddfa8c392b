//! Concurrent page downloads and the filename rules they rely on.
//!
//! [`fetch_all`] downloads a chapter's page images into a directory, one task
//! per URL, and returns the local paths in input order. Files are named by
//! their 1-based position zero-padded to three digits plus the source
//! extension, so lexicographic order equals reading order:
//!
//! ```text
//! https://node/data/h/x1-abc.png   ->  001.png
//! https://node/data/h/x2-def.jpg   ->  002.jpg
//! https://node/data/h/x3-ghi       ->  003.jpg
//! ```

use crate::error::{Error, Result};
use crate::net::HttpClient;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// Extension used when a page URL has none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Characters that are illegal in a path segment on at least one common OS.
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const MAX_FILENAME_LEN: usize = 200;

/// Downloads every URL into `dest_dir`, numbering files from `001`.
///
/// See [`fetch_all_from`] for the failure policy.
///
/// # Examples
///
/// ```rust,no_run
/// use mangaka::download::fetch_all;
/// use std::path::Path;
///
/// # async fn example() -> mangaka::Result<()> {
/// let urls = vec![
///     "https://node.example/data/h/1.png".to_string(),
///     "https://node.example/data/h/2.png".to_string(),
/// ];
/// let files = fetch_all(&urls, Path::new("/tmp/chapter")).await?;
/// assert!(files[0].ends_with("001.png"));
/// # Ok(())
/// # }
/// ```
pub async fn fetch_all(urls: &[String], dest_dir: &Path) -> Result<Vec<PathBuf>> {
    fetch_all_from(urls, dest_dir, 0).await
}

/// Downloads every URL into `dest_dir`, numbering files from `start + 1`.
///
/// One task is spawned per URL with no concurrency limit. Each task knows its
/// output path before it starts, so results line up with `urls` regardless of
/// completion order.
///
/// Every task is awaited even after one fails. The first failure observed wins
/// and is returned once all tasks have finished; files written by the other
/// tasks, and whatever the failed transfer left behind, stay on disk for the
/// caller to clean up.
pub async fn fetch_all_from(urls: &[String], dest_dir: &Path, start: usize) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest_dir).await?;

    let client = HttpClient::new();
    let first_error: Arc<Mutex<Option<Error>>> = Arc::new(Mutex::new(None));

    let handles: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let path = dest_dir.join(page_file_name(start + i, url));
            let url = url.clone();
            let client = client.clone();
            let first_error = Arc::clone(&first_error);

            tokio::spawn(async move {
                match client.download_to(&url, &path).await {
                    Ok(_) => Some(path),
                    Err(e) => {
                        warn!(url = %url, error = %e, "page download failed");
                        first_error.lock().get_or_insert(e);
                        None
                    }
                }
            })
        })
        .collect();

    let mut files = Vec::with_capacity(handles.len());
    for joined in futures::future::join_all(handles).await {
        match joined {
            Ok(slot) => files.push(slot),
            Err(e) => {
                first_error.lock().get_or_insert(Error::Join(e));
                files.push(None);
            }
        }
    }

    if let Some(e) = first_error.lock().take() {
        return Err(e);
    }

    debug!(count = files.len(), dir = %dest_dir.display(), "batch complete");
    Ok(files.into_iter().flatten().collect())
}

/// Name of the file that holds the page at zero-based `index`.
///
/// ```rust
/// use mangaka::download::page_file_name;
///
/// assert_eq!(page_file_name(0, "https://x/data/h/a.png"), "001.png");
/// assert_eq!(page_file_name(41, "https://x/data/h/b"), "042.jpg");
/// ```
pub fn page_file_name(index: usize, url: &str) -> String {
    let ext = extract_extension(url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{:03}.{}", index + 1, ext)
}

/// Makes a string usable as a single path segment.
///
/// Removes `<>:"/\|?*` and control characters, trims surrounding whitespace and
/// caps the length. An empty result becomes `untitled`.
///
/// # Examples
///
/// ```rust
/// use mangaka::download::sanitize_filename;
///
/// assert_eq!(sanitize_filename("One/Two: Three?"), "OneTwo Three");
/// assert_eq!(sanitize_filename("  ??  "), "untitled");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !INVALID_CHARS.contains(c) && !c.is_control())
        .collect();

    let mut sanitized = cleaned.trim().to_string();
    if sanitized.len() > MAX_FILENAME_LEN {
        let mut cut = MAX_FILENAME_LEN;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized = sanitized.trim_end().to_string();
    }

    // "." and ".." would escape the library directory
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        sanitized = "untitled".to_string();
    }

    sanitized
}

/// Extracts file extension from a URL.
///
/// Query parameters and fragments are ignored and the result is lower-cased.
///
/// # Examples
///
/// ```rust
/// use mangaka::download::extract_extension;
///
/// assert_eq!(extract_extension("https://example.com/image.jpg"), Some("jpg".to_string()));
/// assert_eq!(extract_extension("https://example.com/image.png?v=123"), Some("png".to_string()));
/// assert_eq!(extract_extension("https://example.com/image"), None);
/// ```
pub fn extract_extension(url: &str) -> Option<String> {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next()?.to_string(),
    };

    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("normal_file.txt"), "normal_file.txt");
        assert_eq!(sanitize_filename("One/Two: Three?"), "OneTwo Three");
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
        assert_eq!(sanitize_filename("  Ch. 1 - Start  "), "Ch. 1 - Start");
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename(".."), "untitled");

        let long_name = "é".repeat(150);
        let sanitized = sanitize_filename(&long_name);
        assert!(sanitized.len() <= MAX_FILENAME_LEN);
    }

    #[test]
    fn test_extract_extension() {
        assert_eq!(
            extract_extension("https://example.com/image.jpg"),
            Some("jpg".to_string())
        );
        assert_eq!(
            extract_extension("https://example.com/image.PNG"),
            Some("png".to_string())
        );
        assert_eq!(
            extract_extension("https://example.com/image.webp#frag"),
            Some("webp".to_string())
        );
        assert_eq!(
            extract_extension("https://example.com/data/abc.def/image"),
            None
        );
        assert_eq!(extract_extension("https://example.com/image"), None);
        assert_eq!(extract_extension("https://example.com/image."), None);
        assert_eq!(extract_extension("https://example.com/"), None);
        assert_eq!(extract_extension(""), None);
    }

    #[test]
    fn test_page_file_name_is_zero_padded() {
        assert_eq!(page_file_name(0, "https://x/a.png"), "001.png");
        assert_eq!(page_file_name(9, "https://x/a.gif?x=1"), "010.gif");
        assert_eq!(page_file_name(99, "https://x/a"), "100.jpg");
    }

    #[test]
    fn test_page_names_sort_in_input_order() {
        let urls: Vec<String> = (0..60)
            .map(|i| format!("https://x/data/h/{}-{}.jpg", 60 - i, i))
            .collect();
        let names: Vec<String> = urls
            .iter()
            .enumerate()
            .map(|(i, u)| page_file_name(i, u))
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_fetch_empty_list_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("scratch");
        let files = fetch_all(&[], &dest).await.unwrap();
        assert!(files.is_empty());
        assert!(dest.is_dir());
    }
}
