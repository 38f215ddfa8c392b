//! CBZ assembly.
//!
//! A chapter archive is a plain zip container with the `.cbz` extension whose
//! entries are the page images, named by their base filename and added in
//! page order. Entries are stored uncompressed since the images already are.

use crate::error::Result;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

/// Extension of library archives, without the dot.
pub const ARCHIVE_EXTENSION: &str = "cbz";

/// Writes `files` into a new archive at `output_path`, in order.
///
/// The archive is created or truncated. Each entry is named by the file's base
/// name only. Empty paths are skipped. Building twice from the same inputs
/// yields logically equivalent archives, not byte-identical ones.
///
/// This is blocking IO; async callers should run it on a blocking thread.
///
/// # Examples
///
/// ```rust,no_run
/// use mangaka::archive::build_archive;
/// use std::path::{Path, PathBuf};
///
/// # fn example() -> mangaka::Result<()> {
/// let pages = vec![PathBuf::from("/tmp/ch/001.jpg"), PathBuf::from("/tmp/ch/002.png")];
/// build_archive(Path::new("out.cbz"), &pages)?;
/// # Ok(())
/// # }
/// ```
pub fn build_archive(output_path: &Path, files: &[PathBuf]) -> Result<()> {
    let out = File::create(output_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(out));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut added = 0usize;
    for file in files {
        if file.as_os_str().is_empty() {
            continue;
        }
        let Some(name) = file.file_name() else {
            continue;
        };

        zip.start_file(name.to_string_lossy(), options)?;
        let mut reader = BufReader::new(File::open(file)?);
        io::copy(&mut reader, &mut zip)?;
        added += 1;
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer)?;

    debug!(path = %output_path.display(), entries = added, "archive written");
    Ok(())
}

/// Lists the entry names of an archive in stored order.
pub fn entry_names(path: &Path) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}

/// Number of entries (pages) in an archive.
pub fn entry_count(path: &Path) -> Result<usize> {
    let archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    Ok(archive.len())
}
