//! File discovery module for finding images to convert.
//!
//! Files are selected by content, not by name: the first bytes of every
//! regular file are matched against a small table of JPEG and PNG
//! signatures. Order follows directory listing order, with the current
//! level's files ahead of anything found in its subdirectories.

use crate::error::{CoreError, CoreResult};

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Number of leading bytes read when sniffing a file.
pub const SNIFF_LEN: u64 = 12;

/// Image formats the encoder accepts and discovery selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
        }
    }
}

const SIGNATURES: &[(&[u8], ImageKind)] = &[
    (&[0xFF, 0xD8, 0xFF], ImageKind::Jpeg),
    (&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], ImageKind::Png),
];

/// Classifies a file header by its magic bytes.
#[must_use]
pub fn detect_image_kind(header: &[u8]) -> Option<ImageKind> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| header.starts_with(magic))
        .map(|(_, kind)| *kind)
}

/// Reads the first [`SNIFF_LEN`] bytes of `path` and classifies them.
pub fn sniff_image_kind(path: &Path) -> io::Result<Option<ImageKind>> {
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut header)?;
    Ok(detect_image_kind(&header))
}

/// Chooses the files to convert.
///
/// An explicit list is returned verbatim, in the given order and without
/// existence or type checks. Otherwise `root` is searched with
/// [`find_image_files`].
pub fn resolve_candidates(
    explicit: Option<Vec<PathBuf>>,
    root: &Path,
    recursive: bool,
) -> CoreResult<Vec<PathBuf>> {
    match explicit {
        Some(files) => {
            log::debug!("Using {} explicitly listed file(s); discovery skipped", files.len());
            Ok(files)
        }
        None => find_image_files(root, recursive),
    }
}

/// Finds JPEG and PNG files under `root`.
///
/// # Errors
///
/// * `CoreError::Discovery` if `root` is missing or cannot be listed
/// * `CoreError::NotADirectory` if `root` is not a directory
///
/// Problems with individual entries or subdirectories are logged and skipped.
/// An empty result is not an error.
pub fn find_image_files(root: &Path, recursive: bool) -> CoreResult<Vec<PathBuf>> {
    let metadata = fs::metadata(root).map_err(|source| CoreError::Discovery {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(CoreError::NotADirectory(root.to_path_buf()));
    }

    let entries = list_entries(root).map_err(|source| CoreError::Discovery {
        path: root.to_path_buf(),
        source,
    })?;

    let mut walker = Walker {
        recursive,
        visited: HashSet::new(),
        files: Vec::new(),
    };
    walker.mark_visited(root);
    walker.visit(entries);

    log::debug!("Found {} image file(s) in {}", walker.files.len(), root.display());
    Ok(walker.files)
}

struct Walker {
    recursive: bool,
    visited: HashSet<PathBuf>,
    files: Vec<PathBuf>,
}

impl Walker {
    /// Returns false if the directory was already walked.
    fn mark_visited(&mut self, dir: &Path) -> bool {
        match fs::canonicalize(dir) {
            Ok(canonical) => self.visited.insert(canonical),
            Err(e) => {
                log::debug!("Cannot canonicalize {}: {}", dir.display(), e);
                true
            }
        }
    }

    fn visit(&mut self, entries: Vec<PathBuf>) {
        let mut subdirs = Vec::new();

        for path in entries {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            if metadata.is_file() {
                match sniff_image_kind(&path) {
                    Ok(Some(kind)) => {
                        log::debug!("  {} ({})", path.display(), kind.as_str());
                        self.files.push(path);
                    }
                    Ok(None) => log::debug!("Not a JPEG/PNG, skipping {}", path.display()),
                    Err(e) => log::warn!("Skipping unreadable file {}: {}", path.display(), e),
                }
            } else if metadata.is_dir() && self.recursive {
                subdirs.push(path);
            }
        }

        for dir in subdirs {
            if !self.mark_visited(&dir) {
                log::debug!("Already visited {}, not descending again", dir.display());
                continue;
            }
            match list_entries(&dir) {
                Ok(entries) => self.visit(entries),
                Err(e) => log::warn!("Skipping directory {}: {}", dir.display(), e),
            }
        }
    }
}

/// Lists the entries of `dir` in the order the OS returns them.
fn list_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => entries.push(entry.path()),
            Err(e) => log::warn!("Failed to read an entry of {}: {}", dir.display(), e),
        }
    }
    Ok(entries)
}
