//! Working layout: the scratch directory tree assembled before compression.
//!
//! Each layout is a uniquely named directory under a parent work dir, owned by
//! one snapshot. Dropping it removes the tree; [`WorkingLayout::teardown`]
//! does the same but reports failures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the page markup inside the layout and the archive.
pub const ENTRY_POINT: &str = "index.html";

/// Linux PATH_MAX, terminating NUL included.
const PATH_MAX: usize = 4096;

/// Outcome of checking where an asset would go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Nothing there yet; the asset may be written to this absolute path.
    Free(PathBuf),
    /// A file already holds this path (first wins).
    Occupied,
    /// The path, or one of its parents, clashes with the other kind of entry.
    Collision(String),
    /// Root plus relative path would exceed PATH_MAX.
    TooLong,
}

pub struct WorkingLayout {
    dir: TempDir,
}

impl WorkingLayout {
    /// Create a fresh layout directory named after `request_id` inside `parent`.
    pub fn create(parent: &Path, request_id: &str) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("pagezip-{request_id}-"))
            .tempdir_in(parent)?;
        tracing::debug!(path = %dir.path().display(), "working layout created");
        Ok(WorkingLayout { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_entry_point(&self, page: &[u8]) -> io::Result<()> {
        fs::write(self.root().join(ENTRY_POINT), page)
    }

    /// Decides where `relative` (a `/`-separated path) would land.
    ///
    /// Walks the parents first: a parent that is a file makes the path
    /// unusable. Then the target itself: a directory is a collision, a file
    /// means an earlier reference already claimed it. Paths the filesystem
    /// could not address at all are rejected up front.
    pub fn slot(&self, relative: &str) -> Slot {
        if self.root().as_os_str().len() + 1 + relative.len() >= PATH_MAX {
            return Slot::TooLong;
        }
        let mut current = self.root().to_path_buf();
        let mut segments = relative.split('/').peekable();
        while let Some(segment) = segments.next() {
            current.push(segment);
            let is_last = segments.peek().is_none();
            let meta = match fs::symlink_metadata(&current) {
                Ok(meta) => meta,
                Err(_) => continue,
            };
            if is_last {
                if meta.is_dir() {
                    return Slot::Collision(format!("{relative} is already a directory"));
                }
                return Slot::Occupied;
            }
            if !meta.is_dir() {
                let parent = current
                    .strip_prefix(self.root())
                    .unwrap_or(&current)
                    .display()
                    .to_string();
                return Slot::Collision(format!("{parent} is already a file"));
            }
        }
        Slot::Free(current)
    }

    /// Writes an asset at a path previously returned as [`Slot::Free`],
    /// creating parent directories as needed.
    pub fn place(&self, target: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, bytes)
    }

    /// Remove every file and directory of the layout.
    pub fn teardown(self) -> io::Result<()> {
        let path = self.root().to_path_buf();
        self.dir.close()?;
        tracing::debug!(path = %path.display(), "working layout removed");
        Ok(())
    }
}
