//! Serializes a working layout into an in-memory ZIP archive.

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::ArchiveError;
use crate::config::{Compression, EntryOrder};

/// Every regular file under `root` with its `/`-separated name relative to `root`.
fn collect_entries(root: &Path, order: EntryOrder) -> Result<Vec<String>, ArchiveError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| ArchiveError::Layout(io::Error::from(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ArchiveError::Layout(io::Error::new(io::ErrorKind::Other, e)))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        names.push(name);
    }
    if order == EntryOrder::Sorted {
        names.sort();
    }
    Ok(names)
}

/// Writes every file of the layout at `root` into a ZIP archive and returns
/// its bytes together with the entry names, in archive order.
pub(crate) fn pack_layout(
    root: &Path,
    compression: Compression,
    order: EntryOrder,
) -> Result<(Vec<u8>, Vec<String>), ArchiveError> {
    let names = collect_entries(root, order)?;
    let options = SimpleFileOptions::default()
        .compression_method(compression.method())
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for name in &names {
        let data = fs::read(root.join(name)).map_err(ArchiveError::Layout)?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&data).map_err(ArchiveError::Layout)?;
    }
    let cursor = zip.finish()?;
    tracing::debug!(entries = names.len(), "archive serialized");
    Ok((cursor.into_inner(), names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn write(root: &Path, rel: &str, body: &[u8]) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    #[test]
    fn sorted_entries_with_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", b"<html/>");
        write(dir.path(), "js/b.js", b"b()");
        write(dir.path(), "img/a.png", b"\x89PNG");
        fs::create_dir_all(dir.path().join("empty/dir")).unwrap();

        let (bytes, names) =
            pack_layout(dir.path(), Compression::Deflated, EntryOrder::Sorted).unwrap();
        assert_eq!(names, vec!["img/a.png", "index.html", "js/b.js"]);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);
        let mut body = String::new();
        archive
            .by_name("js/b.js")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "b()");
    }

    #[test]
    fn walk_order_contains_same_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", b"x");
        write(dir.path(), "a/b.css", b"y");
        let (_, mut names) =
            pack_layout(dir.path(), Compression::Stored, EntryOrder::Walk).unwrap();
        names.sort();
        assert_eq!(names, vec!["a/b.css", "index.html"]);
    }

    #[test]
    fn sorted_archives_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", b"page");
        write(dir.path(), "s/1.js", b"one");
        let (a, _) = pack_layout(dir.path(), Compression::Deflated, EntryOrder::Sorted).unwrap();
        let (b, _) = pack_layout(dir.path(), Compression::Deflated, EntryOrder::Sorted).unwrap();
        assert_eq!(a, b);
    }
}
