//! Persisting a finished archive: temp sibling, then atomic rename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::ArchiveError;

/// Temporary file suffix used before the rename into place.
pub const TEMP_SUFFIX: &str = ".part";

/// Final archive path for a request inside `dir`.
pub fn archive_path(dir: &Path, request_id: &str) -> PathBuf {
    dir.join(format!("webpage-{request_id}.zip"))
}

/// Writes `bytes` to `webpage-<request_id>.zip` in `dir`. An existing file of
/// the same name is replaced.
pub(crate) fn persist_archive(
    dir: &Path,
    request_id: &str,
    bytes: &[u8],
) -> Result<PathBuf, ArchiveError> {
    let final_path = archive_path(dir, request_id);
    let output_err = |source| ArchiveError::Output {
        path: final_path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(output_err)?;
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".webpage-{request_id}-"))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(output_err)?;
    temp.write_all(bytes).map_err(output_err)?;
    temp.as_file().sync_all().map_err(output_err)?;
    temp.persist(&final_path)
        .map_err(|e| output_err(e.error))?;

    tracing::info!(path = %final_path.display(), bytes = bytes.len(), "archive written");
    Ok(final_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let first = persist_archive(dir.path(), "r1", b"one").unwrap();
        assert_eq!(first, dir.path().join("webpage-r1.zip"));
        let second = persist_archive(dir.path(), "r1", b"two").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"two");
        // No leftover temp files.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn distinct_requests_do_not_clash() {
        let dir = tempfile::tempdir().unwrap();
        let a = persist_archive(dir.path(), "a", b"A").unwrap();
        let b = persist_archive(dir.path(), "b", b"B").unwrap();
        assert_ne!(a, b);
        assert_eq!(fs::read(a).unwrap(), b"A");
        assert_eq!(fs::read(b).unwrap(), b"B");
    }
}
