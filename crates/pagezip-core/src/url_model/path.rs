//! Relative layout path derivation from a URL path.

use super::ResolveError;

/// Linux NAME_MAX; longer segments cannot be created as files or directories.
const NAME_MAX: usize = 255;

/// Turns the path of `url` into a path relative to the layout root.
///
/// Leading separators are stripped. Empty results and directory-like paths
/// (trailing `/`) are rejected, as are segments that are not plain names.
/// The query and fragment play no part.
pub fn relative_path_from_url(url: &url::Url) -> Result<String, ResolveError> {
    let relative = url.path().trim_start_matches('/');
    if relative.is_empty() {
        return Err(ResolveError::EmptyPath);
    }
    if relative.ends_with('/') {
        return Err(ResolveError::DirectoryLike(relative.to_string()));
    }
    for segment in relative.split('/') {
        if !is_plain_segment(segment) {
            return Err(ResolveError::UnsafePath(relative.to_string()));
        }
    }
    Ok(relative.to_string())
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment.len() <= NAME_MAX
        && !segment.contains(['\\', '\0'])
}
