//! Resolution of asset references into absolute URLs and layout paths.

mod path;

pub use path::relative_path_from_url;

use thiserror::Error;
use url::Url;

use crate::extract::AssetReference;

/// Why a reference cannot be placed in the working layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("cannot join with page URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("empty path")]
    EmptyPath,
    #[error("directory-like path {0:?}")]
    DirectoryLike(String),
    #[error("unsafe path {0:?}")]
    UnsafePath(String),
}

/// An asset reference joined with the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub reference: AssetReference,
    pub url: Url,
    /// `/`-separated path relative to the layout root; also the archive entry name.
    pub relative_path: String,
}

/// Resolves `reference` against `base` (the page URL).
///
/// Absolute references stay as they are; scheme-relative and path-relative
/// ones are joined. Only http(s) targets are accepted.
pub fn resolve(base: &Url, reference: &AssetReference) -> Result<ResolvedAsset, ResolveError> {
    let url = base.join(&reference.value)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ResolveError::UnsupportedScheme(url.scheme().to_string()));
    }
    let relative_path = relative_path_from_url(&url)?;
    Ok(ResolvedAsset {
        reference: reference.clone(),
        url,
        relative_path,
    })
}
