//! What happened to each asset reference of a snapshot.

use std::fmt;
use url::Url;

use crate::extract::AssetReference;
use crate::fetch::FetchError;
use crate::url_model::ResolveError;

/// Reason an asset reference did not make it into the archive.
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// The reference could not be turned into a fetchable URL and file path.
    Unresolvable(ResolveError),
    /// An earlier entry (the page itself or a previous reference) holds the path.
    AlreadyPresent,
    /// The path clashes with a directory or runs through a file.
    Collision(String),
    /// Network or HTTP failure.
    FetchFailed(FetchError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unresolvable(e) => write!(f, "unresolvable: {}", e),
            SkipReason::AlreadyPresent => write!(f, "path already present"),
            SkipReason::Collision(detail) => write!(f, "path collision: {}", detail),
            SkipReason::FetchFailed(e) => write!(f, "fetch failed ({}): {}", e.kind(), e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedAsset {
    pub reference: AssetReference,
    /// Absolute URL, when resolution got that far.
    pub url: Option<Url>,
    pub reason: SkipReason,
}

/// Summary of one snapshot run.
#[derive(Debug, Clone, Default)]
pub struct SnapshotReport {
    /// Archive entry names, in archive order. Always contains `index.html`.
    pub entries: Vec<String>,
    /// Skipped references, in document order.
    pub skipped: Vec<SkippedAsset>,
}

impl SnapshotReport {
    /// Number of assets stored besides the page.
    pub fn assets_stored(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn fetch_failures(&self) -> impl Iterator<Item = &SkippedAsset> {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::FetchFailed(_)))
    }
}
