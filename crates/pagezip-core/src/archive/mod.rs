//! Snapshot pipeline: fetch the page, collect its assets into a working
//! layout, serialize the layout as ZIP and tear it down.
//!
//! Per-asset problems (unresolvable reference, fetch failure, path collision)
//! are recorded in the [`SnapshotReport`] and never abort the run. Failing to
//! fetch the page, or any filesystem / serialization error, does.

mod output;
mod pack;
mod report;

pub use output::{archive_path, TEMP_SUFFIX};
pub use report::{SkipReason, SkippedAsset, SnapshotReport};

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::checksum;
use crate::config::{Compression, EntryOrder, PagezipConfig};
use crate::extract::{self, AssetReference};
use crate::fetch::{Fetch, FetchError, Session};
use crate::layout::{Slot, WorkingLayout};
use crate::request_id;
use crate::url_model::{self, ResolveError};

/// Fatal snapshot failure; no archive is produced.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid page URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported page URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
    #[error("invalid request id {0:?}")]
    InvalidRequestId(String),
    #[error("could not set up HTTP session: {0}")]
    Session(#[source] curl::Error),
    #[error("page fetch failed: {0}")]
    PageFetch(#[source] FetchError),
    #[error("working layout: {0}")]
    Layout(#[source] io::Error),
    #[error("archive serialization: {0}")]
    Serialize(#[from] zip::result::ZipError),
    #[error("writing archive {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where and how a snapshot is assembled.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Parent directory for per-request scratch layouts.
    pub work_dir: PathBuf,
    pub compression: Compression,
    pub entry_order: EntryOrder,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            compression: Compression::default(),
            entry_order: EntryOrder::default(),
        }
    }
}

/// In-memory result of [`save_page`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub page_url: Url,
    /// ZIP archive bytes.
    pub bytes: Vec<u8>,
    pub report: SnapshotReport,
}

/// A snapshot persisted to disk.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub request_id: String,
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the archive.
    pub sha256: String,
    pub report: SnapshotReport,
}

enum Outcome {
    Stored(String),
    Skipped(SkippedAsset),
}

fn parse_page_url(raw: &str) -> Result<Url, ArchiveError> {
    let url = Url::parse(raw.trim()).map_err(|source| ArchiveError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ArchiveError::UnsupportedScheme(url.scheme().to_string()));
    }
    Ok(url)
}

/// Snapshots `page_url` into an in-memory ZIP archive using `fetcher` for the
/// page and every asset.
///
/// The working layout lives under `opts.work_dir`, is named after
/// `request_id`, and is removed before this returns, whatever the outcome.
pub fn save_page<F: Fetch>(
    fetcher: &mut F,
    page_url: &str,
    request_id: &str,
    opts: &ArchiveOptions,
) -> Result<Snapshot, ArchiveError> {
    let base = parse_page_url(page_url)?;
    let page = fetcher.fetch(&base).map_err(ArchiveError::PageFetch)?;
    tracing::info!(url = %base, bytes = page.len(), "page fetched");

    let layout = WorkingLayout::create(&opts.work_dir, request_id).map_err(ArchiveError::Layout)?;
    let built = fill_and_pack(fetcher, &base, &page, &layout, opts);
    let cleanup = layout.teardown();

    match (built, cleanup) {
        (Ok((bytes, report)), Ok(())) => Ok(Snapshot {
            page_url: base,
            bytes,
            report,
        }),
        (Ok(_), Err(e)) => Err(ArchiveError::Layout(e)),
        (Err(e), Err(cleanup_err)) => {
            tracing::warn!(error = %cleanup_err, "working layout cleanup failed");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

fn fill_and_pack<F: Fetch>(
    fetcher: &mut F,
    base: &Url,
    page: &[u8],
    layout: &WorkingLayout,
    opts: &ArchiveOptions,
) -> Result<(Vec<u8>, SnapshotReport), ArchiveError> {
    layout.write_entry_point(page).map_err(ArchiveError::Layout)?;

    let references: Vec<AssetReference> = {
        let document = extract::parse_document(page);
        extract::asset_references(&document).collect()
    };
    tracing::debug!(count = references.len(), "asset references found");

    let mut skipped = Vec::new();
    for reference in references {
        match place_asset(fetcher, base, layout, reference)? {
            Outcome::Stored(path) => tracing::debug!(%path, "asset stored"),
            Outcome::Skipped(skip) => {
                tracing::warn!(
                    reference = %skip.reference.value,
                    url = skip.url.as_ref().map(Url::as_str).unwrap_or("-"),
                    reason = %skip.reason,
                    "asset skipped"
                );
                skipped.push(skip);
            }
        }
    }

    let (bytes, entries) = pack::pack_layout(layout.root(), opts.compression, opts.entry_order)?;
    Ok((bytes, SnapshotReport { entries, skipped }))
}

/// Resolve, check the slot, fetch and write one asset. Only filesystem
/// failures while writing are returned as errors.
fn place_asset<F: Fetch>(
    fetcher: &mut F,
    base: &Url,
    layout: &WorkingLayout,
    reference: AssetReference,
) -> Result<Outcome, ArchiveError> {
    let resolved = match url_model::resolve(base, &reference) {
        Ok(resolved) => resolved,
        Err(e) => {
            return Ok(Outcome::Skipped(SkippedAsset {
                reference,
                url: None,
                reason: SkipReason::Unresolvable(e),
            }))
        }
    };

    let skip = |reason| {
        Outcome::Skipped(SkippedAsset {
            reference: resolved.reference.clone(),
            url: Some(resolved.url.clone()),
            reason,
        })
    };

    let target = match layout.slot(&resolved.relative_path) {
        Slot::Free(target) => target,
        Slot::Occupied => return Ok(skip(SkipReason::AlreadyPresent)),
        Slot::Collision(detail) => return Ok(skip(SkipReason::Collision(detail))),
        Slot::TooLong => {
            let path = resolved.relative_path.clone();
            return Ok(skip(SkipReason::Unresolvable(ResolveError::UnsafePath(path))));
        }
    };

    let bytes = match fetcher.fetch(&resolved.url) {
        Ok(bytes) => bytes,
        Err(e) => return Ok(skip(SkipReason::FetchFailed(e))),
    };

    layout.place(&target, &bytes).map_err(ArchiveError::Layout)?;
    Ok(Outcome::Stored(resolved.relative_path))
}

/// Snapshots `page_url` with a fresh libcurl session and writes the archive to
/// `<output_dir>/webpage-<request_id>.zip`.
///
/// `request_id` is sanitized into a file-name fragment; it namespaces both the
/// scratch layout and the output file, so distinct ids never interfere.
pub fn snapshot_to_file(
    page_url: &str,
    request_id: &str,
    cfg: &PagezipConfig,
) -> Result<ArchiveFile, ArchiveError> {
    let request_id = request_id::sanitize(request_id)
        .ok_or_else(|| ArchiveError::InvalidRequestId(request_id.to_string()))?;
    let output_dir = cfg.resolved_output_dir().map_err(|source| ArchiveError::Output {
        path: PathBuf::from("."),
        source,
    })?;

    let mut session = Session::new(&cfg.fetch_options()).map_err(ArchiveError::Session)?;
    let snapshot = save_page(&mut session, page_url, &request_id, &cfg.archive_options())?;

    let path = output::persist_archive(&output_dir, &request_id, &snapshot.bytes)?;
    Ok(ArchiveFile {
        sha256: checksum::sha256_bytes(&snapshot.bytes),
        request_id,
        path,
        report: snapshot.report,
    })
}

/// Entry point: snapshot `page_url` under a generated request id and return
/// the path of the written archive.
pub fn generate_zip_file(page_url: &str, cfg: &PagezipConfig) -> Result<PathBuf, ArchiveError> {
    generate_zip_file_with_id(page_url, &request_id::generate(), cfg)
}

/// Like [`generate_zip_file`] with a caller-chosen request id.
pub fn generate_zip_file_with_id(
    page_url: &str,
    request_id: &str,
    cfg: &PagezipConfig,
) -> Result<PathBuf, ArchiveError> {
    snapshot_to_file(page_url, request_id, cfg).map(|file| file.path)
}
