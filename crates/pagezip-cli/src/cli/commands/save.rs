//! `pagezip save <url>...` – snapshot pages into ZIP archives.

use anyhow::{Context, Result};
use pagezip_core::archive::{self, ArchiveFile};
use pagezip_core::config::PagezipConfig;
use pagezip_core::request_id;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct SaveArgs {
    pub urls: Vec<String>,
    pub id: Option<String>,
    pub jobs: usize,
}

fn print_archive(url: &str, file: &ArchiveFile) {
    println!(
        "saved {} -> {} ({} assets, {} skipped)",
        url,
        file.path.display(),
        file.report.assets_stored(),
        file.report.skipped.len()
    );
    println!("  sha256 {}", file.sha256);
    for skip in &file.report.skipped {
        println!("  skipped {}: {}", skip.reference, skip.reason);
    }
}

/// Each URL runs on its own blocking worker with its own session and request
/// id; at most `jobs` run at once.
pub async fn run_save(cfg: &PagezipConfig, args: SaveArgs) -> Result<()> {
    if args.id.is_some() && args.urls.len() > 1 {
        anyhow::bail!("--id can only be used with a single URL");
    }
    let total = args.urls.len();
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for url in args.urls {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("job limiter closed")?;
        let cfg = cfg.clone();
        let id = args.id.clone().unwrap_or_else(request_id::generate);
        tasks.spawn_blocking(move || {
            let result = archive::snapshot_to_file(&url, &id, &cfg);
            drop(permit);
            (url, result)
        });
    }

    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (url, result) = joined.context("snapshot worker panicked")?;
        match result {
            Ok(file) => {
                tracing::info!(
                    %url,
                    path = %file.path.display(),
                    skipped = file.report.skipped.len(),
                    "snapshot complete"
                );
                print_archive(&url, &file);
            }
            Err(err) => {
                failed += 1;
                tracing::error!(%url, error = %err, "snapshot failed");
                eprintln!("failed {}: {}", url, err);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} snapshot(s) failed", failed, total);
    }
    Ok(())
}
