//! CLI for pagezip.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pagezip_core::config;
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_presets, run_save, SaveArgs};

/// Top-level CLI for pagezip.
#[derive(Debug, Parser)]
#[command(name = "pagezip")]
#[command(about = "pagezip: save a web page and its assets as a ZIP archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Snapshot one or more pages into ZIP archives.
    Save {
        /// HTTP/HTTPS page URLs.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Directory for the archives (default: config `output_dir`, else current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Request id naming the archive (single URL only; default: random).
        #[arg(long)]
        id: Option<String>,
        /// Snapshot up to N pages concurrently (default 1).
        #[arg(long, default_value = "1", value_name = "N")]
        jobs: usize,
    },

    /// List the preset example URLs.
    Presets,

    /// Compute SHA-256 of a file (e.g. a produced archive).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Save {
                urls,
                output_dir,
                id,
                jobs,
            } => {
                let mut cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                if output_dir.is_some() {
                    cfg.output_dir = output_dir;
                }
                run_save(&cfg, SaveArgs { urls, id, jobs }).await?;
            }
            CliCommand::Presets => run_presets(),
            CliCommand::Checksum { path } => run_checksum(Path::new(&path)).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
