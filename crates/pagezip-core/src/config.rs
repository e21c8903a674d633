use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::archive::ArchiveOptions;
use crate::fetch::FetchOptions;

/// Compression applied to every archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}

/// Order of entries inside the archive: lexicographic by name (reproducible)
/// or whatever the directory walk yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrder {
    #[default]
    Sorted,
    Walk,
}

/// Global configuration loaded from `~/.config/pagezip/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagezipConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole transfer (page or single asset).
    pub timeout_secs: u64,
    /// Maximum redirects followed per request.
    pub max_redirections: u32,
    /// User-Agent sent with every request of a session.
    pub user_agent: String,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default)]
    pub entry_order: EntryOrder,
    /// Directory receiving finished archives (None = current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Parent directory for scratch layouts (None = system temp dir).
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

impl Default for PagezipConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_redirections: 10,
            user_agent: concat!("pagezip/", env!("CARGO_PKG_VERSION")).to_string(),
            compression: Compression::default(),
            entry_order: EntryOrder::default(),
            output_dir: None,
            work_dir: None,
        }
    }
}

impl PagezipConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            max_redirections: self.max_redirections,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            work_dir: self.work_dir.clone().unwrap_or_else(std::env::temp_dir),
            compression: self.compression,
            entry_order: self.entry_order,
        }
    }

    /// Where finished archives go; falls back to the process working directory.
    pub fn resolved_output_dir(&self) -> std::io::Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagezip")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PagezipConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PagezipConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PagezipConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = PagezipConfig::default();
        assert_eq!(cfg.connect_timeout_secs, 15);
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.max_redirections, 10);
        assert!(cfg.user_agent.starts_with("pagezip/"));
        assert_eq!(cfg.compression, Compression::Deflated);
        assert_eq!(cfg.entry_order, EntryOrder::Sorted);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PagezipConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PagezipConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
        assert_eq!(parsed.user_agent, cfg.user_agent);
        assert_eq!(parsed.entry_order, cfg.entry_order);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            connect_timeout_secs = 5
            timeout_secs = 20
            max_redirections = 3
            user_agent = "snapshot-bot"
            compression = "stored"
            entry_order = "walk"
            output_dir = "/srv/archives"
        "#;
        let cfg: PagezipConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.connect_timeout_secs, 5);
        assert_eq!(cfg.max_redirections, 3);
        assert_eq!(cfg.compression, Compression::Stored);
        assert_eq!(cfg.entry_order, EntryOrder::Walk);
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/archives")));
        assert!(cfg.work_dir.is_none());
    }

    #[test]
    fn options_carry_config_values() {
        let mut cfg = PagezipConfig::default();
        cfg.work_dir = Some(PathBuf::from("/var/tmp/pz"));
        cfg.timeout_secs = 7;
        let fetch = cfg.fetch_options();
        assert_eq!(fetch.timeout, Duration::from_secs(7));
        let archive = cfg.archive_options();
        assert_eq!(archive.work_dir, PathBuf::from("/var/tmp/pz"));
    }
}
