use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::generate::{Generator, DEFAULT_MODULE_SIZE, DEFAULT_QUIET_ZONE};
use crate::scan::live::{FeedOptions, DEFAULT_POLL_INTERVAL};
use crate::scan::DEFAULT_MAX_DIMENSION;
use crate::store::settings;

/// On-disk shape of config.toml. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    module_size: Option<u32>,
    quiet_zone: Option<u32>,
    max_scan_dimension: Option<u32>,
    poll_interval: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Settings database; the platform data dir when unset.
    pub database: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub generator: Generator,
    pub max_scan_dimension: u32,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: None,
            export_dir: std::env::temp_dir(),
            generator: Generator {
                module_size: DEFAULT_MODULE_SIZE,
                quiet_zone: DEFAULT_QUIET_ZONE,
            },
            max_scan_dimension: DEFAULT_MAX_DIMENSION,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Config {
    /// ~/.config/stikqr/config.toml or platform equivalent
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("", "", "stikqr")
            .ok_or(Error::NoProjectDir("config"))?
            .config_dir()
            .to_path_buf();

        Ok(config_dir.join("config.toml"))
    }

    /// Loads `path`, or the default location when `None`.
    /// A missing default file means defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if !required && !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&text, &path)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;

        let defaults = Config::default();
        let poll_interval = match file.poll_interval {
            Some(value) => parse_duration(&value)?,
            None => defaults.poll_interval,
        };

        Ok(Config {
            database: file.database,
            export_dir: file.export_dir.unwrap_or(defaults.export_dir),
            generator: Generator {
                module_size: file.module_size.unwrap_or(defaults.generator.module_size),
                quiet_zone: file.quiet_zone.unwrap_or(defaults.generator.quiet_zone),
            },
            max_scan_dimension: file.max_scan_dimension.unwrap_or(defaults.max_scan_dimension),
            poll_interval,
        })
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => settings::default_db_path(),
        }
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            poll_interval: self.poll_interval,
            max_dimension: self.max_scan_dimension,
        }
    }
}

/// Parses human durations such as "250ms", "30s" or "2m".
pub fn parse_duration(value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim()).map_err(|source| Error::Duration {
        value: value.to_string(),
        source,
    })
}
