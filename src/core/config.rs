//! Persisted configuration and vault resolution.
//!
//! The config lives in `.bamboo_config.json`, looked up first in the home
//! directory and then in the current directory. Every store receives the vault
//! root through a [`VaultResolver`], which reads the configuration once per
//! invocation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{BambooError, Result};
use super::paths::{VaultPaths, CONFIG_FILENAME};
use super::task_store::write_replacing;

pub const DEFAULT_VAULT_NAME: &str = "BambooVault";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BambooConfig {
    pub vault_name: String,
    pub vault_path: Option<String>,
    pub pomodoro_focus: u32,
    pub pomodoro_break: u32,
    pub long_break: u32,
    pub cycles_before_long_break: u32,
}

impl Default for BambooConfig {
    fn default() -> Self {
        Self {
            vault_name: DEFAULT_VAULT_NAME.to_string(),
            vault_path: None,
            pomodoro_focus: 25,
            pomodoro_break: 5,
            long_break: 15,
            cycles_before_long_break: 4,
        }
    }
}

impl BambooConfig {
    pub fn for_vault(name: &str, root: &Path) -> Self {
        Self {
            vault_name: name.to_string(),
            vault_path: Some(root.to_string_lossy().to_string()),
            ..Self::default()
        }
    }

    /// The configured vault root, if set and non-empty.
    pub fn vault_root(&self) -> Option<PathBuf> {
        self.vault_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

pub trait ConfigSource {
    fn load(&self) -> Result<BambooConfig>;
    fn save(&self, config: &BambooConfig) -> Result<()>;
}

/// Reads `.bamboo_config.json` from the home and current directories.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
}

impl FileConfigSource {
    pub fn new(home: Option<PathBuf>, cwd: Option<PathBuf>) -> Self {
        Self { home, cwd }
    }

    pub fn discover() -> Self {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let cwd = std::env::current_dir().ok();
        Self::new(home, cwd)
    }

    pub fn candidates(&self) -> Vec<PathBuf> {
        [&self.home, &self.cwd]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .collect()
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<BambooConfig> {
        for path in self.candidates() {
            match read_config(&path) {
                Ok(Some(config)) => {
                    debug!(path = %path.display(), "loaded config");
                    return Ok(config);
                }
                Ok(None) => continue,
                Err(e) => warn!("skipping config: {}", e),
            }
        }
        Ok(BambooConfig::default())
    }

    /// Writes the vault copy and the home copy. The home copy is the one later
    /// invocations find. If one write fails, copies already written are put
    /// back to what they were.
    fn save(&self, config: &BambooConfig) -> Result<()> {
        let mut targets = Vec::new();
        if let Some(root) = config.vault_root() {
            targets.push(root.join(CONFIG_FILENAME));
        }
        if let Some(home) = &self.home {
            let home_config = home.join(CONFIG_FILENAME);
            if !targets.contains(&home_config) {
                targets.push(home_config);
            }
        }

        let mut written: Vec<(PathBuf, Option<String>)> = Vec::new();
        for path in targets {
            let previous = fs::read_to_string(&path).ok();
            if let Err(e) = write_config(&path, config) {
                for (path, previous) in written.iter().rev() {
                    restore(path, previous.as_deref());
                }
                return Err(e);
            }
            written.push((path, previous));
        }
        Ok(())
    }
}

fn restore(path: &Path, previous: Option<&str>) {
    let restored = match previous {
        Some(content) => write_replacing(path, content),
        None => fs::remove_file(path).map_err(|e| BambooError::storage(path, e)),
    };
    if let Err(e) = restored {
        warn!("could not restore config: {}", e);
    }
}

pub fn read_config(path: &Path) -> Result<Option<BambooConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BambooError::storage(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| BambooError::Config {
            path: path.to_path_buf(),
            source,
        })
}

fn write_config(path: &Path, config: &BambooConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).map_err(|source| BambooError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    write_replacing(path, &(json + "\n"))?;
    debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Resolves the active vault root.
pub struct VaultResolver<S: ConfigSource> {
    source: S,
    config: BambooConfig,
    override_root: Option<PathBuf>,
}

impl<S: ConfigSource> VaultResolver<S> {
    pub fn new(source: S) -> Result<Self> {
        let config = source.load()?;
        Ok(Self {
            source,
            config,
            override_root: None,
        })
    }

    /// A root given on the command line wins over the configured one.
    pub fn with_override(mut self, root: Option<PathBuf>) -> Self {
        self.override_root = root;
        self
    }

    pub fn resolve(&self) -> Option<PathBuf> {
        self.override_root
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| self.config.vault_root())
    }

    pub fn require(&self) -> Result<PathBuf> {
        self.resolve().ok_or(BambooError::NoVaultConfigured)
    }

    /// Resolves and opens the vault, creating missing layout folders.
    pub fn open(&self) -> Result<VaultPaths> {
        VaultPaths::open(self.require()?)
    }

    pub fn config(&self) -> &BambooConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
