//! Vault creation, switching and timer preferences.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::config::{read_config, BambooConfig, ConfigSource};
use super::error::{BambooError, Result};
use super::paths::VaultPaths;

pub const FOCUS_MINUTES_RANGE: (u32, u32) = (1, 120);
pub const BREAK_MINUTES_RANGE: (u32, u32) = (1, 60);

/// Makes a user supplied path absolute against the current directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| BambooError::storage(path, e))?;
    Ok(cwd.join(path))
}

pub fn validate_vault_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(BambooError::validation(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }
    }
    if path.exists() && !path.is_dir() {
        return Err(BambooError::validation(format!(
            "Path exists but is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Creates the vault layout and records it in the config. If the config
/// cannot be saved, the folders created here are removed again.
pub fn create_vault<S: ConfigSource>(source: &S, name: &str, path: &Path) -> Result<BambooConfig> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BambooError::validation("Vault name cannot be empty"));
    }
    let root = absolute_path(path)?;
    validate_vault_path(&root)?;

    let layout = VaultPaths::from_root(root.clone());
    let root_existed = root.exists();
    let missing: Vec<PathBuf> = layout
        .required_folders()
        .into_iter()
        .map(|(dir, _)| dir.clone())
        .chain(std::iter::once(layout.templates.clone()))
        .filter(|dir| !dir.exists())
        .collect();

    let config = BambooConfig::for_vault(name, &root);
    let created = layout
        .ensure_layout()
        .and_then(|_| source.save(&config));
    if let Err(e) = created {
        undo_layout(&root, root_existed, &missing);
        return Err(e);
    }
    info!(vault = %root.display(), "created vault");
    Ok(config)
}

fn undo_layout(root: &Path, root_existed: bool, missing: &[PathBuf]) {
    if !root_existed {
        if let Err(e) = fs::remove_dir_all(root) {
            warn!(path = %root.display(), "could not remove vault folder: {}", e);
        }
        return;
    }
    // deepest first so Templates/Habits goes before Templates
    let mut dirs: Vec<&PathBuf> = missing.iter().collect();
    dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    for dir in dirs {
        if let Err(e) = fs::remove_dir(dir) {
            warn!(path = %dir.display(), "could not remove vault folder: {}", e);
        }
    }
}

/// Switches to the vault at `path`, creating it when it does not exist yet.
pub fn switch_vault<S: ConfigSource>(source: &S, path: &Path) -> Result<BambooConfig> {
    let root = absolute_path(path)?;
    let dir_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| super::config::DEFAULT_VAULT_NAME.to_string());

    if !root.exists() {
        return create_vault(source, &dir_name, &root);
    }
    validate_vault_path(&root)?;

    let paths = VaultPaths::open(root.clone())?;
    let config = match read_config(&paths.config)? {
        Some(existing) => BambooConfig {
            vault_path: Some(root.to_string_lossy().to_string()),
            ..existing
        },
        None => BambooConfig::for_vault(&dir_name, &root),
    };
    source.save(&config)?;
    info!(vault = %root.display(), "switched vault");
    Ok(config)
}

/// Restores default timer settings, keeping the current vault.
pub fn reset_to_defaults<S: ConfigSource>(source: &S, current: &BambooConfig) -> Result<BambooConfig> {
    let config = match current.vault_root() {
        Some(root) => {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| current.vault_name.clone());
            BambooConfig::for_vault(&name, &root)
        }
        None => BambooConfig::default(),
    };
    source.save(&config)?;
    Ok(config)
}

pub fn set_focus_minutes<S: ConfigSource>(
    source: &S,
    current: &BambooConfig,
    minutes: u32,
) -> Result<BambooConfig> {
    check_range("Focus time", minutes, FOCUS_MINUTES_RANGE)?;
    let config = BambooConfig {
        pomodoro_focus: minutes,
        ..current.clone()
    };
    source.save(&config)?;
    Ok(config)
}

pub fn set_break_minutes<S: ConfigSource>(
    source: &S,
    current: &BambooConfig,
    minutes: u32,
) -> Result<BambooConfig> {
    check_range("Break time", minutes, BREAK_MINUTES_RANGE)?;
    let config = BambooConfig {
        pomodoro_break: minutes,
        ..current.clone()
    };
    source.save(&config)?;
    Ok(config)
}

fn check_range(what: &str, value: u32, (min, max): (u32, u32)) -> Result<()> {
    if value < min || value > max {
        return Err(BambooError::validation(format!(
            "{} must be between {} and {} minutes (got {})",
            what, min, max, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::tests::MemoryConfigSource;
    use crate::core::paths::CONFIG_FILENAME;

    struct FailingSource;

    impl ConfigSource for FailingSource {
        fn load(&self) -> Result<BambooConfig> {
            Ok(BambooConfig::default())
        }

        fn save(&self, _config: &BambooConfig) -> Result<()> {
            Err(BambooError::storage(
                "/home/.bamboo_config.json",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ))
        }
    }

    #[test]
    fn test_create_vault_failed_save_removes_new_vault() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Garden");

        let err = create_vault(&FailingSource, "Garden", &root).unwrap_err();
        assert!(matches!(err, BambooError::Storage { .. }));
        assert!(!root.exists());
    }

    #[test]
    fn test_create_vault_failed_save_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Existing");
        std::fs::create_dir_all(root.join("Habits/Yoga")).unwrap();
        std::fs::write(root.join("notes.md"), "mine").unwrap();

        assert!(create_vault(&FailingSource, "Existing", &root).is_err());
        assert!(root.join("Habits/Yoga").is_dir());
        assert!(root.join("notes.md").is_file());
        assert!(!root.join("Tasks").exists());
        assert!(!root.join("Pomodoro").exists());
        assert!(!root.join("Templates").exists());
    }

    #[test]
    fn test_create_vault() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemoryConfigSource::default();
        let root = dir.path().join("Garden");

        let config = create_vault(&source, "Garden", &root).unwrap();
        assert_eq!(config.vault_name, "Garden");
        assert_eq!(config.vault_root(), Some(root.clone()));
        assert!(root.join("Habits").is_dir());
        assert!(root.join("Templates/Habits").is_dir());
        assert_eq!(source.load().unwrap(), config);
    }

    #[test]
    fn test_create_vault_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemoryConfigSource::default();

        assert!(matches!(
            create_vault(&source, "  ", &dir.path().join("x")),
            Err(BambooError::Validation(_))
        ));

        let missing_parent = dir.path().join("no/such/parent/vault");
        assert!(create_vault(&source, "V", &missing_parent).is_err());
        assert!(!dir.path().join("no").exists());

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(create_vault(&source, "V", &file).is_err());
        assert!(source.stored.borrow().is_none());
    }

    #[test]
    fn test_switch_vault_adopts_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Existing");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(
            root.join(CONFIG_FILENAME),
            r#"{"vault_name": "Existing", "vault_path": "/old/location", "pomodoro_focus": 50}"#,
        )
        .unwrap();

        let source = MemoryConfigSource::default();
        let config = switch_vault(&source, &root).unwrap();
        assert_eq!(config.pomodoro_focus, 50);
        assert_eq!(config.vault_root(), Some(root.clone()));
        assert!(root.join("Tasks").is_dir());
    }

    #[test]
    fn test_switch_vault_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Fresh");
        let source = MemoryConfigSource::default();

        let config = switch_vault(&source, &root).unwrap();
        assert_eq!(config.vault_name, "Fresh");
        assert!(root.join("Pomodoro").is_dir());
    }

    #[test]
    fn test_timer_settings() {
        let source = MemoryConfigSource::default();
        let base = BambooConfig::for_vault("V", Path::new("/v"));

        let config = set_focus_minutes(&source, &base, 45).unwrap();
        assert_eq!(config.pomodoro_focus, 45);
        assert!(set_focus_minutes(&source, &base, 0).is_err());
        assert!(set_focus_minutes(&source, &base, 121).is_err());

        let config = set_break_minutes(&source, &config, 10).unwrap();
        assert_eq!(config.pomodoro_break, 10);
        assert_eq!(config.pomodoro_focus, 45);
        assert!(set_break_minutes(&source, &config, 61).is_err());

        let reset = reset_to_defaults(&source, &config).unwrap();
        assert_eq!(reset.pomodoro_focus, 25);
        assert_eq!(reset.pomodoro_break, 5);
        assert_eq!(reset.vault_root(), Some(PathBuf::from("/v")));
        assert_eq!(reset.vault_name, "v");
    }
}
