//! Error types shared by the vault stores.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BambooError {
    /// No vault path is set in the configuration.
    #[error("no vault configured (run `bamboo init` or `bamboo config switch <path>`)")]
    NoVaultConfigured,

    /// User supplied text could not be parsed (recoverable, re-prompt).
    #[error("invalid {expected}: '{input}'")]
    Parse {
        input: String,
        expected: &'static str,
    },

    /// Read or write failure other than "file does not exist".
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input rejected before any filesystem mutation.
    #[error("{0}")]
    Validation(String),

    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl BambooError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BambooError>;

/// Checks a name used verbatim as a directory or filename component.
///
/// Shared by habits, templates and pomodoro sessions.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BambooError::validation(format!("{} name cannot be empty", kind)));
    }
    if trimmed != name {
        return Err(BambooError::validation(format!(
            "{} name cannot start or end with whitespace",
            kind
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(BambooError::validation(format!(
            "{} name cannot contain path separators: {}",
            kind, name
        )));
    }
    if name.starts_with('.') {
        return Err(BambooError::validation(format!(
            "{} name cannot start with '.': {}",
            kind, name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Habit", "Meditate").is_ok());
        assert!(validate_name("Habit", "Read 20 pages").is_ok());
        assert!(validate_name("Habit", "").is_err());
        assert!(validate_name("Habit", "   ").is_err());
        assert!(validate_name("Habit", " padded").is_err());
        assert!(validate_name("Habit", "a/b").is_err());
        assert!(validate_name("Habit", "a\\b").is_err());
        assert!(validate_name("Habit", ".hidden").is_err());
    }

    #[test]
    fn test_display_messages() {
        let err = BambooError::Parse {
            input: "2024-13-01".to_string(),
            expected: "date (YYYY-MM-DD)",
        };
        assert_eq!(err.to_string(), "invalid date (YYYY-MM-DD): '2024-13-01'");

        let err = BambooError::validation("Habit name cannot be empty");
        assert_eq!(err.to_string(), "Habit name cannot be empty");
    }

    #[test]
    fn test_storage_error_keeps_source() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = BambooError::storage("/vault/Tasks", io_err);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/vault/Tasks"));
    }
}
