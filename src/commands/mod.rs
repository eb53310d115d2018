pub mod config;
pub mod habits;
pub mod init;
pub mod pomodoro;
pub mod status;
pub mod tasks;
pub mod templates;

use std::path::PathBuf;

use anyhow::Result;
use bamboo::core::clock::SystemClock;
use bamboo::core::config::{FileConfigSource, VaultResolver};
use bamboo::core::date_cursor::DateCursor;
use bamboo::core::paths::{VaultPaths, DATE_FORMAT};
use clap::Args;
use colored::*;

/// Which day a command looks at.
#[derive(Args, Debug, Clone, Default)]
pub struct DateArgs {
    #[arg(long, help = "Date to view (YYYY-MM-DD, default today)")]
    pub date: Option<String>,
    #[arg(
        long,
        allow_hyphen_values = true,
        default_value_t = 0,
        help = "Days to move from the date (e.g. -1 for the day before)"
    )]
    pub offset: i64,
}

impl DateArgs {
    pub fn cursor(&self) -> Result<DateCursor> {
        let mut cursor = DateCursor::new();
        if let Some(date) = &self.date {
            cursor.jump_to(date)?;
        }
        cursor.advance(self.offset);
        Ok(cursor)
    }
}

pub fn resolver(vault: Option<PathBuf>) -> Result<VaultResolver<FileConfigSource>> {
    Ok(VaultResolver::new(FileConfigSource::discover())?.with_override(vault))
}

pub fn open_vault(vault: Option<PathBuf>) -> Result<VaultPaths> {
    Ok(resolver(vault)?.open()?)
}

pub fn date_heading(cursor: &DateCursor<SystemClock>) -> String {
    format!(
        "{} ({})",
        cursor.current_date().format(DATE_FORMAT),
        cursor.label()
    )
}

pub fn print_title(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
    println!();
}

pub fn ok(message: &str) {
    println!("{} {}", "✓".green(), message);
}
