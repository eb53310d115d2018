//! bamboo library
//!
//! Habits, tasks and pomodoro sessions kept as plain markdown files in a vault.
//!
//! # Modules
//!
//! - `core::paths`, `core::config`: vault layout and where the active vault lives
//! - `core::date_cursor`: the day every view looks at
//! - `core::habit`: per-day habit logs and streaks
//! - `core::task`, `core::task_store`: the per-day checkbox list
//! - `core::template`, `core::pomodoro`: detailed log templates and focus sessions

pub mod core;

// Re-exports for convenience
pub use core::config::{BambooConfig, FileConfigSource, VaultResolver};
pub use core::date_cursor::DateCursor;
pub use core::error::{BambooError, Result};
pub use core::habit::{HabitStats, HabitStore, LogOutcome};
pub use core::paths::VaultPaths;
pub use core::task::{Task, TaskList};
pub use core::task_store::TaskStore;
