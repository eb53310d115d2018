pub mod clock;
pub mod config;
pub mod date_cursor;
pub mod error;
pub mod habit;
pub mod paths;
pub mod pomodoro;
pub mod settings;
pub mod task;
pub mod task_store;
pub mod template;
pub mod terminal;
