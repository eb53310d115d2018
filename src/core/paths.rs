use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use super::error::{BambooError, Result};

pub const CONFIG_FILENAME: &str = ".bamboo_config.json";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct VaultPaths {
    pub root: PathBuf,
    pub pomodoro: PathBuf,
    pub habits: PathBuf,
    pub tasks: PathBuf,
    pub templates: PathBuf,
    pub habit_templates: PathBuf,
    pub config: PathBuf,
}

impl VaultPaths {
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            pomodoro: root.join("Pomodoro"),
            habits: root.join("Habits"),
            tasks: root.join("Tasks"),
            templates: root.join("Templates"),
            habit_templates: root.join("Templates").join("Habits"),
            config: root.join(CONFIG_FILENAME),
            root,
        }
    }

    /// Opens a vault, creating any missing layout folders.
    pub fn open(root: PathBuf) -> Result<Self> {
        let paths = Self::from_root(root);
        paths.ensure_layout()?;
        Ok(paths)
    }

    pub fn required_folders(&self) -> Vec<(&PathBuf, &str)> {
        vec![
            (&self.pomodoro, "Focus session logs"),
            (&self.habits, "One folder per habit"),
            (&self.tasks, "Daily task lists"),
            (&self.habit_templates, "Habit log templates"),
        ]
    }

    pub fn ensure_layout(&self) -> Result<()> {
        for (dir, _) in self.required_folders() {
            fs::create_dir_all(dir).map_err(|e| BambooError::storage(dir, e))?;
        }
        Ok(())
    }

    pub fn habit_dir(&self, habit: &str) -> PathBuf {
        self.habits.join(habit)
    }

    /// `Habits/<habit>/<habit>-<YYYY-MM-DD>.md`
    pub fn habit_log(&self, habit: &str, date: NaiveDate) -> PathBuf {
        self.habit_dir(habit)
            .join(format!("{}-{}.md", habit, date.format(DATE_FORMAT)))
    }

    /// `Tasks/Task_<YYYY-MM-DD>.md`
    pub fn task_file(&self, date: NaiveDate) -> PathBuf {
        self.tasks
            .join(format!("Task_{}.md", date.format(DATE_FORMAT)))
    }

    /// `Templates/Habits/<name>.template.md`
    pub fn habit_template(&self, name: &str) -> PathBuf {
        self.habit_templates.join(format!("{}.template.md", name))
    }

    /// `Pomodoro/Pomodoro_<session>_<YYYY-MM-DD>.md`
    pub fn pomodoro_log(&self, session: &str, date: NaiveDate) -> PathBuf {
        self.pomodoro
            .join(format!("Pomodoro_{}_{}.md", session, date.format(DATE_FORMAT)))
    }
}
