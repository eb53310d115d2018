use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use bamboo::core::habit::HabitStore;
use bamboo::core::pomodoro::PomodoroLog;
use bamboo::core::task_store::{TaskStore, TaskSummary};
use bamboo::core::template::TemplateStore;
use colored::*;
use serde::Serialize;
use walkdir::WalkDir;

use super::{date_heading, print_title, resolver, DateArgs};

#[derive(Serialize)]
struct VaultStatus {
    vault_name: String,
    vault_path: String,
    date: String,
    folder_counts: BTreeMap<String, usize>,
    habits: usize,
    habits_completed: usize,
    best_current_streak: Option<(String, u32)>,
    tasks: TaskSummary,
    templates: usize,
    pomodoro_sessions: usize,
}

pub fn run(vault: Option<PathBuf>, date: &DateArgs, json: bool) -> Result<()> {
    let resolver = resolver(vault)?;
    let paths = resolver.open()?;
    let cursor = date.cursor()?;
    let day = cursor.current_date();

    let mut folder_counts = BTreeMap::new();
    folder_counts.insert("Habits".to_string(), count_markdown(&paths.habits));
    folder_counts.insert("Tasks".to_string(), count_markdown(&paths.tasks));
    folder_counts.insert("Pomodoro".to_string(), count_markdown(&paths.pomodoro));
    folder_counts.insert("Templates".to_string(), count_markdown(&paths.habit_templates));

    let habit_store = HabitStore::new(&paths);
    let habits = habit_store.list_habits()?;
    let habits_completed = habits
        .iter()
        .filter(|h| habit_store.is_completed(h, day))
        .count();
    let best_current_streak = habits
        .iter()
        .map(|h| (h.clone(), habit_store.current_streak(h, day)))
        .filter(|(_, streak)| *streak > 0)
        .max_by_key(|(_, streak)| *streak);

    let status = VaultStatus {
        vault_name: resolver.config().vault_name.clone(),
        vault_path: paths.root.display().to_string(),
        date: day.to_string(),
        folder_counts,
        habits: habits.len(),
        habits_completed,
        best_current_streak,
        tasks: TaskStore::new(&paths).summary(day)?,
        templates: TemplateStore::new(&paths).list_templates()?.len(),
        pomodoro_sessions: PomodoroLog::new(&paths).sessions_on(day)?.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_title(&format!("Vault Status - {}", date_heading(&cursor)));
        print_status(&status);
    }
    Ok(())
}

/// Markdown files anywhere under `dir`.
fn count_markdown(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "md").unwrap_or(false))
        .count()
}

fn print_status(status: &VaultStatus) {
    println!("Vault: {} ({})", status.vault_name.cyan(), status.vault_path);
    println!();

    println!("{}", "Files per folder".cyan());
    println!("{}", "-".repeat(30));
    for (folder, count) in &status.folder_counts {
        println!("   {:<12} {:>4}", folder, count);
    }
    println!();

    println!("{}", "This day".cyan());
    println!("{}", "-".repeat(30));
    println!(
        "   Habits     {:>4} / {}",
        status.habits_completed, status.habits
    );
    println!(
        "   Tasks      {:>4} / {}",
        status.tasks.completed, status.tasks.total
    );
    println!("   Sessions   {:>4}", status.pomodoro_sessions);
    if let Some((habit, streak)) = &status.best_current_streak {
        println!();
        println!("Longest running streak: {} ({} days)", habit.green(), streak);
    }
    println!();
    println!("{}", "=".repeat(50));
    if status.templates > 0 {
        println!("*{} habit templates*", status.templates);
    }
}
