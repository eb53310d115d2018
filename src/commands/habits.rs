use std::path::PathBuf;

use anyhow::{bail, Result};
use bamboo::core::clock::{Clock, SystemClock};
use bamboo::core::habit::{HabitStats, HabitStore, LogOutcome};
use bamboo::core::template::TemplateStore;
use colored::*;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::{date_heading, open_vault, print_title, DateArgs};

const NAME_COLUMN: usize = 20;

#[derive(Serialize)]
struct HabitDay {
    date: String,
    habits: Vec<HabitStatus>,
}

#[derive(Serialize)]
struct HabitStatus {
    name: String,
    completed: bool,
    current_streak: u32,
}

pub fn list(vault: Option<PathBuf>, date: &DateArgs, json: bool) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = HabitStore::new(&paths);
    let cursor = date.cursor()?;
    let day = cursor.current_date();

    let habits = store
        .list_habits()?
        .into_iter()
        .map(|name| HabitStatus {
            completed: store.is_completed(&name, day),
            current_streak: store.current_streak(&name, day),
            name,
        })
        .collect::<Vec<_>>();

    let report = HabitDay {
        date: day.to_string(),
        habits,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_title(&format!("Habits - {}", date_heading(&cursor)));
    if report.habits.is_empty() {
        println!("{}", "No habits yet. Create one with `bamboo habits create <name>`.".yellow());
        return Ok(());
    }
    for habit in &report.habits {
        let mark = if habit.completed {
            "✓".green()
        } else {
            "○".dimmed()
        };
        println!(
            "  {} {} {}",
            mark,
            pad(&habit.name, NAME_COLUMN),
            format!("streak {}", habit.current_streak).dimmed()
        );
    }
    Ok(())
}

pub fn create(vault: Option<PathBuf>, name: &str) -> Result<()> {
    let paths = open_vault(vault)?;
    HabitStore::new(&paths).create_habit(name)?;
    super::ok(&format!("Created habit: {}", name));
    Ok(())
}

pub fn done(vault: Option<PathBuf>, name: &str, date: &DateArgs) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = HabitStore::new(&paths);
    if !store.exists(name) {
        bail!("Habit '{}' does not exist", name);
    }
    let cursor = date.cursor()?;

    match store.quick_complete(name, cursor.current_date(), SystemClock.now())? {
        LogOutcome::Created => super::ok(&format!(
            "{} marked complete for {}",
            name,
            date_heading(&cursor)
        )),
        LogOutcome::AlreadyLogged => println!(
            "{}",
            format!("{} is already logged for {}", name, date_heading(&cursor)).yellow()
        ),
    }
    Ok(())
}

pub fn log(vault: Option<PathBuf>, name: &str, template: Option<&str>, date: &DateArgs) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = HabitStore::new(&paths);
    if !store.exists(name) {
        bail!("Habit '{}' does not exist", name);
    }
    let cursor = date.cursor()?;

    // an explicit template must exist; otherwise use the habit's own if present
    let templates = TemplateStore::new(&paths);
    let template = match template {
        Some(t) => match templates.load(t)? {
            Some(found) => Some(found),
            None => bail!("Template '{}' does not exist", t),
        },
        None => templates.load(name)?,
    };

    let day = cursor.current_date();
    match store.log_detailed(name, day, SystemClock.now(), template.as_ref())? {
        LogOutcome::Created => {
            super::ok(&format!("{} logged for {}", name, date_heading(&cursor)));
            println!("  {}", store.log_file_path(name, day).display());
        }
        LogOutcome::AlreadyLogged => println!(
            "{}",
            format!(
                "{} is already logged for {}; edit {}",
                name,
                date_heading(&cursor),
                store.log_file_path(name, day).display()
            )
            .yellow()
        ),
    }
    Ok(())
}

pub fn stats(vault: Option<PathBuf>, habit: Option<&str>, date: &DateArgs, json: bool) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = HabitStore::new(&paths);
    let as_of = date.cursor()?.current_date();

    let names = match habit {
        Some(name) if !store.exists(name) => bail!("Habit '{}' does not exist", name),
        Some(name) => vec![name.to_string()],
        None => store.list_habits()?,
    };
    let stats = names
        .iter()
        .map(|name| store.stats(name, as_of))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn print_stats(stats: &[HabitStats]) {
    print_title("Habit Statistics");
    if stats.is_empty() {
        println!("{}", "No habits to show statistics for".yellow());
        return;
    }
    println!(
        "  {} {:>7} {:>5} {:>7}  {}",
        pad("Habit", NAME_COLUMN).cyan(),
        "Current".cyan(),
        "Best".cyan(),
        "Entries".cyan(),
        "Last logged".cyan()
    );
    println!("  {}", "-".repeat(58));
    for s in stats {
        let last = s
            .last_logged
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {:>7} {:>5} {:>7}  {}",
            pad(&s.habit, NAME_COLUMN),
            s.current_streak,
            s.best_streak,
            s.total_entries,
            last
        );
    }
}

/// Truncates with "..." and pads to `width` display columns.
fn pad(text: &str, width: usize) -> String {
    let mut out = String::new();
    if text.width() > width {
        for ch in text.chars() {
            if (out.as_str().width() + ch.to_string().width()) > width - 3 {
                break;
            }
            out.push(ch);
        }
        out.push_str("...");
    } else {
        out.push_str(text);
    }
    let fill = width.saturating_sub(out.as_str().width());
    out.push_str(&" ".repeat(fill));
    out
}
