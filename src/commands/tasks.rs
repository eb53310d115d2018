use std::path::PathBuf;

use anyhow::{bail, Result};
use bamboo::core::task::TaskList;
use bamboo::core::task_store::TaskStore;
use colored::*;
use serde::Serialize;

use super::{date_heading, open_vault, print_title, DateArgs};

#[derive(Serialize)]
struct TaskDay<'a> {
    date: String,
    file: String,
    total: usize,
    completed: usize,
    tasks: &'a TaskList,
}

pub fn show(vault: Option<PathBuf>, date: &DateArgs, json: bool) -> Result<()> {
    let paths = open_vault(vault)?;
    let store = TaskStore::new(&paths);
    let cursor = date.cursor()?;
    let day = cursor.current_date();
    let tasks = store.load(day)?;

    if json {
        let report = TaskDay {
            date: day.to_string(),
            file: store.file_path(day).display().to_string(),
            total: tasks.len(),
            completed: tasks.completed_count(),
            tasks: &tasks,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_title(&format!("Tasks - {}", date_heading(&cursor)));
    print_tasks(&tasks);
    Ok(())
}

fn print_tasks(tasks: &TaskList) {
    if tasks.is_empty() {
        println!("{}", "No tasks for this date.".dimmed());
        return;
    }
    for (i, task) in tasks.tasks().iter().enumerate() {
        let status = if task.completed {
            "✓".green()
        } else {
            "○".normal()
        };
        let indent = "  ".repeat(task.indent_level as usize);
        let text = if task.completed {
            task.text.dimmed()
        } else {
            task.text.normal()
        };
        println!("{:>3}. {}{} {}", i + 1, indent, status, text);
    }
    println!();
    println!(
        "{}",
        format!("{}/{} done", tasks.completed_count(), tasks.len()).dimmed()
    );
}

pub fn add(vault: Option<PathBuf>, date: &DateArgs, text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Task text cannot be empty");
    }
    edit_day(vault, date, |tasks| {
        tasks.append(text);
        Ok(format!("Added task #{}", tasks.len()))
    })
}

pub fn toggle(vault: Option<PathBuf>, date: &DateArgs, number: usize) -> Result<()> {
    edit_day(vault, date, |tasks| {
        let index = to_index(tasks, number)?;
        tasks.toggle_completed(index);
        let state = match tasks.get(index) {
            Some(task) if task.completed => "done",
            _ => "open",
        };
        Ok(format!("Task #{} marked {}", number, state))
    })
}

pub fn indent(vault: Option<PathBuf>, date: &DateArgs, number: usize) -> Result<()> {
    edit_day(vault, date, |tasks| {
        let index = to_index(tasks, number)?;
        tasks.indent(index);
        Ok(format!(
            "Task #{} at level {}",
            number,
            tasks.get(index).map(|t| t.indent_level).unwrap_or_default()
        ))
    })
}

pub fn unindent(vault: Option<PathBuf>, date: &DateArgs, number: usize) -> Result<()> {
    edit_day(vault, date, |tasks| {
        let index = to_index(tasks, number)?;
        tasks.unindent(index);
        Ok(format!(
            "Task #{} at level {}",
            number,
            tasks.get(index).map(|t| t.indent_level).unwrap_or_default()
        ))
    })
}

pub fn delete(vault: Option<PathBuf>, date: &DateArgs, number: usize) -> Result<()> {
    edit_day(vault, date, |tasks| {
        let index = to_index(tasks, number)?;
        match tasks.delete(index) {
            Some(removed) => Ok(format!("Deleted: {}", removed.text)),
            None => bail!("No task #{}", number),
        }
    })
}

pub fn edit(vault: Option<PathBuf>, date: &DateArgs, number: usize, text: &str) -> Result<()> {
    edit_day(vault, date, |tasks| {
        let index = to_index(tasks, number)?;
        if tasks.edit_text(index, text) {
            Ok(format!("Task #{} updated", number))
        } else {
            bail!("Empty text; task #{} left unchanged", number)
        }
    })
}

/// Load the day, apply one change, save the whole list back.
fn edit_day<F>(vault: Option<PathBuf>, date: &DateArgs, change: F) -> Result<()>
where
    F: FnOnce(&mut TaskList) -> Result<String>,
{
    let paths = open_vault(vault)?;
    let store = TaskStore::new(&paths);
    let cursor = date.cursor()?;
    let day = cursor.current_date();

    let mut tasks = store.load(day)?;
    let message = change(&mut tasks)?;
    store.save(day, &tasks)?;

    super::ok(&message);
    println!();
    print_title(&format!("Tasks - {}", date_heading(&cursor)));
    print_tasks(&tasks);
    Ok(())
}

/// Task numbers shown to the user start at 1.
fn to_index(tasks: &TaskList, number: usize) -> Result<usize> {
    if number == 0 || number > tasks.len() {
        bail!("No task #{} (this day has {} tasks)", number, tasks.len());
    }
    Ok(number - 1)
}
