//! Markdown checkbox lists.
//!
//! Only the subset the app writes itself is understood:
//!
//! ```text
//! # Tasks - 2024-06-01
//!
//! - [ ] Write report
//!     - [x] Collect numbers
//! ```
//!
//! Every four leading spaces are one indent level (partial indentation floors).
//! Headers and anything outside the checkbox lines are regenerated on save, not
//! preserved.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::paths::DATE_FORMAT;

pub const MAX_INDENT: u8 = 3;
pub const SPACES_PER_INDENT: usize = 4;
pub const EMPTY_PLACEHOLDER: &str = "(No tasks for this date)";

lazy_static! {
    // leading spaces, anything up to the first "- [", checkbox content, rest of line
    static ref TASK_LINE_RE: Regex = Regex::new(r"^( *).*?- \[([^\]]*)\](.*)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub text: String,
    pub completed: bool,
    pub indent_level: u8,
}

impl Task {
    /// Text is normalised with [`clean_text`] so the task survives a save.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: clean_text(&text.into()),
            completed: false,
            indent_level: 0,
        }
    }
}

/// Collapses line breaks into single spaces and trims the ends. A task is one
/// line in the day file, and `parse_line` trims, so this is the only text form
/// that reads back unchanged.
pub fn clean_text(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_line(line: &str) -> Option<Task> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let caps = TASK_LINE_RE.captures(line)?;
    let leading = caps[1].len();
    let indent = (leading / SPACES_PER_INDENT).min(u8::MAX as usize) as u8;
    let mark = &caps[2];

    Some(Task {
        text: caps[3].trim().to_string(),
        completed: mark == "x" || mark == "X",
        indent_level: indent,
    })
}

pub fn parse(content: &str) -> Vec<Task> {
    content.lines().filter_map(parse_line).collect()
}

/// Renders a full day file. Callers keep indent levels within `0..=MAX_INDENT`.
pub fn format(tasks: &[Task], date: NaiveDate) -> String {
    let mut out = format!("# Tasks - {}\n\n", date.format(DATE_FORMAT));
    if tasks.is_empty() {
        out.push_str(EMPTY_PLACEHOLDER);
        out.push('\n');
        return out;
    }
    for task in tasks {
        out.push_str(&" ".repeat(task.indent_level as usize * SPACES_PER_INDENT));
        out.push_str(if task.completed { "- [x] " } else { "- [ ] " });
        out.push_str(&task.text);
        out.push('\n');
    }
    out
}

/// A day's tasks, addressed by position.
///
/// Out-of-range indices are ignored; each mutation reports whether it applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn parse(content: &str) -> Self {
        Self::new(parse(content))
    }

    pub fn to_markdown(&self, date: NaiveDate) -> String {
        format(&self.tasks, date)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn toggle_completed(&mut self, index: usize) -> bool {
        match self.tasks.get_mut(index) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    pub fn indent(&mut self, index: usize) -> bool {
        match self.tasks.get_mut(index) {
            Some(task) => {
                task.indent_level = task.indent_level.saturating_add(1).min(MAX_INDENT);
                true
            }
            None => false,
        }
    }

    pub fn unindent(&mut self, index: usize) -> bool {
        match self.tasks.get_mut(index) {
            Some(task) => {
                task.indent_level = task.indent_level.saturating_sub(1).min(MAX_INDENT);
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, index: usize) -> Option<Task> {
        if index < self.tasks.len() {
            Some(self.tasks.remove(index))
        } else {
            None
        }
    }

    /// Keeps a selection cursor on a valid row: `min(selection, max(0, len - 1))`.
    pub fn clamp_selection(&self, selection: usize) -> usize {
        selection.min(self.tasks.len().saturating_sub(1))
    }

    pub fn append(&mut self, text: impl Into<String>) {
        self.tasks.push(Task::new(text));
    }

    /// Blank input counts as cancel and keeps the old text.
    pub fn edit_text(&mut self, index: usize, new_text: &str) -> bool {
        let new_text = clean_text(new_text);
        if new_text.is_empty() {
            return false;
        }
        match self.tasks.get_mut(index) {
            Some(task) => {
                task.text = new_text;
                true
            }
            None => false,
        }
    }
}
