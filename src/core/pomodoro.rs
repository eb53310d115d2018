//! Focus session logs and the work/break schedule.
//!
//! The countdown itself lives outside the core; this module only knows how a
//! finished session is recorded under `Pomodoro/`.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use super::config::BambooConfig;
use super::error::{validate_name, BambooError, Result};
use super::paths::{VaultPaths, DATE_FORMAT};
use super::task_store::write_replacing;

/// Upper bound on work cycles in one session.
pub const MAX_SESSION_CYCLES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PomodoroSettings {
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
    pub cycles_before_long_break: u32,
}

impl From<&BambooConfig> for PomodoroSettings {
    fn from(config: &BambooConfig) -> Self {
        Self {
            focus_minutes: config.pomodoro_focus,
            break_minutes: config.pomodoro_break,
            long_break_minutes: config.long_break,
            cycles_before_long_break: config.cycles_before_long_break,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Short,
    Long,
}

impl PomodoroSettings {
    /// Break that follows the `completed_cycles`-th work cycle.
    pub fn break_after(&self, completed_cycles: u32) -> BreakKind {
        let every = self.cycles_before_long_break;
        if every > 0 && completed_cycles > 0 && completed_cycles % every == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    pub fn break_minutes(&self, kind: BreakKind) -> u32 {
        match kind {
            BreakKind::Short => self.break_minutes,
            BreakKind::Long => self.long_break_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PomodoroSession {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub work_cycles: u32,
    pub break_cycles: u32,
    pub total_work_secs: u64,
    pub total_break_secs: u64,
    pub longest_work_secs: u64,
}

impl PomodoroSession {
    pub fn start(name: &str, at: NaiveDateTime) -> Self {
        Self {
            name: name.to_string(),
            start: at,
            end: at,
            work_cycles: 0,
            break_cycles: 0,
            total_work_secs: 0,
            total_break_secs: 0,
            longest_work_secs: 0,
        }
    }

    pub fn record_work(&mut self, secs: u64) {
        self.work_cycles += 1;
        self.total_work_secs = self.total_work_secs.saturating_add(secs);
        self.longest_work_secs = self.longest_work_secs.max(secs);
        self.extend_end(secs);
    }

    pub fn record_break(&mut self, secs: u64) {
        self.break_cycles += 1;
        self.total_break_secs = self.total_break_secs.saturating_add(secs);
        self.extend_end(secs);
    }

    /// The end time stays put once it would leave chrono's range.
    fn extend_end(&mut self, secs: u64) {
        let moved = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| self.end.checked_add_signed(d));
        if let Some(end) = moved {
            self.end = end;
        }
    }

    /// A session that ran `cycles` full focus blocks back to back, with the
    /// scheduled break between consecutive blocks. `cycles` is capped at
    /// [`MAX_SESSION_CYCLES`].
    pub fn completed(name: &str, start: NaiveDateTime, settings: &PomodoroSettings, cycles: u32) -> Self {
        let cycles = cycles.min(MAX_SESSION_CYCLES);
        let mut session = Self::start(name, start);
        for cycle in 1..=cycles {
            session.record_work(settings.focus_minutes as u64 * 60);
            if cycle < cycles {
                let kind = settings.break_after(cycle);
                session.record_break(settings.break_minutes(kind) as u64 * 60);
            }
        }
        session
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn total_secs(&self) -> u64 {
        let elapsed = (self.end - self.start).num_seconds();
        if elapsed > 0 {
            elapsed as u64
        } else {
            self.total_work_secs.saturating_add(self.total_break_secs)
        }
    }

    pub fn to_markdown(&self) -> String {
        format!(
            "# Pomodoro Session: {name}\n\n\
             Date: {date}\n\
             Start Time: {start}\n\
             End Time: {end}\n\n\
             ## Session Statistics\n\n\
             - Work cycles completed: {work_cycles}\n\
             - Break cycles taken: {break_cycles}\n\
             - Total work time: {work}\n\
             - Total break time: {brk}\n\
             - Longest work session: {longest}\n\
             - Total session time: {total}\n\n\
             ## Session Notes\n\n\
             Focus Quality: [Rate 1-10]\n\
             Key Accomplishments:\n- \n- \n- \n\n\
             Distractions/Challenges:\n- \n- \n\n\
             Next Session Goals:\n- \n- \n",
            name = self.name,
            date = self.start.format(DATE_FORMAT),
            start = self.start.format("%H:%M:%S"),
            end = self.end.format("%H:%M:%S"),
            work_cycles = self.work_cycles,
            break_cycles = self.break_cycles,
            work = format_duration(self.total_work_secs),
            brk = format_duration(self.total_break_secs),
            longest = format_duration(self.longest_work_secs),
            total = format_duration(self.total_secs()),
        )
    }
}

/// `HH:MM:SS`; hours are not wrapped.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEntry {
    pub name: String,
    pub date: NaiveDate,
    pub path: PathBuf,
}

pub struct PomodoroLog<'a> {
    paths: &'a VaultPaths,
}

impl<'a> PomodoroLog<'a> {
    pub fn new(paths: &'a VaultPaths) -> Self {
        Self { paths }
    }

    pub fn session_file_path(&self, session: &str, date: NaiveDate) -> PathBuf {
        self.paths.pomodoro_log(session, date)
    }

    /// Saves the session log. A second session with the same name on the same
    /// day replaces the first.
    pub fn save(&self, session: &PomodoroSession) -> Result<PathBuf> {
        validate_name("Session", &session.name)?;
        let dir = &self.paths.pomodoro;
        fs::create_dir_all(dir).map_err(|e| BambooError::storage(dir, e))?;

        let path = self.session_file_path(&session.name, session.date());
        write_replacing(&path, &session.to_markdown())?;
        info!(path = %path.display(), cycles = session.work_cycles, "saved pomodoro session");
        Ok(path)
    }

    /// All session logs, oldest first.
    pub fn history(&self) -> Result<Vec<SessionEntry>> {
        let dir = &self.paths.pomodoro;
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BambooError::storage(dir, e)),
        };

        let mut sessions: Vec<SessionEntry> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let parsed = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(parse_session_filename);
                match parsed {
                    Some((name, date)) => Some(SessionEntry { name, date, path }),
                    None => {
                        debug!(path = %path.display(), "ignoring foreign file in Pomodoro");
                        None
                    }
                }
            })
            .collect();
        sessions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Ok(sessions)
    }

    pub fn sessions_on(&self, date: NaiveDate) -> Result<Vec<SessionEntry>> {
        Ok(self
            .history()?
            .into_iter()
            .filter(|s| s.date == date)
            .collect())
    }
}

/// `Pomodoro_<name>_<YYYY-MM-DD>.md` -> (name, date)
fn parse_session_filename(file_name: &str) -> Option<(String, NaiveDate)> {
    let stem = file_name.strip_prefix("Pomodoro_")?.strip_suffix(".md")?;
    let (name, date) = stem.rsplit_once('_')?;
    if name.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    Some((name.to_string(), date))
}
