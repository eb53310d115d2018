//! Habit folders, daily log files and streaks.
//!
//! A habit is completed on a date iff `Habits/<name>/<name>-<date>.md` exists.
//! Log contents are never parsed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{validate_name, BambooError, Result};
use super::paths::{VaultPaths, DATE_FORMAT};
use super::template::HabitTemplate;

/// Backward scan limit for the current streak.
pub const MAX_STREAK_SCAN_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutcome {
    Created,
    AlreadyLogged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    pub habit: String,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_entries: usize,
    pub last_logged: Option<NaiveDate>,
}

pub struct HabitStore<'a> {
    paths: &'a VaultPaths,
}

impl<'a> HabitStore<'a> {
    pub fn new(paths: &'a VaultPaths) -> Self {
        Self { paths }
    }

    /// Habit folders under `Habits/`, sorted. Hidden entries are skipped.
    pub fn list_habits(&self) -> Result<Vec<String>> {
        let dir = &self.paths.habits;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| BambooError::storage(dir, e))?;
            return Ok(Vec::new());
        }

        let mut habits = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| BambooError::storage(dir, e))? {
            let entry = entry.map_err(|e| BambooError::storage(dir, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) if !name.starts_with('.') => habits.push(name.to_string()),
                Some(_) => {}
                None => debug!(path = %entry.path().display(), "skipping non-UTF-8 habit folder"),
            }
        }
        habits.sort();
        Ok(habits)
    }

    /// False for names that could not have been created.
    pub fn exists(&self, habit: &str) -> bool {
        validate_name("Habit", habit).is_ok() && self.paths.habit_dir(habit).is_dir()
    }

    pub fn create_habit(&self, habit: &str) -> Result<()> {
        validate_name("Habit", habit)?;
        if self.exists(habit) {
            return Err(BambooError::validation(format!(
                "Habit '{}' already exists",
                habit
            )));
        }
        let dir = self.paths.habit_dir(habit);
        fs::create_dir_all(&dir).map_err(|e| BambooError::storage(&dir, e))?;
        info!(habit, "created habit");
        Ok(())
    }

    pub fn log_file_path(&self, habit: &str, date: NaiveDate) -> PathBuf {
        self.paths.habit_log(habit, date)
    }

    pub fn is_completed(&self, habit: &str, date: NaiveDate) -> bool {
        self.log_file_path(habit, date).exists()
    }

    /// Writes the short completion note unless the date is already logged.
    pub fn quick_complete(&self, habit: &str, date: NaiveDate, now: NaiveDateTime) -> Result<LogOutcome> {
        let content = format!(
            "{}\n## Completion\n- Completed: Yes\n\n## Notes\n- Quick completion logged\n",
            log_header(habit, date, now)
        );
        self.write_new_log(habit, date, &content)
    }

    /// Writes the full log form, one section per template field when a
    /// template is given.
    pub fn log_detailed(
        &self,
        habit: &str,
        date: NaiveDate,
        now: NaiveDateTime,
        template: Option<&HabitTemplate>,
    ) -> Result<LogOutcome> {
        let body = match template {
            Some(template) => format!(
                "## Completion\n- Completed: Yes\n\n{}",
                template.render_log_sections()
            ),
            None => "## Completion\n- Completed: Yes\n\n\
                     ## Duration\n- Time spent: [Enter duration]\n\n\
                     ## Quality/Rating\n- Rating (1-10): [Enter rating]\n\n\
                     ## Notes\n- [Add any notes about today's session]\n\n\
                     ## Reflection\n- How did it feel?\n- What went well?\n- What could be improved?\n"
                .to_string(),
        };
        let content = format!("{}\n{}", log_header(habit, date, now), body);
        self.write_new_log(habit, date, &content)
    }

    /// Never replaces an existing log. On failure nothing created by this call
    /// is left behind.
    fn write_new_log(&self, habit: &str, date: NaiveDate, content: &str) -> Result<LogOutcome> {
        validate_name("Habit", habit)?;
        let path = self.log_file_path(habit, date);
        let outcome = create_log_file(&self.paths.habit_dir(habit), &path, |file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        })?;
        if outcome == LogOutcome::Created {
            info!(habit, date = %date, "logged habit");
        }
        Ok(outcome)
    }

    /// Consecutive logged days ending at `as_of`, capped at
    /// [`MAX_STREAK_SCAN_DAYS`].
    pub fn current_streak(&self, habit: &str, as_of: NaiveDate) -> u32 {
        if !self.exists(habit) {
            return 0;
        }
        let mut streak = 0;
        for offset in 0..MAX_STREAK_SCAN_DAYS {
            let Some(day) = as_of.checked_sub_days(Days::new(offset as u64)) else {
                break;
            };
            if !self.is_completed(habit, day) {
                break;
            }
            streak += 1;
        }
        streak
    }

    /// Dates of every well-formed log file, ascending and unique.
    pub fn logged_dates(&self, habit: &str) -> Result<Vec<NaiveDate>> {
        let dir = self.paths.habit_dir(habit);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/{}-*.md",
            glob::Pattern::escape(&dir.to_string_lossy()),
            glob::Pattern::escape(habit)
        );
        let entries = glob::glob(&pattern).map_err(|e| {
            BambooError::validation(format!("Cannot scan habit '{}': {}", habit, e))
        })?;

        let mut dates: Vec<NaiveDate> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("unreadable habit log: {}", e);
                    None
                }
            })
            .filter_map(|path| {
                let date = log_date(habit, &path);
                if date.is_none() {
                    debug!(path = %path.display(), "ignoring foreign file in habit folder");
                }
                date
            })
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    /// Longest run of consecutive logged days ever.
    pub fn best_streak(&self, habit: &str) -> Result<u32> {
        Ok(longest_run(&self.logged_dates(habit)?))
    }

    pub fn stats(&self, habit: &str, as_of: NaiveDate) -> Result<HabitStats> {
        let dates = self.logged_dates(habit)?;
        Ok(HabitStats {
            habit: habit.to_string(),
            current_streak: self.current_streak(habit, as_of),
            best_streak: longest_run(&dates),
            total_entries: dates.len(),
            last_logged: dates.last().copied(),
        })
    }
}

fn log_header(habit: &str, date: NaiveDate, now: NaiveDateTime) -> String {
    format!(
        "# Habit: {}\nDate: {}\nTime: {}\n",
        habit,
        date.format(DATE_FORMAT),
        now.format("%H:%M")
    )
}

/// Creates `path` inside `dir` with create-new semantics and fills it with
/// `fill`. If anything fails, the file and a `dir` created here are removed.
fn create_log_file<F>(dir: &Path, path: &Path, fill: F) -> Result<LogOutcome>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    if path.exists() {
        return Ok(LogOutcome::AlreadyLogged);
    }

    let created_dir = !dir.exists();
    if let Err(e) = fs::create_dir_all(dir) {
        return Err(BambooError::storage(dir, e));
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(LogOutcome::AlreadyLogged),
        Err(e) => {
            rollback(None, created_dir.then_some(dir));
            return Err(BambooError::storage(path, e));
        }
    };
    if let Err(e) = fill(&mut file) {
        drop(file);
        rollback(Some(path), created_dir.then_some(dir));
        return Err(BambooError::storage(path, e));
    }
    Ok(LogOutcome::Created)
}

fn rollback(file: Option<&Path>, dir: Option<&Path>) {
    if let Some(file) = file {
        if let Err(e) = fs::remove_file(file) {
            warn!(path = %file.display(), "could not remove partial log: {}", e);
        }
    }
    if let Some(dir) = dir {
        if let Err(e) = fs::remove_dir(dir) {
            warn!(path = %dir.display(), "could not remove habit folder: {}", e);
        }
    }
}

/// `<habit>-<YYYY-MM-DD>.md` -> date. Anything else is foreign.
fn log_date(habit: &str, path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let date = name
        .strip_suffix(".md")?
        .strip_prefix(habit)?
        .strip_prefix('-')?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Longest run of consecutive days in a sorted, deduplicated slice.
pub fn longest_run(dates: &[NaiveDate]) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &date in dates {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(date);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(day: NaiveDate) -> NaiveDateTime {
        day.and_hms_opt(12, 30, 0).unwrap()
    }

    fn vault() -> (tempfile::TempDir, VaultPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::open(dir.path().to_path_buf()).unwrap();
        (dir, paths)
    }

    fn touch(store: &HabitStore, habit: &str, day: NaiveDate) {
        let path = store.log_file_path(habit, day);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "done").unwrap();
    }

    #[test]
    fn test_meditate_scenario() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        for d in [1, 2, 3, 4, 5, 7] {
            touch(&store, "Meditate", date(2024, 1, d));
        }

        assert_eq!(store.current_streak("Meditate", date(2024, 1, 7)), 1);
        assert_eq!(store.current_streak("Meditate", date(2024, 1, 5)), 5);
        assert_eq!(store.current_streak("Meditate", date(2024, 1, 6)), 0);
        assert_eq!(store.best_streak("Meditate").unwrap(), 5);
    }

    #[test]
    fn test_no_logs() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);

        assert_eq!(store.current_streak("Ghost", date(2024, 1, 1)), 0);
        assert_eq!(store.best_streak("Ghost").unwrap(), 0);

        store.create_habit("Empty").unwrap();
        assert_eq!(store.current_streak("Empty", date(2024, 1, 1)), 0);
        assert_eq!(store.best_streak("Empty").unwrap(), 0);
        let stats = store.stats("Empty", date(2024, 1, 1)).unwrap();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.last_logged, None);
    }

    #[test]
    fn test_current_streak_counts_recent_run() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        let as_of = date(2024, 3, 1);
        for offset in 0..4u64 {
            touch(&store, "Run", as_of - Days::new(offset));
        }
        // crosses the leap day
        assert_eq!(store.current_streak("Run", as_of), 4);
    }

    #[test]
    fn test_current_streak_capped_at_a_year() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        let as_of = date(2024, 12, 31);
        for offset in 0..400u64 {
            touch(&store, "Daily", as_of - Days::new(offset));
        }
        assert_eq!(store.current_streak("Daily", as_of), MAX_STREAK_SCAN_DAYS);
        assert_eq!(store.best_streak("Daily").unwrap(), 400);
    }

    #[test]
    fn test_best_streak_ignores_foreign_files() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        for d in [10, 11, 12] {
            touch(&store, "Read", date(2024, 2, d));
        }
        let dir = paths.habit_dir("Read");
        fs::write(dir.join("Read-notes.md"), "x").unwrap();
        fs::write(dir.join("Read-2024-02-13.txt"), "x").unwrap();
        fs::write(dir.join("Read-extra-2024-02-13.md"), "x").unwrap();
        fs::write(dir.join("Read-2024-02-30.md"), "x").unwrap();
        fs::write(dir.join("Other-2024-02-13.md"), "x").unwrap();
        fs::write(dir.join("README.md"), "x").unwrap();

        assert_eq!(store.best_streak("Read").unwrap(), 3);
        assert_eq!(store.logged_dates("Read").unwrap().len(), 3);
    }

    #[test]
    fn test_best_streak_independent_of_creation_order() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        for d in [20, 3, 5, 21, 4, 22, 23, 1] {
            touch(&store, "Walk", date(2024, 5, d));
        }
        assert_eq!(store.best_streak("Walk").unwrap(), 4);
    }

    #[test]
    fn test_habit_name_with_glob_characters() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        touch(&store, "Read [fiction]", date(2024, 1, 1));
        touch(&store, "Read [fiction]", date(2024, 1, 2));
        assert_eq!(store.best_streak("Read [fiction]").unwrap(), 2);
    }

    #[test]
    fn test_quick_complete_never_overwrites() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        let day = date(2024, 1, 7);

        let first = store.quick_complete("Meditate", day, noon(day)).unwrap();
        assert_eq!(first, LogOutcome::Created);
        let path = store.log_file_path("Meditate", day);
        let original = fs::read_to_string(&path).unwrap();
        assert!(original.starts_with("# Habit: Meditate\nDate: 2024-01-07\nTime: 12:30\n"));
        assert!(original.contains("- Quick completion logged"));

        let later = day.and_hms_opt(20, 0, 0).unwrap();
        let second = store.quick_complete("Meditate", day, later).unwrap();
        assert_eq!(second, LogOutcome::AlreadyLogged);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        let detailed = store.log_detailed("Meditate", day, later, None).unwrap();
        assert_eq!(detailed, LogOutcome::AlreadyLogged);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        assert!(store.is_completed("Meditate", day));
    }

    #[test]
    fn test_failed_write_removes_file_and_new_folder() {
        let (_dir, paths) = vault();
        let habit_dir = paths.habit_dir("Swim");
        let path = paths.habit_log("Swim", date(2024, 1, 1));

        let result = create_log_file(&habit_dir, &path, |file| {
            file.write_all(b"# Habit: Swim\n")?;
            Err(io::Error::new(ErrorKind::Other, "disk full"))
        });
        assert!(matches!(result, Err(BambooError::Storage { .. })));
        assert!(!path.exists());
        assert!(!habit_dir.exists());
    }

    #[test]
    fn test_failed_write_keeps_existing_folder() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        store.create_habit("Swim").unwrap();
        touch(&store, "Swim", date(2024, 1, 1));
        let path = paths.habit_log("Swim", date(2024, 1, 2));

        let result = create_log_file(&paths.habit_dir("Swim"), &path, |_| {
            Err(io::Error::new(ErrorKind::Other, "disk full"))
        });
        assert!(result.is_err());
        assert!(!path.exists());
        assert!(store.exists("Swim"));
        assert!(store.is_completed("Swim", date(2024, 1, 1)));
    }

    #[test]
    fn test_rollback_removes_partial_log_and_folder() {
        let (_dir, paths) = vault();
        let habit_dir = paths.habit_dir("Partial");
        let path = paths.habit_log("Partial", date(2024, 1, 1));
        fs::create_dir_all(&habit_dir).unwrap();
        fs::write(&path, "# Habit: Par").unwrap();

        rollback(Some(&path), Some(&habit_dir));
        assert!(!path.exists());
        assert!(!habit_dir.exists());
    }

    #[test]
    fn test_exists_rejects_names_outside_habits() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        assert!(paths.root.join("Tasks").is_dir());
        assert!(!store.exists("../Tasks"));
        assert_eq!(store.current_streak("../Tasks", date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_log_detailed_with_template() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        let day = date(2024, 4, 2);
        let template = HabitTemplate::default_for("Reading");

        store
            .log_detailed("Reading", day, noon(day), Some(&template))
            .unwrap();
        let content = fs::read_to_string(store.log_file_path("Reading", day)).unwrap();
        assert!(content.contains("## Duration (required)"));
        assert!(content.contains("- Completed: Yes"));

        let other = date(2024, 4, 3);
        store.log_detailed("Reading", other, noon(other), None).unwrap();
        let content = fs::read_to_string(store.log_file_path("Reading", other)).unwrap();
        assert!(content.contains("## Reflection"));
    }

    #[test]
    fn test_list_habits() {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::from_root(dir.path().to_path_buf());
        let store = HabitStore::new(&paths);

        assert!(store.list_habits().unwrap().is_empty());
        assert!(paths.habits.is_dir());

        store.create_habit("Yoga").unwrap();
        store.create_habit("Journal").unwrap();
        fs::create_dir(paths.habits.join(".trash")).unwrap();
        fs::write(paths.habits.join("stray.md"), "x").unwrap();

        assert_eq!(store.list_habits().unwrap(), vec!["Journal", "Yoga"]);
    }

    #[test]
    fn test_create_habit_validation() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);

        store.create_habit("Yoga").unwrap();
        assert!(matches!(
            store.create_habit("Yoga"),
            Err(BambooError::Validation(_))
        ));
        assert!(store.create_habit("").is_err());
        assert!(store.create_habit("a/b").is_err());
        assert!(!paths.habits.join("a").exists());
        assert!(store
            .quick_complete("x/y", date(2024, 1, 1), noon(date(2024, 1, 1)))
            .is_err());
    }

    #[test]
    fn test_quick_complete_creates_habit_folder() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        let day = date(2024, 8, 8);

        store.quick_complete("Stretch", day, noon(day)).unwrap();
        assert_eq!(store.list_habits().unwrap(), vec!["Stretch"]);
    }

    #[test]
    fn test_stats() {
        let (_dir, paths) = vault();
        let store = HabitStore::new(&paths);
        for d in [1, 2, 5, 6, 7] {
            touch(&store, "Floss", date(2024, 9, d));
        }
        let stats = store.stats("Floss", date(2024, 9, 7)).unwrap();
        assert_eq!(
            stats,
            HabitStats {
                habit: "Floss".to_string(),
                current_streak: 3,
                best_streak: 3,
                total_entries: 5,
                last_logged: Some(date(2024, 9, 7)),
            }
        );
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run(&[]), 0);
        assert_eq!(longest_run(&[date(2024, 1, 1)]), 1);
        assert_eq!(
            longest_run(&[date(2023, 12, 31), date(2024, 1, 1), date(2024, 1, 3)]),
            2
        );
    }
}
