use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::error::{BambooError, Result};
use super::paths::VaultPaths;
use super::task::TaskList;

/// Per-date task files under `Tasks/`.
pub struct TaskStore<'a> {
    paths: &'a VaultPaths,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
}

impl<'a> TaskStore<'a> {
    pub fn new(paths: &'a VaultPaths) -> Self {
        Self { paths }
    }

    pub fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.paths.task_file(date)
    }

    /// A missing file is an empty list.
    pub fn load(&self, date: NaiveDate) -> Result<TaskList> {
        let path = self.file_path(date);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(TaskList::parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no task file");
                Ok(TaskList::default())
            }
            Err(e) => Err(BambooError::storage(path, e)),
        }
    }

    /// Replaces the whole day file.
    pub fn save(&self, date: NaiveDate, tasks: &TaskList) -> Result<()> {
        let path = self.file_path(date);
        fs::create_dir_all(&self.paths.tasks).map_err(|e| BambooError::storage(&self.paths.tasks, e))?;
        write_replacing(&path, &tasks.to_markdown(date))?;
        info!(path = %path.display(), tasks = tasks.len(), "saved tasks");
        Ok(())
    }

    pub fn summary(&self, date: NaiveDate) -> Result<TaskSummary> {
        let tasks = self.load(date)?;
        Ok(TaskSummary {
            total: tasks.len(),
            completed: tasks.completed_count(),
        })
    }
}

/// Writes through a sibling temp file and renames it over `path`, so a failed
/// write leaves the previous content in place.
pub(crate) fn write_replacing(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    if let Err(e) = fs::write(&tmp, content) {
        let _ = fs::remove_file(&tmp);
        return Err(BambooError::storage(path, e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(BambooError::storage(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::{Task, EMPTY_PLACEHOLDER};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::from_root(dir.path().to_path_buf());
        let store = TaskStore::new(&paths);

        let tasks = store.load(date(2024, 6, 1)).unwrap();
        assert!(tasks.is_empty());
        assert!(!store.file_path(date(2024, 6, 1)).exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::from_root(dir.path().to_path_buf());
        let store = TaskStore::new(&paths);
        let day = date(2024, 6, 1);

        let mut tasks = TaskList::default();
        tasks.append("Write report");
        tasks.append("Collect numbers");
        tasks.indent(1);
        tasks.toggle_completed(1);
        store.save(day, &tasks).unwrap();

        let path = dir.path().join("Tasks/Task_2024-06-01.md");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Tasks - 2024-06-01\n"));
        assert!(content.contains("    - [x] Collect numbers"));

        assert_eq!(store.load(day).unwrap(), tasks);
        assert_eq!(
            store.summary(day).unwrap(),
            TaskSummary {
                total: 2,
                completed: 1
            }
        );
    }

    #[test]
    fn test_save_overwrites_and_empty_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::from_root(dir.path().to_path_buf());
        let store = TaskStore::new(&paths);
        let day = date(2024, 6, 2);

        store
            .save(day, &TaskList::new(vec![Task::new("temporary")]))
            .unwrap();
        store.save(day, &TaskList::default()).unwrap();

        let content = fs::read_to_string(store.file_path(day)).unwrap();
        assert!(content.contains(EMPTY_PLACEHOLDER));
        assert!(!content.contains("temporary"));
        assert!(store.load(day).unwrap().is_empty());

        let leftovers: Vec<_> = fs::read_dir(&paths.tasks)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_load_reads_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::open(dir.path().to_path_buf()).unwrap();
        let store = TaskStore::new(&paths);
        let day = date(2024, 6, 3);

        fs::write(
            store.file_path(day),
            "# My own header\n\nSome intro text\n- [X] Done thing\n  - [ ] shallow\n        - [ ] deep\n",
        )
        .unwrap();

        let tasks = store.load(day).unwrap();
        assert_eq!(tasks.len(), 3);
        assert!(tasks.get(0).unwrap().completed);
        assert_eq!(tasks.get(1).unwrap().indent_level, 0);
        assert_eq!(tasks.get(2).unwrap().indent_level, 2);
    }

    #[test]
    fn test_read_error_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::open(dir.path().to_path_buf()).unwrap();
        let store = TaskStore::new(&paths);
        let day = date(2024, 6, 4);

        // a directory where the file should be cannot be read as text
        fs::create_dir(store.file_path(day)).unwrap();
        assert!(matches!(
            store.load(day),
            Err(BambooError::Storage { .. })
        ));
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Task_2024-06-05.md");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.md"), "x").unwrap();

        let err = write_replacing(&target, "- [ ] new\n").unwrap_err();
        assert!(matches!(err, BambooError::Storage { .. }));
        assert!(target.join("keep.md").is_file());
        assert!(!dir.path().join(".Task_2024-06-05.md.tmp").exists());
    }

    #[test]
    fn test_failed_temp_write_keeps_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Task_2024-06-06.md");
        fs::write(&target, "old").unwrap();
        // the temp file name is taken by a directory, so the first write fails
        fs::create_dir(dir.path().join(".Task_2024-06-06.md.tmp")).unwrap();

        assert!(write_replacing(&target, "new").is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
    }
}
