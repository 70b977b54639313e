//! Archival and state reset
//!
//! Archiving copies a state file into the archive directory under a
//! timestamped name and leaves the source untouched. A full reset runs a
//! fixed ordered sequence of archive-then-reset steps; the first failing step
//! aborts the remaining ones, already-completed steps are not rolled back.

use crate::config::WorkspacePaths;
use crate::error::EngineResult;
use crate::models::task::ArchiveSnapshot;
use crate::models::time::file_timestamp;
use crate::parser::template::resolve_template;
use crate::storage::Storage;
use std::collections::HashMap;
use std::path::Path;

const PROGRESS_TEMPLATE: &str = include_str!("../../templates/progress.md");

const IMPROVEMENT_RESET: &str = "# Improvement Suggestions\nThis file contains suggestions for improvements that are outside the current task scope.\n";
const DEPENDENCY_RESET: &str = "# New Dependencies\nThis file documents dependencies discovered during implementation.\n";
const TASK_LOG_RESET: &str = "# Task Implementation Log\nThis file contains the complete implementation history of all tasks.\n";
const ACTION_LOG_RESET: &str = "# Action Log\n";

/// Copy a file into the archive directory as `<prefix>-<timestamp>.md`.
/// A missing source is a no-op, not an error.
pub fn archive_file(
    storage: &dyn Storage,
    source: &Path,
    archive_dir: &Path,
    prefix: &str,
) -> EngineResult<Option<ArchiveSnapshot>> {
    if !storage.exists(source) {
        return Ok(None);
    }

    storage.create_dir_all(archive_dir)?;
    let timestamp = file_timestamp();
    let archive = archive_dir.join(format!("{prefix}-{timestamp}.md"));
    storage.copy(source, &archive)?;

    Ok(Some(ArchiveSnapshot {
        source: source.to_path_buf(),
        archive,
        timestamp,
    }))
}

/// Reset every state file to its initial content, archiving the task history
/// first. Steps run in a fixed order and the first failure stops the
/// sequence; its error names the failing path.
pub fn reset_all(paths: &WorkspacePaths, storage: &dyn Storage) -> EngineResult<Vec<String>> {
    let mut steps = Vec::new();

    if let Some(snapshot) = archive_file(
        storage,
        &paths.task_history_file,
        &paths.archive_dir,
        "active-task",
    )? {
        steps.push(format!(
            "archived task history to {}",
            snapshot.archive.display()
        ));
    }

    let progress = match paths.template_override("progress.md") {
        Some(path) => storage.read_to_string(&path)?,
        None => PROGRESS_TEMPLATE.to_string(),
    };
    let progress = resolve_template(&progress, &HashMap::new());
    storage.write(&paths.progress_file, &progress.text)?;
    steps.push("reset progress document from template".to_string());

    storage.write(&paths.improvement_file, IMPROVEMENT_RESET)?;
    steps.push("reset improvement suggestions".to_string());

    storage.write(&paths.dependency_file, DEPENDENCY_RESET)?;
    steps.push("reset dependency log".to_string());

    storage.write(&paths.task_log_file, TASK_LOG_RESET)?;
    steps.push("reset task implementation log".to_string());

    storage.write(&paths.action_log_file, ACTION_LOG_RESET)?;
    steps.push("reset action log".to_string());

    storage.write(&paths.approach_file, "")?;
    steps.push("reset task approach".to_string());

    storage.write(&paths.task_history_file, "")?;
    steps.push("reset task history".to_string());

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::file_timestamp_at;
    use crate::storage::FsStorage;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_archive_missing_source_is_noop() {
        let temp = TempDir::new().unwrap();
        let result = archive_file(
            &FsStorage,
            &temp.path().join("absent.md"),
            &temp.path().join("archive"),
            "active-task",
        )
        .unwrap();
        assert!(result.is_none());
        assert!(!temp.path().join("archive").exists());
    }

    #[test]
    fn test_archive_copies_and_leaves_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("history.md");
        FsStorage.write(&source, "history contents\n").unwrap();

        let snapshot = archive_file(
            &FsStorage,
            &source,
            &temp.path().join("archive"),
            "active-task",
        )
        .unwrap()
        .unwrap();

        assert!(snapshot.archive.exists());
        let name = snapshot.archive.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("active-task-"));
        assert!(name.ends_with(".md"));
        assert_eq!(
            FsStorage.read_to_string(&snapshot.archive).unwrap(),
            "history contents\n"
        );
        // Source remains in place, unmodified
        assert_eq!(
            FsStorage.read_to_string(&source).unwrap(),
            "history contents\n"
        );
    }

    #[test]
    fn test_archive_name_format() {
        // 2025-03-04 14:05 PT
        let instant = Utc.with_ymd_and_hms(2025, 3, 4, 22, 5, 0).unwrap();
        let name = format!("active-task-{}.md", file_timestamp_at(instant));
        assert_eq!(name, "active-task-03-04-25-0205pm.md");
    }

    #[test]
    fn test_reset_all_initializes_every_state_file() {
        let temp = TempDir::new().unwrap();
        let paths = WorkspacePaths::resolve(temp.path()).unwrap();

        let steps = reset_all(&paths, &FsStorage).unwrap();
        assert_eq!(steps.len(), 7); // no history to archive on first run

        let progress = FsStorage.read_to_string(&paths.progress_file).unwrap();
        assert!(progress.starts_with("# Project Progress"));
        assert!(FsStorage
            .read_to_string(&paths.improvement_file)
            .unwrap()
            .starts_with("# Improvement Suggestions"));
        assert!(FsStorage
            .read_to_string(&paths.dependency_file)
            .unwrap()
            .starts_with("# New Dependencies"));
        assert!(FsStorage
            .read_to_string(&paths.task_log_file)
            .unwrap()
            .starts_with("# Task Implementation Log"));
        assert_eq!(
            FsStorage.read_to_string(&paths.action_log_file).unwrap(),
            "# Action Log\n"
        );
        assert_eq!(FsStorage.read_to_string(&paths.approach_file).unwrap(), "");
        assert_eq!(
            FsStorage.read_to_string(&paths.task_history_file).unwrap(),
            ""
        );
    }

    #[test]
    fn test_reset_all_clears_stale_discovery_records() {
        let temp = TempDir::new().unwrap();
        let paths = WorkspacePaths::resolve(temp.path()).unwrap();
        FsStorage
            .write(
                &paths.dependency_file,
                "# New Dependencies\n\n## [old ts] Dependency for T-0.9\nstale entry from last task\n",
            )
            .unwrap();

        reset_all(&paths, &FsStorage).unwrap();

        let dependency = FsStorage.read_to_string(&paths.dependency_file).unwrap();
        assert_eq!(dependency, DEPENDENCY_RESET);
        assert!(!dependency.contains("stale entry from last task"));
    }

    #[test]
    fn test_reset_all_archives_existing_history_first() {
        let temp = TempDir::new().unwrap();
        let paths = WorkspacePaths::resolve(temp.path()).unwrap();
        FsStorage
            .write(&paths.task_history_file, "## T-1.1 done\n")
            .unwrap();

        let steps = reset_all(&paths, &FsStorage).unwrap();
        assert!(steps[0].starts_with("archived task history"));

        // History blanked, archive holds the old content
        assert_eq!(
            FsStorage.read_to_string(&paths.task_history_file).unwrap(),
            ""
        );
        let archived: Vec<_> = std::fs::read_dir(&paths.archive_dir)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(archived.len(), 1);
    }
}
