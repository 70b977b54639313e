//! Task initiation
//!
//! Starting a task extracts its records from the breakdown document,
//! archives any active task already in flight, and renders a fresh
//! active-task document from the template.

use crate::config::WorkspacePaths;
use crate::error::{EngineError, EngineResult};
use crate::models::task::Task;
use crate::models::time::entry_timestamp;
use crate::parser::breakdown::extract_task_breakdown;
use crate::parser::section::locate_section;
use crate::parser::template::resolve_template;
use crate::storage::Storage;
use std::collections::HashMap;

const ACTIVE_TASK_TEMPLATE: &str = include_str!("../../templates/active-task.md");
const PROGRESS_TEMPLATE: &str = include_str!("../../templates/progress.md");

/// Starting confidence written into a fresh active-task document.
const INITIAL_CONFIDENCE: &str = "5";

/// Result of starting a task.
#[derive(Debug)]
pub struct StartOutcome {
    pub task_id: String,
    pub title: String,
    pub warnings: Vec<String>,
}

/// Initiate a task: archive the previous active-task document, render a new
/// one from the breakdown records, and point the progress focus at it.
pub fn start_task(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    task_id: &str,
) -> EngineResult<StartOutcome> {
    if !storage.exists(&paths.task_breakdown_file) {
        return Err(EngineError::NotFound(format!(
            "task breakdown not found at: {}",
            paths.task_breakdown_file.display()
        )));
    }
    let breakdown = storage.read_to_string(&paths.task_breakdown_file)?;
    let task = extract_task_breakdown(&breakdown, task_id)?;

    let mut warnings = Vec::new();
    if let Some(snapshot) = super::archive_file(
        storage,
        &paths.active_task_file,
        &paths.archive_dir,
        "active-task",
    )? {
        warnings.push(format!(
            "previous active task archived to {}",
            snapshot.archive.display()
        ));
    }

    let template = match paths.template_override("active-task.md") {
        Some(path) => storage.read_to_string(&path)?,
        None => ACTIVE_TASK_TEMPLATE.to_string(),
    };
    let rendered = resolve_template(&template, &token_values(&task));
    for token in &rendered.unresolved {
        warnings.push(format!("template placeholder left unresolved: {token}"));
    }
    storage.write(&paths.active_task_file, &rendered.text)?;

    seed_progress_focus(paths, storage, &task)?;

    super::append_task_log(
        paths,
        storage,
        task_id,
        &format!("[{}] Started task: {}", entry_timestamp(), task.title),
    )?;

    Ok(StartOutcome {
        task_id: task_id.to_string(),
        title: title_text(&task),
        warnings,
    })
}

fn title_text(task: &Task) -> String {
    task.title
        .split_once(": ")
        .map(|(_, title)| title.to_string())
        .unwrap_or_else(|| task.title.clone())
}

fn token_values(task: &Task) -> HashMap<String, String> {
    let elements = if task.elements.is_empty() {
        "None".to_string()
    } else {
        task.elements
            .iter()
            .map(|e| format!("- [ ] [{}] {}", e.full_id(), e.description))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let step_list = |steps: &[String]| {
        if steps.is_empty() {
            "None".to_string()
        } else {
            steps
                .iter()
                .map(|s| format!("- [ ] {s}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    HashMap::from([
        ("TASK_ID".to_string(), task.id.clone()),
        ("TASK_TITLE".to_string(), title_text(task)),
        ("FR_REFERENCE".to_string(), task.fr_reference.clone()),
        (
            "IMPLEMENTATION_LOCATION".to_string(),
            task.implementation_location.clone(),
        ),
        ("DEPENDENCIES".to_string(), task.dependencies.clone()),
        ("CONFIDENCE".to_string(), INITIAL_CONFIDENCE.to_string()),
        ("TIMESTAMP".to_string(), entry_timestamp()),
        ("DESCRIPTION".to_string(), task.description.clone()),
        ("ELEMENTS".to_string(), elements),
        (
            "PREPARATION_STEPS".to_string(),
            step_list(&task.preparation.steps),
        ),
        (
            "IMPLEMENTATION_STEPS".to_string(),
            step_list(&task.implementation.steps),
        ),
        (
            "VALIDATION_STEPS".to_string(),
            step_list(&task.validation.steps),
        ),
    ])
}

/// Point "Current Focus" in the progress document at the new task, creating
/// the document from its template when absent.
fn seed_progress_focus(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    task: &Task,
) -> EngineResult<()> {
    if !storage.exists(&paths.progress_file) {
        let template = match paths.template_override("progress.md") {
            Some(path) => storage.read_to_string(&path)?,
            None => PROGRESS_TEMPLATE.to_string(),
        };
        let rendered = resolve_template(&template, &HashMap::new());
        storage.write(&paths.progress_file, &rendered.text)?;
    }

    let doc = storage.read_to_string(&paths.progress_file)?;
    let Some(section) = locate_section(&doc, "Current Focus") else {
        return Ok(());
    };
    let heading = format!("{} Current Focus", "#".repeat(section.level));
    let focus = format!("Starting {}", task.title);
    let updated = format!(
        "{}{heading}\n{focus}\n\n{}",
        &doc[..section.start],
        &doc[section.end..]
    );
    storage.write(&paths.progress_file, &updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStorage;
    use tempfile::TempDir;

    const BREAKDOWN: &str = "\
# Task Breakdown

#### T-1.1: Build the widget
- **FR Reference**: FR-1.1.0
- **Implementation Location**: src/widget
- **Dependencies**: T-1.0
- **Description**: Build the core widget

**Components/Elements**:
- [T-1.1:ELE-1] Data model
- [T-1.1:ELE-2] Renderer

**Preparation Steps**:
- [PREP-1] Review the data shape

**Implementation Steps**:
- [IMP-1] Implement the model

**Validation Steps**:
- [VAL-1] Unit test the model

#### T-1.2: Ship the widget
- **Description**: Ship it
";

    fn setup() -> (TempDir, WorkspacePaths) {
        let temp = TempDir::new().unwrap();
        let paths = WorkspacePaths::resolve(temp.path()).unwrap();
        FsStorage
            .write(&paths.task_breakdown_file, BREAKDOWN)
            .unwrap();
        (temp, paths)
    }

    #[test]
    fn test_start_task_renders_active_task() {
        let (_temp, paths) = setup();
        let outcome = start_task(&paths, &FsStorage, "T-1.1").unwrap();
        assert_eq!(outcome.task_id, "T-1.1");
        assert_eq!(outcome.title, "Build the widget");
        assert!(outcome.warnings.is_empty());

        let active = FsStorage.read_to_string(&paths.active_task_file).unwrap();
        assert!(active.starts_with("# Active Task: T-1.1"));
        assert!(active.contains("- Task ID: T-1.1"));
        assert!(active.contains("- FR Reference: FR-1.1.0"));
        assert!(active.contains("- Confidence: 5/10"));
        assert!(active.contains("- [ ] [T-1.1:ELE-1] Data model"));
        assert!(active.contains("- [ ] Review the data shape"));
        assert!(!active.contains("{{"));
        // Sections the logging operations rely on are present
        assert!(locate_section(&active, "Recent Actions").is_some());
        assert!(locate_section(&active, "Addendums").is_some());
        assert!(locate_section(&active, "Next Steps").is_some());
    }

    #[test]
    fn test_start_task_uses_field_sentinels() {
        let (_temp, paths) = setup();
        start_task(&paths, &FsStorage, "T-1.2").unwrap();

        let active = FsStorage.read_to_string(&paths.active_task_file).unwrap();
        assert!(active.contains("- FR Reference: N/A"));
        assert!(active.contains("- Dependencies: None"));
    }

    #[test]
    fn test_start_task_archives_previous_active_task() {
        let (_temp, paths) = setup();
        FsStorage
            .write(&paths.active_task_file, "# Active Task: T-0.9\n")
            .unwrap();

        let outcome = start_task(&paths, &FsStorage, "T-1.1").unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("archived"));

        let archived: Vec<_> = std::fs::read_dir(&paths.archive_dir)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(archived.len(), 1);
    }

    #[test]
    fn test_start_task_seeds_progress_focus() {
        let (_temp, paths) = setup();
        start_task(&paths, &FsStorage, "T-1.1").unwrap();

        let progress = FsStorage.read_to_string(&paths.progress_file).unwrap();
        let focus = locate_section(&progress, "Current Focus").unwrap();
        assert_eq!(focus.content, "Starting T-1.1: Build the widget");
    }

    #[test]
    fn test_start_task_unknown_task_is_not_found() {
        let (_temp, paths) = setup();
        let err = start_task(&paths, &FsStorage, "T-9.9").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_start_task_requires_breakdown() {
        let temp = TempDir::new().unwrap();
        let paths = WorkspacePaths::resolve(temp.path()).unwrap();
        let err = start_task(&paths, &FsStorage, "T-1.1").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
