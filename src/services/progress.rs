//! Progress aggregation
//!
//! Recomputes element completion counts and the "Current Focus" pointer in
//! the progress document, rewrites per-element checkbox lines, and flips
//! phase-stage glyphs in the phase view. The census scans checkbox glyphs
//! rather than trusting any stored counter.

use crate::config::WorkspacePaths;
use crate::error::{EngineError, EngineResult};
use crate::models::status::{glyph_for, ElementStatus, PhaseAbbr, StageStatus};
use crate::models::time::entry_timestamp;
use crate::mutate::{mutate_section, MutationRequest};
use crate::parser::breakdown::{extract_task_breakdown, list_tasks};
use crate::parser::section::locate_section;
use crate::parser::template::resolve_template;
use crate::storage::Storage;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const PROGRESS_TEMPLATE: &str = include_str!("../../templates/progress.md");

/// Checkbox census over the progress document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total_elements: usize,
    pub completed_elements: usize,
    pub completion_percentage: u32,
}

fn checkbox_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"- \[[ x\-ya]\]").unwrap())
}

fn completed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"- \[x\]").unwrap())
}

fn checkbox_census(doc: &str) -> ProgressSummary {
    let total = checkbox_regex().find_iter(doc).count();
    let completed = completed_regex().find_iter(doc).count();
    let percentage = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    ProgressSummary {
        total_elements: total,
        completed_elements: completed,
        completion_percentage: percentage,
    }
}

/// Recompute the progress document: rewrite the element's checkbox line when
/// one is given, refresh "Current Focus" from the breakdown ordering, and
/// rebuild "Overall Progress" from a full checkbox census. Creates the
/// document from its template when absent.
pub fn recompute_progress(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    task_id: &str,
    element_id: Option<&str>,
    status: &str,
) -> EngineResult<(ProgressSummary, Vec<String>)> {
    let mut warnings = Vec::new();

    if !storage.exists(&paths.progress_file) {
        let template = match paths.template_override("progress.md") {
            Some(path) => storage.read_to_string(&path)?,
            None => PROGRESS_TEMPLATE.to_string(),
        };
        let rendered = resolve_template(&template, &HashMap::new());
        storage.write(&paths.progress_file, &rendered.text)?;
    }

    let mut doc = storage.read_to_string(&paths.progress_file)?;
    let timestamp = entry_timestamp();

    if let Some(element_id) = element_id {
        match rewrite_element_line(&doc, element_id, status, &timestamp) {
            Some((updated, _)) => doc = updated,
            None => warnings.push(format!(
                "element {element_id} not found in progress document"
            )),
        }
    }

    if locate_section(&doc, "Current Focus").is_none() {
        doc = insert_after_title(
            &doc,
            "## Current Focus\nStarting task initialization...\n\n",
        );
    }

    let next = if storage.exists(&paths.task_breakdown_file) {
        let breakdown = storage.read_to_string(&paths.task_breakdown_file)?;
        next_focus(&breakdown, task_id, element_id.unwrap_or_default())
    } else {
        "Next element to be determined".to_string()
    };

    let focus = match element_id {
        Some(element_id) => {
            let completed = ElementStatus::parse(status).is_some_and(|s| s.is_complete());
            if completed {
                format!("Completed {element_id}, next: {next}")
            } else {
                format!("Working on {element_id}, status: {status}, next: {next}")
            }
        }
        None => next,
    };
    if let Some(section) = locate_section(&doc, "Current Focus") {
        let heading = format!("{} Current Focus", "#".repeat(section.level));
        doc = format!(
            "{}{heading}\n{focus}\n\n{}",
            &doc[..section.start],
            &doc[section.end..]
        );
    }

    let summary = checkbox_census(&doc);
    let overall = format!(
        "- **Tasks Completed**: {completed} of {total}\n- **Elements Completed**: {completed} of {total}\n- **Current Completion**: {percentage}%",
        completed = summary.completed_elements,
        total = summary.total_elements,
        percentage = summary.completion_percentage,
    );
    doc = match locate_section(&doc, "Overall Progress") {
        Some(section) => {
            let heading = format!("{} Overall Progress", "#".repeat(section.level));
            format!(
                "{}{heading}\n{overall}\n\n{}",
                &doc[..section.start],
                &doc[section.end..]
            )
        }
        None => insert_after_title(&doc, &format!("## Overall Progress\n{overall}\n\n")),
    };

    storage.write(&paths.progress_file, &doc)?;

    if let Some(element_id) = element_id {
        super::append_task_log(
            paths,
            storage,
            task_id,
            &format!("[{timestamp}] Updated element {element_id} status to \"{status}\""),
        )?;
    }

    Ok((summary, warnings))
}

/// Census of the progress document without mutating it. A missing document
/// counts as zero elements.
pub fn progress_summary(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
) -> EngineResult<ProgressSummary> {
    if !storage.exists(&paths.progress_file) {
        return Ok(ProgressSummary {
            total_elements: 0,
            completed_elements: 0,
            completion_percentage: 0,
        });
    }
    let doc = storage.read_to_string(&paths.progress_file)?;
    Ok(checkbox_census(&doc))
}

/// Update one element's status across the progress and active-task
/// documents. The element id carries its task (`T-x.y:ELE-n`).
pub fn update_element_status(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    element_id: &str,
    status: &str,
) -> EngineResult<Vec<String>> {
    static TASK_RE: OnceLock<Regex> = OnceLock::new();
    let task_re = TASK_RE.get_or_init(|| Regex::new(r"^(T-[\d.]+):").unwrap());
    let task_id = task_re
        .captures(element_id)
        .map(|c| c[1].to_string())
        .ok_or_else(|| {
            EngineError::Validation(format!("invalid element ID format: {element_id}"))
        })?;

    let mut warnings = Vec::new();
    if ElementStatus::parse(status).is_none() {
        warnings.push(format!(
            "unrecognized status \"{status}\", recording it as-is with an unchecked glyph"
        ));
    }

    if !storage.exists(&paths.progress_file) {
        return Err(EngineError::NotFound(
            "progress document not found, run init first".to_string(),
        ));
    }
    let (_, mut recompute_warnings) =
        recompute_progress(paths, storage, &task_id, Some(element_id), status)?;
    warnings.append(&mut recompute_warnings);

    if !storage.exists(&paths.active_task_file) {
        return Err(EngineError::NotFound(
            "active-task document not found, run start-task first".to_string(),
        ));
    }
    let mut active = storage.read_to_string(&paths.active_task_file)?;
    let timestamp = entry_timestamp();

    let description = match rewrite_element_line(&active, element_id, status, &timestamp) {
        Some((updated, description)) => {
            active = updated;
            description
        }
        None => {
            warnings.push(format!(
                "element {element_id} not found in active-task document"
            ));
            element_id
                .split_once(':')
                .map(|(_, id)| id.to_string())
                .unwrap_or_else(|| element_id.to_string())
        }
    };

    let block = format!(
        "- Element ID: {element_id}\n- Description: {description}\n- Status: {status}\n- Updated: {timestamp}"
    );
    active = match locate_section(&active, "Current Element") {
        Some(section) => {
            let heading = format!("{} Current Element", "#".repeat(section.level));
            format!(
                "{}{heading}\n{block}\n\n{}",
                &active[..section.start],
                &active[section.end..]
            )
        }
        None => mutate_section(&active, &MutationRequest::plain("Current Element", &block)),
    };
    storage.write(&paths.active_task_file, &active)?;

    Ok(warnings)
}

/// Flip the glyph of one phase stage in the phase view. The phase line must
/// sit within five lines below its task line.
pub fn update_phase_stage(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    task_id: &str,
    phase_abbr: &str,
    status: &str,
) -> EngineResult<String> {
    let phase = PhaseAbbr::parse(phase_abbr)?;
    let stage = StageStatus::parse(status)?;

    if !storage.exists(&paths.progress_phase_file) {
        return Err(EngineError::NotFound(format!(
            "progress phase file not found at: {}",
            paths.progress_phase_file.display()
        )));
    }

    let doc = storage.read_to_string(&paths.progress_phase_file)?;
    let mut lines: Vec<String> = doc.lines().map(str::to_string).collect();

    let task_line = lines
        .iter()
        .position(|line| {
            [StageStatus::NotStarted, StageStatus::Active, StageStatus::Complete]
                .iter()
                .any(|s| line.contains(&format!("- {} {task_id}:", s.glyph())))
        })
        .ok_or_else(|| {
            EngineError::NotFound(format!(
                "task with ID {task_id} not found in the progress phase file"
            ))
        })?;

    let phase_name = phase.display_name();
    let phase_pattern = Regex::new(&format!(r"-\s\[.?\]\s{phase_name}"))
        .map_err(|e| EngineError::Validation(e.to_string()))?;
    let search_limit = (task_line + 6).min(lines.len());
    let phase_line = (task_line + 1..search_limit)
        .find(|&i| phase_pattern.is_match(&lines[i]))
        .ok_or_else(|| {
            EngineError::NotFound(format!("{phase_name} not found for task {task_id}"))
        })?;

    static GLYPH_RE: OnceLock<Regex> = OnceLock::new();
    let glyph_re = GLYPH_RE.get_or_init(|| Regex::new(r"\[.\]").unwrap());
    let updated = glyph_re
        .replace(&lines[phase_line], stage.glyph())
        .into_owned();

    if updated == lines[phase_line] {
        return Ok(format!(
            "phase {phase_name} for task {task_id} already has status: {status}",
            status = stage.as_str()
        ));
    }
    lines[phase_line] = updated;
    storage.write(&paths.progress_phase_file, &(lines.join("\n") + "\n"))?;

    Ok(format!(
        "updated {phase_name} for task {task_id} to status: {status}",
        status = stage.as_str()
    ))
}

/// Rewrite the checkbox line mentioning an element id, preserving the
/// original indentation and the text between the checkbox and any previous
/// status indicator. Returns the updated document and the element
/// description found on the line.
fn rewrite_element_line(
    doc: &str,
    element_id: &str,
    status: &str,
    timestamp: &str,
) -> Option<(String, String)> {
    let glyph = glyph_for(status);
    let indicator = if status == "Not Started" {
        String::new()
    } else {
        format!(" (Status: {status}, Updated: {timestamp})")
    };

    let mut lines: Vec<String> = doc.lines().map(str::to_string).collect();
    let mut description = None;

    for line in lines.iter_mut() {
        if !(line.contains(element_id) && line.contains('[') && line.contains(']')) {
            continue;
        }
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        let checkbox_end = line.find(']')? + 1;
        let rest = &line[checkbox_end..];
        let after_checkbox = match rest.find("(Status:") {
            Some(at) => rest[..at].trim(),
            None => rest.trim(),
        }
        .to_string();

        // Text after the `[label:id]` bracket is the description
        description = Some(match after_checkbox.find(']') {
            Some(at) => after_checkbox[at + 1..].trim().to_string(),
            None => after_checkbox.clone(),
        });
        *line = format!("{indent}- {glyph} {after_checkbox}{indicator}");
        break;
    }

    let description = description?;
    let mut updated = lines.join("\n");
    if doc.ends_with('\n') {
        updated.push('\n');
    }
    Some((updated, description))
}

/// Next-focus text from the breakdown ordering: the next element of the
/// current task, else the next task in document order, else done.
fn next_focus(breakdown: &str, task_id: &str, element_id: &str) -> String {
    if let Ok(task) = extract_task_breakdown(breakdown, task_id) {
        if let Some(at) = task.elements.iter().position(|e| e.full_id() == element_id) {
            if let Some(next) = task.elements.get(at + 1) {
                return format!("{}: {}", next.full_id(), next.description);
            }
        }
        let tasks = list_tasks(breakdown);
        if let Some(at) = tasks.iter().position(|(id, _)| id == task_id) {
            if let Some((next_id, next_title)) = tasks.get(at + 1) {
                return format!("Moving to next task: {next_id}: {next_title}");
            }
        }
        return "All tasks completed".to_string();
    }
    "Next element to be determined".to_string()
}

/// Insert a block right after the `# Project Progress` title line, or at the
/// top when the title is missing.
fn insert_after_title(doc: &str, block: &str) -> String {
    const TITLE: &str = "# Project Progress\n";
    match doc.find(TITLE) {
        Some(at) => {
            let after = at + TITLE.len();
            format!("{}\n{block}{}", &doc[..after], doc[after..].trim_start_matches('\n'))
        }
        None => format!("{block}{doc}"),
    }
}
