//! Improvement and dependency discovery records
//!
//! Each discovery lands twice: a timestamped one-liner goes through the
//! section-mutator fallback chain into the active-task Addendums, and a
//! structured record rendered through the template processor is prepended to
//! its tracking file underneath the preserved header.

use crate::config::WorkspacePaths;
use crate::error::{EngineError, EngineResult};
use crate::models::task::{DependencyRecord, ImprovementRecord};
use crate::models::time::entry_timestamp;
use crate::mutate::{mutate_section, MutationRequest};
use crate::parser::template::resolve_template;
use crate::storage::Storage;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

const IMPROVEMENT_TEMPLATE: &str = include_str!("../../templates/improvement-entry.md");
const DEPENDENCY_TEMPLATE: &str = include_str!("../../templates/dependency-entry.md");

const IMPROVEMENT_HEADER: &str =
    "# Improvement Suggestions\n\nThis file contains improvement suggestions discovered during implementation.\n\n";
const DEPENDENCY_HEADER: &str =
    "# New Dependencies\n\nThis file documents dependencies discovered during implementation.\n\n";

/// Log an improvement suggestion. Free-text `Description:`/`Rationale:`/
/// `Implementation:`/`Priority:`/`Effort:` markers inside the suggestion are
/// lifted into the structured record; anything else defaults.
pub fn log_improvement(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    task_id: &str,
    suggestion: &str,
) -> EngineResult<Vec<String>> {
    validate_inputs(task_id, suggestion)?;

    let timestamp = entry_timestamp();
    let entry = format!("- [{timestamp}] Improvement: {suggestion}");
    let mut warnings = mutate_active_task(
        paths,
        storage,
        &MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), &entry),
    )?;

    let record = parse_improvement(task_id, suggestion, timestamp);
    let template = load_template(
        paths,
        storage,
        "improvement-entry.md",
        IMPROVEMENT_TEMPLATE,
    )?;
    let resolved = resolve_template(&template, &improvement_values(&record));
    for token in &resolved.unresolved {
        warnings.push(format!("unresolved template placeholder: {token}"));
    }

    prepend_under_header(
        storage,
        &paths.improvement_file,
        IMPROVEMENT_HEADER,
        &resolved.text,
    )?;
    Ok(warnings)
}

/// Log a dependency discovery. `Blocking:` and `Affected Tasks:` markers in
/// the free text are lifted into the structured record.
pub fn log_dependency(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    task_id: &str,
    dependency_spec: &str,
) -> EngineResult<Vec<String>> {
    validate_inputs(task_id, dependency_spec)?;

    let timestamp = entry_timestamp();
    let entry = format!("- [{timestamp}] Dependency: {dependency_spec}");
    let mut warnings = mutate_active_task(
        paths,
        storage,
        &MutationRequest::addendum("New Dependencies", None, &entry),
    )?;

    let record = parse_dependency(task_id, dependency_spec, timestamp);
    let template = load_template(paths, storage, "dependency-entry.md", DEPENDENCY_TEMPLATE)?;
    let resolved = resolve_template(&template, &dependency_values(&record));
    for token in &resolved.unresolved {
        warnings.push(format!("unresolved template placeholder: {token}"));
    }

    prepend_under_header(
        storage,
        &paths.dependency_file,
        DEPENDENCY_HEADER,
        &resolved.text,
    )?;
    Ok(warnings)
}

/// Lift `Description:`/`Rationale:`/... markers out of the free-text
/// suggestion; anything not given falls back to a default.
fn parse_improvement(task_id: &str, suggestion: &str, timestamp: String) -> ImprovementRecord {
    ImprovementRecord {
        timestamp,
        task_id: task_id.to_string(),
        description: structured_field(
            suggestion,
            "Description",
            &["Rationale", "Implementation", "Priority", "Effort"],
        )
        .unwrap_or_else(|| suggestion.to_string()),
        rationale: structured_field(suggestion, "Rationale", &["Implementation", "Priority", "Effort"])
            .unwrap_or_else(|| "Provides additional functionality or improvement".to_string()),
        implementation: structured_field(suggestion, "Implementation", &["Priority", "Effort"])
            .unwrap_or_else(|| "Implementation details not specified".to_string()),
        priority: structured_field(suggestion, "Priority", &["Effort"])
            .unwrap_or_else(|| "Medium".to_string()),
        effort: structured_field(suggestion, "Effort", &[]).unwrap_or_else(|| "Medium".to_string()),
    }
}

fn improvement_values(record: &ImprovementRecord) -> HashMap<String, String> {
    HashMap::from([
        ("TIMESTAMP".to_string(), record.timestamp.clone()),
        ("TASK_ID".to_string(), record.task_id.clone()),
        ("DESCRIPTION".to_string(), record.description.clone()),
        ("RATIONALE".to_string(), record.rationale.clone()),
        ("IMPLEMENTATION".to_string(), record.implementation.clone()),
        ("PRIORITY".to_string(), record.priority.clone()),
        ("EFFORT".to_string(), record.effort.clone()),
    ])
}

fn parse_dependency(task_id: &str, dependency_spec: &str, timestamp: String) -> DependencyRecord {
    let affected_tasks = structured_field(dependency_spec, "Affected Tasks", &[])
        .map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_else(|| vec![task_id.to_string()]);

    DependencyRecord {
        timestamp,
        task_id: task_id.to_string(),
        description: structured_field(
            dependency_spec,
            "Description",
            &["Blocking", "Affected Tasks"],
        )
        .unwrap_or_else(|| dependency_spec.to_string()),
        blocking: structured_field(dependency_spec, "Blocking", &["Affected Tasks"])
            .unwrap_or_else(|| "Yes".to_string()),
        affected_tasks,
    }
}

fn dependency_values(record: &DependencyRecord) -> HashMap<String, String> {
    let affected = record
        .affected_tasks
        .iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    HashMap::from([
        ("TIMESTAMP".to_string(), record.timestamp.clone()),
        ("TASK_ID".to_string(), record.task_id.clone()),
        ("DESCRIPTION".to_string(), record.description.clone()),
        ("BLOCKING".to_string(), record.blocking.clone()),
        ("AFFECTED_TASKS".to_string(), affected),
    ])
}

fn validate_inputs(task_id: &str, text: &str) -> EngineResult<()> {
    if task_id.trim().is_empty() || text.trim().is_empty() {
        return Err(EngineError::Validation(
            "task id and description are required".to_string(),
        ));
    }
    Ok(())
}

fn mutate_active_task(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    req: &MutationRequest,
) -> EngineResult<Vec<String>> {
    if storage.exists(&paths.active_task_file) {
        let doc = storage.read_to_string(&paths.active_task_file)?;
        let updated = mutate_section(&doc, req);
        storage.write(&paths.active_task_file, &updated)?;
        Ok(Vec::new())
    } else {
        Ok(vec![
            "active-task document not found, Addendums not updated".to_string(),
        ])
    }
}

/// Workspace template override, else the embedded default.
fn load_template(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    name: &str,
    embedded: &str,
) -> EngineResult<String> {
    match paths.template_override(name) {
        Some(path) => storage.read_to_string(&path),
        None => Ok(embedded.to_string()),
    }
}

/// Prepend a record to a tracking file, keeping its header first. The
/// newest record sits directly under the header.
fn prepend_under_header(
    storage: &dyn Storage,
    path: &Path,
    default_header: &str,
    record: &str,
) -> EngineResult<()> {
    let updated = if storage.exists(path) {
        let existing = storage.read_to_string(path)?;
        match split_header(&existing) {
            Some((header, rest)) => format!("{header}{record}{rest}"),
            None => format!("{existing}{record}"),
        }
    } else {
        format!("{default_header}{record}")
    };
    storage.write(path, &updated)
}

/// Split the `# Title` line plus its non-heading intro text from the records
/// that follow. The header ends at the first record heading after the title,
/// whatever the blank-line layout, and is normalized to end with one blank
/// line so records never fuse with the intro.
fn split_header(content: &str) -> Option<(String, &str)> {
    if !content.starts_with("# ") {
        return None;
    }

    let mut split_at = content.len();
    let mut offset = 0;
    for (i, line) in content.split_inclusive('\n').enumerate() {
        if i > 0 && line.starts_with('#') {
            split_at = offset;
            break;
        }
        offset += line.len();
    }

    let (header, rest) = content.split_at(split_at);
    let mut header = header.trim_end().to_string();
    header.push_str("\n\n");
    Some((header, rest))
}

/// Extract `<label>: value` where value runs until one of the follower
/// labels or end of text.
fn structured_field(text: &str, label: &str, followers: &[&str]) -> Option<String> {
    let re = Regex::new(&format!(r"(?s){}:\s*(.*)$", regex::escape(label))).ok()?;
    let raw = re.captures(text)?.get(1)?.as_str();

    let mut end = raw.len();
    for follower in followers {
        if let Some(i) = raw.find(&format!("{follower}:")) {
            end = end.min(i);
        }
    }
    let value = raw[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}
