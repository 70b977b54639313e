//! Action logging and active-task field updates

use crate::config::WorkspacePaths;
use crate::error::{EngineError, EngineResult};
use crate::models::task::ActionLogEntry;
use crate::models::time::entry_timestamp;
use crate::mutate::{mutate_section, MutationRequest};
use crate::parser::section::locate_section;
use crate::storage::Storage;
use regex::Regex;
use std::sync::OnceLock;

fn confidence_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^- Confidence:.*$").unwrap())
}

fn last_updated_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^- Last Updated:.*$").unwrap())
}

fn validate_confidence(confidence: u8) -> EngineResult<()> {
    if !(1..=10).contains(&confidence) {
        return Err(EngineError::Validation(format!(
            "confidence must be an integer between 1 and 10, got {confidence}"
        )));
    }
    Ok(())
}

/// Log a micro-action into "Recent Actions" of the active-task document and
/// append it to the action log. Returns non-fatal warnings.
pub fn log_action(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    action: &str,
    confidence: u8,
    files: &[String],
) -> EngineResult<Vec<String>> {
    if action.trim().is_empty() {
        return Err(EngineError::Validation(
            "action description is required".to_string(),
        ));
    }
    validate_confidence(confidence)?;

    let entry = ActionLogEntry {
        timestamp: entry_timestamp(),
        action: action.to_string(),
        confidence,
        files: files.to_vec(),
    };
    let formatted = entry.format();
    let mut warnings = Vec::new();

    if storage.exists(&paths.active_task_file) {
        let doc = storage.read_to_string(&paths.active_task_file)?;
        let updated = mutate_section(&doc, &MutationRequest::plain("Recent Actions", &formatted));
        storage.write(&paths.active_task_file, &updated)?;
    } else {
        warnings.push("active-task document not found, Recent Actions not updated".to_string());
    }

    // Historical record, independent of the active-task document
    if !storage.exists(&paths.action_log_file) {
        storage.write(
            &paths.action_log_file,
            &format!(
                "# Action Log\n\n**Started:** {}\n\n## Actions\n\n",
                entry.timestamp
            ),
        )?;
    }
    storage.append(&paths.action_log_file, &format!("{formatted}\n"))?;

    Ok(warnings)
}

/// Update the `- Confidence: N/10` and `- Last Updated:` lines inside "Task
/// Information" via direct line-pattern substitution. No full-section
/// rewrite.
pub fn update_confidence(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    confidence: u8,
) -> EngineResult<()> {
    validate_confidence(confidence)?;

    let doc = storage.read_to_string(&paths.active_task_file)?;
    if locate_section(&doc, "Task Information").is_none() {
        return Err(EngineError::NotFound(
            "Task Information section not found in active-task document".to_string(),
        ));
    }

    let timestamp = entry_timestamp();
    let updated = confidence_line_regex()
        .replace(&doc, format!("- Confidence: {confidence}/10"))
        .into_owned();
    let updated = last_updated_regex()
        .replace(&updated, format!("- Last Updated: {timestamp}"))
        .into_owned();

    storage.write(&paths.active_task_file, &updated)?;

    let task_id = current_task_id(&doc).unwrap_or_else(|| "unknown".to_string());
    super::append_task_log(
        paths,
        storage,
        &task_id,
        &format!("[{timestamp}] Updated task confidence to {confidence}/10"),
    )?;
    Ok(())
}

/// Register a file under "Expected Implementation Files", in the "Primary:"
/// or "Additional Files:" sub-list. Duplicate paths are a no-op; returns
/// whether the entry was added.
pub fn add_implementation_file(
    paths: &WorkspacePaths,
    storage: &dyn Storage,
    file_path: &str,
    primary: bool,
) -> EngineResult<bool> {
    if file_path.trim().is_empty() {
        return Err(EngineError::Validation("file path is required".to_string()));
    }

    const SECTION: &str = "Expected Implementation Files";
    let mut doc = storage.read_to_string(&paths.active_task_file)?;

    if locate_section(&doc, SECTION).is_none() {
        // Seed the section with its two fixed sub-lists
        doc = mutate_section(
            &doc,
            &MutationRequest::plain(SECTION, "Primary:\n\nAdditional Files:"),
        );
    }

    let section = locate_section(&doc, SECTION)
        .ok_or_else(|| EngineError::NotFound(format!("failed to create {SECTION} section")))?;

    let (mut primary_files, mut additional_files) = parse_file_lists(&section.content);

    let timestamp = entry_timestamp();
    let duplicate = primary_files
        .iter()
        .chain(additional_files.iter())
        .any(|line| line.starts_with(&format!("- {file_path} ")));
    if duplicate {
        return Ok(false);
    }

    let entry = format!("- {file_path} (Added: {timestamp})");
    if primary {
        primary_files.push(entry);
    } else {
        additional_files.push(entry);
    }

    let heading = format!("{} {}", "#".repeat(section.level), SECTION);
    let rebuilt = format!(
        "{heading}\n\nPrimary:\n{}\n\nAdditional Files:\n{}\n\n",
        primary_files.join("\n"),
        additional_files.join("\n"),
    );

    let updated = format!(
        "{}{}{}",
        &doc[..section.start],
        rebuilt,
        &doc[section.end..]
    );
    storage.write(&paths.active_task_file, &updated)?;

    let task_id = current_task_id(&doc).unwrap_or_else(|| "unknown".to_string());
    let kind = if primary { "primary" } else { "additional" };
    super::append_task_log(
        paths,
        storage,
        &task_id,
        &format!("[{timestamp}] Added {kind} implementation file: {file_path}"),
    )?;
    Ok(true)
}

/// Split the section body into the two fixed sub-lists.
fn parse_file_lists(content: &str) -> (Vec<String>, Vec<String>) {
    let mut primary = Vec::new();
    let mut additional = Vec::new();
    let mut current: Option<&mut Vec<String>> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed == "Primary:" {
            current = Some(&mut primary);
            continue;
        }
        if trimmed == "Additional Files:" {
            current = Some(&mut additional);
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        if let Some(list) = current.as_deref_mut() {
            list.push(trimmed.to_string());
        }
    }

    (primary, additional)
}

/// Task id from the `- Task ID: <id>` line of Task Information.
pub(crate) fn current_task_id(doc: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?m)^- Task ID:\s*(\S+)").unwrap());
    re.captures(doc).map(|c| c[1].to_string())
}
