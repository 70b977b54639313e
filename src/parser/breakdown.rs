//! Task breakdown extractor
//!
//! Pulls task, phase, and element records out of the master breakdown
//! document. A task's block is bounded by its `#### <id>: <title>` heading
//! and the next sibling heading. Scalar fields use the single-line
//! `- **Label**: value` pattern with `N/A`/`None` sentinels when absent.

use crate::error::{EngineError, EngineResult};
use crate::models::status::ElementStatus;
use crate::models::task::{Element, ElementId, Phase, Task};
use crate::parser::section::SectionTree;
use regex::Regex;
use std::sync::OnceLock;

fn element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // [T-1.1.1:ELE-2a] description
    RE.get_or_init(|| Regex::new(r"\[([A-Za-z0-9.\-]+):(ELE-\d+[a-z]?)\]\s*(.*)").unwrap())
}

fn field_regex(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?m)^-\s*\*\*{}\*\*:\s*(.*)$",
        regex::escape(label)
    ))
    .unwrap()
}

/// Extract one task's records from the breakdown document.
pub fn extract_task_breakdown(breakdown: &str, task_id: &str) -> EngineResult<Task> {
    let block = task_block(breakdown, task_id)?;
    let title = block
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches('#')
        .trim()
        .to_string();

    Ok(Task {
        id: task_id.to_string(),
        title,
        description: scalar_field(&block, "Description", "N/A"),
        fr_reference: scalar_field(&block, "FR Reference", "N/A"),
        implementation_location: scalar_field(&block, "Implementation Location", "N/A"),
        dependencies: scalar_field(&block, "Dependencies", "None"),
        preparation: phase_block(&block, "Preparation"),
        implementation: phase_block(&block, "Implementation"),
        validation: phase_block(&block, "Validation"),
        elements: parse_elements(&block),
    })
}

/// All task headings (`#### T-x.y: title`) in document order.
pub fn list_tasks(breakdown: &str) -> Vec<(String, String)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?m)^####\s+(T-[\d.]+):\s*(.*)$").unwrap());
    re.captures_iter(breakdown)
        .map(|c| (c[1].to_string(), c[2].trim().to_string()))
        .collect()
}

fn task_block(breakdown: &str, task_id: &str) -> EngineResult<String> {
    let tree = SectionTree::parse(breakdown);
    let wanted = format!("{task_id}:");
    let node = tree
        .iter()
        .find(|n| n.title.starts_with(&wanted) || n.title == task_id)
        .ok_or_else(|| {
            EngineError::NotFound(format!("task {task_id} not found in task breakdown"))
        })?;
    Ok(breakdown[node.start..node.end].to_string())
}

fn scalar_field(block: &str, label: &str, sentinel: &str) -> String {
    match field_regex(label).captures(block) {
        Some(caps) => {
            let value = caps[1].trim();
            if value.is_empty() {
                sentinel.to_string()
            } else {
                value.to_string()
            }
        }
        None => sentinel.to_string(),
    }
}

/// Parse one ordered phase block. Accepts both the `- **<name> Steps**:` list
/// style and a `### <name> Phase` heading style; `[PREP-n]`-type step markers
/// are stripped from line items.
fn phase_block(block: &str, name: &str) -> Phase {
    let phase_name = format!("{name} Phase");
    let mut steps = Vec::new();

    let marker_bold = format!("**{name} Steps**:");
    let marker_heading = format!("{name} Phase");
    let step_marker: &Regex = {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^\[(?:PREP|IMP|VAL)-\d+\]\s*").unwrap())
    };

    let mut in_phase = false;
    for raw in block.lines() {
        let line = raw.trim();
        if line.contains(&marker_bold)
            || (line.starts_with('#') && line.trim_start_matches('#').trim() == marker_heading)
        {
            in_phase = true;
            continue;
        }
        if in_phase {
            // Any other bold list marker or heading ends the block
            if line.starts_with("- **") || line.starts_with('#') || line.contains("**:") {
                break;
            }
            if let Some(item) = line.strip_prefix('-') {
                let item = item.trim();
                // Drop a leading checkbox if present
                let item = item
                    .strip_prefix("[ ]")
                    .or_else(|| item.strip_prefix("[x]"))
                    .or_else(|| item.strip_prefix("[-]"))
                    .unwrap_or(item)
                    .trim();
                let item = step_marker.replace(item, "").trim().to_string();
                if !item.is_empty() {
                    steps.push(item);
                }
            }
        }
    }

    Phase {
        name: phase_name,
        steps,
    }
}

/// Parse `[<label>:ELE-<n>[<letter>]] <description>` declarations, dedupe,
/// and sort: numeric id ascending, unlettered before lettered, letters
/// ascending.
fn parse_elements(block: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();

    for line in block.lines() {
        let Some(caps) = element_regex().captures(line) else {
            continue;
        };
        let Ok(id) = ElementId::parse(&caps[2]) else {
            continue;
        };
        if elements.iter().any(|e| e.id == id) {
            continue;
        }
        elements.push(Element {
            label: caps[1].to_string(),
            id,
            description: caps[3].trim().to_string(),
            status: ElementStatus::NotStarted,
        });
    }

    elements.sort_by(|a, b| a.id.cmp(&b.id));
    elements
}
