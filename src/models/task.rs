//! Computed-view records
//!
//! Tasks, elements, and phases are views computed from the breakdown and
//! progress documents on each read; they are never stored as objects.

use crate::error::{EngineError, EngineResult};
use crate::models::status::ElementStatus;
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Element identifier: `ELE-n` or `ELE-n<letter>` for sub-elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub number: u32,
    pub letter: Option<char>,
}

impl ElementId {
    /// Parse the `ELE-n[letter]` form.
    pub fn parse(raw: &str) -> EngineResult<ElementId> {
        let rest = raw
            .trim()
            .strip_prefix("ELE-")
            .ok_or_else(|| EngineError::Validation(format!("malformed element id: {raw}")))?;

        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let tail = &rest[digits.len()..];

        let number: u32 = digits
            .parse()
            .map_err(|_| EngineError::Validation(format!("malformed element id: {raw}")))?;

        let letter = match tail.len() {
            0 => None,
            1 => {
                let c = tail.chars().next().unwrap();
                if c.is_ascii_lowercase() {
                    Some(c)
                } else {
                    return Err(EngineError::Validation(format!(
                        "malformed element id: {raw}"
                    )));
                }
            }
            _ => {
                return Err(EngineError::Validation(format!(
                    "malformed element id: {raw}"
                )))
            }
        };

        Ok(ElementId { number, letter })
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter {
            Some(c) => write!(f, "ELE-{}{}", self.number, c),
            None => write!(f, "ELE-{}", self.number),
        }
    }
}

// Numeric id ascending; for equal numbers the unlettered entry sorts first,
// then letters ascending.
impl Ord for ElementId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| match (self.letter, other.letter) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for ElementId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The smallest trackable unit of a task.
#[derive(Debug, Clone)]
pub struct Element {
    /// Label preceding the colon in the declaration, usually the task id
    pub label: String,
    pub id: ElementId,
    pub description: String,
    pub status: ElementStatus,
}

impl Element {
    /// Full id as written in documents, e.g. `T-1.1.1:ELE-2a`.
    pub fn full_id(&self) -> String {
        format!("{}:{}", self.label, self.id)
    }
}

/// One workflow phase with its ordered line items.
#[derive(Debug, Clone, Default)]
pub struct Phase {
    pub name: String,
    pub steps: Vec<String>,
}

/// One task extracted from the master breakdown document.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub fr_reference: String,
    pub implementation_location: String,
    pub dependencies: String,
    pub preparation: Phase,
    pub implementation: Phase,
    pub validation: Phase,
    pub elements: Vec<Element>,
}

/// One formatted action-log entry.
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub timestamp: String,
    pub action: String,
    /// Integer in [1,10]
    pub confidence: u8,
    pub files: Vec<String>,
}

impl ActionLogEntry {
    /// Render as `- [<ts>] <action> (Confidence: n/10) [f1, f2]`.
    pub fn format(&self) -> String {
        let mut entry = format!("- [{}] {}", self.timestamp, self.action);
        entry.push_str(&format!(" (Confidence: {}/10)", self.confidence));
        if !self.files.is_empty() {
            entry.push_str(&format!(" [{}]", self.files.join(", ")));
        }
        entry
    }
}

/// Structured improvement suggestion record.
#[derive(Debug, Clone)]
pub struct ImprovementRecord {
    pub timestamp: String,
    pub task_id: String,
    pub description: String,
    pub rationale: String,
    pub implementation: String,
    pub priority: String,
    pub effort: String,
}

/// Structured dependency discovery record.
#[derive(Debug, Clone)]
pub struct DependencyRecord {
    pub timestamp: String,
    pub task_id: String,
    pub description: String,
    pub blocking: String,
    pub affected_tasks: Vec<String>,
}

/// Result of archiving one state file.
#[derive(Debug, Clone)]
pub struct ArchiveSnapshot {
    pub source: PathBuf,
    pub archive: PathBuf,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_parse() {
        let id = ElementId::parse("ELE-3").unwrap();
        assert_eq!(id.number, 3);
        assert_eq!(id.letter, None);

        let sub = ElementId::parse("ELE-12b").unwrap();
        assert_eq!(sub.number, 12);
        assert_eq!(sub.letter, Some('b'));
        assert_eq!(sub.to_string(), "ELE-12b");
    }

    #[test]
    fn test_element_id_rejects_malformed() {
        assert!(ElementId::parse("ELE-").is_err());
        assert!(ElementId::parse("ELE-1abc").is_err());
        assert!(ElementId::parse("ELE-1B").is_err());
        assert!(ElementId::parse("T-1.1").is_err());
    }

    #[test]
    fn test_element_id_ordering() {
        let mut ids = vec![
            ElementId::parse("ELE-2").unwrap(),
            ElementId::parse("ELE-1").unwrap(),
            ElementId::parse("ELE-1a").unwrap(),
            ElementId::parse("ELE-10").unwrap(),
        ];
        ids.sort();
        let rendered: Vec<_> = ids.iter().map(|i| i.to_string()).collect();
        assert_eq!(rendered, ["ELE-1", "ELE-1a", "ELE-2", "ELE-10"]);
    }

    #[test]
    fn test_action_entry_format() {
        let entry = ActionLogEntry {
            timestamp: "03/04/2025, 02:05:00 PM PT".to_string(),
            action: "Wired up the parser".to_string(),
            confidence: 8,
            files: vec!["src/parser.rs".to_string(), "src/lib.rs".to_string()],
        };
        assert_eq!(
            entry.format(),
            "- [03/04/2025, 02:05:00 PM PT] Wired up the parser (Confidence: 8/10) [src/parser.rs, src/lib.rs]"
        );
    }

    #[test]
    fn test_action_entry_without_files() {
        let entry = ActionLogEntry {
            timestamp: "ts".to_string(),
            action: "did a thing".to_string(),
            confidence: 9,
            files: vec![],
        };
        assert_eq!(entry.format(), "- [ts] did a thing (Confidence: 9/10)");
    }
}
