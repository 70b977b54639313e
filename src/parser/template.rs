//! Template processor
//!
//! Pure `{{TOKEN}}` resolution against a value map. Tokens missing from the
//! map are replaced with a visible `[Missing: TOKEN]` marker rather than
//! silently dropped, and reported back so callers can surface a warning.
//! Map entries unused by the template are ignored.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").unwrap())
}

/// Resolved template text plus the placeholders that had no value.
#[derive(Debug, Clone)]
pub struct TemplateOutput {
    pub text: String,
    pub unresolved: Vec<String>,
}

impl TemplateOutput {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Substitute every `{{TOKEN}}` occurrence literally. No partial or
/// overlapping matches; values are inserted verbatim, never re-expanded.
pub fn resolve_template(template: &str, values: &HashMap<String, String>) -> TemplateOutput {
    let mut text = String::with_capacity(template.len());
    let mut unresolved: Vec<String> = Vec::new();
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(template) {
        let whole = caps.get(0).unwrap();
        let token = &caps[1];
        text.push_str(&template[last..whole.start()]);
        match values.get(token) {
            Some(value) => text.push_str(value),
            None => {
                text.push_str(&format!("[Missing: {token}]"));
                if !unresolved.iter().any(|t| t == token) {
                    unresolved.push(token.to_string());
                }
            }
        }
        last = whole.end();
    }
    text.push_str(&template[last..]);

    TemplateOutput { text, unresolved }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_basic_substitution() {
        let out = resolve_template("Hello {{NAME}}!", &map(&[("NAME", "Ada")]));
        assert_eq!(out.text, "Hello Ada!");
        assert!(out.is_complete());
    }

    #[test]
    fn test_missing_token_marker() {
        let out = resolve_template(
            "Hello {{NAME}}, task {{TASK_ID}}",
            &map(&[("NAME", "Ada")]),
        );
        assert_eq!(out.text, "Hello Ada, task [Missing: TASK_ID]");
        assert_eq!(out.unresolved, ["TASK_ID"]);
    }

    #[test]
    fn test_repeated_token_reported_once() {
        let out = resolve_template("{{X}} and {{X}}", &HashMap::new());
        assert_eq!(out.text, "[Missing: X] and [Missing: X]");
        assert_eq!(out.unresolved, ["X"]);
    }

    #[test]
    fn test_unused_map_entries_ignored() {
        let out = resolve_template("plain text", &map(&[("NAME", "Ada")]));
        assert_eq!(out.text, "plain text");
        assert!(out.is_complete());
    }

    #[test]
    fn test_value_is_literal_not_reexpanded() {
        let out = resolve_template("{{A}}", &map(&[("A", "{{B}}"), ("B", "nope")]));
        assert_eq!(out.text, "{{B}}");
        assert!(out.is_complete());
    }

    #[test]
    fn test_every_occurrence_substituted() {
        let out = resolve_template("{{T}} {{T}} {{T}}", &map(&[("T", "x")]));
        assert_eq!(out.text, "x x x");
    }
}
