//! Section mutator
//!
//! Idempotent insert-or-append over one document. Placement is decided by an
//! ordered chain of strategy functions tried in sequence; each returns either
//! the rewritten document or "not applicable" so new rules can be added
//! without touching existing ones. Exactly one full-document rewrite happens
//! per call, entries are never reordered, and the result re-parses with the
//! same section boundaries it started with.

use crate::parser::section::{SectionNode, SectionTree};

/// Placeholder sentinels standing in for "no entries yet". Exact match after
/// trimming, case-sensitive.
const PLACEHOLDERS: [&str; 2] = ["None", "None yet"];

/// Where a new entry should land.
#[derive(Debug, Clone)]
pub struct MutationRequest<'a> {
    /// Target (sub)section title
    pub section: &'a str,
    /// Container section holding the target as a subsection, e.g. "Addendums"
    pub container: Option<&'a str>,
    /// Sibling section the target is created after when absent,
    /// e.g. "Improvement Suggestions" goes after "New Dependencies"
    pub anchor_after: Option<&'a str>,
    /// Section a brand-new container is created before, e.g. "Next Steps"
    pub tail_anchor: Option<&'a str>,
    /// Entry text, one line or several, without trailing newline
    pub entry: &'a str,
}

impl<'a> MutationRequest<'a> {
    /// Plain top-level section with the usual "Next Steps" tail anchor.
    pub fn plain(section: &'a str, entry: &'a str) -> Self {
        MutationRequest {
            section,
            container: None,
            anchor_after: None,
            tail_anchor: Some("Next Steps"),
            entry,
        }
    }

    /// Subsection of the "Addendums" container.
    pub fn addendum(section: &'a str, anchor_after: Option<&'a str>, entry: &'a str) -> Self {
        MutationRequest {
            section,
            container: Some("Addendums"),
            anchor_after,
            tail_anchor: Some("Next Steps"),
            entry,
        }
    }
}

type Strategy = fn(&str, &SectionTree, &MutationRequest) -> Option<String>;

/// Insert-or-append `req.entry` under `req.section`, trying each placement
/// strategy in order. The final strategy always applies, so this returns an
/// updated document for any input.
pub fn mutate_section(doc: &str, req: &MutationRequest) -> String {
    const CHAIN: [Strategy; 5] = [
        subsection_in_container,
        create_in_container,
        independent_section,
        after_anchor_section,
        create_section,
    ];

    let tree = SectionTree::parse(doc);
    for strategy in CHAIN {
        if let Some(updated) = strategy(doc, &tree, req) {
            return updated;
        }
    }
    unreachable!("create_section always applies");
}

/// Splice a rewritten section over `node`'s span: replace the placeholder on
/// first write, append after existing entries otherwise.
fn replace_or_append(doc: &str, node: &SectionNode, title: &str, entry: &str) -> String {
    let content = node.content(doc);
    let heading = format!("{} {}", "#".repeat(node.level), title);

    let section = if PLACEHOLDERS.contains(&content) || content.is_empty() {
        format!("{heading}\n{entry}\n\n")
    } else {
        format!("{heading}\n{content}\n{entry}\n\n")
    };

    format!("{}{}{}", &doc[..node.start], section, &doc[node.end..])
}

/// 1. Container exists and already holds the subsection.
fn subsection_in_container(doc: &str, tree: &SectionTree, req: &MutationRequest) -> Option<String> {
    let container = tree.locate(req.container?)?;
    let node = tree.locate_within(container, req.section)?;
    Some(replace_or_append(doc, node, req.section, req.entry))
}

/// 2. Container exists but the subsection does not: create it inside, after
/// the anchor subsection when present, else directly after the container's
/// own heading line.
fn create_in_container(doc: &str, tree: &SectionTree, req: &MutationRequest) -> Option<String> {
    let container = tree.locate(req.container?)?;
    let block = format!("\n### {}\n{}\n\n", req.section, req.entry);

    let insert_at = req
        .anchor_after
        .and_then(|anchor| tree.locate_within(container, anchor))
        .map(|anchor| anchor.end)
        .unwrap_or(container.body_start);

    Some(format!(
        "{}{}{}",
        &doc[..insert_at],
        block,
        &doc[insert_at..]
    ))
}

/// 3. No container in play: the section exists independently somewhere in the
/// document. Its original heading level is preserved.
fn independent_section(doc: &str, tree: &SectionTree, req: &MutationRequest) -> Option<String> {
    let node = tree.locate(req.section)?;
    Some(replace_or_append(doc, node, req.section, req.entry))
}

/// 4. Section absent everywhere: insert it right after its designated anchor
/// section.
fn after_anchor_section(doc: &str, tree: &SectionTree, req: &MutationRequest) -> Option<String> {
    let anchor = tree.locate(req.anchor_after?)?;
    let block = format!("\n### {}\n{}\n\n", req.section, req.entry);
    Some(format!(
        "{}{}{}",
        &doc[..anchor.end],
        block,
        &doc[anchor.end..]
    ))
}

/// 5. Final fallback: create the section (inside a fresh container when one
/// was requested) before the tail anchor, else append at end-of-document.
fn create_section(doc: &str, tree: &SectionTree, req: &MutationRequest) -> Option<String> {
    let block = match req.container {
        Some(container) => format!(
            "## {}\n\n### {}\n{}\n\n",
            container, req.section, req.entry
        ),
        None => format!("## {}\n{}\n\n", req.section, req.entry),
    };

    match req.tail_anchor.and_then(|t| tree.locate(t)) {
        Some(tail) => Some(format!(
            "{}{}{}",
            &doc[..tail.start],
            block,
            &doc[tail.start..]
        )),
        None => Some(format!("{}\n\n{}", doc.trim_end(), block.trim_end())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::section::locate_section;

    const DOC: &str = "# Active Task\n\n## Task Information\n- Confidence: 8/10\n\n## Addendums\n\n### New Dependencies\nNone\n\n### Improvement Suggestions\nNone yet\n\n## Next Steps\n1. Continue\n";

    #[test]
    fn test_placeholder_replaced_once_then_appended() {
        let req = MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), "- [ts] Improvement: first");
        let once = mutate_section(DOC, &req);
        let section = locate_section(&once, "Improvement Suggestions").unwrap();
        assert_eq!(section.content, "- [ts] Improvement: first");
        assert!(!once.contains("None yet"));

        let req2 = MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), "- [ts] Improvement: second");
        let twice = mutate_section(&once, &req2);
        let section = locate_section(&twice, "Improvement Suggestions").unwrap();
        assert_eq!(
            section.content,
            "- [ts] Improvement: first\n- [ts] Improvement: second"
        );
        // No duplicated heading
        assert_eq!(twice.matches("### Improvement Suggestions").count(), 1);
    }

    #[test]
    fn test_order_preserved_over_many_entries() {
        let mut doc = DOC.to_string();
        for i in 1..=4 {
            let entry = format!("- entry {i}");
            let req = MutationRequest::addendum("New Dependencies", None, &entry);
            doc = mutate_section(&doc, &req);
        }
        let section = locate_section(&doc, "New Dependencies").unwrap();
        assert_eq!(
            section.content,
            "- entry 1\n- entry 2\n- entry 3\n- entry 4"
        );
    }

    #[test]
    fn test_subsection_created_inside_existing_container() {
        let doc = "# Task\n\n## Addendums\n\n### New Dependencies\nNone\n\n## Next Steps\n1. x\n";
        let req = MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), "- first");
        let updated = mutate_section(doc, &req);

        let container = locate_section(&updated, "Addendums").unwrap();
        assert!(container.content.contains("### Improvement Suggestions"));
        // Created after the anchor subsection
        let deps_at = updated.find("### New Dependencies").unwrap();
        let impr_at = updated.find("### Improvement Suggestions").unwrap();
        assert!(impr_at > deps_at);
    }

    #[test]
    fn test_independent_section_keeps_heading_level() {
        let doc = "# Task\n\n### Improvement Suggestions\nNone\n\n## Next Steps\n1. x\n";
        let req = MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), "- first");
        let updated = mutate_section(doc, &req);
        let section = locate_section(&updated, "Improvement Suggestions").unwrap();
        assert_eq!(section.level, 3);
        assert_eq!(section.content, "- first");
    }

    #[test]
    fn test_created_after_anchor_when_absent() {
        let doc = "# Task\n\n### New Dependencies\n- dep one\n\n## Next Steps\n1. x\n";
        let req = MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), "- first");
        let updated = mutate_section(doc, &req);
        let deps_at = updated.find("### New Dependencies").unwrap();
        let impr_at = updated.find("### Improvement Suggestions").unwrap();
        assert!(impr_at > deps_at);
        assert!(updated.contains("- dep one"));
    }

    #[test]
    fn test_container_created_before_tail_anchor() {
        let doc = "# Task\n\n## Next Steps\n1. x\n";
        let req = MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), "- first");
        let updated = mutate_section(doc, &req);
        let addendums_at = updated.find("## Addendums").unwrap();
        let next_at = updated.find("## Next Steps").unwrap();
        assert!(addendums_at < next_at);
        let section = locate_section(&updated, "Improvement Suggestions").unwrap();
        assert_eq!(section.content, "- first");
    }

    #[test]
    fn test_appended_at_eof_without_tail_anchor() {
        let doc = "# Task\n\n## Task Information\n- Confidence: 8/10\n";
        let req = MutationRequest::addendum("Improvement Suggestions", Some("New Dependencies"), "- first");
        let updated = mutate_section(doc, &req);
        assert!(updated.trim_end().ends_with("- first"));
        assert!(locate_section(&updated, "Addendums").is_some());
    }

    #[test]
    fn test_plain_section_mutation() {
        let doc = "# Task\n\n## Recent Actions\nNone yet\n\n## Next Steps\n1. x\n";
        let req = MutationRequest::plain("Recent Actions", "- [ts] acted (Confidence: 8/10)");
        let updated = mutate_section(doc, &req);
        let section = locate_section(&updated, "Recent Actions").unwrap();
        assert_eq!(section.content, "- [ts] acted (Confidence: 8/10)");
    }

    #[test]
    fn test_round_trip_entry_exactly_once() {
        let req = MutationRequest::plain("Recent Actions", "- [ts] one-off entry");
        let updated = mutate_section(DOC, &req);
        let section = locate_section(&updated, "Recent Actions").unwrap();
        assert_eq!(section.content.matches("one-off entry").count(), 1);
    }

    #[test]
    fn test_section_boundaries_stable_after_mutation() {
        let req = MutationRequest::addendum("New Dependencies", None, "- entry");
        let updated = mutate_section(DOC, &req);

        for title in ["Task Information", "Addendums", "Next Steps"] {
            let before = locate_section(DOC, title).unwrap();
            let after = locate_section(&updated, title).unwrap();
            assert_eq!(before.level, after.level, "level changed for {title}");
        }
        let info = locate_section(&updated, "Task Information").unwrap();
        assert_eq!(info.content, "- Confidence: 8/10");
    }
}
