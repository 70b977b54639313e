//! Section locator
//!
//! Documents carry no persisted schema; heading structure is inferred on each
//! read. Parsing produces a typed tree of heading nodes once per document,
//! and the mutator, extractor, and aggregator all operate on that tree
//! instead of re-scanning raw text. A section's span runs from its heading
//! line to the next heading at equal-or-higher level, or end-of-document.

/// One heading and its span inside a document.
#[derive(Debug, Clone)]
pub struct SectionNode {
    /// Heading text without the leading '#' run
    pub title: String,
    /// Number of '#' characters (1-6)
    pub level: usize,
    /// Byte offset of the heading line start
    pub start: usize,
    /// Byte offset just past the heading line (start of the body)
    pub body_start: usize,
    /// Byte offset of the next heading at equal-or-higher level, or EOF
    pub end: usize,
    /// Nested subsections in document order
    pub children: Vec<SectionNode>,
}

impl SectionNode {
    /// Section body text, trimmed.
    pub fn content<'a>(&self, doc: &'a str) -> &'a str {
        doc[self.body_start..self.end].trim()
    }

    fn matches(&self, title: &str) -> bool {
        self.title.eq_ignore_ascii_case(title)
    }
}

/// Parsed heading structure of one document.
#[derive(Debug, Clone)]
pub struct SectionTree {
    roots: Vec<SectionNode>,
}

/// Flat locator result, for callers that only need one section's span.
#[derive(Debug, Clone)]
pub struct LocatedSection {
    pub title: String,
    pub level: usize,
    pub start: usize,
    pub end: usize,
    pub content: String,
}

impl SectionTree {
    /// Parse ATX headings ('#' runs at line start) into a nested tree.
    pub fn parse(doc: &str) -> Self {
        // Collect flat heading records first
        let mut headings: Vec<(usize, usize, usize, String)> = Vec::new(); // (level, start, body_start, title)
        let mut offset = 0;
        for line in doc.split_inclusive('\n') {
            let trimmed = line.trim_end_matches(['\n', '\r']);
            let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
            if (1..=6).contains(&hashes) && trimmed.as_bytes().get(hashes) == Some(&b' ') {
                let title = trimmed[hashes..].trim().to_string();
                headings.push((hashes, offset, offset + line.len(), title));
            }
            offset += line.len();
        }

        // Resolve each heading's end: next heading at equal-or-higher level
        let doc_len = doc.len();
        let mut nodes: Vec<SectionNode> = headings
            .iter()
            .enumerate()
            .map(|(i, &(level, start, body_start, ref title))| {
                let end = headings[i + 1..]
                    .iter()
                    .find(|&&(l, ..)| l <= level)
                    .map(|&(_, s, ..)| s)
                    .unwrap_or(doc_len);
                SectionNode {
                    title: title.clone(),
                    level,
                    start,
                    body_start,
                    end,
                    children: Vec::new(),
                }
            })
            .collect();

        // Nest: a node is a child of the nearest preceding node with a lower
        // level whose span contains it.
        let mut roots: Vec<SectionNode> = Vec::new();
        let mut stack: Vec<SectionNode> = Vec::new();
        nodes.reverse();
        while let Some(node) = nodes.pop() {
            while let Some(top) = stack.last() {
                if node.level > top.level && node.start < top.end {
                    break;
                }
                let finished = stack.pop().unwrap();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(finished),
                    None => roots.push(finished),
                }
            }
            stack.push(node);
        }
        while let Some(finished) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.children.push(finished),
                None => roots.push(finished),
            }
        }

        SectionTree { roots }
    }

    /// Top-level sections in document order.
    pub fn roots(&self) -> &[SectionNode] {
        &self.roots
    }

    /// All sections, depth-first in document order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionNode> {
        let mut out = Vec::new();
        fn walk<'a>(nodes: &'a [SectionNode], out: &mut Vec<&'a SectionNode>) {
            for n in nodes {
                out.push(n);
                walk(&n.children, out);
            }
        }
        walk(&self.roots, &mut out);
        out.into_iter()
    }

    /// Find a section by title, case-insensitive. Deeper headings win over
    /// shallower ones with the same title; ties resolve to document order.
    /// Fails soft: absent sections return `None`.
    pub fn locate(&self, title: &str) -> Option<&SectionNode> {
        self.iter()
            .filter(|n| n.matches(title))
            .max_by_key(|n| (n.level, std::cmp::Reverse(n.start)))
    }

    /// Find a subsection by title inside a container section's span.
    pub fn locate_within(&self, container: &SectionNode, title: &str) -> Option<&SectionNode> {
        self.iter()
            .filter(|n| n.matches(title) && n.start > container.start && n.start < container.end)
            .max_by_key(|n| (n.level, std::cmp::Reverse(n.start)))
    }
}

/// One-shot locator over raw text.
pub fn locate_section(doc: &str, title: &str) -> Option<LocatedSection> {
    let tree = SectionTree::parse(doc);
    tree.locate(title).map(|node| LocatedSection {
        title: node.title.clone(),
        level: node.level,
        start: node.start,
        end: node.end,
        content: node.content(doc).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Task\n\n## Task Information\n- Confidence: 8/10\n\n## Addendums\n\n### New Dependencies\nNone\n\n### Improvement Suggestions\nNone yet\n\n## Next Steps\n1. Do things\n";

    #[test]
    fn test_section_span_ends_at_sibling() {
        let found = locate_section(DOC, "Task Information").unwrap();
        assert_eq!(found.level, 2);
        assert_eq!(found.content, "- Confidence: 8/10");
        assert_eq!(&DOC[found.end..found.end + 12], "## Addendums");
    }

    #[test]
    fn test_container_spans_its_subsections() {
        let found = locate_section(DOC, "Addendums").unwrap();
        assert!(found.content.contains("### New Dependencies"));
        assert!(found.content.contains("### Improvement Suggestions"));
        assert_eq!(&DOC[found.end..found.end + 13], "## Next Steps");
    }

    #[test]
    fn test_last_section_ends_at_eof() {
        let found = locate_section(DOC, "Next Steps").unwrap();
        assert_eq!(found.end, DOC.len());
        assert_eq!(found.content, "1. Do things");
    }

    #[test]
    fn test_case_insensitive() {
        assert!(locate_section(DOC, "addendums").is_some());
        assert!(locate_section(DOC, "NEXT STEPS").is_some());
    }

    #[test]
    fn test_missing_section_fails_soft() {
        assert!(locate_section(DOC, "Recent Actions").is_none());
    }

    #[test]
    fn test_subsection_preferred_over_main_section() {
        let doc = "## Notes\ntop\n\n### Notes\nnested\n";
        let found = locate_section(doc, "Notes").unwrap();
        assert_eq!(found.level, 3);
        assert_eq!(found.content, "nested");
    }

    #[test]
    fn test_tree_nesting() {
        let tree = SectionTree::parse(DOC);
        let root = &tree.roots()[0];
        assert_eq!(root.title, "Task");
        let titles: Vec<_> = root.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Task Information", "Addendums", "Next Steps"]);
        assert_eq!(root.children[1].children.len(), 2);
    }

    #[test]
    fn test_locate_within_container() {
        let tree = SectionTree::parse(DOC);
        let container = tree.locate("Addendums").unwrap();
        let sub = tree.locate_within(container, "New Dependencies").unwrap();
        assert_eq!(sub.level, 3);
        assert_eq!(sub.content(DOC), "None");
        assert!(tree.locate_within(container, "Next Steps").is_none());
    }

    #[test]
    fn test_non_heading_hash_is_ignored() {
        let doc = "## Code\n#not a heading\n###### Deep\nbody\n";
        let tree = SectionTree::parse(doc);
        assert!(tree.locate("not a heading").is_none());
        assert_eq!(tree.locate("Deep").unwrap().level, 6);
    }
}
