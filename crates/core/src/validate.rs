//! Conformance checks over a decoded record array.
//!
//! Field presence and category values are already enforced by decoding; the
//! checks here cover the relationships between records.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use docindex_common::{Category, SearchRecord};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks an invariant consumers rely on.
    Error,
    /// Unusual but usable.
    Warning,
}

/// What is wrong with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// Same anchored location and category as an earlier record.
    DuplicateAnchor {
        /// Position of the earlier record.
        first: usize,
    },
    /// Method without docstring.
    EmptyMethodText,
    /// Location has more than one `#`.
    MultipleFragments,
    /// Record has no title.
    EmptyTitle,
    /// Record has no page grouping.
    EmptyPage,
}

impl IssueKind {
    /// Severity of this kind of issue.
    pub fn severity(self) -> Severity {
        match self {
            IssueKind::DuplicateAnchor { .. }
            | IssueKind::EmptyMethodText
            | IssueKind::MultipleFragments => Severity::Error,
            IssueKind::EmptyTitle | IssueKind::EmptyPage => Severity::Warning,
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Position of the record in the array.
    pub index: usize,
    /// Location of the record.
    pub location: String,
    /// Severity of `kind`.
    pub severity: Severity,
    /// The finding itself.
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    /// Severity of the finding.
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            IssueKind::DuplicateAnchor { first } => {
                format!("duplicate anchor, first defined by record {first}")
            }
            IssueKind::EmptyMethodText => "method record has empty docstring".to_string(),
            IssueKind::MultipleFragments => "location has more than one '#'".to_string(),
            IssueKind::EmptyTitle => "record has empty title".to_string(),
            IssueKind::EmptyPage => "record has empty page".to_string(),
        };
        write!(f, "record {} ('{}'): {}", self.index, self.location, what)
    }
}

/// All findings for an index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Number of records checked.
    pub records: usize,
    /// Findings in record order.
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// True when there are no error-level issues.
    pub fn is_conformant(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Error-level issues.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Error)
    }

    /// Rewrite record indices as positions in the source array.
    ///
    /// `positions[i]` is the source position of the `i`-th validated record,
    /// as reported by [`crate::codec::ParseOutcome::positions`]; positions
    /// differ from indices once a tolerant parse dropped records.
    pub fn at_source_positions(mut self, positions: &[usize]) -> Self {
        let source = |index: usize| positions.get(index).copied().unwrap_or(index);
        for issue in &mut self.issues {
            issue.index = source(issue.index);
            if let IssueKind::DuplicateAnchor { first } = &mut issue.kind {
                *first = source(*first);
            }
        }
        self
    }

    /// Warning-level issues.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Warning)
    }
}

/// Check `records` against the format invariants.
pub fn validate(records: &[SearchRecord]) -> ValidationReport {
    let mut issues = Vec::new();
    let mut anchors: HashMap<(&str, Category), usize> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        let mut push = |kind| {
            issues.push(Issue {
                index,
                location: record.location.clone(),
                severity: IssueKind::severity(kind),
                kind,
            });
        };

        if record.category.is_anchored() {
            if let Some(&first) = anchors.get(&(record.location.as_str(), record.category)) {
                push(IssueKind::DuplicateAnchor { first });
            } else {
                anchors.insert((record.location.as_str(), record.category), index);
            }
        }

        if record.location.matches('#').count() > 1 {
            push(IssueKind::MultipleFragments);
        }

        if record.category == Category::Method && record.text.trim().is_empty() {
            push(IssueKind::EmptyMethodText);
        }

        if record.title.trim().is_empty() {
            push(IssueKind::EmptyTitle);
        }

        if record.page.trim().is_empty() {
            push(IssueKind::EmptyPage);
        }
    }

    let report = ValidationReport {
        records: records.len(),
        issues,
    };
    tracing::debug!(
        "validate: {} records, {} errors, {} warnings",
        report.records,
        report.errors().count(),
        report.warnings().count()
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn method(location: &str, text: &str) -> SearchRecord {
        SearchRecord::new(location, "API Reference", "foo", text, Category::Method)
    }

    #[test]
    fn test_clean_index_is_conformant() {
        let records = vec![
            SearchRecord::new("apireference/#Documentation", "API Reference", "Documentation", "", Category::Section),
            SearchRecord::new("apireference/", "API Reference", "API Reference", "Modules = [Foo]", Category::Page),
            method("apireference/#foo", "foo(x)"),
            method("apireference/#bar", "bar(x)"),
        ];
        let report = validate(&records);
        assert!(report.is_conformant());
        assert!(report.issues.is_empty());
        assert_eq!(report.records, 4);
    }

    #[test]
    fn test_duplicate_method_anchor_is_error() {
        let records = vec![
            method("apireference/#foo", "first"),
            method("apireference/#foo", "second"),
        ];
        let report = validate(&records);
        assert!(!report.is_conformant());
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].index, 1);
        assert_eq!(report.issues[0].kind, IssueKind::DuplicateAnchor { first: 0 });
    }

    #[test]
    fn test_same_location_different_category_is_fine() {
        let records = vec![
            SearchRecord::new("guide/#Setup", "Guide", "Setup", "", Category::Section),
            SearchRecord::new("guide/#Setup", "Guide", "Setup", "setup()", Category::Method),
        ];
        assert!(validate(&records).is_conformant());
    }

    #[test]
    fn test_repeated_page_paragraphs_allowed() {
        let records = vec![
            SearchRecord::new("", "Home", "Home", "First paragraph.", Category::Page),
            SearchRecord::new("", "Home", "Home", "Second paragraph.", Category::Page),
        ];
        assert!(validate(&records).is_conformant());
    }

    #[test]
    fn test_empty_method_text_is_error() {
        let report = validate(&[method("apireference/#foo", "  \n")]);
        assert!(!report.is_conformant());
        assert_eq!(report.issues[0].kind, IssueKind::EmptyMethodText);
    }

    #[test]
    fn test_multiple_fragments_is_error() {
        let records = vec![SearchRecord::new("a/#b#c", "A", "b", "", Category::Section)];
        let report = validate(&records);
        assert_eq!(report.issues[0].kind, IssueKind::MultipleFragments);
        assert!(!report.is_conformant());
    }

    #[test]
    fn test_warnings_do_not_break_conformance() {
        let records = vec![SearchRecord::new("a/", "", "", "", Category::Page)];
        let report = validate(&records);
        assert!(report.is_conformant());
        assert_eq!(report.warnings().count(), 2);
    }

    #[test]
    fn test_issue_positions_follow_source_after_drops() {
        use crate::codec::{self, ParseMode};

        let input = r#"[
            {"bad":1},
            {"location":"a/#x","page":"A","title":"x","text":"","category":"section"},
            {"location":"a/#x","page":"A","title":"x","text":"","category":"section"}
        ]"#;
        let outcome = codec::parse(input, ParseMode::Tolerant).unwrap();
        assert_eq!(outcome.dropped[0].position, 0);

        let report = validate(&outcome.index.records).at_source_positions(&outcome.positions);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].index, 2);
        assert_eq!(report.issues[0].kind, IssueKind::DuplicateAnchor { first: 1 });
        assert_eq!(
            report.issues[0].to_string(),
            "record 2 ('a/#x'): duplicate anchor, first defined by record 1"
        );
    }

    #[test]
    fn test_issue_display_and_json() {
        let issue = Issue {
            index: 3,
            location: "a/#x".to_string(),
            severity: Severity::Error,
            kind: IssueKind::DuplicateAnchor { first: 1 },
        };
        assert_eq!(
            issue.to_string(),
            "record 3 ('a/#x'): duplicate anchor, first defined by record 1"
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "duplicate_anchor");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["first"], 1);
    }
}
