//! Structured diagnostics for recoverable conditions.
//!
//! Every component that can skip or drop data takes a `&mut Diagnostics`
//! sink and records what it did there. Nothing is written to a global
//! warning channel; the caller decides whether diagnostics go to stderr,
//! a report file, or a test assertion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One recoverable condition observed during an evaluation run.
///
/// Each variant carries the identifiers needed to locate the affected
/// input, so a diagnostic is actionable without re-running the evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A stand-off file was discarded because a line did not split into
    /// exactly three tab fields.
    MalformedLine {
        /// Path of the discarded file.
        path: String,
        /// The offending line, verbatim.
        line: String,
        /// How many tab fields the line actually had.
        found_fields: usize,
    },

    /// A stand-off file was discarded because a text-span line declared a
    /// discontinuous (semicolon-joined) span.
    DiscontinuousSpan {
        /// Path of the discarded file.
        path: String,
        /// The offending line, verbatim.
        line: String,
    },

    /// A stand-off file was discarded because a span declaration did not
    /// carry two integer offsets.
    BadOffsets {
        /// Path of the discarded file.
        path: String,
        /// The offending line, verbatim.
        line: String,
    },

    /// Two records with the same identity collapsed to one (first-seen wins).
    DuplicateCollapsed {
        /// Document the duplicate belonged to.
        document_id: String,
        /// Entity label of the duplicate.
        label: String,
        /// Span start offset.
        start: usize,
        /// Span end offset.
        end: usize,
    },

    /// An input yielded no qualifying annotations after filtering.
    EmptyAnnotations {
        /// The input path or description that produced nothing.
        source: String,
    },

    /// A record was removed because one of its terminology codes is not in
    /// the valid-code set.
    InvalidCode {
        /// Document the record belonged to.
        document_id: String,
        /// Mark identifier of the record within its file.
        mark_id: String,
        /// The canonicalized code that failed validation.
        code: String,
    },

    /// A score was defined as zero to avoid division by zero.
    ZeroDivision {
        /// Which score was zeroed (e.g. "micro-average F-score").
        scope: String,
    },

    /// A computed score exceeded 1. This signals an internal defect, not a
    /// data problem.
    MetricBound {
        /// Which score violated the bound.
        scope: String,
        /// The out-of-range value.
        value: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedLine {
                path,
                line,
                found_fields,
            } => write!(
                f,
                "{path}: line with {found_fields} tabular splits (expected 3): {line:?}; skipping this file"
            ),
            Diagnostic::DiscontinuousSpan { path, line } => write!(
                f,
                "{path}: text span with discontinuous annotation: {line:?}; skipping this file"
            ),
            Diagnostic::BadOffsets { path, line } => write!(
                f,
                "{path}: span offsets are not integers: {line:?}; skipping this file"
            ),
            Diagnostic::DuplicateCollapsed {
                document_id,
                label,
                start,
                end,
            } => write!(
                f,
                "{document_id}: duplicate {label} annotation at {start} {end} collapsed"
            ),
            Diagnostic::EmptyAnnotations { source } => {
                write!(f, "{source}: no parsed annotations")
            }
            Diagnostic::InvalidCode {
                document_id,
                mark_id,
                code,
            } => write!(
                f,
                "{document_id} {mark_id}: code {code:?} is not in the valid-code list; row removed"
            ),
            Diagnostic::ZeroDivision { scope } => {
                write!(f, "{scope} set to zero to avoid division by zero")
            }
            Diagnostic::MetricBound { scope, value } => write!(
                f,
                "{scope} is {value}, greater than 1: internal defect, please report"
            ),
        }
    }
}

/// Ordered collection of diagnostics for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Whether anything was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over recorded diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Whether any recorded diagnostic matches the predicate.
    pub fn any(&self, pred: impl FnMut(&Diagnostic) -> bool) -> bool {
        self.items.iter().any(pred)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_one_line() {
        let d = Diagnostic::InvalidCode {
            document_id: "cc_onco1.ann".into(),
            mark_id: "T3".into(),
            code: "9999/9".into(),
        };
        let rendered = d.to_string();
        assert!(rendered.contains("cc_onco1.ann"));
        assert!(rendered.contains("T3"));
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn test_sink_preserves_order() {
        let mut sink = Diagnostics::new();
        sink.push(Diagnostic::EmptyAnnotations {
            source: "a".into(),
        });
        sink.push(Diagnostic::ZeroDivision {
            scope: "micro-average F-score".into(),
        });
        assert_eq!(sink.len(), 2);
        let kinds: Vec<_> = sink.iter().collect();
        assert!(matches!(kinds[0], Diagnostic::EmptyAnnotations { .. }));
        assert!(matches!(kinds[1], Diagnostic::ZeroDivision { .. }));
    }
}
