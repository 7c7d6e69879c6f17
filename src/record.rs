//! Canonical annotation record model.
//!
//! All parsers produce `AnnotationRecord` sequences; everything downstream
//! (code validation, alignment, metrics) consumes them. A record is one
//! labeled text span in one document, optionally carrying a terminology
//! code when the run scores normalization.

use crate::diag::{Diagnostic, Diagnostics};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One labeled span parsed from an annotation source.
///
/// Offsets are character positions into the document text, half-open
/// (`start < end`). `text` is the covered surface form; it is kept for
/// diagnostics and never used in matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Stable identifier of the source document, derived from the
    /// originating annotation file name (e.g. `cc_onco838.ann`).
    pub document_id: String,
    /// Local identifier of the annotation within its source file
    /// (e.g. `T1`); empty for flat exports that omit it.
    pub mark_id: String,
    /// Entity type label (e.g. `ENFERMEDAD`).
    pub label: String,
    /// Span start, character offset.
    pub start: usize,
    /// Span end, character offset, exclusive.
    pub end: usize,
    /// Surface text covered by the span.
    pub text: String,
    /// Terminology code(s), present only in normalization mode. Multiple
    /// codes are joined by a separator; see [`crate::codes::format_code`].
    pub code: Option<String>,
}

impl AnnotationRecord {
    /// Create a record without a terminology code (entity mode).
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        mark_id: impl Into<String>,
        label: impl Into<String>,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            mark_id: mark_id.into(),
            label: label.into(),
            start,
            end,
            text: text.into(),
            code: None,
        }
    }

    /// Attach a terminology code (normalization mode).
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The span join key within this record's document.
    #[must_use]
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

/// Collapse duplicate records, first-seen wins.
///
/// Identity is `(document_id, label, start, end, code)`. The code field
/// participates so that gold rows sharing a span but carrying alternative
/// codes (the enumerated disjunctive cases) both survive to alignment; for
/// code-less records this degrades to the `(document, label, offset)` key.
/// Each collapse is reported through the sink; it is never an error.
pub fn collapse_duplicates(
    records: Vec<AnnotationRecord>,
    diag: &mut Diagnostics,
) -> Vec<AnnotationRecord> {
    let mut seen: HashSet<(String, String, usize, usize, Option<String>)> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        let key = (
            record.document_id.clone(),
            record.label.clone(),
            record.start,
            record.end,
            record.code.clone(),
        );
        if seen.insert(key) {
            kept.push(record);
        } else {
            diag.push(Diagnostic::DuplicateCollapsed {
                document_id: record.document_id.clone(),
                label: record.label.clone(),
                start: record.start,
                end: record.end,
            });
        }
    }
    kept
}

/// Distinct document identifiers in a record sequence, in first-seen order.
#[must_use]
pub fn document_ids(records: &[AnnotationRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for record in records {
        if seen.insert(record.document_id.as_str()) {
            ids.push(record.document_id.clone());
        }
    }
    ids
}
