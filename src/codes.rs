//! Terminology-code canonicalization and validation.
//!
//! Annotations may carry several codes joined by `|` or `+`. Before codes
//! can be compared for equality they are brought to one canonical shape:
//! a single separator, no duplicates, components in lexicographic order.
//! `"9913|9913|3847"` and `"3847+9913"` both canonicalize to `"3847|9913"`.

use crate::diag::{Diagnostic, Diagnostics};
use crate::record::AnnotationRecord;
use std::collections::{BTreeSet, HashSet};

/// Canonical separator between codes of one annotation.
pub const CODE_SEPARATOR: char = '|';

/// Accepted alternative separator, unified to [`CODE_SEPARATOR`].
pub const ALT_SEPARATOR: char = '+';

/// Trailing qualifier attached to a code by annotators. Not part of the
/// code identity, so it is stripped before membership testing.
pub const QUALIFIER_SUFFIX: &str = "/H";

/// Canonicalize a raw code string.
///
/// Unifies separators, splits into components, drops empty components,
/// deduplicates, sorts lexicographically and rejoins. Idempotent:
/// canonicalizing an already-canonical string returns it unchanged.
///
/// # Example
///
/// ```rust
/// use clineval::codes::format_code;
///
/// assert_eq!(format_code("9913|9913|3847"), "3847|9913");
/// assert_eq!(format_code("3847+9913"), "3847|9913");
/// assert_eq!(format_code("3847|9913"), "3847|9913");
/// ```
#[must_use]
pub fn format_code(raw: &str) -> String {
    let components: BTreeSet<&str> = raw
        .split([CODE_SEPARATOR, ALT_SEPARATOR])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    components
        .into_iter()
        .collect::<Vec<_>>()
        .join(&CODE_SEPARATOR.to_string())
}

/// Canonicalize the code field of every record in place.
pub fn format_record_codes(records: &mut [AnnotationRecord]) {
    for record in records {
        if let Some(code) = &record.code {
            record.code = Some(format_code(code));
        }
    }
}

/// Strip the trailing qualifier suffix from one code component.
#[must_use]
pub fn strip_qualifier(component: &str) -> &str {
    component.strip_suffix(QUALIFIER_SUFFIX).unwrap_or(component)
}

/// Immutable set of acceptable terminology code strings.
///
/// Supplied externally (the reference list lives outside the core); its
/// lifetime is one evaluation run.
#[derive(Debug, Clone, Default)]
pub struct CodeSet {
    codes: HashSet<String>,
}

impl CodeSet {
    /// Build a set from code strings.
    pub fn new(codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of codes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Membership test for one code component, qualifier stripped.
    #[must_use]
    pub fn contains(&self, component: &str) -> bool {
        self.codes.contains(strip_qualifier(component))
    }

    /// Whether every component of a canonical code is in the set.
    ///
    /// An empty code has no valid components and is invalid.
    #[must_use]
    pub fn is_valid(&self, canonical_code: &str) -> bool {
        !canonical_code.is_empty()
            && canonical_code
                .split(CODE_SEPARATOR)
                .all(|component| self.contains(component))
    }
}

impl<S: Into<String>> FromIterator<S> for CodeSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Remove records whose codes are invalid against the set.
///
/// A record is invalid if it carries no code or if any component of its
/// canonicalized code is absent from the set. Removals are reported with
/// the affected row identity; this is deliberate, unlike span-duplicate
/// collapsing, because a bad code usually means a submission defect the
/// participant should hear about.
pub fn retain_valid_codes(
    records: Vec<AnnotationRecord>,
    valid: &CodeSet,
    diag: &mut Diagnostics,
) -> Vec<AnnotationRecord> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        let ok = record.code.as_deref().is_some_and(|code| valid.is_valid(code));
        if ok {
            kept.push(record);
        } else {
            diag.push(Diagnostic::InvalidCode {
                document_id: record.document_id.clone(),
                mark_id: record.mark_id.clone(),
                code: record.code.clone().unwrap_or_default(),
            });
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AnnotationRecord;

    #[test]
    fn test_format_unifies_separators() {
        assert_eq!(format_code("3847+9913"), "3847|9913");
        assert_eq!(format_code("9913|3847"), "3847|9913");
    }

    #[test]
    fn test_format_dedups_and_sorts() {
        assert_eq!(format_code("9913|9913|3847"), "3847|9913");
        assert_eq!(format_code("9913|3847|9913"), "3847|9913");
    }

    #[test]
    fn test_format_strips_stray_separators() {
        assert_eq!(format_code("|3847|"), "3847");
        assert_eq!(format_code("+3847"), "3847");
        assert_eq!(format_code(" 3847 | 9913 "), "3847|9913");
    }

    #[test]
    fn test_format_idempotent() {
        let once = format_code("9913+3847|9913");
        assert_eq!(format_code(&once), once);
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_code(""), "");
        assert_eq!(format_code("||"), "");
    }

    #[test]
    fn test_qualifier_stripped_for_membership() {
        let set = CodeSet::new(["8000/3"]);
        assert!(set.contains("8000/3/H"));
        assert!(set.is_valid("8000/3/H"));
    }

    #[test]
    fn test_multi_code_validity_requires_all() {
        let set = CodeSet::new(["3847", "9913"]);
        assert!(set.is_valid("3847|9913"));
        assert!(!set.is_valid("3847|0000"));
        assert!(!set.is_valid(""));
    }

    #[test]
    fn test_retain_valid_reports_removals() {
        let mut diag = Diagnostics::new();
        let set = CodeSet::new(["3847"]);
        let records = vec![
            AnnotationRecord::new("a.ann", "T1", "X", 0, 5, "x").with_code("3847"),
            AnnotationRecord::new("a.ann", "T2", "X", 6, 9, "y").with_code("0000"),
        ];
        let kept = retain_valid_codes(records, &set, &mut diag);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].mark_id, "T1");
        assert!(diag.any(|d| matches!(
            d,
            Diagnostic::InvalidCode { mark_id, .. } if mark_id == "T2"
        )));
    }

    #[test]
    fn test_retain_valid_drops_missing_code() {
        let mut diag = Diagnostics::new();
        let set = CodeSet::new(["3847"]);
        let records = vec![AnnotationRecord::new("a.ann", "T1", "X", 0, 5, "x")];
        let kept = retain_valid_codes(records, &set, &mut diag);
        assert!(kept.is_empty());
        assert_eq!(diag.len(), 1);
    }
}
