//! Alignment of predicted records against the gold standard.
//!
//! Joining is exact: a prediction counts only when it sits in the same
//! document at the exact same character span as a gold annotation. No
//! partial-overlap or fuzzy matching is performed.
//!
//! The engine produces one [`AlignmentPair`] per gold record. Predictions
//! with no gold counterpart never enter the join; they affect precision
//! only through the predicted-positive counts the aggregator computes
//! independently.

use crate::codes::format_code;
use crate::record::AnnotationRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a prediction must get right to count as a true positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMode {
    /// Span match only (entity recognition).
    Entity,
    /// Span match plus terminology-code equality. The entity label joins
    /// the key as well, since typed exports may annotate several labels at
    /// one span.
    Normalization,
}

/// Result of joining one gold record with zero-or-one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentPair {
    /// Document both sides refer to.
    pub document_id: String,
    /// Span start offset.
    pub start: usize,
    /// Span end offset.
    pub end: usize,
    /// Gold entity label.
    pub label: String,
    /// Canonical gold code, if the gold record carried one.
    pub gold_code: Option<String>,
    /// Canonical predicted code at the same key, if any.
    pub pred_code: Option<String>,
    /// Whether a prediction existed at this key at all.
    pub matched: bool,
    /// Whether this pair counts as a true positive under the scoring mode.
    pub is_valid: bool,
}

/// One enumerated gold annotation allowed to match either of two codes.
///
/// The gold standard encodes such an annotation as two sibling rows at the
/// same span, one per alternative code. This is configuration data, not
/// alignment logic: extend or clear the table without touching [`align`].
/// General multi-code matching for ordinary submissions is intentionally
/// not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeException {
    /// Document the annotation lives in.
    pub document_id: String,
    /// Span start offset.
    pub start: usize,
    /// Span end offset.
    pub end: usize,
    /// Gold code of the sibling row that is removed after validity is
    /// settled, so the annotation contributes exactly one count.
    pub alternate_code: String,
}

impl CodeException {
    fn matches(&self, pair: &AlignmentPair) -> bool {
        pair.document_id == self.document_id
            && pair.start == self.start
            && pair.end == self.end
    }
}

/// The dual-code annotations present in the reference corpus.
#[must_use]
pub fn default_code_exceptions() -> Vec<CodeException> {
    vec![
        CodeException {
            document_id: "cc_onco838.ann".to_string(),
            start: 2509,
            end: 2534,
            alternate_code: "8441/0".to_string(),
        },
        CodeException {
            document_id: "cc_onco1057.ann".to_string(),
            start: 2791,
            end: 2831,
            alternate_code: "8803/3".to_string(),
        },
    ]
}

/// Join predictions against the gold standard.
///
/// `predictions` must already be restricted to documents present in the
/// gold standard. Codes are expected in canonical form (see
/// [`crate::codes::format_record_codes`]); equality is plain string
/// equality on the canonical shape.
#[must_use]
pub fn align(
    gold: &[AnnotationRecord],
    predictions: &[AnnotationRecord],
    mode: ScoringMode,
    exceptions: &[CodeException],
) -> Vec<AlignmentPair> {
    let label_in_key = mode == ScoringMode::Normalization;
    let key = |r: &AnnotationRecord| -> (String, usize, usize, Option<String>) {
        (
            r.document_id.clone(),
            r.start,
            r.end,
            label_in_key.then(|| r.label.clone()),
        )
    };

    let mut by_key: HashMap<(String, usize, usize, Option<String>), &AnnotationRecord> =
        HashMap::new();
    for prediction in predictions {
        by_key.entry(key(prediction)).or_insert(prediction);
    }

    let mut pairs: Vec<AlignmentPair> = gold
        .iter()
        .map(|g| {
            let counterpart = by_key.get(&key(g)).copied();
            let is_valid = match mode {
                ScoringMode::Entity => counterpart.is_some(),
                ScoringMode::Normalization => match (&g.code, counterpart.and_then(|p| p.code.as_ref())) {
                    (Some(gold_code), Some(pred_code)) => gold_code == pred_code,
                    _ => false,
                },
            };
            AlignmentPair {
                document_id: g.document_id.clone(),
                start: g.start,
                end: g.end,
                label: g.label.clone(),
                gold_code: g.code.clone(),
                pred_code: counterpart.and_then(|p| p.code.clone()),
                matched: counterpart.is_some(),
                is_valid,
            }
        })
        .collect();

    apply_code_exceptions(&mut pairs, exceptions);
    pairs
}

/// Settle the enumerated dual-code annotations.
///
/// If any pair at the exception's span is already valid, every pair at
/// that span becomes valid; the sibling whose gold code equals the
/// alternate is then removed unconditionally, so the span contributes one
/// pair to every aggregate whether or not it was matched.
fn apply_code_exceptions(pairs: &mut Vec<AlignmentPair>, exceptions: &[CodeException]) {
    for exception in exceptions {
        if pairs.iter().any(|p| exception.matches(p) && p.is_valid) {
            for pair in pairs.iter_mut().filter(|p| exception.matches(p)) {
                pair.is_valid = true;
            }
        }
        let alternate = format_code(&exception.alternate_code);
        pairs.retain(|p| {
            !(exception.matches(p) && p.gold_code.as_deref() == Some(alternate.as_str()))
        });
    }
}
