//! Precision/recall/F1 aggregation.
//!
//! Counts are micro-averaged: true positives, predicted positives and gold
//! positives are summed over the corpus before dividing. Per-document
//! scores use the same counts partitioned by document.
//!
//! Positives are counted over distinct `(document, span)` keys, so a
//! submission repeating the same span twice is not rewarded or punished
//! twice. True positives come from the alignment pairs.

use crate::align::AlignmentPair;
use crate::diag::{Diagnostic, Diagnostics};
use crate::record::AnnotationRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Scores and counts for one document.
///
/// `None` means undefined: the denominator was zero, which is different
/// from a true zero score. A document with no predictions has undefined
/// precision but a well-defined recall of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentScores {
    /// True positives in this document.
    pub true_positives: usize,
    /// Distinct predicted spans in this document.
    pub predicted_positives: usize,
    /// Distinct gold spans in this document.
    pub gold_positives: usize,
    /// TP / predicted positives, undefined when nothing was predicted.
    pub precision: Option<f64>,
    /// TP / gold positives.
    pub recall: Option<f64>,
    /// Harmonic mean of precision and recall; 0 when both are 0,
    /// undefined when precision is undefined.
    pub f1: Option<f64>,
}

/// Full metric output of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Per-document scores, keyed by document identifier.
    pub per_document: BTreeMap<String, DocumentScores>,
    /// Corpus-wide true positives.
    pub true_positives: usize,
    /// Corpus-wide distinct predicted spans.
    pub predicted_positives: usize,
    /// Corpus-wide distinct gold spans.
    pub gold_positives: usize,
    /// Micro-average precision. Unrounded; rounding is display-only.
    pub precision: f64,
    /// Micro-average recall.
    pub recall: f64,
    /// Micro-average F1.
    pub f1: f64,
}

/// Distinct `(document, span)` keys, overall and per document.
fn span_counts(records: &[AnnotationRecord]) -> (usize, HashMap<&str, usize>) {
    let mut seen: HashSet<(&str, usize, usize)> = HashSet::new();
    let mut per_doc: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if seen.insert((record.document_id.as_str(), record.start, record.end)) {
            *per_doc.entry(record.document_id.as_str()).or_default() += 1;
        }
    }
    (seen.len(), per_doc)
}

/// Compute the metric set from joined pairs and the full (pre-join) sides.
///
/// `predictions` is the prediction set as submitted (already restricted to
/// gold documents), `gold` the full gold set. Documents present only in
/// `predictions` keep contributing to the overall predicted-positive count
/// but are dropped from the per-document mapping; documents present only
/// in `gold` get an explicit zero-TP entry so their recall is 0, not
/// undefined. This asymmetry is intentional.
pub fn compute_metrics(
    pairs: &[AlignmentPair],
    predictions: &[AnnotationRecord],
    gold: &[AnnotationRecord],
    diag: &mut Diagnostics,
) -> MetricSet {
    let (predicted_positives, pred_per_doc) = span_counts(predictions);
    let (gold_positives, gold_per_doc) = span_counts(gold);

    let mut tp_per_doc: HashMap<&str, usize> = HashMap::new();
    let mut true_positives = 0usize;
    for pair in pairs.iter().filter(|p| p.is_valid) {
        *tp_per_doc.entry(pair.document_id.as_str()).or_default() += 1;
        true_positives += 1;
    }

    let mut per_document = BTreeMap::new();
    for (&doc, &doc_gold) in &gold_per_doc {
        let tp = tp_per_doc.get(doc).copied().unwrap_or(0);
        let doc_pred = pred_per_doc.get(doc).copied().unwrap_or(0);
        let precision = (doc_pred > 0).then(|| tp as f64 / doc_pred as f64);
        let recall = Some(tp as f64 / doc_gold as f64);
        let f1 = match (precision, recall) {
            (Some(p), Some(r)) if p + r > 0.0 => Some(2.0 * p * r / (p + r)),
            (Some(_), Some(_)) => Some(0.0),
            _ => None,
        };
        per_document.insert(
            doc.to_string(),
            DocumentScores {
                true_positives: tp,
                predicted_positives: doc_pred,
                gold_positives: doc_gold,
                precision,
                recall,
                f1,
            },
        );
    }

    let precision = ratio_or_zero(true_positives, predicted_positives, "micro-average precision", diag);
    let recall = ratio_or_zero(true_positives, gold_positives, "micro-average recall", diag);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        diag.push(Diagnostic::ZeroDivision {
            scope: "micro-average F-score".to_string(),
        });
        0.0
    };

    let metrics = MetricSet {
        per_document,
        true_positives,
        predicted_positives,
        gold_positives,
        precision,
        recall,
        f1,
    };
    check_bounds(&metrics, diag);
    metrics
}

fn ratio_or_zero(
    numerator: usize,
    denominator: usize,
    scope: &str,
    diag: &mut Diagnostics,
) -> f64 {
    if denominator == 0 {
        diag.push(Diagnostic::ZeroDivision {
            scope: scope.to_string(),
        });
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// No score may exceed 1; a violation means the engine itself is broken.
fn check_bounds(metrics: &MetricSet, diag: &mut Diagnostics) {
    let mut check = |scope: String, value: f64| {
        if value > 1.0 {
            diag.push(Diagnostic::MetricBound { scope, value });
        }
    };
    check("micro-average precision".to_string(), metrics.precision);
    check("micro-average recall".to_string(), metrics.recall);
    check("micro-average F-score".to_string(), metrics.f1);
    for (doc, scores) in &metrics.per_document {
        for (name, value) in [
            ("precision", scores.precision),
            ("recall", scores.recall),
            ("F-score", scores.f1),
        ] {
            if let Some(value) = value {
                check(format!("{doc} {name}"), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align, ScoringMode};
    use crate::record::AnnotationRecord;

    fn rec(doc: &str, start: usize, end: usize) -> AnnotationRecord {
        AnnotationRecord::new(doc, "T1", "ENFERMEDAD", start, end, "x")
    }

    fn eval(gold: &[AnnotationRecord], pred: &[AnnotationRecord]) -> (MetricSet, Diagnostics) {
        let pairs = align(gold, pred, ScoringMode::Entity, &[]);
        let mut diag = Diagnostics::new();
        let metrics = compute_metrics(&pairs, pred, gold, &mut diag);
        (metrics, diag)
    }

    #[test]
    fn test_perfect_match() {
        let gold = vec![rec("a.ann", 0, 5), rec("a.ann", 10, 15)];
        let (m, _) = eval(&gold, &gold.clone());
        assert_eq!(m.true_positives, 2);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1, 1.0);
    }

    #[test]
    fn test_duplicate_predictions_count_once() {
        let gold = vec![rec("a.ann", 0, 5)];
        let pred = vec![rec("a.ann", 0, 5), rec("a.ann", 0, 5)];
        let (m, _) = eval(&gold, &pred);
        assert_eq!(m.predicted_positives, 1);
        assert_eq!(m.precision, 1.0);
    }

    #[test]
    fn test_unpredicted_document_has_zero_recall() {
        let gold = vec![rec("a.ann", 0, 5), rec("b.ann", 0, 5)];
        let pred = vec![rec("a.ann", 0, 5)];
        let (m, _) = eval(&gold, &pred);
        let b = &m.per_document["b.ann"];
        assert_eq!(b.true_positives, 0);
        assert_eq!(b.recall, Some(0.0));
        assert_eq!(b.precision, None);
        assert_eq!(b.f1, None);
    }

    #[test]
    fn test_document_absent_from_gold_is_dropped_from_mapping() {
        // Restriction upstream keys off the gold file listing, which may
        // include documents whose parse later failed; those predictions
        // still reach the aggregator.
        let gold = vec![rec("a.ann", 0, 5)];
        let pred = vec![rec("a.ann", 0, 5), rec("ghost.ann", 0, 5)];
        let (m, _) = eval(&gold, &pred);
        assert!(!m.per_document.contains_key("ghost.ann"));
        // ...but the overall precision denominator still sees them.
        assert_eq!(m.predicted_positives, 2);
        assert_eq!(m.precision, 0.5);
    }

    #[test]
    fn test_zero_predictions_is_reported_not_fatal() {
        let gold = vec![rec("a.ann", 0, 5)];
        let (m, diag) = eval(&gold, &[]);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert!(diag.any(|d| matches!(d, Diagnostic::ZeroDivision { .. })));
    }

    #[test]
    fn test_all_wrong_f1_is_zero_not_nan() {
        let gold = vec![rec("a.ann", 0, 5)];
        let pred = vec![rec("a.ann", 50, 55)];
        let (m, diag) = eval(&gold, &pred);
        assert_eq!(m.f1, 0.0);
        assert!(diag.any(|d| matches!(
            d,
            Diagnostic::ZeroDivision { scope } if scope == "micro-average F-score"
        )));
        let a = &m.per_document["a.ann"];
        assert_eq!(a.precision, Some(0.0));
        assert_eq!(a.f1, Some(0.0));
    }

    #[test]
    fn test_scores_within_bounds() {
        let gold = vec![rec("a.ann", 0, 5), rec("b.ann", 3, 9)];
        let pred = vec![rec("a.ann", 0, 5), rec("b.ann", 2, 9)];
        let (m, diag) = eval(&gold, &pred);
        assert!(m.precision <= 1.0 && m.recall <= 1.0 && m.f1 <= 1.0);
        assert!(!diag.any(|d| matches!(d, Diagnostic::MetricBound { .. })));
    }
}
