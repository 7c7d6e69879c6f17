//! End-to-end normalization scoring: codes, validity filtering and the
//! enumerated dual-code annotations.

use clineval::codes::{format_record_codes, retain_valid_codes};
use clineval::prelude::*;

fn rec(doc: &str, mark: &str, start: usize, end: usize, code: &str) -> AnnotationRecord {
    AnnotationRecord::new(doc, mark, "ENFERMEDAD", start, end, "x").with_code(code)
}

#[test]
fn test_code_mismatch_costs_a_true_positive() {
    // Ten gold spans, seven predicted at the exact span, one of those with
    // the wrong code: TP = 6, predicted positives stay 7.
    let gold = vec![
        rec("caso1.ann", "T1", 0, 5, "8500/3"),
        rec("caso1.ann", "T2", 10, 18, "8000/3"),
        rec("caso1.ann", "T3", 25, 31, "8010/3"),
        rec("caso1.ann", "T4", 40, 52, "8140/3"),
        rec("caso1.ann", "T5", 60, 66, "8070/3"),
        rec("caso2.ann", "T1", 3, 9, "8500/3"),
        rec("caso2.ann", "T2", 15, 22, "8041/3"),
        rec("caso2.ann", "T3", 30, 38, "8046/3"),
        rec("caso2.ann", "T4", 45, 51, "8246/3"),
        rec("caso2.ann", "T5", 70, 81, "8013/3"),
    ];
    let predictions = vec![
        rec("caso1.ann", "T1", 0, 5, "8500/3"),
        rec("caso1.ann", "T2", 10, 18, "8000/3"),
        rec("caso1.ann", "T3", 25, 31, "8010/3"),
        rec("caso1.ann", "T4", 40, 52, "9999/9"), // wrong code at a right span
        rec("caso2.ann", "T1", 3, 9, "8500/3"),
        rec("caso2.ann", "T2", 15, 22, "8041/3"),
        rec("caso2.ann", "T3", 30, 38, "8046/3"),
    ];

    let mut diag = Diagnostics::new();
    let metrics = clineval::evaluate(
        gold,
        predictions,
        ScoringMode::Normalization,
        &default_code_exceptions(),
        &mut diag,
    );

    assert_eq!(metrics.true_positives, 6);
    assert_eq!(metrics.predicted_positives, 7);
    assert_eq!(metrics.gold_positives, 10);
    assert!((metrics.precision - 6.0 / 7.0).abs() < 1e-12);
    assert!((metrics.recall - 0.6).abs() < 1e-12);
    let p = 6.0 / 7.0;
    let r = 0.6;
    assert!((metrics.f1 - 2.0 * p * r / (p + r)).abs() < 1e-12);
}

#[test]
fn test_separator_variants_score_identically() {
    let gold = vec![rec("caso1.ann", "T1", 0, 5, "3847|9913")];
    let mut predictions = vec![rec("caso1.ann", "T1", 0, 5, "9913+3847|9913")];
    let mut gold_canonical = gold.clone();
    format_record_codes(&mut gold_canonical);
    format_record_codes(&mut predictions);

    let mut diag = Diagnostics::new();
    let metrics = clineval::evaluate(
        gold_canonical,
        predictions,
        ScoringMode::Normalization,
        &[],
        &mut diag,
    );
    assert_eq!(metrics.true_positives, 1);
    assert_eq!(metrics.f1, 1.0);
}

#[test]
fn test_invalid_codes_removed_before_scoring() {
    let valid = CodeSet::new(["8500/3"]);
    let predictions = vec![
        rec("caso1.ann", "T1", 0, 5, "8500/3"),
        rec("caso1.ann", "T2", 10, 15, "0000/0"),
    ];
    let mut diag = Diagnostics::new();
    let kept = retain_valid_codes(predictions, &valid, &mut diag);
    assert_eq!(kept.len(), 1);
    assert!(diag.any(|d| matches!(
        d,
        Diagnostic::InvalidCode { document_id, .. } if document_id == "caso1.ann"
    )));

    let gold = vec![rec("caso1.ann", "T1", 0, 5, "8500/3")];
    let metrics =
        clineval::evaluate(gold, kept, ScoringMode::Normalization, &[], &mut diag);
    assert_eq!(metrics.true_positives, 1);
    assert_eq!(metrics.predicted_positives, 1);
}

/// The reference gold standard annotates `cc_onco838.ann` at 2509-2534 with
/// two alternative codes; matching either must score exactly one true
/// positive with no double-counted denominator.
#[test]
fn test_dual_code_annotation_matches_either_code() {
    for predicted_code in ["8441/3", "8441/0"] {
        let gold = vec![
            rec("cc_onco838.ann", "T1", 2509, 2534, "8441/3"),
            rec("cc_onco838.ann", "T1", 2509, 2534, "8441/0"),
            rec("cc_onco838.ann", "T2", 2600, 2610, "8000/3"),
        ];
        let predictions = vec![rec("cc_onco838.ann", "T1", 2509, 2534, predicted_code)];

        let mut diag = Diagnostics::new();
        let metrics = clineval::evaluate(
            gold,
            predictions,
            ScoringMode::Normalization,
            &default_code_exceptions(),
            &mut diag,
        );

        assert_eq!(metrics.true_positives, 1, "predicted {predicted_code}");
        assert_eq!(metrics.gold_positives, 2);
        assert!((metrics.recall - 0.5).abs() < 1e-12);
        assert!((metrics.precision - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_dual_code_annotation_unmatched_counts_one_miss() {
    let gold = vec![
        rec("cc_onco838.ann", "T1", 2509, 2534, "8441/3"),
        rec("cc_onco838.ann", "T1", 2509, 2534, "8441/0"),
    ];
    let mut diag = Diagnostics::new();
    let metrics = clineval::evaluate(
        gold,
        Vec::new(),
        ScoringMode::Normalization,
        &default_code_exceptions(),
        &mut diag,
    );
    assert_eq!(metrics.true_positives, 0);
    assert_eq!(metrics.gold_positives, 1);
    let doc = &metrics.per_document["cc_onco838.ann"];
    assert_eq!(doc.recall, Some(0.0));
}
