//! Plain-text rendering of a [`MetricSet`].
//!
//! Rendering is display-only: values are rounded to three decimals here,
//! while the metric set keeps the unrounded numbers. Undefined scores
//! render as `NaN` so they cannot be mistaken for a true zero.

use crate::metrics::MetricSet;
use std::fmt::Write;

const RULE: &str = "-----------------------------------------------------";

fn display(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "NaN".to_string(),
    }
}

/// Render the per-document report: one dashed table per metric.
#[must_use]
pub fn render_individual(metrics: &MetricSet) -> String {
    let mut out = String::new();
    for (title, pick) in [
        ("Precision", 0usize),
        ("Recall", 1),
        ("F-score", 2),
    ] {
        let _ = writeln!(out, "\n{RULE}");
        let _ = writeln!(out, "Clinical case name\t\t\t{title}");
        let _ = writeln!(out, "{RULE}");
        for (doc, scores) in &metrics.per_document {
            let value = match pick {
                0 => scores.precision,
                1 => scores.recall,
                _ => scores.f1,
            };
            let _ = writeln!(out, "{doc}\t\t{}", display(value));
            let _ = writeln!(out, "{RULE}");
        }
    }
    out
}

/// Render the corpus-level report, ending in the fixed summary line.
#[must_use]
pub fn render_general(metrics: &MetricSet, pred_path: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "Micro-average metrics");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "\nMicro-average precision = {:.3}\n", metrics.precision);
    let _ = writeln!(out, "\nMicro-average recall = {:.3}\n", metrics.recall);
    let _ = writeln!(out, "\nMicro-average F-score = {:.3}\n", metrics.f1);
    let _ = writeln!(out, "{}", summary_line(metrics, pred_path));
    out
}

/// The fixed-format summary line `path|P|R|F1`.
#[must_use]
pub fn summary_line(metrics: &MetricSet, pred_path: &str) -> String {
    format!(
        "{pred_path}|{:.3}|{:.3}|{:.3}",
        metrics.precision, metrics.recall, metrics.f1
    )
}
