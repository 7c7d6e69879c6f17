//! # clineval
//!
//! Evaluation of clinical-entity annotations against a human-curated gold
//! standard: precision, recall and F1 per document and micro-averaged over
//! the corpus.
//!
//! Two annotation encodings are supported:
//!
//! - **Stand-off** directories of brat `.ann` files (typed spans, binary
//!   relations, annotator notes carrying terminology codes).
//! - **Flat tables**, tab-delimited with a fixed header vocabulary.
//!
//! Two scoring modes:
//!
//! | Mode | A prediction counts when |
//! |------|--------------------------|
//! | Entity | it sits at the exact gold span in the same document |
//! | Normalization | the span matches and the canonical terminology codes are equal |
//!
//! ## Quick start
//!
//! ```rust
//! use clineval::prelude::*;
//!
//! let gold = vec![
//!     AnnotationRecord::new("caso1.ann", "T1", "ENFERMEDAD", 10, 25, "carcinoma ductal"),
//!     AnnotationRecord::new("caso1.ann", "T2", "ENFERMEDAD", 40, 48, "adenoma"),
//! ];
//! let predictions = vec![
//!     AnnotationRecord::new("caso1.ann", "T1", "ENFERMEDAD", 10, 25, "carcinoma ductal"),
//! ];
//!
//! let mut diag = Diagnostics::new();
//! let metrics = clineval::evaluate(gold, predictions, ScoringMode::Entity, &[], &mut diag);
//! assert_eq!(metrics.true_positives, 1);
//! assert_eq!(metrics.recall, 0.5);
//! ```
//!
//! ## Pipeline
//!
//! raw files → [`standoff`]/[`table`] parser → canonical [`record`]s →
//! ([`codes`] canonicalization and validation, normalization mode only) →
//! [`align`]ment → [`metrics`] aggregation → [`report`] rendering.
//!
//! Recoverable conditions (skipped files, dropped rows, zeroed scores)
//! surface as [`diag::Diagnostic`] values in an explicit sink; only
//! run-fatal conditions become [`Error`].

#![warn(missing_docs)]

pub mod align;
pub mod cli;
pub mod codes;
pub mod diag;
mod error;
pub mod metrics;
pub mod record;
pub mod report;
pub mod standoff;
pub mod table;

pub use error::{Error, Result};

use align::{align, CodeException, ScoringMode};
use diag::Diagnostics;
use metrics::{compute_metrics, MetricSet};
use record::{collapse_duplicates, AnnotationRecord};

/// Run the record-level evaluation pipeline.
///
/// Collapses duplicates on both sides, aligns predictions against the gold
/// standard and aggregates the metrics. `predictions` must already be
/// restricted to documents present in the gold standard, and in
/// normalization mode both sides must carry canonical codes (see
/// [`codes::format_record_codes`]).
pub fn evaluate(
    gold: Vec<AnnotationRecord>,
    predictions: Vec<AnnotationRecord>,
    mode: ScoringMode,
    exceptions: &[CodeException],
    diag: &mut Diagnostics,
) -> MetricSet {
    let gold = collapse_duplicates(gold, diag);
    let predictions = collapse_duplicates(predictions, diag);
    let pairs = align(&gold, &predictions, mode, exceptions);
    compute_metrics(&pairs, &predictions, &gold, diag)
}

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use clineval::prelude::*;
    //!
    //! let mut diag = Diagnostics::new();
    //! let metrics = clineval::evaluate(vec![], vec![], ScoringMode::Entity, &[], &mut diag);
    //! assert_eq!(metrics.gold_positives, 0);
    //! ```
    pub use crate::align::{default_code_exceptions, AlignmentPair, CodeException, ScoringMode};
    pub use crate::codes::{format_code, CodeSet};
    pub use crate::diag::{Diagnostic, Diagnostics};
    pub use crate::error::{Error, Result};
    pub use crate::metrics::{DocumentScores, MetricSet};
    pub use crate::record::AnnotationRecord;
}
