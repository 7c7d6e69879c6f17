//! Flat tabular annotation parsing.
//!
//! Submissions may arrive as one tab-delimited file instead of a stand-off
//! directory. The first row is a header naming columns from the fixed
//! vocabulary `{filename, mark, label, off0, off1, span, code,
//! semantic_rel}`; quoting is disabled and every cell is read as
//! uninterpreted text.
//!
//! Exactly three header shapes are recognized:
//!
//! | Shape | Columns | Used for |
//! |-------|---------|----------|
//! | NER | `filename, mark, label, off0, off1, span` | entity recognition |
//! | Normalization | `…, code` | normalization predictions |
//! | Normalization gold | `…, code, semantic_rel` | normalization gold standard |
//!
//! Any other header aborts the run: a shape mismatch means the file belongs
//! to a different subtask or is malformed as a whole.

use crate::diag::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};
use crate::record::AnnotationRecord;
use std::fs;
use std::path::Path;

const NER_HEADER: &[&str] = &["filename", "mark", "label", "off0", "off1", "span"];
const NORM_HEADER: &[&str] = &["filename", "mark", "label", "off0", "off1", "span", "code"];
const NORM_GOLD_HEADER: &[&str] = &[
    "filename",
    "mark",
    "label",
    "off0",
    "off1",
    "span",
    "code",
    "semantic_rel",
];

/// Recognized flat-table header shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSchema {
    /// Span columns only.
    Ner,
    /// Span columns plus a terminology code.
    Norm,
    /// Span columns plus code and a semantic-relation column (gold exports).
    NormGold,
}

impl TableSchema {
    /// Identify the schema from header columns, or fail the run.
    pub fn detect(path: &Path, header: &[String]) -> Result<Self> {
        let cols: Vec<&str> = header.iter().map(String::as_str).collect();
        if cols == NER_HEADER {
            Ok(TableSchema::Ner)
        } else if cols == NORM_HEADER {
            Ok(TableSchema::Norm)
        } else if cols == NORM_GOLD_HEADER {
            Ok(TableSchema::NormGold)
        } else {
            Err(Error::header_shape(path.display().to_string(), header))
        }
    }

    /// Whether rows of this schema carry a terminology code.
    #[must_use]
    pub fn has_code(self) -> bool {
        !matches!(self, TableSchema::Ner)
    }

    /// Number of columns a row must have.
    #[must_use]
    pub fn column_count(self) -> usize {
        match self {
            TableSchema::Ner => NER_HEADER.len(),
            TableSchema::Norm => NORM_HEADER.len(),
            TableSchema::NormGold => NORM_GOLD_HEADER.len(),
        }
    }
}

/// Parse a flat tabular annotation file into canonical records.
///
/// Returns the detected schema alongside the records so the caller can
/// check that the file matches the requested subtask. An empty result
/// after label filtering is reported as a warning, not an error.
pub fn parse_table_file(
    path: &Path,
    relevant_labels: &[String],
    diag: &mut Diagnostics,
) -> Result<(TableSchema, Vec<AnnotationRecord>)> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();
    let header: Vec<String> = match lines.next() {
        Some(line) => line.split('\t').map(str::to_string).collect(),
        None => return Err(Error::header_shape(path.display().to_string(), &[])),
    };
    let schema = TableSchema::detect(path, &header)?;

    let mut records = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() != schema.column_count() {
            return Err(Error::table(
                path.display().to_string(),
                format!(
                    "row {} has {} columns, expected {}",
                    line_no + 2,
                    cells.len(),
                    schema.column_count()
                ),
            ));
        }
        let label = cells[2];
        if !relevant_labels.iter().any(|l| l == label) {
            continue;
        }
        let parse_offset = |cell: &str, name: &str| -> Result<usize> {
            cell.trim().parse().map_err(|_| {
                Error::table(
                    path.display().to_string(),
                    format!("row {}: {name} {cell:?} is not an integer", line_no + 2),
                )
            })
        };
        let start = parse_offset(cells[3], "off0")?;
        let end = parse_offset(cells[4], "off1")?;

        let mut record =
            AnnotationRecord::new(cells[0], cells[1], label, start, end, cells[5]);
        if schema.has_code() {
            record = record.with_code(cells[6]);
        }
        records.push(record);
    }

    if records.is_empty() {
        diag.push(Diagnostic::EmptyAnnotations {
            source: path.display().to_string(),
        });
    }
    Ok((schema, records))
}
