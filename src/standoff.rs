//! Stand-off annotation parsing (brat `.ann` directories).
//!
//! Each file holds tab-delimited lines referencing the document text by
//! character offset:
//!
//! ```text
//! T1	ENFERMEDAD 2509 2534	carcinoma ductal infiltrante
//! R1	Rel Arg1:T1 Arg2:T2
//! #1	AnnotatorNotes T1	8500/3
//! ```
//!
//! - `T` lines are typed text spans (`id<TAB>LABEL start end<TAB>text`).
//! - `R` lines are binary relations; spans participating in one are
//!   excluded from scoring when exclusion is requested.
//! - `#` lines are annotator notes carrying the terminology code for the
//!   referenced span.
//!
//! A line that does not split into exactly three tab fields, a span with a
//! discontinuous (semicolon-joined) offset range, or non-integer offsets
//! discard the whole file's contribution; the run continues with the
//! remaining files.

use crate::diag::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};
use crate::record::AnnotationRecord;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Options controlling stand-off parsing.
#[derive(Debug, Clone)]
pub struct StandoffOptions {
    /// Read `#` annotator notes and attach their codes to the referenced
    /// spans. Spans without a note are then omitted (not an error).
    pub with_notes: bool,
    /// Drop spans that participate in a binary relation.
    pub exclude_related: bool,
}

impl Default for StandoffOptions {
    fn default() -> Self {
        Self {
            with_notes: false,
            exclude_related: true,
        }
    }
}

impl StandoffOptions {
    /// Options for a normalization run: notes are required for codes.
    #[must_use]
    pub fn with_notes() -> Self {
        Self {
            with_notes: true,
            ..Self::default()
        }
    }
}

/// List the `.ann` files under a directory, recursively, sorted by path.
///
/// The listing is also what defines which documents exist on this side of
/// the evaluation, including files later discarded as malformed.
pub fn list_annotation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/*.ann", dir.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| Error::config(format!("bad annotation path {}: {e}", dir.display())))?
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::Io(e.into_error()))?;
    files.sort();
    Ok(files)
}

/// Parse every `.ann` file under `dir` into canonical records.
///
/// Malformed files are skipped with a diagnostic (file-level partial
/// failure); IO failures abort. An empty overall result is reported as a
/// warning and returned as an empty sequence.
pub fn parse_standoff_dir(
    dir: &Path,
    relevant_labels: &[String],
    options: &StandoffOptions,
    diag: &mut Diagnostics,
) -> Result<Vec<AnnotationRecord>> {
    let mut records = Vec::new();
    for path in list_annotation_files(dir)? {
        records.extend(parse_standoff_file(&path, relevant_labels, options, diag)?);
    }
    if records.is_empty() {
        diag.push(Diagnostic::EmptyAnnotations {
            source: dir.display().to_string(),
        });
    }
    Ok(records)
}

/// Parse one `.ann` file into canonical records.
///
/// Returns an empty sequence (after pushing a diagnostic) when the file is
/// malformed; propagates IO errors.
pub fn parse_standoff_file(
    path: &Path,
    relevant_labels: &[String],
    options: &StandoffOptions,
    diag: &mut Diagnostics,
) -> Result<Vec<AnnotationRecord>> {
    let content = fs::read_to_string(path)?;
    let document_id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match parse_content(path, &document_id, &content, relevant_labels, options) {
        Ok(records) => Ok(records),
        Err(defect) => {
            diag.push(defect);
            Ok(Vec::new())
        }
    }
}

/// Parse file content; a malformed line rejects the whole file.
fn parse_content(
    path: &Path,
    document_id: &str,
    content: &str,
    relevant_labels: &[String],
    options: &StandoffOptions,
) -> std::result::Result<Vec<AnnotationRecord>, Diagnostic> {
    let lines: Vec<&str> = content.lines().collect();

    // Whole-file shape check before anything is extracted.
    for line in &lines {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(Diagnostic::MalformedLine {
                path: path.display().to_string(),
                line: (*line).to_string(),
                found_fields: fields.len(),
            });
        }
        if fields[0].starts_with('T') {
            let offset_part: Vec<&str> = fields[1].split(' ').skip(1).collect();
            if offset_part.join(" ").contains(';') {
                return Err(Diagnostic::DiscontinuousSpan {
                    path: path.display().to_string(),
                    line: (*line).to_string(),
                });
            }
        }
    }

    // Spans referenced by a relation are excluded from scoring.
    let mut excluded: HashSet<&str> = HashSet::new();
    if options.exclude_related {
        for line in &lines {
            if !line.starts_with('R') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            for token in fields[1].split(' ').skip(1).take(2) {
                if let Some((_, mark)) = token.split_once(':') {
                    excluded.insert(mark);
                }
            }
        }
    }

    // Annotator notes map a span's mark to its terminology code.
    let mut mark_to_code: HashMap<&str, &str> = HashMap::new();
    if options.with_notes {
        for line in &lines {
            if !line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if let Some(mark) = fields[1].split(' ').nth(1) {
                mark_to_code.insert(mark, fields[2].trim());
            }
        }
    }

    let mut records = Vec::new();
    for line in &lines {
        if !line.starts_with('T') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let mark = fields[0];
        if excluded.contains(mark) {
            continue;
        }
        let tokens: Vec<&str> = fields[1].split_whitespace().collect();
        let label = tokens.first().copied().unwrap_or("");
        if !relevant_labels.iter().any(|l| l == label) {
            continue;
        }
        if tokens.len() != 3 {
            return Err(Diagnostic::BadOffsets {
                path: path.display().to_string(),
                line: (*line).to_string(),
            });
        }
        let (start, end) = match (tokens[1].parse::<usize>(), tokens[2].parse::<usize>()) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                return Err(Diagnostic::BadOffsets {
                    path: path.display().to_string(),
                    line: (*line).to_string(),
                })
            }
        };
        let text = fields[2].trim();

        let record = AnnotationRecord::new(document_id, mark, label, start, end, text);
        if options.with_notes {
            // Only spans with a note carry a code; the rest are omitted.
            if let Some(code) = mark_to_code.get(mark) {
                records.push(record.with_code(*code));
            }
        } else {
            records.push(record);
        }
    }
    Ok(records)
}
