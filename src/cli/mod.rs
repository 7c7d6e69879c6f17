//! Command-line interface.
//!
//! The CLI is a thin shell around the library: it discovers input files,
//! loads the valid-code reference list, runs the evaluation pipeline and
//! writes the reports. All scoring logic lives in the library modules.

pub mod output;

use crate::align::{default_code_exceptions, ScoringMode};
use crate::codes::{format_record_codes, retain_valid_codes, CodeSet};
use crate::diag::Diagnostics;
use crate::error::{Error, Result};
use crate::record::{document_ids, AnnotationRecord};
use crate::standoff::{list_annotation_files, parse_standoff_dir, StandoffOptions};
use crate::table::parse_table_file;
use crate::{evaluate, metrics::MetricSet, report};
use clap::{Parser, ValueEnum};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Evaluate clinical-entity annotations against a gold standard.
#[derive(Debug, Parser)]
#[command(
    name = "clineval",
    version,
    about = "Evaluate clinical-entity annotations against a gold standard",
    long_about = "\
Computes precision, recall and F1 per document and micro-averaged over the
corpus. Inputs are either directories of stand-off .ann files or single
tab-delimited tables; the encoding is chosen per path.

Subtasks:
  ner    span match only
  norm   span match plus terminology-code match

Examples:
  clineval -g gold/ -p subm/run1/ -s ner
  clineval -g gold.tsv -p pred.tsv -s norm -c valid-codes.tsv"
)]
pub struct Cli {
    /// Path to the gold standard (directory of .ann files, or one table).
    #[arg(short = 'g', long = "gs-path")]
    pub gs_path: PathBuf,

    /// Path to the predictions (same encodings as the gold standard).
    #[arg(short = 'p', long = "pred-path")]
    pub pred_path: PathBuf,

    /// Path to the valid-code reference list (first TSV column per line).
    /// Required for subtask `norm`.
    #[arg(short = 'c', long = "valid-codes")]
    pub valid_codes: Option<PathBuf>,

    /// Subtask to score.
    #[arg(short = 's', long, value_enum)]
    pub subtask: Subtask,

    /// Entity labels to evaluate; annotations with other labels are ignored.
    #[arg(long, value_delimiter = ',', default_value = "ENFERMEDAD")]
    pub labels: Vec<String>,

    /// Output format for the metric report.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Directory the report files are written into.
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,
}

/// Subtask selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Subtask {
    /// Entity recognition: exact span match.
    Ner,
    /// Entity normalization: exact span match plus code equality.
    Norm,
}

impl Subtask {
    fn mode(self) -> ScoringMode {
        match self {
            Subtask::Ner => ScoringMode::Entity,
            Subtask::Norm => ScoringMode::Normalization,
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Dashed plain-text tables plus the `path|P|R|F1` summary line.
    #[default]
    Text,
    /// The full metric set as JSON on stdout.
    Json,
}

/// Parse arguments from the environment and run the evaluation.
pub fn run() -> Result<()> {
    run_with(Cli::parse())
}

/// Run the evaluation for already-parsed arguments.
pub fn run_with(cli: Cli) -> Result<()> {
    let mode = cli.subtask.mode();
    let mut diag = Diagnostics::new();

    let (gold, gold_documents) = load_side(&cli.gs_path, &cli.labels, mode, &mut diag)?;
    let (mut predictions, _) = load_side(&cli.pred_path, &cli.labels, mode, &mut diag)?;

    // Empty sides are recoverable inside the library but fatal here: there
    // is nothing to score.
    if predictions.is_empty() {
        report_warnings(&diag);
        return Err(Error::empty_input(
            "predicted",
            cli.pred_path.display().to_string(),
        ));
    }
    if gold.is_empty() {
        report_warnings(&diag);
        return Err(Error::empty_input(
            "gold standard",
            cli.gs_path.display().to_string(),
        ));
    }

    // Predictions for documents outside the gold standard cannot score.
    let keep: HashSet<&String> = gold_documents.iter().collect();
    predictions.retain(|r| keep.contains(&r.document_id));

    let mut gold = gold;
    let exceptions = match cli.subtask {
        Subtask::Ner => Vec::new(),
        Subtask::Norm => {
            let codes_path = cli.valid_codes.as_deref().ok_or_else(|| {
                Error::config("--valid-codes is required for subtask norm")
            })?;
            let valid = load_code_set(codes_path)?;
            format_record_codes(&mut gold);
            format_record_codes(&mut predictions);
            predictions = retain_valid_codes(predictions, &valid, &mut diag);
            default_code_exceptions()
        }
    };

    let metrics = evaluate(gold, predictions, mode, &exceptions, &mut diag);
    report_warnings(&diag);

    emit(&cli, &metrics)
}

fn report_warnings(diag: &Diagnostics) {
    for diagnostic in diag.iter() {
        eprintln!("warning: {diagnostic}");
    }
}

/// Parse one side of the evaluation.
///
/// A directory is read as stand-off annotations; a file as a flat table.
/// Returns the records plus the side's document listing: for stand-off
/// input that is every `.ann` file found (parse failures included, so a
/// skipped gold file still admits its predictions), for tables the
/// documents actually parsed.
fn load_side(
    path: &Path,
    labels: &[String],
    mode: ScoringMode,
    diag: &mut Diagnostics,
) -> Result<(Vec<AnnotationRecord>, Vec<String>)> {
    if path.is_dir() {
        let options = match mode {
            ScoringMode::Entity => StandoffOptions::default(),
            ScoringMode::Normalization => StandoffOptions::with_notes(),
        };
        let records = parse_standoff_dir(path, labels, &options, diag)?;
        let documents = list_annotation_files(path)?
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        Ok((records, documents))
    } else {
        let (_, mut records) = parse_table_file(path, labels, diag)?;
        if mode == ScoringMode::Entity {
            // Tables exported for normalization still score as plain NER.
            for record in &mut records {
                record.code = None;
            }
        }
        let documents = document_ids(&records);
        Ok((records, documents))
    }
}

/// Load the valid-code reference list: first tab field of each line.
pub fn load_code_set(path: &Path) -> Result<CodeSet> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter_map(|line| line.split('\t').next())
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .collect())
}

fn emit(cli: &Cli, metrics: &MetricSet) -> Result<()> {
    match cli.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(metrics)
                .map_err(|e| Error::config(format!("cannot serialize metrics: {e}")))?;
            output::write_stdout(&json)?;
            output::write_stdout("\n")?;
        }
        Format::Text => {
            let pred_path = cli.pred_path.display().to_string();
            let stem = output::sanitized_stem(&cli.pred_path);
            output::write_report(
                &cli.output_dir,
                &stem,
                "_individual_data.txt",
                &report::render_individual(metrics),
            )?;
            output::write_report(
                &cli.output_dir,
                &stem,
                "_general_data.txt",
                &report::render_general(metrics, &pred_path),
            )?;
            output::write_stdout(&report::render_general(metrics, &pred_path))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_code_set_first_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "8500/3\tCarcinoma ductal infiltrante").unwrap();
        writeln!(file, "8000/3\tNeoplasia maligna").unwrap();
        writeln!(file).unwrap();
        let set = load_code_set(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("8500/3"));
        assert!(!set.contains("Carcinoma ductal infiltrante"));
    }

    #[test]
    fn test_subtask_mode_mapping() {
        assert_eq!(Subtask::Ner.mode(), ScoringMode::Entity);
        assert_eq!(Subtask::Norm.mode(), ScoringMode::Normalization);
    }
}
