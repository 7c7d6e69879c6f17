//! Output helpers for the CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Strip ASCII punctuation from a path to build a report-file stem.
///
/// `subm/run1` becomes `submrun1`, so a prediction path maps to the report
/// files `submrun1_individual_data.txt` and `submrun1_general_data.txt`.
#[must_use]
pub fn sanitized_stem(path: &Path) -> String {
    path.display()
        .to_string()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}

/// Write a report file into `dir`, returning the path written.
pub fn write_report(dir: &Path, stem: &str, suffix: &str, content: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("{stem}{suffix}"));
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Write content to stdout, flushing so pipes see it immediately.
pub fn write_stdout(content: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_stem_strips_punctuation() {
        assert_eq!(sanitized_stem(Path::new("subm/run-1.tsv")), "submrun1tsv");
        assert_eq!(sanitized_stem(Path::new("plain")), "plain");
    }
}
