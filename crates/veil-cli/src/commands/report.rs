//! Shared rendering of batch outcomes.

use veil_core::{BatchReport, FileIssue};

use crate::errors::CliError;
use crate::ui::{issue_table, receipt, Badge, UiContext};

/// Concatenate several reports into one.
pub fn combine(reports: &[&BatchReport]) -> BatchReport {
    let mut combined = BatchReport::default();
    for report in reports {
        combined.processed.extend(report.processed.iter().cloned());
        combined.skipped.extend(report.skipped.iter().cloned());
        combined.failed.extend(report.failed.iter().cloned());
    }
    combined
}

fn rows(issues: &[FileIssue]) -> Vec<(String, String)> {
    issues
        .iter()
        .map(|issue| (issue.path.clone(), issue.reason.clone()))
        .collect()
}

/// Print a receipt for `report`, then list skipped and failed notes.
///
/// Failed notes are listed even in quiet mode.
pub fn print_batch(
    ui: &UiContext,
    quiet: bool,
    title: &str,
    items: &[(&str, String)],
    report: &BatchReport,
) {
    if !quiet {
        let kind = if report.is_clean() { Badge::Ok } else { Badge::Warn };
        let mut all = items.to_vec();
        if !report.skipped.is_empty() {
            all.push(("Skipped", report.skipped.len().to_string()));
        }
        if !report.failed.is_empty() {
            all.push(("Failed", report.failed.len().to_string()));
        }
        println!("{}", receipt(ui, kind, title, &all));
        if !report.skipped.is_empty() {
            println!("{}", issue_table(ui, "Skipped", &rows(&report.skipped)));
        }
    }
    if !report.failed.is_empty() {
        eprintln!("{}", issue_table(ui, "Failed", &rows(&report.failed)));
    }
}

/// Turn per-note failures into the partial-failure exit.
pub fn ensure_clean(report: &BatchReport) -> anyhow::Result<()> {
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed: report.failed.len(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(processed: &[&str], failed: &[&str]) -> BatchReport {
        BatchReport {
            processed: processed.iter().map(|p| p.to_string()).collect(),
            skipped: Vec::new(),
            failed: failed
                .iter()
                .map(|p| FileIssue {
                    path: p.to_string(),
                    reason: "disk full".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_combine_keeps_order() {
        let first = report(&["a.md"], &[]);
        let second = report(&["b.md"], &["c.md"]);

        let combined = combine(&[&first, &second]);

        assert_eq!(combined.processed, vec!["a.md", "b.md"]);
        assert_eq!(combined.failed.len(), 1);
    }

    #[test]
    fn test_ensure_clean() {
        assert!(ensure_clean(&report(&["a.md"], &[])).is_ok());
        let err = ensure_clean(&report(&[], &["a.md"])).unwrap_err();
        assert!(err.to_string().contains("1 note(s)"));
    }
}
