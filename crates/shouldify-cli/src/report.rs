//! Human-readable output for a migration run

use std::io::{self, Write};

use shouldify_core::migrate::{FileReport, MigrationSummary};

/// Writes one `path:line:col: ID message [shape]` line per finding.
pub fn write_findings(out: &mut impl Write, report: &FileReport) -> io::Result<()> {
    for (finding, position) in report.findings.iter().zip(&report.positions) {
        writeln!(
            out,
            "{}:{}:{}: {} {} [{}]",
            report.path.display(),
            position.line,
            position.col,
            finding.diagnostic_id(),
            finding.message(),
            finding.shape
        )?;
    }
    Ok(())
}

pub fn write_summary(
    out: &mut impl Write,
    summary: &MigrationSummary,
    check: bool,
) -> io::Result<()> {
    if check {
        writeln!(
            out,
            "{} finding(s) in {} file(s)",
            summary.findings,
            summary.reports.iter().filter(|r| !r.findings.is_empty()).count()
        )?;
    } else {
        write!(
            out,
            "{} file(s) processed, {} changed, {}/{} assertion(s) converted",
            summary.files_processed,
            summary.files_changed,
            summary.rewrites(),
            summary.findings
        )?;
        match summary.unconverted() {
            0 => writeln!(out)?,
            n => writeln!(out, ", {n} left unchanged")?,
        }
    }
    for error in &summary.errors {
        writeln!(out, "error: {error}")?;
    }
    Ok(())
}

/// Full report: findings of every file followed by the summary.
pub fn write_report(
    out: &mut impl Write,
    summary: &MigrationSummary,
    check: bool,
) -> io::Result<()> {
    for report in &summary.reports {
        write_findings(out, report)?;
        if report.has_parse_errors {
            writeln!(out, "{}: warning: file has syntax errors", report.path.display())?;
        }
    }
    write_summary(out, summary, check)
}
