//! Display formatting for CLI output
//!
//! Everything here goes to stderr; stdout is reserved for rendered charts.

use chartify_convert::{Diagnostics, WarningSeverity};
use console::style;

/// Outcome of one conversion run
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Generated template file names
    pub converted: Vec<String>,
    /// Resources no processor applies to
    pub skipped: usize,
    /// Resources that matched but failed, with the error message
    pub failed: Vec<(String, String)>,
    /// Diagnostics per generated file
    pub diagnostics: Vec<(String, Diagnostics)>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped + self.failed.len()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().map(|(_, d)| d.len()).sum()
    }
}

pub fn print_failures(report: &ConversionReport) {
    for (resource, message) in &report.failed {
        eprintln!(
            "  {} {} {}",
            style("✗").red().bold(),
            style(resource).bold(),
            style(message).red()
        );
    }
}

pub fn print_warnings(report: &ConversionReport, verbose: bool) {
    for (file, diagnostics) in &report.diagnostics {
        for warning in diagnostics.warnings() {
            if warning.severity == WarningSeverity::Info && !verbose {
                continue;
            }
            let icon = match warning.severity {
                WarningSeverity::Info => style(warning.severity.icon()).cyan(),
                WarningSeverity::Warning => style(warning.severity.icon()).yellow(),
            };
            eprintln!(
                "  {} {} {} {} {}",
                icon,
                style(file).dim(),
                style(format!("[{}]", warning.category.label())).dim(),
                style(&warning.path).cyan(),
                warning.message
            );
        }
    }
}

pub fn print_summary(report: &ConversionReport) {
    let mut msg = format!(
        "Converted {} resource{}",
        report.converted.len(),
        if report.converted.len() == 1 { "" } else { "s" },
    );

    if report.skipped > 0 {
        msg.push_str(&format!(", skipped {}", report.skipped));
    }
    if !report.failed.is_empty() {
        msg.push_str(&format!(", failed {}", report.failed.len()));
    }

    let warnings = report.warning_count();
    if warnings > 0 {
        msg.push_str(&format!(
            " with {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" }
        ));
    }

    let marker = if report.failed.is_empty() {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    eprintln!("  {} {}", marker, msg);
}
