//! Plain-text report rendering and the file-backed report adapter.

use crate::domain::error::RecommenderError;
use crate::domain::ranking::{RankedEntry, RankedList};
use crate::domain::universe::SkippedCode;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

const HEADER: &str = "Daily Stock Recommendations";

fn render_entry(entry: &RankedEntry) -> String {
    let rec = &entry.recommendation;
    let mut out = format!(
        "#{} {}  {}  confidence {:.2}  score {:+.3}  (as of {})\n",
        entry.rank,
        entry.code,
        rec.action,
        rec.confidence,
        entry.score,
        rec.as_of.format("%Y-%m-%d"),
    );
    for reason in &rec.reasoning {
        out.push_str(&format!("    - {}\n", reason));
    }
    out
}

/// Renders the ranked list in rank order. Reasoning lines are emitted verbatim.
pub fn render(ranked: &RankedList) -> String {
    if ranked.is_empty() {
        return "No recommendations.".to_string();
    }

    let mut out = format!("{}\n{}\n", HEADER, "=".repeat(HEADER.len()));
    for entry in ranked.entries() {
        out.push('\n');
        out.push_str(&render_entry(entry));
    }
    out
}

/// Lists the instruments excluded from the ranking. Empty input renders nothing.
pub fn render_skipped(skipped: &[SkippedCode]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut out = format!("Skipped ({}):\n", skipped.len());
    for s in skipped {
        out.push_str(&format!("  {}: {}\n", s.code, s.reason));
    }
    out
}

/// Ranked report followed by the skipped section, as written to stdout and file.
pub fn render_full(ranked: &RankedList, skipped: &[SkippedCode]) -> String {
    let mut out = render(ranked);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    let skipped = render_skipped(skipped);
    if !skipped.is_empty() {
        out.push('\n');
        out.push_str(&skipped);
    }
    out
}

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        ranked: &RankedList,
        skipped: &[SkippedCode],
        output_path: &str,
    ) -> Result<(), RecommenderError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, render_full(ranked, skipped))?;
        Ok(())
    }
}
