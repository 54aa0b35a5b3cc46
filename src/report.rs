//! Import report: JSON file output and console summary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::models::{ImportResult, UnmatchedReason};
use crate::progress::format_duration;

#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    #[serde(flatten)]
    result: &'a ImportResult,
    match_rate: f64,
    duplicates: usize,
    elapsed_seconds: f64,
}

/// Write the result as pretty-printed JSON.
pub fn write_report(path: &Path, result: &ImportResult, elapsed: Duration) -> Result<()> {
    let report = ReportFile {
        result,
        match_rate: result.match_rate(),
        duplicates: result.duplicate_count(),
        elapsed_seconds: elapsed.as_secs_f64(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(())
}

/// Human-readable summary, one line per unmatched title.
pub fn summary(result: &ImportResult, elapsed: Duration) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:=<60}\n", ""));
    out.push_str(&format!("Imported '{}'\n", result.playlist_title));
    out.push_str(&format!("  Videos:     {}\n", result.total_videos));
    out.push_str(&format!(
        "  Matched:    {} ({:.1}%)\n",
        result.matched_songs.len(),
        result.match_rate()
    ));
    out.push_str(&format!("  Unmatched:  {}\n", result.unmatched_titles.len()));
    out.push_str(&format!("  Duplicates: {}\n", result.duplicate_count()));
    out.push_str(&format!("  Elapsed:    {}\n", format_duration(elapsed)));
    out.push_str(&format!("{:=<60}\n", ""));

    for unmatched in &result.unmatched_titles {
        let detail = match &unmatched.reason {
            UnmatchedReason::NoMatch { best_score: Some(s) } => format!("best {:.2}", s),
            UnmatchedReason::NoMatch { best_score: None } => "no candidates".to_string(),
            UnmatchedReason::Duplicate { record_id, claimed_by } => {
                format!("record {} taken by #{}", record_id, claimed_by + 1)
            }
        };
        out.push_str(&format!(
            "  #{:<4} {} [{}]\n",
            unmatched.position + 1,
            unmatched,
            detail
        ));
    }
    out
}
