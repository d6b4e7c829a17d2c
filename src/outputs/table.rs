//! Terminal rendering of the ranked results.
//!
//! One block per article separated by rule lines, highest rank first. The
//! table is printed before output files are written so a disk failure never
//! takes the on-screen results with it.

use crate::models::RankedRecord;
use std::fmt::Write as _;

const RULE_WIDTH: usize = 100;

/// Render ranked records as a plain-text table.
pub fn render(records: &[RankedRecord]) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Rank: {}", record.rank);
        let _ = writeln!(out, "Score: {}\n", record.score);
        let _ = writeln!(out, "Publication Date: {}\n", record.published_at);
        let _ = writeln!(out, "Title: {}\n", record.title);
        let _ = writeln!(out, "Summary: {}\n", record.summary);
        let _ = writeln!(out, "Rationale: {}\n", record.rationale);
        let _ = writeln!(out, "URL: {}", record.url);
    }
    let _ = writeln!(out, "{rule}");
    out
}

/// Print the table to stdout.
pub fn print(records: &[RankedRecord]) {
    print!("{}", render(records));
}
