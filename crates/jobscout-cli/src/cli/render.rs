//! Human-readable report rendering.

use jobscout_core::aggregate::RankedJob;
use jobscout_core::pipeline::{DiscoveryReport, Ranking, RunCounts};
use std::fmt::Write;

const TITLE_WIDTH: usize = 40;
const COMPANY_WIDTH: usize = 20;
const LOCATION_WIDTH: usize = 20;

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "-"
    } else {
        text
    }
}

/// Ranked results as a table, one block per posting.
pub fn results_table(results: &[RankedJob]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        out.push_str("No matching jobs.\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<3} {:<5} {:<15} {:<TITLE_WIDTH$} {:<COMPANY_WIDTH$} {}",
        "#", "SCORE", "FIT", "TITLE", "COMPANY", "LOCATION"
    );
    for (i, item) in results.iter().enumerate() {
        let posting = &item.posting;
        let score = &item.score;
        let _ = writeln!(
            out,
            "{:<3} {:<5} {:<15} {:<TITLE_WIDTH$} {:<COMPANY_WIDTH$} {}",
            i + 1,
            score.score,
            score.recommendation.as_str(),
            clip(or_dash(&posting.title), TITLE_WIDTH),
            clip(or_dash(&posting.company), COMPANY_WIDTH),
            clip(or_dash(&posting.location), LOCATION_WIDTH),
        );
        let _ = writeln!(out, "    {}", posting.url);
        if !score.matched_skills.is_empty() {
            let _ = writeln!(out, "    matched: {}", score.matched_skills.join(", "));
        }
        if !score.missing_skills.is_empty() {
            let _ = writeln!(out, "    missing: {}", score.missing_skills.join(", "));
        }
        if let Some(salary) = &posting.salary {
            let _ = writeln!(out, "    salary:  {}-{} {}", salary.min, salary.max, salary.currency);
        }
    }
    out
}

pub fn counts_line(counts: &RunCounts) -> String {
    format!(
        "links: {}  fetched: {}  skipped: {}  not scheduled: {}  retried: {}  scoring errors: {}  below minimum: {}  returned: {}",
        counts.links_found,
        counts.fetched,
        counts.skipped,
        counts.not_scheduled,
        counts.retried,
        counts.scoring_errors,
        counts.below_minimum,
        counts.returned,
    )
}

/// Counts for an offline ranking of `total` loaded postings.
pub fn ranking_counts(total: usize, ranking: &Ranking) -> RunCounts {
    RunCounts {
        fetched: total,
        scoring_errors: ranking.scoring_errors,
        below_minimum: ranking.below_minimum,
        returned: ranking.ranked.len(),
        ..RunCounts::default()
    }
}

/// `rank --json` output: the same `counts` and `results` keys a search
/// report carries.
pub fn ranking_json(total: usize, ranking: &Ranking) -> serde_json::Value {
    serde_json::json!({
        "counts": ranking_counts(total, ranking),
        "results": ranking.ranked,
    })
}

/// Full text report: header, table, skipped links and counts.
pub fn report_text(report: &DiscoveryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Results for {:?} on {} (min score {})",
        report.query, report.source, report.min_score
    );
    if report.no_results {
        out.push_str("The search page listed no jobs. Try a broader query or a longer --days window.\n");
    } else {
        out.push_str(&results_table(&report.results));
    }
    for skipped in &report.skipped {
        let _ = writeln!(out, "skipped {} after {} attempt(s): {}", skipped.url, skipped.attempts, skipped.error);
    }
    out.push_str(&counts_line(&report.counts));
    out.push('\n');
    out
}
