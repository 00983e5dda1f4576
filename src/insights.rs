//! Ranking of externally generated insights and the executive summary.

use crate::models::Insight;
use std::collections::HashSet;

/// Characters of the summary that take part in the duplicate key.
pub const DEDUP_SUMMARY_CHARS: usize = 50;
/// Insights quoted in a generated executive summary.
pub const SUMMARY_FINDINGS: usize = 3;

pub const NO_INSIGHTS_SUMMARY: &str = "No significant insights generated from analysis.";

/// Removes duplicates and orders insights by confidence, highest first.
///
/// Two insights are duplicates when they share a type and the first 50
/// characters of their summary; the first occurrence wins. Ordering uses the
/// confidence clamped to [0, 1] (non-finite values rank as 0) while the stored
/// value is left as received. Ties keep input order.
pub fn rank_insights(insights: Vec<Insight>) -> Vec<Insight> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Insight> = insights
        .into_iter()
        .filter(|insight| seen.insert(dedup_key(insight)))
        .collect();

    unique.sort_by(|a, b| ranking_confidence(b).total_cmp(&ranking_confidence(a)));
    unique
}

fn ranking_confidence(insight: &Insight) -> f64 {
    if insight.confidence.is_finite() {
        insight.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn dedup_key(insight: &Insight) -> String {
    let prefix: String = insight.summary.chars().take(DEDUP_SUMMARY_CHARS).collect();
    format!("{}_{}", insight.kind, prefix)
}

/// Builds an executive summary from already ranked insights.
pub fn executive_summary(ranked: &[Insight]) -> String {
    if ranked.is_empty() {
        return NO_INSIGHTS_SUMMARY.to_string();
    }

    let findings: Vec<&str> = ranked
        .iter()
        .map(|insight| insight.summary.trim())
        .filter(|summary| !summary.is_empty())
        .take(SUMMARY_FINDINGS)
        .collect();

    let mut summary = format!(
        "Analysis identified {} insight{} across multiple dimensions.",
        ranked.len(),
        if ranked.len() == 1 { "" } else { "s" }
    );
    if !findings.is_empty() {
        summary.push_str(&format!(" Key findings include: {}.", findings.join("; ")));
    }
    summary
}
