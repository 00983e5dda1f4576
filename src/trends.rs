//! Engagement trend and interaction sentiment.

use crate::account_data::AccountSnapshot;
use crate::models::{Sentiment, SentimentSummary, TrendAnalysis, TrendDirection};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Length of each comparison window.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Reported until a financial trend signal exists.
pub const FINANCIAL_TREND_PLACEHOLDER: &str = "positive";
/// Reported until a stakeholder trend signal exists.
pub const STAKEHOLDER_TREND_PLACEHOLDER: &str = "stable";

const POSITIVE_WORDS: &str = r"(?i)\b(good|great|excellent|positive|happy|satisfied|success|amazing)";
const NEGATIVE_WORDS: &str = r"(?i)\b(bad|poor|negative|unhappy|problem|issue|concern|worried)";

fn positive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(POSITIVE_WORDS).expect("valid positive word pattern"))
}

fn negative_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NEGATIVE_WORDS).expect("valid negative word pattern"))
}

/// Compares `(as_of-30d, as_of]` against `(as_of-60d, as_of-30d]`.
pub fn analyze_trends(snapshot: &AccountSnapshot, as_of: DateTime<Utc>) -> TrendAnalysis {
    let recent = snapshot.interactions_within(as_of, TREND_WINDOW_DAYS);
    let prior = snapshot.interactions_between(as_of, 2 * TREND_WINDOW_DAYS, TREND_WINDOW_DAYS);

    TrendAnalysis {
        engagement: engagement_direction(recent, prior),
        financial: FINANCIAL_TREND_PLACEHOLDER.to_string(),
        stakeholder: STAKEHOLDER_TREND_PLACEHOLDER.to_string(),
        recent_interactions: recent,
        prior_interactions: prior,
        sentiment: summarize_sentiment(snapshot),
    }
}

pub fn engagement_direction(recent: usize, prior: usize) -> TrendDirection {
    match recent.cmp(&prior) {
        std::cmp::Ordering::Greater => TrendDirection::Increasing,
        std::cmp::Ordering::Less => TrendDirection::Decreasing,
        std::cmp::Ordering::Equal => TrendDirection::Stable,
    }
}

/// Classifies text by counting distinct positive vs negative keywords.
///
/// Keywords match at the start of a word, so "issues" counts as "issue".
/// Ties (including no keywords at all) are neutral.
pub fn classify_sentiment(text: &str) -> Sentiment {
    let positive = distinct_matches(positive_pattern(), text);
    let negative = distinct_matches(negative_pattern(), text);

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

fn distinct_matches(pattern: &Regex, text: &str) -> usize {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Tallies sentiment over every interaction that carries free text.
pub fn summarize_sentiment(snapshot: &AccountSnapshot) -> SentimentSummary {
    let mut positive = 0;
    let mut negative = 0;
    let mut neutral = 0;

    for text in snapshot.interactions().filter_map(|i| i.text.as_deref()) {
        match classify_sentiment(text) {
            Sentiment::Positive => positive += 1,
            Sentiment::Negative => negative += 1,
            Sentiment::Neutral => neutral += 1,
        }
    }

    let overall = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    };

    SentimentSummary {
        positive,
        negative,
        neutral,
        overall,
    }
}
