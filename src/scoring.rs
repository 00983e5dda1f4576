//! Account health scoring.
//!
//! Four sub-scores on a 0/25/50/75/100 ladder are averaged into a 0-100
//! score, which is then bucketed. `growth` and `satisfaction` are reserved
//! factors with no input signal yet; they contribute a constant 0.

use crate::account_data::AccountSnapshot;
use crate::models::{HealthFactors, HealthScore, HealthStatus};
use chrono::{DateTime, Utc};

/// Window used for the engagement factor.
pub const ENGAGEMENT_WINDOW_DAYS: i64 = 30;

/// Score contributed by factors that have no signal yet.
pub const RESERVED_FACTOR_SCORE: u8 = 0;

/// Computes the health score of an account as of `as_of`.
///
/// Missing categories score 0 for their factor; an empty snapshot therefore
/// yields a CRITICAL score of 0.
pub fn compute_health(snapshot: &AccountSnapshot, as_of: DateTime<Utc>) -> HealthScore {
    let financial = snapshot
        .primary_financial()
        .and_then(|f| f.growth_rate)
        .map(financial_factor)
        .unwrap_or(0);

    let engagement = if snapshot.has_interaction_data() {
        engagement_factor(snapshot.interactions_within(as_of, ENGAGEMENT_WINDOW_DAYS))
    } else {
        0
    };

    let factors = HealthFactors {
        financial,
        engagement,
        growth: RESERVED_FACTOR_SCORE,
        satisfaction: RESERVED_FACTOR_SCORE,
    };
    let score = overall_score(&factors);

    tracing::debug!(
        "Health factors: financial={} engagement={} growth={} satisfaction={} -> {}",
        factors.financial,
        factors.engagement,
        factors.growth,
        factors.satisfaction,
        score
    );

    HealthScore {
        overall: health_status(score),
        score,
        factors,
    }
}

/// Financial factor from the year-over-year growth rate.
///
/// Each tier includes its lower boundary: 0.2 scores 100, 0.1 scores 75,
/// 0.0 scores 50, anything negative 25.
pub fn financial_factor(growth_rate: f64) -> u8 {
    if growth_rate >= 0.2 {
        100
    } else if growth_rate >= 0.1 {
        75
    } else if growth_rate >= 0.0 {
        50
    } else {
        25
    }
}

/// Engagement factor from the number of interactions in the last 30 days.
pub fn engagement_factor(recent_interactions: usize) -> u8 {
    match recent_interactions {
        n if n >= 3 => 100,
        2 => 75,
        1 => 50,
        _ => 25,
    }
}

/// Mean of the four factors, rounded half away from zero.
pub fn overall_score(factors: &HealthFactors) -> u8 {
    let sum = u32::from(factors.financial)
        + u32::from(factors.engagement)
        + u32::from(factors.growth)
        + u32::from(factors.satisfaction);
    (f64::from(sum) / 4.0).round() as u8
}

/// Buckets a score; each bucket includes its lower boundary.
pub fn health_status(score: u8) -> HealthStatus {
    match score {
        80..=u8::MAX => HealthStatus::Excellent,
        60..=79 => HealthStatus::Good,
        40..=59 => HealthStatus::AtRisk,
        _ => HealthStatus::Critical,
    }
}
