//! Rule-based risk assessment.

use crate::account_data::AccountSnapshot;
use crate::models::{Impact, Risk, RiskKind, RiskLevel};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Contracts ending within this many days raise a renewal risk.
pub const RENEWAL_WINDOW_DAYS: f64 = 180.0;
/// Renewal risks inside this many days are HIGH rather than MEDIUM.
pub const RENEWAL_URGENT_DAYS: f64 = 90.0;
pub const RENEWAL_PROBABILITY: f64 = 0.3;
pub const RENEWAL_MITIGATION: &str =
    "Schedule renewal discussion with the executive sponsor and prepare a value realization summary";

/// Window inspected for engagement risk.
pub const ENGAGEMENT_RISK_WINDOW_DAYS: i64 = 60;
/// Fewer interactions than this inside the window raise an engagement risk.
pub const ENGAGEMENT_RISK_MIN_INTERACTIONS: usize = 2;
pub const ENGAGEMENT_PROBABILITY: f64 = 0.4;
pub const ENGAGEMENT_MITIGATION: &str =
    "Increase touchpoint cadence with regular business reviews and stakeholder check-ins";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Assesses contract and engagement risks as of `as_of`.
///
/// Checks whose input category is absent are skipped.
pub fn assess_risks(snapshot: &AccountSnapshot, as_of: DateTime<Utc>) -> Vec<Risk> {
    let mut risks = Vec::new();

    if let Some(risk) = contract_renewal_risk(snapshot, as_of) {
        risks.push(risk);
    }
    if let Some(risk) = engagement_risk(snapshot, as_of) {
        risks.push(risk);
    }

    tracing::debug!("Assessed {} risk(s)", risks.len());
    risks
}

/// Calendar days from `as_of` until `date`, fractional and unrounded.
pub fn days_until(date: DateTime<Utc>, as_of: DateTime<Utc>) -> f64 {
    (date - as_of).num_seconds() as f64 / SECONDS_PER_DAY
}

fn contract_renewal_risk(snapshot: &AccountSnapshot, as_of: DateTime<Utc>) -> Option<Risk> {
    let end_date = snapshot.primary_financial()?.contract_end_date?;
    let days = days_until(end_date, as_of);
    if days >= RENEWAL_WINDOW_DAYS {
        return None;
    }

    let level = if days < RENEWAL_URGENT_DAYS {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    Some(Risk {
        kind: RiskKind::ContractRenewal,
        level,
        probability: RENEWAL_PROBABILITY,
        impact: Impact::High,
        description: format!("Contract expires in {} days", days.round() as i64),
        mitigation: RENEWAL_MITIGATION.to_string(),
    })
}

fn engagement_risk(snapshot: &AccountSnapshot, as_of: DateTime<Utc>) -> Option<Risk> {
    if !snapshot.has_interaction_data() {
        return None;
    }
    let recent = snapshot.interactions_within(as_of, ENGAGEMENT_RISK_WINDOW_DAYS);
    if recent >= ENGAGEMENT_RISK_MIN_INTERACTIONS {
        return None;
    }

    Some(Risk {
        kind: RiskKind::Engagement,
        level: RiskLevel::Medium,
        probability: ENGAGEMENT_PROBABILITY,
        impact: Impact::Medium,
        description: format!(
            "Only {} interaction(s) in the last {} days",
            recent, ENGAGEMENT_RISK_WINDOW_DAYS
        ),
        mitigation: ENGAGEMENT_MITIGATION.to_string(),
    })
}

/// Most severe level among `risks`, LOW when there are none.
pub fn overall_risk_level(risks: &[Risk]) -> RiskLevel {
    risks
        .iter()
        .map(|r| r.level)
        .max()
        .unwrap_or(RiskLevel::Low)
}

/// The `limit` most pressing risks: by level, then probability, then input order.
pub fn top_risks(risks: &[Risk], limit: usize) -> Vec<Risk> {
    let mut ranked = risks.to_vec();
    ranked.sort_by(|a, b| {
        b.level.cmp(&a.level).then_with(|| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        })
    });
    ranked.truncate(limit);
    ranked
}
