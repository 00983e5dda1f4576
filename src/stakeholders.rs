//! Stakeholder bucketing and relationship risk.

use crate::account_data::AccountSnapshot;
use crate::models::{MappedStakeholder, StakeholderMap, StakeholderRisk, StakeholderRole};
use chrono::{DateTime, Utc};

/// More days than this without contact is HIGH risk.
pub const HIGH_RISK_SILENCE_DAYS: f64 = 90.0;
/// More days than this without contact is MEDIUM risk.
pub const MEDIUM_RISK_SILENCE_DAYS: f64 = 60.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Buckets every stakeholder by role and rates relationship risk.
///
/// Records keep their source tag. Bucket order follows input order.
pub fn map_stakeholders(snapshot: &AccountSnapshot, as_of: DateTime<Utc>) -> StakeholderMap {
    let mut map = StakeholderMap::default();

    for sourced in snapshot.stakeholders() {
        let stakeholder = &sourced.record;
        let days_since_contact = stakeholder
            .last_contact
            .map(|last| (as_of - last).num_seconds() as f64 / SECONDS_PER_DAY);

        let mapped = MappedStakeholder {
            stakeholder: stakeholder.clone(),
            source: sourced.source.clone(),
            risk_level: stakeholder_risk(days_since_contact),
            days_since_contact: days_since_contact.map(|days| days.floor() as i64),
        };

        let bucket = match StakeholderRole::from_label(stakeholder.role.as_deref()) {
            StakeholderRole::DecisionMaker => &mut map.decision_makers,
            StakeholderRole::Influencer => &mut map.influencers,
            StakeholderRole::Champion => &mut map.champions,
            StakeholderRole::Technical => &mut map.technical,
            StakeholderRole::Financial => &mut map.financial,
        };
        bucket.push(mapped);
    }

    tracing::debug!("Mapped {} stakeholder(s)", map.len());
    map
}

/// Relationship risk from days since last contact.
///
/// An unknown last contact rates LOW: there is no evidence of a lapse.
pub fn stakeholder_risk(days_since_contact: Option<f64>) -> StakeholderRisk {
    match days_since_contact {
        Some(days) if days > HIGH_RISK_SILENCE_DAYS => StakeholderRisk::High,
        Some(days) if days > MEDIUM_RISK_SILENCE_DAYS => StakeholderRisk::Medium,
        _ => StakeholderRisk::Low,
    }
}
