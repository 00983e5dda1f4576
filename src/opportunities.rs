//! Rule-based opportunity detection and prioritization.

use crate::account_data::AccountSnapshot;
use crate::models::{Engagement, Opportunity, OpportunityType, Priority};
use std::cmp::Ordering;

/// Growth rate above which an expansion opportunity is emitted (strict).
pub const EXPANSION_GROWTH_THRESHOLD: f64 = 0.15;
/// Share of current ARR estimated as expansion value.
pub const EXPANSION_ARR_SHARE: f64 = 0.3;
pub const EXPANSION_CONFIDENCE: f64 = 0.8;
pub const EXPANSION_TIMELINE: &str = "Q2 2024";
/// Ceiling for a single opportunity value; the largest integer an f64 holds exactly.
pub const MAX_OPPORTUNITY_VALUE: u64 = 9_007_199_254_740_991;

/// Number of highly engaged stakeholders needed for an upsell opportunity.
pub const UPSELL_MIN_HIGH_ENGAGEMENT: usize = 2;
pub const UPSELL_VALUE: u64 = 250_000;
pub const UPSELL_CONFIDENCE: f64 = 0.6;
pub const UPSELL_TIMELINE: &str = "Q3 2024";

/// Detects opportunities in rule order: expansion first, then upsell.
///
/// A rule whose input category is absent is skipped.
pub fn detect_opportunities(snapshot: &AccountSnapshot) -> Vec<Opportunity> {
    let mut opportunities = Vec::new();

    if let Some(expansion) = expansion_opportunity(snapshot) {
        opportunities.push(expansion);
    }
    if let Some(upsell) = upsell_opportunity(snapshot) {
        opportunities.push(upsell);
    }

    tracing::debug!("Detected {} opportunit(ies)", opportunities.len());
    opportunities
}

fn expansion_opportunity(snapshot: &AccountSnapshot) -> Option<Opportunity> {
    let financial = snapshot.primary_financial()?;
    let growth_rate = financial.growth_rate?;
    if growth_rate <= EXPANSION_GROWTH_THRESHOLD {
        return None;
    }
    let current_arr = financial.current_arr?;
    let value = (current_arr * EXPANSION_ARR_SHARE)
        .round()
        .clamp(0.0, MAX_OPPORTUNITY_VALUE as f64) as u64;

    Some(Opportunity {
        kind: OpportunityType::Expansion,
        priority: Priority::High,
        value,
        confidence: EXPANSION_CONFIDENCE,
        reasoning: format!(
            "Revenue growing {:.0}% year over year signals room for a broader deployment",
            growth_rate * 100.0
        ),
        timeline: EXPANSION_TIMELINE.to_string(),
        requirements: vec![
            "Executive sponsor alignment".to_string(),
            "Expanded implementation plan".to_string(),
            "Budget approval for additional capacity".to_string(),
        ],
    })
}

fn upsell_opportunity(snapshot: &AccountSnapshot) -> Option<Opportunity> {
    let highly_engaged = snapshot
        .stakeholders()
        .filter(|s| s.record.engagement == Some(Engagement::High))
        .count();
    if highly_engaged < UPSELL_MIN_HIGH_ENGAGEMENT {
        return None;
    }

    Some(Opportunity {
        kind: OpportunityType::Upsell,
        priority: Priority::Medium,
        value: UPSELL_VALUE,
        confidence: UPSELL_CONFIDENCE,
        reasoning: format!(
            "{} highly engaged stakeholders can sponsor a premium tier upgrade",
            highly_engaged
        ),
        timeline: UPSELL_TIMELINE.to_string(),
        requirements: vec![
            "Premium feature demonstration".to_string(),
            "ROI analysis".to_string(),
            "Champion-led business case".to_string(),
        ],
    })
}

/// Prioritization score: expected value (`value * confidence`).
pub fn opportunity_score(opportunity: &Opportunity) -> f64 {
    opportunity.value as f64 * opportunity.confidence
}

/// Returns the opportunities sorted by score, highest first.
///
/// The sort is stable, so equal scores keep their original order.
pub fn prioritize_opportunities(opportunities: &[Opportunity]) -> Vec<Opportunity> {
    let mut ranked = opportunities.to_vec();
    ranked.sort_by(|a, b| {
        opportunity_score(b)
            .partial_cmp(&opportunity_score(a))
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_data::{AccountData, FINANCIAL, STAKEHOLDERS};
    use serde_json::json;

    fn snapshot(data: AccountData) -> AccountSnapshot {
        AccountSnapshot::from_account_data(&data)
    }

    fn opportunity(kind: OpportunityType, value: u64, confidence: f64) -> Opportunity {
        Opportunity {
            kind,
            priority: Priority::Low,
            value,
            confidence,
            reasoning: String::new(),
            timeline: String::new(),
            requirements: vec![],
        }
    }

    #[test]
    fn test_no_data_no_opportunities() {
        assert!(detect_opportunities(&AccountSnapshot::default()).is_empty());
    }

    #[test]
    fn test_expansion_value_is_rounded_arr_share() {
        let data = AccountData::new().with_category(
            FINANCIAL,
            json!([{"source": "erp", "data": {"growthRate": 0.25, "currentARR": 1000000}}]),
        );
        let opportunities = detect_opportunities(&snapshot(data));
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].kind, OpportunityType::Expansion);
        assert_eq!(opportunities[0].value, 300_000);
        assert_eq!(opportunities[0].confidence, 0.8);
        assert_eq!(opportunities[0].timeline, "Q2 2024");
    }

    #[test]
    fn test_expansion_value_is_capped() {
        let data = AccountData::new().with_category(
            FINANCIAL,
            json!([{"source": "erp", "data": {"growthRate": 0.25, "currentARR": 1e30}}]),
        );
        let opportunities = detect_opportunities(&snapshot(data));
        assert_eq!(opportunities[0].value, MAX_OPPORTUNITY_VALUE);
    }

    #[test]
    fn test_expansion_threshold_is_strict() {
        let data = AccountData::new().with_category(
            FINANCIAL,
            json!([{"source": "erp", "data": {"growthRate": 0.15, "currentARR": 1000000}}]),
        );
        assert!(detect_opportunities(&snapshot(data)).is_empty());
    }

    #[test]
    fn test_upsell_only() {
        let data = AccountData::new()
            .with_category(
                FINANCIAL,
                json!([{"source": "erp", "data": {"growthRate": 0.05, "currentARR": 1000000}}]),
            )
            .with_category(
                STAKEHOLDERS,
                json!([
                    {"source": "crm", "data": {"name": "A", "engagement": "high"}},
                    {"source": "linkedin", "data": [
                        {"name": "B", "engagement": "high"},
                        {"name": "C", "engagement": "low"}
                    ]}
                ]),
            );
        let opportunities = detect_opportunities(&snapshot(data));
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].kind, OpportunityType::Upsell);
        assert_eq!(opportunities[0].value, 250_000);
        assert_eq!(opportunities[0].timeline, "Q3 2024");
    }

    #[test]
    fn test_single_engaged_stakeholder_is_not_enough() {
        let data = AccountData::new().with_category(
            STAKEHOLDERS,
            json!([{"source": "crm", "data": [
                {"name": "A", "engagement": "high"},
                {"name": "B", "engagement": "medium"}
            ]}]),
        );
        assert!(detect_opportunities(&snapshot(data)).is_empty());
    }

    #[test]
    fn test_prioritize_sorts_by_expected_value() {
        let input = vec![
            opportunity(OpportunityType::Upsell, 250_000, 0.6),
            opportunity(OpportunityType::Expansion, 300_000, 0.8),
            opportunity(OpportunityType::Partnership, 1_000_000, 0.1),
        ];
        let ranked = prioritize_opportunities(&input);
        let kinds: Vec<_> = ranked.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OpportunityType::Expansion,
                OpportunityType::Upsell,
                OpportunityType::Partnership
            ]
        );
    }

    #[test]
    fn test_prioritize_is_stable_on_ties() {
        let input = vec![
            opportunity(OpportunityType::Geographic, 100_000, 0.5),
            opportunity(OpportunityType::CrossSell, 50_000, 1.0),
        ];
        let ranked = prioritize_opportunities(&input);
        assert_eq!(ranked[0].kind, OpportunityType::Geographic);
        assert_eq!(ranked[1].kind, OpportunityType::CrossSell);
    }
}
