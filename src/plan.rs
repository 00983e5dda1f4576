//! Composition of component outputs into an [`AccountPlan`].

use crate::account_data::AccountSnapshot;
use crate::insights::{executive_summary, rank_insights};
use crate::models::{
    AccountPlan, HealthScore, Opportunity, OpportunityAnalysis, PlanMetadata, PlanNarrative, Risk,
    RiskAssessment, StakeholderMap, TrendAnalysis,
};
use crate::opportunities::prioritize_opportunities;
use crate::risks::{overall_risk_level, top_risks};
use chrono::{DateTime, Utc};

/// Version stamped into every plan's metadata.
pub const PLAN_VERSION: &str = "1.0";
/// Number of highlighted opportunities and risks.
pub const TOP_HIGHLIGHTS: usize = 3;

/// Everything the independent analysis components produced for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanComponents {
    pub health: HealthScore,
    pub opportunities: Vec<Opportunity>,
    pub risks: Vec<Risk>,
    pub stakeholder_map: StakeholderMap,
    pub trends: TrendAnalysis,
}

/// Assembles the final plan. Nothing is re-derived here: summaries are sums,
/// counts and orderings over the supplied component outputs.
///
/// # Arguments
///
/// * `account_name` - Name of the analyzed account.
/// * `snapshot` - The normalized input, used only for provenance metadata.
/// * `as_of` - The single "now" the components were run with.
/// * `components` - Outputs of the analysis components.
/// * `narrative` - Externally generated recommendations and insights, embedded verbatim.
///
/// # Returns
///
/// * `AccountPlan` - A self-contained, serializable plan.
pub fn assemble(
    account_name: &str,
    snapshot: &AccountSnapshot,
    as_of: DateTime<Utc>,
    components: PlanComponents,
    narrative: PlanNarrative,
) -> AccountPlan {
    let PlanComponents {
        health,
        opportunities,
        risks,
        stakeholder_map,
        trends,
    } = components;

    let potential_value = opportunities
        .iter()
        .fold(0u64, |total, o| total.saturating_add(o.value));
    let mut top_opportunities = prioritize_opportunities(&opportunities);
    top_opportunities.truncate(TOP_HIGHLIGHTS);

    let opportunity_analysis = OpportunityAnalysis {
        count: opportunities.len(),
        potential_value,
        top_opportunities,
        opportunities,
    };

    let risk_assessment = RiskAssessment {
        risk_count: risks.len(),
        overall_risk_level: overall_risk_level(&risks),
        top_risks: top_risks(&risks, TOP_HIGHLIGHTS),
        risks,
    };

    let insights = rank_insights(narrative.insights);
    let executive_summary = narrative
        .executive_summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| executive_summary(&insights));

    AccountPlan {
        account_name: account_name.to_string(),
        generated_at: as_of,
        executive_summary,
        health_score: health,
        opportunity_analysis,
        risk_assessment,
        stakeholder_map,
        trends,
        recommendations: narrative.recommendations,
        insights,
        metadata: PlanMetadata {
            version: PLAN_VERSION.to_string(),
            as_of,
            data_sources: snapshot.data_sources.clone(),
            categories: snapshot.categories.clone(),
            records_skipped: snapshot.skipped,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        HealthFactors, HealthStatus, Impact, Insight, OpportunityType, Priority, RiskKind,
        RiskLevel, Sentiment, SentimentSummary, TrendDirection,
    };
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn opportunity(kind: OpportunityType, value: u64, confidence: f64) -> Opportunity {
        Opportunity {
            kind,
            priority: Priority::Medium,
            value,
            confidence,
            reasoning: "r".to_string(),
            timeline: "t".to_string(),
            requirements: vec![],
        }
    }

    fn components(opportunities: Vec<Opportunity>, risks: Vec<Risk>) -> PlanComponents {
        PlanComponents {
            health: HealthScore {
                overall: HealthStatus::Critical,
                score: 0,
                factors: HealthFactors::default(),
            },
            opportunities,
            risks,
            stakeholder_map: StakeholderMap::default(),
            trends: TrendAnalysis {
                engagement: TrendDirection::Stable,
                financial: "positive".to_string(),
                stakeholder: "stable".to_string(),
                recent_interactions: 0,
                prior_interactions: 0,
                sentiment: SentimentSummary {
                    positive: 0,
                    negative: 0,
                    neutral: 0,
                    overall: Sentiment::Neutral,
                },
            },
        }
    }

    #[test]
    fn test_potential_value_is_exact_sum() {
        let plan = assemble(
            "Acme",
            &AccountSnapshot::default(),
            as_of(),
            components(
                vec![
                    opportunity(OpportunityType::Expansion, 300_000, 0.8),
                    opportunity(OpportunityType::Upsell, 250_000, 0.6),
                ],
                vec![],
            ),
            PlanNarrative::default(),
        );
        assert_eq!(plan.opportunity_analysis.potential_value, 550_000);
        assert_eq!(plan.opportunity_analysis.count, 2);
        assert_eq!(plan.risk_assessment.overall_risk_level, RiskLevel::Low);
        assert_eq!(plan.metadata.version, PLAN_VERSION);
        assert_eq!(plan.generated_at, as_of());
    }

    #[test]
    fn test_potential_value_saturates() {
        let plan = assemble(
            "Acme",
            &AccountSnapshot::default(),
            as_of(),
            components(
                vec![
                    opportunity(OpportunityType::Expansion, u64::MAX, 0.8),
                    opportunity(OpportunityType::Upsell, 250_000, 0.6),
                ],
                vec![],
            ),
            PlanNarrative::default(),
        );
        assert_eq!(plan.opportunity_analysis.potential_value, u64::MAX);
    }

    #[test]
    fn test_top_highlights_are_capped() {
        let opportunities = vec![
            opportunity(OpportunityType::Geographic, 10, 1.0),
            opportunity(OpportunityType::Expansion, 40, 1.0),
            opportunity(OpportunityType::CrossSell, 20, 1.0),
            opportunity(OpportunityType::Partnership, 30, 1.0),
        ];
        let risk = Risk {
            kind: RiskKind::Engagement,
            level: RiskLevel::Medium,
            probability: 0.4,
            impact: Impact::Medium,
            description: String::new(),
            mitigation: String::new(),
        };
        let plan = assemble(
            "Acme",
            &AccountSnapshot::default(),
            as_of(),
            components(opportunities, vec![risk.clone(); 5]),
            PlanNarrative::default(),
        );
        let top: Vec<_> = plan
            .opportunity_analysis
            .top_opportunities
            .iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(top, vec![40, 30, 20]);
        // detection order is preserved in the full list
        assert_eq!(plan.opportunity_analysis.opportunities[0].value, 10);
        assert_eq!(plan.risk_assessment.top_risks.len(), 3);
        assert_eq!(plan.risk_assessment.risk_count, 5);
        assert_eq!(plan.risk_assessment.overall_risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_narrative_is_embedded() {
        let narrative = PlanNarrative {
            recommendations: vec!["Book an executive business review".to_string()],
            insights: vec![Insight {
                kind: "opportunity".to_string(),
                summary: "Interest in analytics add-on".to_string(),
                confidence: 0.7,
                ..Default::default()
            }],
            executive_summary: None,
        };
        let plan = assemble(
            "Acme",
            &AccountSnapshot::default(),
            as_of(),
            components(vec![], vec![]),
            narrative,
        );
        assert_eq!(plan.recommendations, vec!["Book an executive business review"]);
        assert_eq!(plan.insights.len(), 1);
        assert!(plan
            .executive_summary
            .contains("Key findings include: Interest in analytics add-on."));
    }

    #[test]
    fn test_supplied_executive_summary_wins() {
        let narrative = PlanNarrative {
            executive_summary: Some("Healthy account, renewal on track.".to_string()),
            ..Default::default()
        };
        let plan = assemble(
            "Acme",
            &AccountSnapshot::default(),
            as_of(),
            components(vec![], vec![]),
            narrative,
        );
        assert_eq!(plan.executive_summary, "Healthy account, renewal on track.");
    }
}
