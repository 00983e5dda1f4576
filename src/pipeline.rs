//! Account plan pipeline: normalize, analyze, assemble.
//!
//! One call is a one-shot pure computation over a snapshot of the input.
//! "Now" is captured once by the caller and threaded through every
//! component, so a run is internally consistent and replayable.

use crate::account_data::{AccountData, AccountSnapshot};
use crate::models::{AccountPlan, Insight, PlanNarrative};
use crate::opportunities::detect_opportunities;
use crate::plan::{assemble, PlanComponents};
use crate::risks::assess_risks;
use crate::scoring::compute_health;
use crate::stakeholders::map_stakeholders;
use crate::trends::analyze_trends;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request to generate an account plan, as accepted over HTTP and by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub account_name: String,
    #[serde(default)]
    pub account_data: AccountData,
    /// Point in time to analyze as of. Defaults to the moment of the request.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub executive_summary: Option<String>,
}

impl PlanRequest {
    /// Pins `as_of`, using `now` when the request did not supply one.
    pub fn resolved(mut self, now: DateTime<Utc>) -> Self {
        self.as_of = Some(self.as_of.unwrap_or(now));
        self
    }

    pub fn narrative(&self) -> PlanNarrative {
        PlanNarrative {
            recommendations: self.recommendations.clone(),
            insights: self.insights.clone(),
            executive_summary: self.executive_summary.clone(),
        }
    }

    /// Runs the pipeline for this request.
    pub fn generate(&self, now: DateTime<Utc>) -> AccountPlan {
        generate_account_plan_with_narrative(
            &self.account_name,
            &self.account_data,
            self.as_of.unwrap_or(now),
            self.narrative(),
        )
    }
}

/// Runs every analysis component over the same snapshot.
///
/// The components neither read each other's output nor share state.
pub fn analyze(snapshot: &AccountSnapshot, as_of: DateTime<Utc>) -> PlanComponents {
    PlanComponents {
        health: compute_health(snapshot, as_of),
        opportunities: detect_opportunities(snapshot),
        risks: assess_risks(snapshot, as_of),
        stakeholder_map: map_stakeholders(snapshot, as_of),
        trends: analyze_trends(snapshot, as_of),
    }
}

/// Generates an account plan without any external narrative.
pub fn generate_account_plan(
    account_name: &str,
    account_data: &AccountData,
    as_of: DateTime<Utc>,
) -> AccountPlan {
    generate_account_plan_with_narrative(
        account_name,
        account_data,
        as_of,
        PlanNarrative::default(),
    )
}

/// Generates an account plan, embedding externally generated narrative.
///
/// Never fails: malformed input is skipped during normalization and the plan
/// is produced from whatever remains.
pub fn generate_account_plan_with_narrative(
    account_name: &str,
    account_data: &AccountData,
    as_of: DateTime<Utc>,
    narrative: PlanNarrative,
) -> AccountPlan {
    tracing::info!("Generating account plan for '{}' as of {}", account_name, as_of);

    let snapshot = AccountSnapshot::from_account_data(account_data);
    let components = analyze(&snapshot, as_of);
    let plan = assemble(account_name, &snapshot, as_of, components, narrative);

    tracing::info!(
        "✓ Account plan ready for '{}': health {} ({:?}), {} opportunities worth ${}, {} risks",
        account_name,
        plan.health_score.score,
        plan.health_score.overall,
        plan.opportunity_analysis.count,
        plan.opportunity_analysis.potential_value,
        plan.risk_assessment.risk_count
    );

    plan
}
