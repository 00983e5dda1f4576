use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ Normalized Input Records ============

/// A normalized record paired with the name of the source it came from.
///
/// The source tag is informational only and never influences scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    /// Origin of the record (e.g., "crm_export").
    pub source: String,
    /// The normalized record itself.
    pub record: T,
}

impl<T> Sourced<T> {
    pub fn new(source: impl Into<String>, record: T) -> Self {
        Self {
            source: source.into(),
            record,
        }
    }
}

/// Financial state of an account as reported by one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialSnapshot {
    /// Year-over-year growth rate (0.25 means 25%).
    pub growth_rate: Option<f64>,
    /// Current annual recurring revenue in USD.
    pub current_arr: Option<f64>,
    /// End of the current contract term.
    pub contract_end_date: Option<DateTime<Utc>>,
    /// Free-form payment history label (e.g., "on_time").
    pub payment_history: Option<String>,
}

/// A single historical interaction with the account.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// When the interaction happened.
    pub date: DateTime<Utc>,
    /// Interaction type (e.g., "meeting", "email", "call").
    pub kind: String,
    /// Free text gathered from summary/notes/subject/description fields.
    pub text: Option<String>,
}

/// Stakeholder engagement level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engagement {
    High,
    Medium,
    Low,
}

impl Engagement {
    /// Parses an exact lowercase label. Anything else yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Qualitative strength of the relationship with a stakeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipStrength {
    Strong,
    Good,
    Developing,
    Weak,
}

impl RelationshipStrength {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Strong" => Some(Self::Strong),
            "Good" => Some(Self::Good),
            "Developing" => Some(Self::Developing),
            "Weak" => Some(Self::Weak),
            _ => None,
        }
    }
}

/// Influence a stakeholder has over buying decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Influence {
    High,
    Medium,
    Low,
}

impl Influence {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Role classification used to bucket stakeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderRole {
    DecisionMaker,
    Influencer,
    Champion,
    Technical,
    Financial,
}

impl StakeholderRole {
    /// Maps a raw role label to a role. Missing or unrecognized labels are influencers.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("decision_maker") => Self::DecisionMaker,
            Some("champion") => Self::Champion,
            Some("technical") => Self::Technical,
            Some("financial") => Self::Financial,
            _ => Self::Influencer,
        }
    }
}

/// A person associated with the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stakeholder {
    /// Full name.
    pub name: String,
    /// Raw role label as supplied by the source.
    #[serde(default)]
    pub role: Option<String>,
    /// Engagement level.
    #[serde(default)]
    pub engagement: Option<Engagement>,
    /// Last time anyone on the account team was in contact.
    #[serde(default)]
    pub last_contact: Option<DateTime<Utc>>,
    /// Relationship strength label.
    #[serde(default)]
    pub relationship_strength: Option<RelationshipStrength>,
    /// Influence label.
    #[serde(default)]
    pub influence: Option<Influence>,
    /// Any additional fields the source provided (title, email, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

// ============ Analysis Results ============

/// Category of a detected revenue opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityType {
    Expansion,
    Upsell,
    CrossSell,
    Geographic,
    Partnership,
}

/// Priority of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A detected potential for additional revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    #[serde(rename = "type")]
    pub kind: OpportunityType,
    pub priority: Priority,
    /// Estimated value in USD.
    pub value: u64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub reasoning: String,
    pub timeline: String,
    pub requirements: Vec<String>,
}

/// Severity of a risk. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Business impact if a risk materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// Kind of detected risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    ContractRenewal,
    Engagement,
}

/// A detected threat to the account relationship or revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    #[serde(rename = "type")]
    pub kind: RiskKind,
    pub level: RiskLevel,
    /// Probability in [0, 1].
    pub probability: f64,
    pub impact: Impact,
    pub description: String,
    pub mitigation: String,
}

/// Qualitative health bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Excellent,
    Good,
    AtRisk,
    Critical,
}

/// The four sub-scores that make up a health score, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthFactors {
    pub financial: u8,
    pub engagement: u8,
    /// Reserved: no signal feeds this factor yet, so it is always 0.
    pub growth: u8,
    /// Reserved: no signal feeds this factor yet, so it is always 0.
    pub satisfaction: u8,
}

/// Composite account health rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall: HealthStatus,
    pub score: u8,
    pub factors: HealthFactors,
}

/// Per-stakeholder relationship risk derived from time since last contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StakeholderRisk {
    Low,
    Medium,
    High,
}

/// A stakeholder enriched with provenance and a computed risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedStakeholder {
    #[serde(flatten)]
    pub stakeholder: Stakeholder,
    /// Source the stakeholder record came from.
    pub source: String,
    pub risk_level: StakeholderRisk,
    /// Whole days since last contact, when known.
    #[serde(default)]
    pub days_since_contact: Option<i64>,
}

/// Stakeholders grouped by role bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderMap {
    pub decision_makers: Vec<MappedStakeholder>,
    pub influencers: Vec<MappedStakeholder>,
    pub champions: Vec<MappedStakeholder>,
    pub technical: Vec<MappedStakeholder>,
    pub financial: Vec<MappedStakeholder>,
}

impl StakeholderMap {
    /// Total number of mapped stakeholders across all buckets.
    pub fn len(&self) -> usize {
        self.decision_makers.len()
            + self.influencers.len()
            + self.champions.len()
            + self.technical.len()
            + self.financial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Direction of a trend between two windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

/// Sentiment class of a piece of interaction text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Tally of interaction sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub overall: Sentiment,
}

/// Trend classification for the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub engagement: TrendDirection,
    /// Placeholder until a financial trend signal exists.
    pub financial: String,
    /// Placeholder until a stakeholder trend signal exists.
    pub stakeholder: String,
    /// Interactions in the most recent 30 days.
    pub recent_interactions: usize,
    /// Interactions in the 30 days before that.
    pub prior_interactions: usize,
    pub sentiment: SentimentSummary,
}

// ============ Narrative (externally generated) ============

/// An externally generated insight, embedded verbatim after ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub confidence: f64,
    /// Provider fields such as `category` or `entities`, kept as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Narrative text produced outside the core (e.g., by an AI provider).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNarrative {
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub executive_summary: Option<String>,
}

// ============ Account Plan ============

/// Opportunity section of an account plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityAnalysis {
    /// Opportunities in detection order.
    pub opportunities: Vec<Opportunity>,
    /// Sum of all opportunity values.
    pub potential_value: u64,
    pub count: usize,
    /// Highest-scoring opportunities (value x confidence).
    pub top_opportunities: Vec<Opportunity>,
}

/// Risk section of an account plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Risks in detection order.
    pub risks: Vec<Risk>,
    pub risk_count: usize,
    /// Most severe emitted level, LOW when nothing was emitted.
    pub overall_risk_level: RiskLevel,
    pub top_risks: Vec<Risk>,
}

/// Provenance and versioning for an account plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub version: String,
    /// The single "now" every component used.
    pub as_of: DateTime<Utc>,
    /// Distinct source tags seen in the input, sorted.
    pub data_sources: Vec<String>,
    /// Category names present in the input, sorted.
    pub categories: Vec<String>,
    /// Entries dropped during normalization.
    pub records_skipped: usize,
}

/// The final, self-contained account plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPlan {
    pub account_name: String,
    pub generated_at: DateTime<Utc>,
    pub executive_summary: String,
    pub health_score: HealthScore,
    pub opportunity_analysis: OpportunityAnalysis,
    pub risk_assessment: RiskAssessment,
    pub stakeholder_map: StakeholderMap,
    pub trends: TrendAnalysis,
    pub recommendations: Vec<String>,
    pub insights: Vec<Insight>,
    pub metadata: PlanMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_influencer() {
        assert_eq!(
            StakeholderRole::from_label(Some("unknown_value")),
            StakeholderRole::Influencer
        );
        assert_eq!(StakeholderRole::from_label(None), StakeholderRole::Influencer);
        assert_eq!(
            StakeholderRole::from_label(Some("decision_maker")),
            StakeholderRole::DecisionMaker
        );
        // labels are matched exactly
        assert_eq!(
            StakeholderRole::from_label(Some("Decision_Maker")),
            StakeholderRole::Influencer
        );
    }

    #[test]
    fn test_labels_match_exact_case() {
        assert_eq!(Engagement::parse("high"), Some(Engagement::High));
        assert_eq!(Engagement::parse("HIGH"), None);
        assert_eq!(Engagement::parse("High"), None);
        assert_eq!(Influence::parse("High"), Some(Influence::High));
        assert_eq!(Influence::parse("high"), None);
        assert_eq!(
            RelationshipStrength::parse("Developing"),
            Some(RelationshipStrength::Developing)
        );
        assert_eq!(RelationshipStrength::parse("strong"), None);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(HealthStatus::AtRisk).unwrap(),
            serde_json::json!("AT_RISK")
        );
        assert_eq!(
            serde_json::to_value(OpportunityType::CrossSell).unwrap(),
            serde_json::json!("CROSS_SELL")
        );
        assert_eq!(
            serde_json::to_value(RiskKind::ContractRenewal).unwrap(),
            serde_json::json!("contract_renewal")
        );
        assert_eq!(
            serde_json::to_value(TrendDirection::Increasing).unwrap(),
            serde_json::json!("increasing")
        );
    }

    #[test]
    fn test_risk_levels_are_ordered() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }

    #[test]
    fn test_mapped_stakeholder_flattens_original_fields() {
        let mut attributes = Map::new();
        attributes.insert("title".to_string(), serde_json::json!("CTO"));
        let mapped = MappedStakeholder {
            stakeholder: Stakeholder {
                name: "Dana Reyes".to_string(),
                role: Some("technical".to_string()),
                engagement: Some(Engagement::High),
                last_contact: None,
                relationship_strength: Some(RelationshipStrength::Strong),
                influence: Some(Influence::High),
                attributes,
            },
            source: "crm_export".to_string(),
            risk_level: StakeholderRisk::Low,
            days_since_contact: None,
        };

        let value = serde_json::to_value(&mapped).unwrap();
        assert_eq!(value["name"], "Dana Reyes");
        assert_eq!(value["title"], "CTO");
        assert_eq!(value["source"], "crm_export");
        assert_eq!(value["riskLevel"], "LOW");
        assert_eq!(value["relationshipStrength"], "Strong");

        let back: MappedStakeholder = serde_json::from_value(value).unwrap();
        assert_eq!(back, mapped);
    }
}
