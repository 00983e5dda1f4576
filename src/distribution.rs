use crate::circuit_breaker::{create_distribution_circuit_breaker, DistributionBreaker};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::AccountPlan;
use failsafe::futures::CircuitBreaker;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

/// How many recommendations are quoted in the Slack message.
const MESSAGE_RECOMMENDATIONS: usize = 3;

/// Sink a plan can be delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Slack,
    Crm,
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
    /// Sink not configured.
    Skipped,
    /// Circuit open, nothing was sent.
    Rejected,
}

/// Outcome of delivering a plan to one sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub channel: Channel,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryOutcome {
    fn skipped(channel: Channel) -> Self {
        Self {
            channel,
            status: DeliveryStatus::Skipped,
            delivery_id: None,
            error: None,
        }
    }
}

/// Per-sink outcomes of a distribute call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub deliveries: Vec<DeliveryOutcome>,
}

impl DistributionReport {
    pub fn delivered_count(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Delivered)
            .count()
    }

    pub fn outcome(&self, channel: Channel) -> Option<&DeliveryOutcome> {
        self.deliveries.iter().find(|d| d.channel == channel)
    }
}

#[derive(Debug, Clone)]
struct CrmTarget {
    base_url: String,
    token: String,
}

/// Pushes finished plans to the configured Slack webhook and CRM.
///
/// Sinks are independent: each has its own circuit breaker, and a failure
/// in one never prevents delivery to the other.
pub struct DistributionClient {
    client: reqwest::Client,
    slack_webhook_url: Option<String>,
    crm: Option<CrmTarget>,
    slack_breaker: DistributionBreaker,
    crm_breaker: DistributionBreaker,
}

impl DistributionClient {
    /// Creates a new `DistributionClient` from the sink settings in `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration; unset sink URLs disable that sink.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create distribution client: {}", e))
            })?;

        let crm = match (&config.crm_base_url, &config.crm_token) {
            (Some(base_url), Some(token)) => Some(CrmTarget {
                base_url: base_url.clone(),
                token: token.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            client,
            slack_webhook_url: config.slack_webhook_url.clone(),
            crm,
            slack_breaker: create_distribution_circuit_breaker(),
            crm_breaker: create_distribution_circuit_breaker(),
        })
    }

    /// True when at least one sink is configured.
    pub fn has_sinks(&self) -> bool {
        self.slack_webhook_url.is_some() || self.crm.is_some()
    }

    /// Delivers `plan` to every configured sink.
    ///
    /// Never fails as a whole; each sink's outcome is reported separately.
    ///
    /// # Returns
    ///
    /// * `DistributionReport` - One outcome per sink, Slack first.
    pub async fn distribute(&self, plan: &AccountPlan) -> DistributionReport {
        tracing::info!("Distributing account plan for '{}'", plan.account_name);

        let (slack, crm) = tokio::join!(self.deliver_slack(plan), self.deliver_crm(plan));

        let report = DistributionReport {
            deliveries: vec![slack, crm],
        };
        tracing::info!(
            "✓ Distribution finished for '{}': {} delivered",
            plan.account_name,
            report.delivered_count()
        );
        report
    }

    async fn deliver_slack(&self, plan: &AccountPlan) -> DeliveryOutcome {
        let Some(url) = self.slack_webhook_url.as_deref() else {
            return DeliveryOutcome::skipped(Channel::Slack);
        };

        let delivery_id = Uuid::new_v4();
        let body = json!({ "text": format_plan_message(plan) });
        let result = self
            .slack_breaker
            .call(self.post_json(url, None, &body, "Slack"))
            .await;

        outcome(Channel::Slack, delivery_id, result)
    }

    async fn deliver_crm(&self, plan: &AccountPlan) -> DeliveryOutcome {
        let Some(crm) = self.crm.as_ref() else {
            return DeliveryOutcome::skipped(Channel::Crm);
        };

        let delivery_id = Uuid::new_v4();
        let url = format!("{}/account-plans", crm.base_url);
        let body = json!({
            "deliveryId": delivery_id,
            "accountName": plan.account_name,
            "generatedAt": plan.generated_at,
            "plan": plan,
        });
        let result = self
            .crm_breaker
            .call(self.post_json(&url, Some(&crm.token), &body, "CRM"))
            .await;

        outcome(Channel::Crm, delivery_id, result)
    }

    async fn post_json(
        &self,
        url: &str,
        token: Option<&str>,
        body: &serde_json::Value,
        sink: &str,
    ) -> Result<(), AppError> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("{} request failed: {}", sink, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "{} returned {}: {}",
                sink, status, error_text
            )));
        }

        Ok(())
    }
}

fn outcome(
    channel: Channel,
    delivery_id: Uuid,
    result: Result<(), failsafe::Error<AppError>>,
) -> DeliveryOutcome {
    let (status, error) = match result {
        Ok(()) => {
            tracing::info!("✓ Plan delivered to {:?} ({})", channel, delivery_id);
            (DeliveryStatus::Delivered, None)
        }
        Err(failsafe::Error::Rejected) => {
            tracing::warn!("❌ {:?} circuit open, delivery rejected", channel);
            (
                DeliveryStatus::Rejected,
                Some("circuit open, sink temporarily disabled".to_string()),
            )
        }
        Err(failsafe::Error::Inner(e)) => {
            tracing::warn!("❌ Delivery to {:?} failed: {}", channel, e);
            (DeliveryStatus::Failed, Some(e.to_string()))
        }
    };

    DeliveryOutcome {
        channel,
        status,
        delivery_id: Some(delivery_id),
        error,
    }
}

/// Plain-text summary of a plan for chat sinks.
pub fn format_plan_message(plan: &AccountPlan) -> String {
    let mut lines = vec![
        format!(
            "*Account plan: {}* (as of {})",
            plan.account_name,
            plan.metadata.as_of.format("%Y-%m-%d")
        ),
        format!(
            "Health: {}/100 ({})",
            plan.health_score.score,
            label(&plan.health_score.overall)
        ),
        format!(
            "Opportunities: {} worth ${}",
            plan.opportunity_analysis.count, plan.opportunity_analysis.potential_value
        ),
        format!(
            "Risks: {} (overall {})",
            plan.risk_assessment.risk_count,
            label(&plan.risk_assessment.overall_risk_level)
        ),
        String::new(),
        plan.executive_summary.clone(),
    ];

    if !plan.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        lines.extend(
            plan.recommendations
                .iter()
                .take(MESSAGE_RECOMMENDATIONS)
                .map(|r| format!("• {}", r)),
        );
    }

    lines.join("\n")
}

/// Wire label of a unit enum, as it appears in plan JSON.
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}
