//! Built-in sample account, used when no live data provider is wired in.
//!
//! Dates are relative to `as_of` so the sample reads the same whenever it
//! is generated.

use crate::account_data::{AccountData, BASIC, EXTERNAL, FINANCIAL, INTERACTIONS, STAKEHOLDERS};
use crate::models::{Insight, PlanNarrative};
use crate::pipeline::PlanRequest;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

pub const SAMPLE_ACCOUNT_NAME: &str = "Northwind Logistics";

/// Sample account data as of `as_of`.
pub fn sample_account_data(as_of: DateTime<Utc>) -> AccountData {
    let days_ago = |days: i64| (as_of - Duration::days(days)).to_rfc3339();
    let contract_end = (as_of + Duration::days(120)).date_naive().to_string();

    AccountData::new()
        .with_category(
            BASIC,
            json!([{
                "source": "crm_export",
                "data": {
                    "name": SAMPLE_ACCOUNT_NAME,
                    "industry": "Transportation & Logistics",
                    "employees": 4200,
                    "region": "North America"
                }
            }]),
        )
        .with_category(
            FINANCIAL,
            json!([{
                "source": "billing_system",
                "data": {
                    "growthRate": 0.18,
                    "currentARR": 850000,
                    "contractEndDate": contract_end,
                    "paymentHistory": "on_time"
                }
            }]),
        )
        .with_category(
            INTERACTIONS,
            json!([
                {
                    "source": "crm_export",
                    "data": [
                        {"date": days_ago(4), "type": "meeting", "summary": "Quarterly business review, team satisfied with rollout"},
                        {"date": days_ago(12), "type": "call", "notes": "Discussed APAC expansion timeline"},
                        {"date": days_ago(41), "type": "meeting", "summary": "Support escalation, concern about response times"}
                    ]
                },
                {
                    "source": "email_archive",
                    "data": {"date": days_ago(20), "type": "email", "subject": "Great feedback from the ops team"}
                }
            ]),
        )
        .with_category(
            STAKEHOLDERS,
            json!([{
                "source": "crm_export",
                "data": [
                    {
                        "name": "Priya Natarajan",
                        "title": "VP Operations",
                        "role": "decision_maker",
                        "engagement": "high",
                        "lastContact": days_ago(4),
                        "relationshipStrength": "Strong",
                        "influence": "High"
                    },
                    {
                        "name": "Marcus Lee",
                        "title": "Director of IT",
                        "role": "technical",
                        "engagement": "high",
                        "lastContact": days_ago(12),
                        "relationshipStrength": "Good",
                        "influence": "Medium"
                    },
                    {
                        "name": "Elena Petrova",
                        "title": "Procurement Manager",
                        "role": "financial",
                        "engagement": "low",
                        "lastContact": days_ago(75),
                        "relationshipStrength": "Developing",
                        "influence": "Medium"
                    },
                    {
                        "name": "Sam Okafor",
                        "title": "Fleet Analyst",
                        "role": "power_user",
                        "engagement": "medium",
                        "lastContact": days_ago(95),
                        "relationshipStrength": "Weak",
                        "influence": "Low"
                    }
                ]
            }]),
        )
        .with_category(
            EXTERNAL,
            json!([{
                "source": "news_feed",
                "data": [
                    {"headline": "Northwind opens Singapore hub", "date": days_ago(9)}
                ]
            }]),
        )
}

/// Sample narrative standing in for AI-generated recommendations.
pub fn sample_narrative() -> PlanNarrative {
    PlanNarrative {
        recommendations: vec![
            "Open renewal conversations with Priya Natarajan this month".to_string(),
            "Re-engage procurement before the renewal window narrows".to_string(),
            "Scope an APAC expansion pilot around the new Singapore hub".to_string(),
        ],
        insights: vec![
            Insight {
                kind: "opportunity_signals".to_string(),
                summary: "New Singapore hub creates demand for regional coverage".to_string(),
                confidence: 0.8,
                ..Default::default()
            },
            Insight {
                kind: "risk_indicators".to_string(),
                summary: "Procurement contact has gone quiet ahead of renewal".to_string(),
                confidence: 0.7,
                ..Default::default()
            },
        ],
        executive_summary: None,
    }
}

/// Complete plan request for the sample account, pinned to `as_of`.
pub fn sample_request(as_of: DateTime<Utc>) -> PlanRequest {
    let narrative = sample_narrative();
    PlanRequest {
        account_name: SAMPLE_ACCOUNT_NAME.to_string(),
        account_data: sample_account_data(as_of),
        as_of: Some(as_of),
        recommendations: narrative.recommendations,
        insights: narrative.insights,
        executive_summary: narrative.executive_summary,
    }
}
