//! Account Planner Library
//!
//! Turns raw, multi-source account data (financials, interactions,
//! stakeholders) into a structured strategic account plan: health score,
//! revenue opportunities, risks, a stakeholder map and engagement trends.
//!
//! # Modules
//!
//! - `api`: HTTP-layer namespace.
//! - `core`: Domain-layer namespace.
//! - `integrations`: Outbound sink namespace.
//! - `account_data`: Raw input and normalization into a typed snapshot.
//! - `scoring`: Account health scoring.
//! - `opportunities`: Revenue opportunity detection.
//! - `risks`: Risk assessment.
//! - `stakeholders`: Stakeholder mapping.
//! - `trends`: Engagement trend and sentiment analysis.
//! - `insights`: Ranking of externally generated insights.
//! - `plan`: Assembly of the final plan document.
//! - `pipeline`: `generate_account_plan` entry point.
//! - `sample_data`: Built-in sample account.
//! - `plan_cache`: Checksummed plan cache.
//! - `distribution`: Slack and CRM delivery.
//! - `circuit_breaker`: Failure isolation for delivery sinks.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.

pub mod api;
pub mod core;
pub mod integrations;

pub mod account_data;
pub mod circuit_breaker;
pub mod config;
pub mod distribution;
pub mod errors;
pub mod handlers;
pub mod insights;
pub mod models;
pub mod opportunities;
pub mod pipeline;
pub mod plan;
pub mod plan_cache;
pub mod risks;
pub mod sample_data;
pub mod scoring;
pub mod stakeholders;
pub mod trends;

pub use pipeline::{generate_account_plan, generate_account_plan_with_narrative, PlanRequest};
