//! Prints an account plan as JSON.
//!
//! Usage: `generate_plan [request.json] [--distribute]`
//!
//! Without a file the built-in sample account is used. With `--distribute`
//! the plan is also pushed to the sinks configured in the environment.

use account_planner::config::Config;
use account_planner::distribution::DistributionClient;
use account_planner::pipeline::PlanRequest;
use account_planner::sample_data::sample_request;
use anyhow::Context;
use chrono::Utc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut path = None;
    let mut distribute = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--distribute" => distribute = true,
            other if other.starts_with("--") => anyhow::bail!("Unknown flag: {}", other),
            other => path = Some(other.to_string()),
        }
    }

    let now = Utc::now();
    let request = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path))?;
            serde_json::from_str::<PlanRequest>(&raw)
                .with_context(|| format!("{} is not a valid plan request", path))?
        }
        None => {
            tracing::info!("No request file given, using the sample account");
            sample_request(now)
        }
    };

    if request.account_name.trim().is_empty() {
        anyhow::bail!("accountName is required");
    }

    let plan = request.generate(now);
    println!("{}", serde_json::to_string_pretty(&plan)?);

    if distribute {
        let config = Config::from_env()?;
        let client = DistributionClient::new(&config)?;
        let report = client.distribute(&plan).await;
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
