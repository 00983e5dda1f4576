use failsafe::{backoff, failure_policy, Config, StateMachine};
use std::time::Duration;

/// Breaker guarding a single distribution sink.
pub type DistributionBreaker =
    StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>;

/// Consecutive failed deliveries before a sink is cut off.
pub const FAILURE_THRESHOLD: u32 = 5;

/// Creates a circuit breaker for one distribution sink (Slack, CRM).
///
/// A sink that keeps failing is skipped fast instead of holding every
/// distribute request for the full HTTP timeout.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// # States
///
/// - **CLOSED**: Deliveries pass through.
/// - **OPEN**: Deliveries are rejected without a request being sent.
/// - **HALF_OPEN**: One trial delivery decides whether the sink recovered.
///
/// # Returns
///
/// * `DistributionBreaker` - The configured circuit breaker instance.
pub fn create_distribution_circuit_breaker() -> DistributionBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(FAILURE_THRESHOLD, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}
