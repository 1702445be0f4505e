//! Metrics-based observability hooks for remote calls and dispatch phases.
//!
//! ```rust
//! use pobserve::MetricsObservabilityHooks;
//! use pprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use pchat::{AdminCommand, DispatchHooks, DispatchState, GatewayError, RollbackReason};
use pprovider::{OutcomeVerdict, ProviderError, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_call_start(&self, operation: &str, _credential_index: usize) {
        metrics::counter!(
            "parley_provider_call_start_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_call_success(&self, operation: &str, _credential_index: usize, elapsed: Duration) {
        metrics::counter!(
            "parley_provider_call_success_total",
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "parley_provider_call_duration_seconds",
            "operation" => operation.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_call_failure(
        &self,
        operation: &str,
        _credential_index: usize,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "parley_provider_call_failure_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "parley_provider_call_duration_seconds",
            "operation" => operation.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_credential_rotated(&self, _from: usize, to: usize) {
        metrics::counter!("parley_provider_credential_rotated_total").increment(1);
        metrics::gauge!("parley_provider_credential_cursor").set(to as f64);
    }
}

impl DispatchHooks for MetricsObservabilityHooks {
    fn on_state_change(&self, _from: DispatchState, to: DispatchState) {
        metrics::counter!(
            "parley_dispatch_state_entered_total",
            "state" => to.as_str()
        )
        .increment(1);
    }

    fn on_verdict(&self, verdict: &OutcomeVerdict) {
        metrics::counter!(
            "parley_dispatch_verdict_total",
            "verdict" => verdict.label()
        )
        .increment(1);

        if let OutcomeVerdict::Success {
            token_count: Some(tokens),
            ..
        } = verdict
        {
            metrics::histogram!("parley_dispatch_conversation_tokens").record(f64::from(*tokens));
        }
    }

    fn on_rollback(&self, reason: RollbackReason, removed: usize) {
        metrics::counter!(
            "parley_dispatch_rollback_total",
            "reason" => reason.as_str()
        )
        .increment(1);
        metrics::counter!(
            "parley_dispatch_rolled_back_turns_total",
            "reason" => reason.as_str()
        )
        .increment(removed as u64);
    }

    fn on_delivery_failure(&self, _chunk_index: usize, _chunk_count: usize, _error: &GatewayError) {
        metrics::counter!("parley_dispatch_delivery_failure_total").increment(1);
    }

    fn on_command(&self, command: AdminCommand) {
        metrics::counter!(
            "parley_dispatch_command_total",
            "command" => command.as_str()
        )
        .increment(1);
    }
}
