//! Tracing-based observability hooks for remote calls and dispatch phases.
//!
//! ```rust
//! use pobserve::TracingObservabilityHooks;
//! use pchat::DispatchHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::time::Duration;

use pchat::{AdminCommand, DispatchHooks, DispatchState, GatewayError, RollbackReason};
use pprovider::{OutcomeVerdict, ProviderError, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_call_start(&self, operation: &str, credential_index: usize) {
        tracing::info!(
            phase = "provider",
            event = "call_start",
            operation,
            credential_index
        );
    }

    fn on_call_success(&self, operation: &str, credential_index: usize, elapsed: Duration) {
        tracing::info!(
            phase = "provider",
            event = "call_success",
            operation,
            credential_index,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_call_failure(
        &self,
        operation: &str,
        credential_index: usize,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "call_failure",
            operation,
            credential_index,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_credential_rotated(&self, from: usize, to: usize) {
        tracing::warn!(
            phase = "provider",
            event = "credential_rotated",
            from,
            to
        );
    }
}

impl DispatchHooks for TracingObservabilityHooks {
    fn on_state_change(&self, from: DispatchState, to: DispatchState) {
        tracing::debug!(
            phase = "dispatch",
            event = "state_change",
            from = from.as_str(),
            to = to.as_str()
        );
    }

    fn on_verdict(&self, verdict: &OutcomeVerdict) {
        match verdict {
            OutcomeVerdict::Success { token_count, .. } => tracing::info!(
                phase = "dispatch",
                event = "verdict",
                verdict = verdict.label(),
                token_count = ?token_count
            ),
            OutcomeVerdict::RateLimited { code } | OutcomeVerdict::OtherError { code, .. } => {
                tracing::warn!(
                    phase = "dispatch",
                    event = "verdict",
                    verdict = verdict.label(),
                    code
                )
            }
            OutcomeVerdict::SafetyBlocked => tracing::warn!(
                phase = "dispatch",
                event = "verdict",
                verdict = verdict.label()
            ),
        }
    }

    fn on_rollback(&self, reason: RollbackReason, removed: usize) {
        tracing::warn!(
            phase = "dispatch",
            event = "rollback",
            reason = reason.as_str(),
            removed
        );
    }

    fn on_delivery_failure(&self, chunk_index: usize, chunk_count: usize, error: &GatewayError) {
        tracing::error!(
            phase = "dispatch",
            event = "delivery_failure",
            chunk_index,
            chunk_count,
            error = %error
        );
    }

    fn on_command(&self, command: AdminCommand) {
        tracing::info!(
            phase = "dispatch",
            event = "command",
            command = command.as_str()
        );
    }
}
