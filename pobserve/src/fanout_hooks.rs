//! Forwards every callback to two hook implementations in order.
//!
//! ```rust
//! use pobserve::{FanoutHooks, MetricsObservabilityHooks, TracingObservabilityHooks};
//! use pprovider::ProviderOperationHooks;
//!
//! let hooks = FanoutHooks::new(TracingObservabilityHooks, MetricsObservabilityHooks);
//! hooks.on_credential_rotated(0, 1);
//! ```

use std::time::Duration;

use pchat::{AdminCommand, DispatchHooks, DispatchState, GatewayError, RollbackReason};
use pprovider::{OutcomeVerdict, ProviderError, ProviderOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct FanoutHooks<A, B> {
    first: A,
    second: B,
}

impl<A, B> FanoutHooks<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> ProviderOperationHooks for FanoutHooks<A, B>
where
    A: ProviderOperationHooks,
    B: ProviderOperationHooks,
{
    fn on_call_start(&self, operation: &str, credential_index: usize) {
        self.first.on_call_start(operation, credential_index);
        self.second.on_call_start(operation, credential_index);
    }

    fn on_call_success(&self, operation: &str, credential_index: usize, elapsed: Duration) {
        self.first.on_call_success(operation, credential_index, elapsed);
        self.second
            .on_call_success(operation, credential_index, elapsed);
    }

    fn on_call_failure(
        &self,
        operation: &str,
        credential_index: usize,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        self.first
            .on_call_failure(operation, credential_index, elapsed, error);
        self.second
            .on_call_failure(operation, credential_index, elapsed, error);
    }

    fn on_credential_rotated(&self, from: usize, to: usize) {
        self.first.on_credential_rotated(from, to);
        self.second.on_credential_rotated(from, to);
    }
}

impl<A, B> DispatchHooks for FanoutHooks<A, B>
where
    A: DispatchHooks,
    B: DispatchHooks,
{
    fn on_state_change(&self, from: DispatchState, to: DispatchState) {
        self.first.on_state_change(from, to);
        self.second.on_state_change(from, to);
    }

    fn on_verdict(&self, verdict: &OutcomeVerdict) {
        self.first.on_verdict(verdict);
        self.second.on_verdict(verdict);
    }

    fn on_rollback(&self, reason: RollbackReason, removed: usize) {
        self.first.on_rollback(reason, removed);
        self.second.on_rollback(reason, removed);
    }

    fn on_delivery_failure(&self, chunk_index: usize, chunk_count: usize, error: &GatewayError) {
        self.first
            .on_delivery_failure(chunk_index, chunk_count, error);
        self.second
            .on_delivery_failure(chunk_index, chunk_count, error);
    }

    fn on_command(&self, command: AdminCommand) {
        self.first.on_command(command);
        self.second.on_command(command);
    }
}
