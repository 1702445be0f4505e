use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use pchat::{AdminCommand, DispatchHooks, DispatchState, GatewayError, RollbackReason};
use pprovider::{OutcomeVerdict, ProviderError, ProviderOperationHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_call_start(&self, operation: &str, credential_index: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_call_start(operation, credential_index)
        }));
    }

    fn on_call_success(&self, operation: &str, credential_index: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_call_success(operation, credential_index, elapsed)
        }));
    }

    fn on_call_failure(
        &self,
        operation: &str,
        credential_index: usize,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_call_failure(operation, credential_index, elapsed, error)
        }));
    }

    fn on_credential_rotated(&self, from: usize, to: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_credential_rotated(from, to)
        }));
    }
}

pub struct SafeDispatchHooks<H> {
    inner: H,
}

impl<H> SafeDispatchHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> DispatchHooks for SafeDispatchHooks<H>
where
    H: DispatchHooks,
{
    fn on_state_change(&self, from: DispatchState, to: DispatchState) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_state_change(from, to)));
    }

    fn on_verdict(&self, verdict: &OutcomeVerdict) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_verdict(verdict)));
    }

    fn on_rollback(&self, reason: RollbackReason, removed: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_rollback(reason, removed)));
    }

    fn on_delivery_failure(&self, chunk_index: usize, chunk_count: usize, error: &GatewayError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_delivery_failure(chunk_index, chunk_count, error)
        }));
    }

    fn on_command(&self, command: AdminCommand) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_command(command)));
    }
}
