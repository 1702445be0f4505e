//! Remote call timeout policy and operational hook contracts.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::ProviderError;

#[derive(Debug, Clone, PartialEq)]
pub struct CallPolicy {
    pub timeout: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

impl CallPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

pub trait ProviderOperationHooks: Send + Sync {
    fn on_call_start(&self, _operation: &str, _credential_index: usize) {}

    fn on_call_success(&self, _operation: &str, _credential_index: usize, _elapsed: Duration) {}

    fn on_call_failure(
        &self,
        _operation: &str,
        _credential_index: usize,
        _elapsed: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_credential_rotated(&self, _from: usize, _to: usize) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Runs one remote call under `policy`, converting an elapsed deadline into a timeout error.
pub async fn execute_with_timeout<T, Fut>(
    operation: &str,
    credential_index: usize,
    policy: &CallPolicy,
    hooks: &dyn ProviderOperationHooks,
    call: Fut,
) -> Result<T, ProviderError>
where
    Fut: Future<Output = Result<T, ProviderError>>,
{
    hooks.on_call_start(operation, credential_index);
    let started = Instant::now();

    let result = match tokio::time::timeout(policy.timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timeout(format!(
            "{operation} did not complete within {}ms",
            policy.timeout.as_millis()
        ))),
    };

    let elapsed = started.elapsed();
    match &result {
        Ok(_) => hooks.on_call_success(operation, credential_index, elapsed),
        Err(error) => hooks.on_call_failure(operation, credential_index, elapsed, error),
    }

    result
}
