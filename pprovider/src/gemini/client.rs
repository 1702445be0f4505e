//! Gemini client: one timed remote call per turn, classified into a verdict.

use std::sync::Arc;

use crate::{
    CallPolicy, CredentialRotator, Endpoint, NoopOperationHooks, ProviderError,
    ProviderOperationHooks, execute_with_timeout,
};

use super::payload::GenerateRequest;
use super::response::OutcomeVerdict;
use super::transport::GeminiTransport;

const GENERATE_OPERATION: &str = "generate_content";

#[derive(Clone)]
pub struct GeminiClient {
    transport: Arc<dyn GeminiTransport>,
    policy: CallPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl GeminiClient {
    pub fn new(transport: Arc<dyn GeminiTransport>) -> Self {
        Self {
            transport,
            policy: CallPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(&self) -> &CallPolicy {
        &self.policy
    }

    /// `Err` means no verdict was obtained: network failure, malformed body, or timeout.
    pub async fn generate(
        &self,
        endpoint: &Endpoint,
        request: &GenerateRequest,
    ) -> Result<OutcomeVerdict, ProviderError> {
        let response = execute_with_timeout(
            GENERATE_OPERATION,
            endpoint.credential_index(),
            &self.policy,
            self.hooks.as_ref(),
            self.transport.generate(endpoint, request),
        )
        .await?;

        Ok(OutcomeVerdict::classify(response))
    }

    /// Advances `rotator` after a rate-limit verdict and reports the move to the hooks.
    pub fn rotate(&self, rotator: &mut CredentialRotator) -> usize {
        let from = rotator.cursor();
        let to = rotator.advance();
        self.hooks.on_credential_rotated(from, to);
        to
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("transport", &self.transport)
            .field("policy", &self.policy)
            .finish()
    }
}
