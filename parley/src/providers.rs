//! Remote client construction for the relay.

use std::sync::Arc;

use pprovider::{
    CallPolicy, CredentialRotator, GeminiClient, GeminiHttpTransport, ProviderError,
    ProviderOperationHooks,
};
use reqwest::Client;

use crate::{HttpAttachmentFetcher, RelayConfig};

pub fn build_client(
    config: &RelayConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<GeminiClient, ProviderError> {
    let http = Client::builder()
        .build()
        .map_err(|err| ProviderError::transport(err.without_url().to_string()))?;
    let transport = Arc::new(GeminiHttpTransport::new(http));

    Ok(GeminiClient::new(transport)
        .with_policy(CallPolicy::new(config.request_timeout))
        .with_hooks(hooks))
}

/// Attachment downloads share the remote call deadline.
pub fn build_fetcher(config: &RelayConfig) -> Result<HttpAttachmentFetcher, ProviderError> {
    let http = Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.without_url().to_string()))?;
    Ok(HttpAttachmentFetcher::new(http))
}

pub fn build_rotator(config: &RelayConfig) -> Result<CredentialRotator, ProviderError> {
    let rotator = CredentialRotator::new(
        config
            .credentials
            .iter()
            .map(|credential| credential.expose().to_string()),
    )?;

    Ok(rotator
        .with_base_url(config.base_url.clone())
        .with_model(config.model.clone()))
}
