//! Runtime wiring from configuration to a ready dispatcher.

use std::sync::Arc;

use pchat::{
    AttachmentFetcher, DispatchHooks, DispatchPolicy, MessagingGateway, ReplyDispatcher,
    TriggerPolicy,
};
use pobserve::{
    FanoutHooks, MetricsObservabilityHooks, SafeDispatchHooks, SafeProviderHooks,
    TracingObservabilityHooks,
};
use pprovider::{GeminiClient, ProviderError, ProviderOperationHooks};

use crate::{RelayConfig, build_client, build_fetcher, build_rotator};

pub const TRANSPORT_FAILURE_NOTICE: &str = "Something went wrong talking to the model. Please try again.";

pub fn provider_hooks() -> Arc<dyn ProviderOperationHooks> {
    Arc::new(SafeProviderHooks::new(FanoutHooks::new(
        TracingObservabilityHooks,
        MetricsObservabilityHooks,
    )))
}

pub fn dispatch_hooks() -> Arc<dyn DispatchHooks> {
    Arc::new(SafeDispatchHooks::new(FanoutHooks::new(
        TracingObservabilityHooks,
        MetricsObservabilityHooks,
    )))
}

pub fn trigger_policy(config: &RelayConfig) -> TriggerPolicy {
    let policy = TriggerPolicy::new(config.bot_id.as_str());
    match &config.admin_id {
        Some(admin) => policy.with_admin(admin.as_str()),
        None => policy,
    }
}

pub fn dispatch_policy(config: &RelayConfig) -> DispatchPolicy {
    let policy = DispatchPolicy::default().with_delivery_limit(config.delivery_limit);
    if config.notify_transport_failure {
        policy.notify_transport_failures(TRANSPORT_FAILURE_NOTICE)
    } else {
        policy
    }
}

/// Builds a dispatcher talking to the real Gemini endpoint over HTTP.
pub fn build_dispatcher(
    config: &RelayConfig,
    gateway: Arc<dyn MessagingGateway>,
) -> Result<ReplyDispatcher, ProviderError> {
    let client = build_client(config, provider_hooks())?;
    let fetcher = build_fetcher(config)?;
    build_dispatcher_with(config, client, gateway, Arc::new(fetcher))
}

pub fn build_dispatcher_with(
    config: &RelayConfig,
    client: GeminiClient,
    gateway: Arc<dyn MessagingGateway>,
    fetcher: Arc<dyn AttachmentFetcher>,
) -> Result<ReplyDispatcher, ProviderError> {
    let rotator = build_rotator(config)?;
    tracing::info!(
        phase = "startup",
        event = "dispatcher_ready",
        credentials = rotator.len(),
        model = %config.model,
        window = config.history_window,
        delivery_limit = config.delivery_limit
    );

    Ok(
        ReplyDispatcher::builder(client, gateway, rotator, trigger_policy(config))
            .fetcher(fetcher)
            .policy(dispatch_policy(config))
            .hooks(dispatch_hooks())
            .window(config.history_window)
            .build(),
    )
}
