//! Common imports for applications embedding the relay.

pub use crate::{
    build_client, build_dispatcher, build_dispatcher_with, build_fetcher, build_rotator,
    dispatch_policy, trigger_policy,
};
pub use crate::{
    BoxFuture, ChannelId, ChatError, ConfigError, ConsoleGateway, ConsoleInput, DispatchOutcome,
    GatewayError, GeminiClient, HttpAttachmentFetcher, InboundEvent, MessagingGateway,
    ProviderError, RelayArgs, RelayConfig, ReplyDispatcher, UserId,
};
