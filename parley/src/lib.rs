//! Unified facade over the parley workspace crates.
//!
//! This crate wires configuration, logging, the Gemini client, and the reply
//! dispatcher together, and re-exports the pieces most applications embed.

pub mod config;
pub mod console;
pub mod fetch;
pub mod logging;
pub mod prelude;
pub mod providers;
pub mod runtime;

pub use pchat;
pub use pcommon;
pub use pobserve;
pub use pprovider;

pub use config::{ConfigError, ConfigErrorKind, RelayArgs, RelayConfig};
pub use console::{ConsoleGateway, ConsoleInput};
pub use fetch::HttpAttachmentFetcher;
pub use pchat::{
    ChatError, ChatErrorKind, DispatchOutcome, DispatchPolicy, GatewayError, InboundEvent,
    MessagingGateway, ReplyDispatcher, TriggerPolicy,
};
pub use pcommon::{BoxFuture, ChannelId, UserId};
pub use pprovider::{CredentialRotator, GeminiClient, ProviderError, ProviderErrorKind};
pub use providers::{build_client, build_fetcher, build_rotator};
pub use runtime::{
    build_dispatcher, build_dispatcher_with, dispatch_hooks, dispatch_policy, provider_hooks,
    trigger_policy,
};
