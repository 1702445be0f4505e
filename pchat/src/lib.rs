//! Conversation state and reply delivery between a chat platform and a generative model.

mod chunk;
mod dispatcher;
mod error;
mod gateway;
mod hooks;
mod store;
mod trigger;

pub mod prelude {
    pub use crate::{
        AdminCommand, AttachmentFetcher, AttachmentRef, ChatError, ChatErrorKind,
        ConversationStore, DispatchHooks, DispatchOutcome, DispatchPolicy, DispatchState,
        GatewayError, InboundEvent, MessagingGateway, ReplyDispatcher, TriggerPolicy, split,
    };
    pub use pcommon::{BoxFuture, ChannelId, UserId};
    pub use pprovider::{OutcomeVerdict, Role, Turn};
}

pub use chunk::{Chunks, DEFAULT_DELIVERY_LIMIT, split};
pub use dispatcher::{
    DispatchOutcome, DispatchPolicy, IDLE_STATUS, ReplyDispatcher, ReplyDispatcherBuilder,
};
pub use error::{ChatError, ChatErrorKind};
pub use gateway::{
    AttachmentFetcher, AttachmentRef, GatewayError, InboundEvent, MessagingGateway,
    NoAttachmentFetcher,
};
pub use hooks::{DispatchHooks, DispatchState, NoopDispatchHooks, RollbackReason};
pub use store::{ConversationStore, DEFAULT_WINDOW};
pub use trigger::{
    AdminCommand, Inbound, Prompt, RESET_COMMAND, RESTART_COMMAND, REVERT_COMMANDS,
    TriggerKind, TriggerPolicy,
};
pub use pcommon::{BoxFuture, ChannelId, UserId};
