//! Messaging gateway contracts consumed by the dispatcher.

use std::error::Error;
use std::fmt::{Display, Formatter};

use pcommon::{BoxFuture, ChannelId, UserId};

use crate::ChatError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "gateway: {}", self.message)
    }
}

impl Error for GatewayError {}

pub trait MessagingGateway: Send + Sync {
    fn send_typing<'a>(&'a self, channel: &'a ChannelId) -> BoxFuture<'a, Result<(), GatewayError>>;

    fn send_message<'a>(
        &'a self,
        channel: &'a ChannelId,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), GatewayError>>;

    fn set_status<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), GatewayError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub url: String,
    pub content_type: String,
    pub filename: String,
}

impl AttachmentRef {
    pub fn new(
        url: impl Into<String>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub author_id: UserId,
    pub channel_id: ChannelId,
    pub content: String,
    pub mentions: Vec<UserId>,
    pub attachments: Vec<AttachmentRef>,
}

impl InboundEvent {
    pub fn new(
        author_id: impl Into<UserId>,
        channel_id: impl Into<ChannelId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            channel_id: channel_id.into(),
            content: content.into(),
            mentions: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_mention(mut self, user: impl Into<UserId>) -> Self {
        self.mentions.push(user.into());
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentRef) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Downloads attachment bytes referenced by an inbound event.
pub trait AttachmentFetcher: Send + Sync {
    fn fetch<'a>(&'a self, attachment: &'a AttachmentRef) -> BoxFuture<'a, Result<Vec<u8>, ChatError>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoAttachmentFetcher;

impl AttachmentFetcher for NoAttachmentFetcher {
    fn fetch<'a>(&'a self, attachment: &'a AttachmentRef) -> BoxFuture<'a, Result<Vec<u8>, ChatError>> {
        Box::pin(async move {
            Err(ChatError::attachment(format!(
                "no attachment fetcher configured for {}",
                attachment.filename
            )))
        })
    }
}
