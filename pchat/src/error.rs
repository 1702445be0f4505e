//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    Configuration,
    Transport,
    Delivery,
    EmptyConversation,
    Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Configuration, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transport, message)
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Delivery, message)
    }

    pub fn empty_conversation() -> Self {
        Self::new(ChatErrorKind::EmptyConversation, "conversation has no turns")
    }

    pub fn attachment(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Attachment, message)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<pprovider::ProviderError> for ChatError {
    fn from(value: pprovider::ProviderError) -> Self {
        match value.kind {
            pprovider::ProviderErrorKind::Configuration => ChatError::configuration(value.message),
            _ => ChatError::transport(value.to_string()),
        }
    }
}

impl From<GatewayError> for ChatError {
    fn from(value: GatewayError) -> Self {
        ChatError::delivery(value.message)
    }
}
