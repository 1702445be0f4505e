//! Conversation and attachment value types shared by request building and dispatch.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{ImageNormalizer, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }
}

/// Raw attachment bytes as downloaded from the chat platform. Consumed once per turn.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub raw_bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, raw_bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            raw_bytes,
        }
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("mime_type", &self.mime_type)
            .field("raw_bytes", &self.raw_bytes.len())
            .finish()
    }
}

/// Base64 image data ready to embed in a request.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    /// Recompresses the attachment through `normalizer` and encodes the result.
    pub fn from_attachment(
        attachment: Attachment,
        normalizer: &dyn ImageNormalizer,
    ) -> Result<Self, ProviderError> {
        let normalized = normalizer.normalize(&attachment.raw_bytes)?;
        Ok(Self::from_bytes(normalizer.output_mime_type(), &normalized))
    }
}

impl std::fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct PassthroughNormalizer;

    impl ImageNormalizer for PassthroughNormalizer {
        fn normalize(&self, raw_bytes: &[u8]) -> Result<Vec<u8>, ProviderError> {
            Ok(raw_bytes.to_vec())
        }

        fn output_mime_type(&self) -> &'static str {
            "image/jpeg"
        }
    }

    #[test]
    fn role_strings_match_api_vocabulary() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Model.as_str(), "model");
    }

    #[test]
    fn inline_image_encodes_normalized_bytes_with_output_type() {
        let attachment = Attachment::new("image/png", b"abc".to_vec());
        let image = InlineImage::from_attachment(attachment, &PassthroughNormalizer)
            .expect("image should encode");

        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "YWJj");
    }

    #[test]
    fn attachment_debug_hides_payload_bytes() {
        let attachment = Attachment::new("image/png", vec![1, 2, 3]);
        assert_eq!(
            format!("{attachment:?}"),
            "Attachment { mime_type: \"image/png\", raw_bytes: 3 }"
        );
    }
}
