//! Gemini `generateContent` request payloads and the request builder.

use serde::Serialize;

use crate::{InlineImage, ProviderError, Role, Turn};

pub const PERMISSIVE_THRESHOLD: &str = "BLOCK_NONE";

pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateRequest {
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ProviderError> {
        serde_json::to_vec(self)
            .map_err(|err| ProviderError::invalid_request(format!("unserializable request: {err}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// Assembles request payloads, attaching the same safety policy to every call.
///
/// ```rust
/// use pprovider::{RequestBuilder, Turn};
///
/// let history = vec![Turn::user("hi"), Turn::model("hello"), Turn::user("how are you?")];
/// let request = RequestBuilder::default().build(&history, None);
/// assert_eq!(request.contents.len(), 3);
/// assert_eq!(request.safety_settings.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    safety_settings: Vec<SafetySetting>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_string(),
                    threshold: PERMISSIVE_THRESHOLD.to_string(),
                })
                .collect(),
        }
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn safety_settings(&self) -> &[SafetySetting] {
        &self.safety_settings
    }

    /// `history` must already end with the new user turn.
    ///
    /// With an image only that last turn is sent, alongside the inline image data.
    pub fn build(&self, history: &[Turn], image: Option<&InlineImage>) -> GenerateRequest {
        match image {
            Some(image) => {
                let text = history
                    .last()
                    .filter(|turn| turn.role == Role::User)
                    .map(|turn| turn.text.as_str())
                    .unwrap_or_default();
                self.image(image, text)
            }
            None => self.conversation(history),
        }
    }

    pub fn conversation(&self, history: &[Turn]) -> GenerateRequest {
        GenerateRequest {
            contents: history
                .iter()
                .map(|turn| Content {
                    role: turn.role.as_str().to_string(),
                    parts: vec![Part::Text {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
            safety_settings: self.safety_settings.clone(),
        }
    }

    pub fn image(&self, image: &InlineImage, text: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Role::User.as_str().to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            data: image.data.clone(),
                            mime_type: image.mime_type.clone(),
                        },
                    },
                    Part::Text {
                        text: text.to_string(),
                    },
                ],
            }],
            safety_settings: self.safety_settings.clone(),
        }
    }
}
