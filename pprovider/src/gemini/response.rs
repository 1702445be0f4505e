//! Gemini response models and classification into an [`OutcomeVerdict`].

use serde::Deserialize;

pub const RATE_LIMIT_CODE: i32 = 429;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
    pub index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CandidateContent {
    pub role: Option<String>,
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageMetadata {
    pub prompt_token_count: Option<i64>,
    pub candidates_token_count: Option<i64>,
    pub total_token_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeVerdict {
    /// `token_count` is `None` when usage was absent or reported as a negative sentinel.
    Success {
        text: String,
        token_count: Option<u32>,
    },
    SafetyBlocked,
    RateLimited {
        code: i32,
    },
    OtherError {
        code: i32,
        message: String,
    },
}

impl OutcomeVerdict {
    /// ```rust
    /// use pprovider::{GenerateResponse, OutcomeVerdict};
    ///
    /// let response: GenerateResponse = serde_json::from_str(
    ///     r#"{"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#,
    /// )
    /// .expect("valid response");
    /// assert_eq!(OutcomeVerdict::classify(response), OutcomeVerdict::RateLimited { code: 429 });
    /// ```
    pub fn classify(response: GenerateResponse) -> Self {
        if let Some(error) = response.error {
            if error.code == RATE_LIMIT_CODE {
                return Self::RateLimited { code: error.code };
            }

            return Self::OtherError {
                code: error.code,
                message: error.message,
            };
        }

        if response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
            .is_some()
        {
            return Self::SafetyBlocked;
        }

        let Some(candidate) = response.candidates.into_iter().next() else {
            return Self::OtherError {
                code: 0,
                message: "response contained no candidates".to_string(),
            };
        };

        match candidate.finish_reason.as_deref() {
            Some("STOP") => {
                let text = candidate
                    .content
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .filter_map(|part| part.text)
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                if text.trim().is_empty() {
                    return Self::OtherError {
                        code: 0,
                        message: "model returned an empty reply".to_string(),
                    };
                }

                let token_count = response
                    .usage_metadata
                    .and_then(|usage| usage.total_token_count)
                    .and_then(|count| u32::try_from(count).ok());

                Self::Success { text, token_count }
            }
            Some("SAFETY") => Self::SafetyBlocked,
            other => Self::OtherError {
                code: 0,
                message: format!("unexpected finish reason: {}", other.unwrap_or("none")),
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::SafetyBlocked => "safety_blocked",
            Self::RateLimited { .. } => "rate_limited",
            Self::OtherError { .. } => "other_error",
        }
    }
}
