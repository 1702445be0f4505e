//! Google Gemini `generateContent` adapter.

mod client;
mod payload;
mod response;
mod transport;

pub use client::GeminiClient;
pub use payload::{
    Content, GenerateRequest, InlineData, PERMISSIVE_THRESHOLD, Part, RequestBuilder,
    SAFETY_CATEGORIES, SafetySetting,
};
pub use response::{
    ApiError, Candidate, CandidateContent, CandidatePart, GenerateResponse, OutcomeVerdict,
    PromptFeedback, RATE_LIMIT_CODE, UsageMetadata,
};
pub use transport::{GeminiHttpTransport, GeminiTransport};
