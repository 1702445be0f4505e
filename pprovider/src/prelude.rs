pub use crate::{
    Attachment, CallPolicy, CredentialRotator, Endpoint, ImageNormalizer, InlineImage,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderOperationHooks, Role, Turn,
};

#[cfg(feature = "provider-gemini")]
pub use crate::{GeminiClient, GeminiTransport, GenerateRequest, OutcomeVerdict, RequestBuilder};
