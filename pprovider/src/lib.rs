//! Generative model access for the relay: credentials, payloads, transport, and verdicts.

use std::future::Future;
use std::pin::Pin;

mod credentials;
mod error;
mod media;
mod model;
mod resilience;

#[cfg(feature = "provider-gemini")]
pub mod gemini;

pub mod prelude;

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use credentials::{
    CREDENTIAL_SLOTS, CredentialRotator, DEFAULT_BASE_URL, DEFAULT_MODEL, Endpoint, SecretString,
};
pub use error::{ProviderError, ProviderErrorKind};
pub use media::{ImageNormalizer, SUPPORTED_IMAGE_TYPES, is_supported_image_type};
#[cfg(feature = "image-jpeg")]
pub use media::JpegNormalizer;
pub use model::{Attachment, InlineImage, Role, Turn};
pub use resilience::{CallPolicy, NoopOperationHooks, ProviderOperationHooks, execute_with_timeout};

#[cfg(feature = "provider-gemini")]
pub use gemini::{
    GeminiClient, GeminiHttpTransport, GeminiTransport, GenerateRequest, GenerateResponse,
    OutcomeVerdict, RequestBuilder,
};
