//! Secure in-memory credential storage and round-robin rotation across API keys.

use std::fmt::{Display, Formatter};

use crate::ProviderError;

/// Number of indexed credential slots probed at startup.
pub const CREDENTIAL_SLOTS: usize = 16;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// A fully-qualified `generateContent` URL carrying one credential.
pub struct Endpoint {
    url: SecretString,
    redacted: String,
    credential_index: usize,
}

impl Endpoint {
    pub fn url(&self) -> &str {
        self.url.expose()
    }

    pub fn credential_index(&self) -> usize {
        self.credential_index
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.redacted)
            .field("credential_index", &self.credential_index)
            .finish()
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted)
    }
}

/// Ordered set of non-empty API keys plus the process-wide rotation cursor.
///
/// ```rust
/// use pprovider::CredentialRotator;
///
/// let mut rotator = CredentialRotator::new(["key-a", "", "key-b"]).expect("credentials");
/// assert_eq!(rotator.len(), 2);
/// assert_eq!(rotator.advance(), 1);
/// assert_eq!(rotator.advance(), 0);
/// assert!(rotator.current().url().ends_with("key=key-a"));
/// ```
#[derive(Debug)]
pub struct CredentialRotator {
    credentials: Vec<SecretString>,
    cursor: usize,
    base_url: String,
    model: String,
}

impl CredentialRotator {
    pub fn new<I, S>(credentials: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let credentials = credentials
            .into_iter()
            .map(|value| SecretString::new(value.into().trim().to_string()))
            .filter(|secret| !secret.is_empty())
            .collect::<Vec<_>>();

        if credentials.is_empty() {
            return Err(ProviderError::configuration("no valid credentials found"));
        }

        Ok(Self {
            credentials,
            cursor: 0,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Resolves each of the [`CREDENTIAL_SLOTS`] indexed slots in order, keeping non-empty values.
    pub fn from_slots(
        resolve: impl FnMut(usize) -> Option<String>,
    ) -> Result<Self, ProviderError> {
        Self::new((0..CREDENTIAL_SLOTS).filter_map(resolve))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Endpoint {
        let base = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let key = self.credentials[self.cursor].expose();

        Endpoint {
            url: SecretString::new(format!("{base}?key={key}")),
            redacted: format!("{base}?key=[REDACTED]"),
            credential_index: self.cursor,
        }
    }

    /// Moves to the next non-empty credential and returns the new cursor.
    pub fn advance(&mut self) -> usize {
        let count = self.credentials.len();
        for _ in 0..count {
            self.cursor = (self.cursor + 1) % count;
            if !self.credentials[self.cursor].is_empty() {
                break;
            }
        }

        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn construction_filters_empty_slots_and_keeps_order() {
        let rotator = CredentialRotator::from_slots(|slot| match slot {
            0 => Some("first".to_string()),
            3 => Some("   ".to_string()),
            7 => Some("second".to_string()),
            _ => None,
        })
        .expect("credentials");

        assert_eq!(rotator.len(), 2);
        assert!(rotator.current().url().ends_with("key=first"));
    }

    #[test]
    fn construction_fails_eagerly_without_credentials() {
        let error = CredentialRotator::from_slots(|_| None).expect_err("should fail");
        assert_eq!(error.kind, ProviderErrorKind::Configuration);

        let error = CredentialRotator::new(["", " "]).expect_err("should fail");
        assert_eq!(error.kind, ProviderErrorKind::Configuration);
    }

    #[test]
    fn slots_beyond_the_slot_space_are_never_probed() {
        let mut probed = Vec::new();
        let _ = CredentialRotator::from_slots(|slot| {
            probed.push(slot);
            Some(format!("key-{slot}"))
        });

        assert_eq!(probed.len(), CREDENTIAL_SLOTS);
        assert_eq!(probed.last(), Some(&(CREDENTIAL_SLOTS - 1)));
    }

    #[test]
    fn advancing_len_times_returns_to_start() {
        let mut rotator = CredentialRotator::new(["a", "b", "c"]).expect("credentials");
        let start = rotator.cursor();

        assert_eq!(rotator.advance(), 1);
        assert_eq!(rotator.advance(), 2);
        assert_eq!(rotator.advance(), start);
    }

    #[test]
    fn single_credential_rotation_stays_put() {
        let mut rotator = CredentialRotator::new(["only"]).expect("credentials");
        assert_eq!(rotator.advance(), 0);
        assert_eq!(rotator.advance(), 0);
    }

    #[test]
    fn endpoint_composes_model_and_redacts_key_in_display() {
        let rotator = CredentialRotator::new(["secret-key"])
            .expect("credentials")
            .with_base_url("https://example.test/v1/")
            .with_model("gemini-test");
        let endpoint = rotator.current();

        assert_eq!(
            endpoint.url(),
            "https://example.test/v1/models/gemini-test:generateContent?key=secret-key"
        );
        assert_eq!(
            endpoint.to_string(),
            "https://example.test/v1/models/gemini-test:generateContent?key=[REDACTED]"
        );
        assert!(!format!("{endpoint:?}").contains("secret-key"));
        assert!(!format!("{rotator:?}").contains("secret-key"));
    }
}
