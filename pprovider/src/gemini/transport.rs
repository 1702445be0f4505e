//! Gemini transport trait and reqwest-based HTTP implementation.

use reqwest::{Client, header};

use crate::{Endpoint, ProviderError, ProviderFuture};

use super::payload::GenerateRequest;
use super::response::{ApiError, GenerateResponse};

pub trait GeminiTransport: Send + Sync + std::fmt::Debug {
    fn generate<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: &'a GenerateRequest,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>>;
}

#[derive(Debug, Clone, Default)]
pub struct GeminiHttpTransport {
    client: Client,
}

impl GeminiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl GeminiTransport for GeminiHttpTransport {
    fn generate<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: &'a GenerateRequest,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>> {
        Box::pin(async move {
            let body = request.to_json_bytes()?;
            tracing::debug!(
                phase = "provider",
                event = "request_built",
                endpoint = %endpoint,
                size_kb = body.len() as f64 / 1024.0
            );

            let response = self
                .client
                .post(endpoint.url())
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.without_url().to_string())
                    } else {
                        ProviderError::transport(err.without_url().to_string())
                    }
                })?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|err| ProviderError::transport(err.without_url().to_string()))?;

            parse_response_body(status.as_u16(), &text)
        })
    }
}

/// Error statuses without an `error` object still surface as an API error carrying the status.
pub(crate) fn parse_response_body(status: u16, body: &str) -> Result<GenerateResponse, ProviderError> {
    let success = (200..300).contains(&status);
    let mut parsed = match serde_json::from_str::<GenerateResponse>(body) {
        Ok(parsed) => parsed,
        Err(err) if success => {
            return Err(ProviderError::transport(format!(
                "malformed response body: {err}"
            )));
        }
        Err(_) => GenerateResponse::default(),
    };

    if !success && parsed.error.is_none() {
        parsed.error = Some(ApiError {
            code: i32::from(status),
            message: format!("request failed with status {status}"),
            status: None,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn malformed_success_body_is_transport_failure() {
        let error = parse_response_body(200, "<html>oops</html>").expect_err("should fail");
        assert_eq!(error.kind, ProviderErrorKind::Transport);
    }

    #[test]
    fn error_status_without_json_becomes_api_error() {
        let parsed = parse_response_body(429, "Too Many Requests").expect("should parse");
        assert_eq!(parsed.error.map(|error| error.code), Some(429));
    }

    #[test]
    fn error_status_with_json_keeps_remote_error() {
        let parsed = parse_response_body(
            403,
            r#"{"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}}"#,
        )
        .expect("should parse");
        let error = parsed.error.expect("error present");
        assert_eq!(error.code, 403);
        assert_eq!(error.message, "API key not valid");
    }
}
