#![cfg(feature = "provider-gemini")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pprovider::gemini::{GenerateResponse, OutcomeVerdict};
use pprovider::{
    CallPolicy, CredentialRotator, Endpoint, GeminiClient, GeminiTransport, GenerateRequest,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderOperationHooks, RequestBuilder,
    Turn,
};

#[derive(Debug)]
struct FakeTransport {
    body: &'static str,
    delay: Option<Duration>,
    captured_urls: Mutex<Vec<String>>,
    captured_requests: Mutex<Vec<GenerateRequest>>,
}

impl FakeTransport {
    fn replying(body: &'static str) -> Self {
        Self {
            body,
            delay: None,
            captured_urls: Mutex::new(Vec::new()),
            captured_requests: Mutex::new(Vec::new()),
        }
    }

    fn stalled() -> Self {
        Self {
            delay: Some(Duration::from_secs(5)),
            ..Self::replying("{}")
        }
    }
}

impl GeminiTransport for FakeTransport {
    fn generate<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: &'a GenerateRequest,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>> {
        Box::pin(async move {
            self.captured_urls
                .lock()
                .expect("urls lock")
                .push(endpoint.url().to_string());
            self.captured_requests
                .lock()
                .expect("requests lock")
                .push(request.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            serde_json::from_str(self.body).map_err(|err| ProviderError::transport(err.to_string()))
        })
    }
}

#[derive(Default)]
struct RotationHooks {
    rotations: Mutex<Vec<(usize, usize)>>,
}

impl ProviderOperationHooks for RotationHooks {
    fn on_credential_rotated(&self, from: usize, to: usize) {
        self.rotations.lock().expect("rotations lock").push((from, to));
    }
}

#[tokio::test]
async fn generate_sends_request_to_current_credential_and_classifies_reply() {
    let transport = Arc::new(FakeTransport::replying(
        r#"{"candidates": [{"content": {"parts": [{"text": "hi there"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"totalTokenCount": 42}}"#,
    ));
    let client = GeminiClient::new(transport.clone());
    let rotator = CredentialRotator::new(["key-a", "key-b"]).expect("credentials");
    let request = RequestBuilder::default().build(&[Turn::user("hello")], None);

    let verdict = client
        .generate(&rotator.current(), &request)
        .await
        .expect("call should succeed");

    assert_eq!(
        verdict,
        OutcomeVerdict::Success {
            text: "hi there".to_string(),
            token_count: Some(42),
        }
    );
    let urls = transport.captured_urls.lock().expect("urls lock");
    assert!(urls[0].ends_with(":generateContent?key=key-a"));
    assert_eq!(
        transport.captured_requests.lock().expect("requests lock")[0],
        request
    );
}

#[tokio::test]
async fn generate_times_out_stalled_calls() {
    let client = GeminiClient::new(Arc::new(FakeTransport::stalled()))
        .with_policy(CallPolicy::new(Duration::from_millis(20)));
    let rotator = CredentialRotator::new(["key-a"]).expect("credentials");
    let request = RequestBuilder::default().build(&[Turn::user("hello")], None);

    let error = client
        .generate(&rotator.current(), &request)
        .await
        .expect_err("call should time out");

    assert_eq!(error.kind, ProviderErrorKind::Timeout);
}

#[tokio::test]
async fn rotate_advances_cursor_and_reports_hooks() {
    let hooks = Arc::new(RotationHooks::default());
    let transport = Arc::new(FakeTransport::replying(r#"{"error": {"code": 429, "message": "quota"}}"#));
    let client = GeminiClient::new(transport.clone()).with_hooks(hooks.clone());
    let mut rotator = CredentialRotator::new(["key-a", "key-b"]).expect("credentials");
    let request = RequestBuilder::default().build(&[Turn::user("hello")], None);

    let verdict = client
        .generate(&rotator.current(), &request)
        .await
        .expect("call should produce a verdict");
    assert_eq!(verdict, OutcomeVerdict::RateLimited { code: 429 });

    assert_eq!(client.rotate(&mut rotator), 1);
    let _ = client.generate(&rotator.current(), &request).await;

    let urls = transport.captured_urls.lock().expect("urls lock");
    assert!(urls[1].ends_with("key=key-b"));
    assert_eq!(*hooks.rotations.lock().expect("rotations lock"), vec![(0, 1)]);
}
