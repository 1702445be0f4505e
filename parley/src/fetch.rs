//! Attachment download over HTTP.

use pchat::{AttachmentFetcher, AttachmentRef, ChatError};
use pcommon::BoxFuture;
use reqwest::Client;

#[derive(Debug, Clone, Default)]
pub struct HttpAttachmentFetcher {
    client: Client,
}

impl HttpAttachmentFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AttachmentFetcher for HttpAttachmentFetcher {
    fn fetch<'a>(&'a self, attachment: &'a AttachmentRef) -> BoxFuture<'a, Result<Vec<u8>, ChatError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&attachment.url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|err| {
                    ChatError::attachment(format!(
                        "failed to download {}: {}",
                        attachment.filename,
                        err.without_url()
                    ))
                })?;

            let bytes = response.bytes().await.map_err(|err| {
                ChatError::attachment(format!(
                    "failed to read {}: {}",
                    attachment.filename,
                    err.without_url()
                ))
            })?;

            tracing::debug!(
                phase = "fetch",
                event = "attachment_downloaded",
                filename = %attachment.filename,
                bytes = bytes.len()
            );
            Ok(bytes.to_vec())
        })
    }
}
