//! Turn processing: trigger, remote call, verdict handling, history mutation, delivery.

use std::sync::Arc;

use pcommon::ChannelId;
use pprovider::{
    CredentialRotator, GeminiClient, ImageNormalizer, InlineImage, JpegNormalizer,
    OutcomeVerdict, RequestBuilder, Turn, is_supported_image_type,
};
use tokio::sync::Mutex;

use crate::{
    AdminCommand, AttachmentFetcher, AttachmentRef, ChatError, ConversationStore,
    DEFAULT_DELIVERY_LIMIT, DEFAULT_WINDOW, DispatchHooks, DispatchState, Inbound, InboundEvent,
    MessagingGateway, NoAttachmentFetcher, NoopDispatchHooks, Prompt, RollbackReason,
    TriggerPolicy, split,
};

pub const IDLE_STATUS: &str = "Tokens: 0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub delivery_limit: usize,
    pub safety_notice: String,
    /// `None` keeps transport failures silent to the user; they are only logged.
    pub transport_failure_notice: Option<String>,
    pub revert_preview_chars: usize,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            delivery_limit: DEFAULT_DELIVERY_LIMIT,
            safety_notice: "That request was blocked by the model's safety filters.".to_string(),
            transport_failure_notice: None,
            revert_preview_chars: 100,
        }
    }
}

impl DispatchPolicy {
    pub fn with_delivery_limit(mut self, limit: usize) -> Self {
        self.delivery_limit = limit;
        self
    }

    pub fn with_safety_notice(mut self, notice: impl Into<String>) -> Self {
        self.safety_notice = notice.into();
        self
    }

    pub fn notify_transport_failures(mut self, notice: impl Into<String>) -> Self {
        self.transport_failure_notice = Some(notice.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored,
    Replied {
        chunks: usize,
        token_count: Option<u32>,
    },
    SafetyBlocked,
    RateLimited {
        code: i32,
        next_credential: usize,
    },
    RemoteError {
        code: i32,
    },
    TransportFailed,
    DeliveryFailed {
        delivered: usize,
    },
    UnsupportedAttachment,
    AttachmentFailed,
    Reset,
    Reverted {
        preview: Option<String>,
    },
    RestartRequested,
}

/// Session state owned by one dispatcher; only touched while its lock is held.
#[derive(Debug)]
struct Session {
    store: ConversationStore,
    rotator: CredentialRotator,
}

pub struct ReplyDispatcherBuilder {
    client: GeminiClient,
    gateway: Arc<dyn MessagingGateway>,
    rotator: CredentialRotator,
    triggers: TriggerPolicy,
    fetcher: Arc<dyn AttachmentFetcher>,
    normalizer: Arc<dyn ImageNormalizer>,
    requests: RequestBuilder,
    policy: DispatchPolicy,
    hooks: Arc<dyn DispatchHooks>,
    window: usize,
}

impl ReplyDispatcherBuilder {
    pub fn fetcher(mut self, fetcher: Arc<dyn AttachmentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn normalizer(mut self, normalizer: Arc<dyn ImageNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn requests(mut self, requests: RequestBuilder) -> Self {
        self.requests = requests;
        self
    }

    pub fn policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn build(self) -> ReplyDispatcher {
        ReplyDispatcher {
            session: Mutex::new(Session {
                store: ConversationStore::new(self.window),
                rotator: self.rotator,
            }),
            client: self.client,
            gateway: self.gateway,
            triggers: self.triggers,
            fetcher: self.fetcher,
            normalizer: self.normalizer,
            requests: self.requests,
            policy: self.policy,
            hooks: self.hooks,
        }
    }
}

/// Drives one inbound event at a time through the reply state machine.
///
/// The session lock is held for the whole span of a turn, so concurrent events queue
/// and every rollback only ever removes turns appended by the same turn.
pub struct ReplyDispatcher {
    session: Mutex<Session>,
    client: GeminiClient,
    gateway: Arc<dyn MessagingGateway>,
    triggers: TriggerPolicy,
    fetcher: Arc<dyn AttachmentFetcher>,
    normalizer: Arc<dyn ImageNormalizer>,
    requests: RequestBuilder,
    policy: DispatchPolicy,
    hooks: Arc<dyn DispatchHooks>,
}

impl ReplyDispatcher {
    pub fn builder(
        client: GeminiClient,
        gateway: Arc<dyn MessagingGateway>,
        rotator: CredentialRotator,
        triggers: TriggerPolicy,
    ) -> ReplyDispatcherBuilder {
        ReplyDispatcherBuilder {
            client,
            gateway,
            rotator,
            triggers,
            fetcher: Arc::new(NoAttachmentFetcher),
            normalizer: Arc::new(JpegNormalizer::default()),
            requests: RequestBuilder::default(),
            policy: DispatchPolicy::default(),
            hooks: Arc::new(NoopDispatchHooks),
            window: DEFAULT_WINDOW,
        }
    }

    pub async fn history(&self) -> Vec<Turn> {
        self.session.lock().await.store.turns().to_vec()
    }

    pub async fn credential_cursor(&self) -> usize {
        self.session.lock().await.rotator.cursor()
    }

    /// Publishes the initial token status.
    pub async fn announce_ready(&self) {
        if let Err(error) = self.gateway.set_status(IDLE_STATUS).await {
            tracing::warn!(phase = "dispatch", event = "status_failed", error = %error);
        }
    }

    pub async fn handle(&self, event: InboundEvent) -> DispatchOutcome {
        match self.triggers.classify(&event) {
            Inbound::Ignored => DispatchOutcome::Ignored,
            Inbound::Command(command) => self.run_command(&event.channel_id, command).await,
            Inbound::Prompt(prompt) => self.run_prompt(&event.channel_id, prompt).await,
        }
    }

    async fn run_prompt(&self, channel: &ChannelId, prompt: Prompt) -> DispatchOutcome {
        let mut session = self.session.lock().await;
        self.transition(DispatchState::Idle, DispatchState::BuildingRequest);
        tracing::info!(
            phase = "dispatch",
            event = "prompt_accepted",
            channel = %channel,
            trigger = ?prompt.trigger,
            has_attachment = prompt.attachment.is_some()
        );

        if let Err(error) = self.gateway.send_typing(channel).await {
            tracing::warn!(phase = "dispatch", event = "typing_failed", error = %error);
        }

        let image = match &prompt.attachment {
            Some(attachment) => match self.prepare_image(channel, attachment).await {
                Ok(image) => Some(image),
                Err(outcome) => {
                    self.transition(DispatchState::BuildingRequest, DispatchState::Idle);
                    return outcome;
                }
            },
            None => None,
        };

        session.store.append_user(prompt.text);
        let request = self.requests.build(session.store.turns(), image.as_ref());
        let endpoint = session.rotator.current();

        self.transition(DispatchState::BuildingRequest, DispatchState::AwaitingRemote);
        let verdict = match self.client.generate(&endpoint, &request).await {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::error!(
                    phase = "dispatch",
                    event = "transport_failure",
                    error_kind = ?error.kind,
                    error = %error
                );
                let removed = usize::from(session.store.rollback_one().is_some());
                self.hooks.on_rollback(RollbackReason::TransportFailure, removed);
                self.transition(DispatchState::AwaitingRemote, DispatchState::RolledBack);

                if let Some(notice) = &self.policy.transport_failure_notice {
                    self.notify(channel, notice).await;
                }
                self.transition(DispatchState::RolledBack, DispatchState::Idle);
                return DispatchOutcome::TransportFailed;
            }
        };

        self.transition(DispatchState::AwaitingRemote, DispatchState::Interpreting);
        self.hooks.on_verdict(&verdict);

        match verdict {
            OutcomeVerdict::Success { text, token_count } => {
                session.store.append_model(text.clone());
                self.transition(DispatchState::Interpreting, DispatchState::Delivering);
                self.deliver_reply(&mut session, channel, &text, token_count)
                    .await
            }
            OutcomeVerdict::SafetyBlocked => {
                self.transition(DispatchState::Interpreting, DispatchState::Delivering);
                self.notify(channel, &self.policy.safety_notice).await;
                self.transition(DispatchState::Delivering, DispatchState::Idle);
                DispatchOutcome::SafetyBlocked
            }
            OutcomeVerdict::RateLimited { code } => {
                let next_credential = self.client.rotate(&mut session.rotator);
                tracing::warn!(
                    phase = "dispatch",
                    event = "rate_limited",
                    code,
                    next_credential
                );
                self.transition(DispatchState::Interpreting, DispatchState::Delivering);
                let notice = format!("Error code: {code} (switched to credential #{next_credential})");
                self.notify(channel, &notice).await;
                self.transition(DispatchState::Delivering, DispatchState::Idle);
                DispatchOutcome::RateLimited {
                    code,
                    next_credential,
                }
            }
            OutcomeVerdict::OtherError { code, message } => {
                tracing::warn!(phase = "dispatch", event = "remote_error", code, message = %message);
                self.transition(DispatchState::Interpreting, DispatchState::Delivering);
                self.notify(channel, &format!("Error code: {code}")).await;
                self.transition(DispatchState::Delivering, DispatchState::Idle);
                DispatchOutcome::RemoteError { code }
            }
        }
    }

    async fn deliver_reply(
        &self,
        session: &mut Session,
        channel: &ChannelId,
        text: &str,
        token_count: Option<u32>,
    ) -> DispatchOutcome {
        let chunks = split(text, self.policy.delivery_limit).collect::<Vec<_>>();
        let count = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            tracing::debug!(
                phase = "dispatch",
                event = "chunk_send",
                index,
                count,
                chars = chunk.chars().count()
            );

            if let Err(error) = self.gateway.send_message(channel, chunk).await {
                tracing::error!(
                    phase = "dispatch",
                    event = "delivery_failure",
                    index,
                    count,
                    error = %error
                );
                self.hooks.on_delivery_failure(index, count, &error);
                let removed = session.store.rollback_two();
                self.hooks.on_rollback(RollbackReason::DeliveryFailure, removed);
                self.transition(DispatchState::Delivering, DispatchState::RolledBack);
                self.transition(DispatchState::RolledBack, DispatchState::Idle);
                return DispatchOutcome::DeliveryFailed { delivered: index };
            }
        }

        if let Some(tokens) = token_count {
            if let Err(error) = self.gateway.set_status(&format!("Tokens: {tokens}")).await {
                tracing::warn!(phase = "dispatch", event = "status_failed", error = %error);
            }
        }

        self.transition(DispatchState::Delivering, DispatchState::Idle);
        DispatchOutcome::Replied {
            chunks: count,
            token_count,
        }
    }

    async fn prepare_image(
        &self,
        channel: &ChannelId,
        attachment: &AttachmentRef,
    ) -> Result<InlineImage, DispatchOutcome> {
        tracing::info!(
            phase = "dispatch",
            event = "attachment_found",
            filename = %attachment.filename,
            content_type = %attachment.content_type
        );

        if !is_supported_image_type(&attachment.content_type) {
            let notice = format!("Unsupported attachment type: [{}]", attachment.content_type);
            self.notify(channel, &notice).await;
            return Err(DispatchOutcome::UnsupportedAttachment);
        }

        // The session lock is held across the download, so it shares the remote call deadline.
        let deadline = self.client.policy().timeout;
        let fetched = match tokio::time::timeout(deadline, self.fetcher.fetch(attachment)).await {
            Ok(fetched) => fetched,
            Err(_) => Err(ChatError::attachment(format!(
                "download of {} timed out after {}ms",
                attachment.filename,
                deadline.as_millis()
            ))),
        };

        let loaded = fetched.and_then(|raw_bytes| {
            let attachment = pprovider::Attachment::new(attachment.content_type.clone(), raw_bytes);
            InlineImage::from_attachment(attachment, self.normalizer.as_ref())
                .map_err(|error| ChatError::attachment(error.to_string()))
        });

        loaded.map_err(|error| {
            tracing::error!(phase = "dispatch", event = "attachment_failed", error = %error);
            DispatchOutcome::AttachmentFailed
        })
    }

    async fn run_command(&self, channel: &ChannelId, command: AdminCommand) -> DispatchOutcome {
        let mut session = self.session.lock().await;
        self.hooks.on_command(command);
        tracing::info!(phase = "dispatch", event = "command", command = command.as_str());

        match command {
            AdminCommand::Reset => {
                if let Err(error) = self.gateway.set_status(IDLE_STATUS).await {
                    tracing::warn!(phase = "dispatch", event = "status_failed", error = %error);
                }
                if let Err(error) = self.gateway.send_typing(channel).await {
                    tracing::warn!(phase = "dispatch", event = "typing_failed", error = %error);
                }
                session.store.reset();
                self.notify(channel, "Cleared conversation!").await;
                DispatchOutcome::Reset
            }
            AdminCommand::Revert => {
                let removed = session.store.rollback_two();
                self.hooks.on_rollback(RollbackReason::Revert, removed);

                let preview = match session.store.last_text() {
                    Ok(text) => Some(preview(text, self.policy.revert_preview_chars)),
                    Err(error) => {
                        tracing::info!(phase = "dispatch", event = "revert_empty", error = %error);
                        None
                    }
                };
                let notice = match &preview {
                    Some(text) => format!("Reverted last exchange. Last message: {text}"),
                    None => "Nothing left to revert.".to_string(),
                };
                self.notify(channel, &notice).await;
                DispatchOutcome::Reverted { preview }
            }
            AdminCommand::Restart => {
                self.notify(channel, "Restarting...").await;
                DispatchOutcome::RestartRequested
            }
        }
    }

    async fn notify(&self, channel: &ChannelId, text: &str) {
        if let Err(error) = self.gateway.send_message(channel, text).await {
            tracing::warn!(phase = "dispatch", event = "notice_failed", error = %error);
        }
    }

    fn transition(&self, from: DispatchState, to: DispatchState) {
        tracing::trace!(
            phase = "dispatch",
            event = "state",
            from = from.as_str(),
            to = to.as_str()
        );
        self.hooks.on_state_change(from, to);
    }
}

impl std::fmt::Debug for ReplyDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyDispatcher")
            .field("client", &self.client)
            .field("triggers", &self.triggers)
            .field("policy", &self.policy)
            .finish()
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn preview_truncates_long_text_with_ellipsis() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly10!", 10), "exactly10!");
        assert_eq!(preview("this is longer", 7), "this is...");
    }
}
