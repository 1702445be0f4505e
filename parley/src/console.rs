//! Terminal-backed messaging gateway used by the bundled binary.
//!
//! Each stdin line becomes one inbound event in a single channel. Tokens of the
//! form `attach:<url>` become attachments; the bot's mention token marks the bot
//! as mentioned.

use pchat::{AttachmentRef, GatewayError, InboundEvent, MessagingGateway};
use pcommon::{BoxFuture, ChannelId, UserId};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

pub const ATTACHMENT_TOKEN_PREFIX: &str = "attach:";

pub struct ConsoleGateway<W = Stdout> {
    bot_name: String,
    out: Mutex<W>,
}

impl ConsoleGateway<Stdout> {
    pub fn stdout(bot_name: impl Into<String>) -> Self {
        Self::with_writer(bot_name, tokio::io::stdout())
    }
}

impl<W> ConsoleGateway<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn with_writer(bot_name: impl Into<String>, out: W) -> Self {
        Self {
            bot_name: bot_name.into(),
            out: Mutex::new(out),
        }
    }

    pub fn into_writer(self) -> W {
        self.out.into_inner()
    }

    async fn write_line(&self, line: String) -> Result<(), GatewayError> {
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|err| GatewayError::new(err.to_string()))?;
        out.flush()
            .await
            .map_err(|err| GatewayError::new(err.to_string()))
    }
}

impl<W> MessagingGateway for ConsoleGateway<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn send_typing<'a>(&'a self, channel: &'a ChannelId) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            tracing::debug!(phase = "console", event = "typing", channel = %channel);
            Ok(())
        })
    }

    fn send_message<'a>(
        &'a self,
        channel: &'a ChannelId,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            self.write_line(format!("[#{channel}] {}: {text}\n", self.bot_name))
                .await
        })
    }

    fn set_status<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move { self.write_line(format!("[status] {text}\n")).await })
    }
}

impl<W> std::fmt::Debug for ConsoleGateway<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleGateway")
            .field("bot_name", &self.bot_name)
            .finish()
    }
}

/// Turns terminal lines into inbound events from a fixed author and channel.
#[derive(Debug, Clone)]
pub struct ConsoleInput {
    author: UserId,
    channel: ChannelId,
    bot_id: UserId,
}

impl ConsoleInput {
    pub fn new(
        author: impl Into<UserId>,
        channel: impl Into<ChannelId>,
        bot_id: impl Into<UserId>,
    ) -> Self {
        Self {
            author: author.into(),
            channel: channel.into(),
            bot_id: bot_id.into(),
        }
    }

    pub fn parse_line(&self, line: &str) -> InboundEvent {
        let line = line.trim_end_matches(['\r', '\n']);

        let mut attachments = Vec::new();
        let mut words = Vec::new();
        for word in line.split(' ') {
            match word.strip_prefix(ATTACHMENT_TOKEN_PREFIX) {
                Some(url) if !url.is_empty() => attachments.push(attachment_for(url)),
                _ => words.push(word),
            }
        }

        let content = if attachments.is_empty() {
            line.to_string()
        } else {
            words.join(" ").trim_end().to_string()
        };

        let mut event = InboundEvent::new(self.author.clone(), self.channel.clone(), content);
        if event.content.contains(&self.bot_id.mention()) {
            event = event.with_mention(self.bot_id.clone());
        }
        for attachment in attachments {
            event = event.with_attachment(attachment);
        }
        event
    }
}

fn attachment_for(url: &str) -> AttachmentRef {
    let filename = url
        .rsplit('/')
        .next()
        .and_then(|name| name.split(['?', '#']).next())
        .unwrap_or(url);
    let extension = filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default();

    let content_type = match extension.as_str() {
        "png" => "image/png".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "webp" => "image/webp".to_string(),
        "gif" => "image/gif".to_string(),
        "" => "application/octet-stream".to_string(),
        other => format!("application/{other}"),
    };

    AttachmentRef::new(url, content_type, filename)
}
