//! Inbound message eligibility, prompt extraction, and administrative commands.

use pcommon::UserId;

use crate::{AttachmentRef, InboundEvent};

pub const RESET_COMMAND: &str = "!resetgemini";
pub const REVERT_COMMANDS: [&str; 2] = ["!revert", "!undo"];
pub const RESTART_COMMAND: &str = "!restart";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Reset,
    Revert,
    Restart,
}

impl AdminCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Revert => "revert",
            Self::Restart => "restart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Mention,
    QuestionPrefix,
    Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub trigger: TriggerKind,
    pub attachment: Option<AttachmentRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Ignored,
    Command(AdminCommand),
    Prompt(Prompt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPolicy {
    bot_id: UserId,
    admin_id: Option<UserId>,
    question_prefix: String,
    attachment_trigger: char,
}

impl TriggerPolicy {
    pub fn new(bot_id: impl Into<UserId>) -> Self {
        Self {
            bot_id: bot_id.into(),
            admin_id: None,
            question_prefix: "? ".to_string(),
            attachment_trigger: '?',
        }
    }

    /// Restricts reset and restart to `admin_id`. Without one, anyone may issue them.
    pub fn with_admin(mut self, admin_id: impl Into<UserId>) -> Self {
        self.admin_id = Some(admin_id.into());
        self
    }

    pub fn with_question_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.question_prefix = prefix.into();
        self
    }

    pub fn bot_id(&self) -> &UserId {
        &self.bot_id
    }

    /// ```rust
    /// use pchat::{Inbound, InboundEvent, TriggerKind, TriggerPolicy};
    ///
    /// let policy = TriggerPolicy::new("bot");
    /// let event = InboundEvent::new("alice", "general", "<@bot> hello").with_mention("bot");
    ///
    /// match policy.classify(&event) {
    ///     Inbound::Prompt(prompt) => {
    ///         assert_eq!(prompt.text, "hello");
    ///         assert_eq!(prompt.trigger, TriggerKind::Mention);
    ///     }
    ///     other => panic!("unexpected {other:?}"),
    /// }
    /// ```
    pub fn classify(&self, event: &InboundEvent) -> Inbound {
        if event.author_id == self.bot_id || event.content.is_empty() {
            return Inbound::Ignored;
        }

        if let Some(command) = self.command(event) {
            return command;
        }

        let mentioned = event.mentions.contains(&self.bot_id);
        let question = event.content.starts_with(&self.question_prefix);
        let attachment = !event.attachments.is_empty()
            && event.content.starts_with(self.attachment_trigger);

        let trigger = if mentioned {
            TriggerKind::Mention
        } else if question {
            TriggerKind::QuestionPrefix
        } else if attachment {
            TriggerKind::Attachment
        } else {
            return Inbound::Ignored;
        };

        let text = self.strip(&event.content, question, attachment);
        let attachment = event.attachments.first().cloned();
        if text.trim().is_empty() && attachment.is_none() {
            return Inbound::Ignored;
        }

        Inbound::Prompt(Prompt {
            text,
            trigger,
            attachment,
        })
    }

    fn command(&self, event: &InboundEvent) -> Option<Inbound> {
        let content = event.content.as_str();
        let command = if content == RESET_COMMAND {
            AdminCommand::Reset
        } else if content == RESTART_COMMAND {
            AdminCommand::Restart
        } else if REVERT_COMMANDS.contains(&content) {
            AdminCommand::Revert
        } else {
            return None;
        };

        let privileged = self
            .admin_id
            .as_ref()
            .is_none_or(|admin| *admin == event.author_id);
        if command != AdminCommand::Revert && !privileged {
            tracing::warn!(
                phase = "trigger",
                event = "command_rejected",
                command = command.as_str(),
                author = %event.author_id
            );
            return Some(Inbound::Ignored);
        }

        Some(Inbound::Command(command))
    }

    fn strip(&self, content: &str, question: bool, attachment: bool) -> String {
        let without_mention = content.replacen(&self.bot_id.mention(), "", 1);

        let stripped = if let Some(rest) = without_mention.strip_prefix(' ') {
            rest
        } else if let Some(rest) = question
            .then(|| without_mention.strip_prefix(&self.question_prefix))
            .flatten()
        {
            rest
        } else if let Some(rest) = attachment
            .then(|| without_mention.strip_prefix(self.attachment_trigger))
            .flatten()
        {
            rest.strip_prefix(' ').unwrap_or(rest)
        } else {
            without_mention.as_str()
        };

        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> TriggerPolicy {
        TriggerPolicy::new("bot").with_admin("admin")
    }

    fn prompt(inbound: Inbound) -> Prompt {
        match inbound {
            Inbound::Prompt(prompt) => prompt,
            other => panic!("expected prompt, got {other:?}"),
        }
    }

    fn image() -> AttachmentRef {
        AttachmentRef::new("https://cdn.test/cat.png", "image/png", "cat.png")
    }

    #[test]
    fn own_messages_and_empty_messages_are_ignored() {
        let own = InboundEvent::new("bot", "c", "<@bot> hi").with_mention("bot");
        let empty = InboundEvent::new("alice", "c", "");

        assert_eq!(policy().classify(&own), Inbound::Ignored);
        assert_eq!(policy().classify(&empty), Inbound::Ignored);
    }

    #[test]
    fn plain_chatter_is_ignored() {
        let event = InboundEvent::new("alice", "c", "just talking?");
        assert_eq!(policy().classify(&event), Inbound::Ignored);
    }

    #[test]
    fn mention_is_stripped_from_prompt() {
        let event = InboundEvent::new("alice", "c", "<@bot> hello there").with_mention("bot");
        let prompt = prompt(policy().classify(&event));

        assert_eq!(prompt.text, "hello there");
        assert_eq!(prompt.trigger, TriggerKind::Mention);
        assert_eq!(prompt.attachment, None);
    }

    #[test]
    fn mention_in_middle_is_removed_once() {
        let event = InboundEvent::new("alice", "c", "hey <@bot> what's up").with_mention("bot");
        assert_eq!(prompt(policy().classify(&event)).text, "hey  what's up");
    }

    #[test]
    fn question_prefix_is_stripped() {
        let event = InboundEvent::new("alice", "c", "? what is rust");
        let prompt = prompt(policy().classify(&event));

        assert_eq!(prompt.text, "what is rust");
        assert_eq!(prompt.trigger, TriggerKind::QuestionPrefix);
    }

    #[test]
    fn attachment_trigger_requires_attachment_and_keeps_first() {
        let bare = InboundEvent::new("alice", "c", "?describe");
        assert_eq!(policy().classify(&bare), Inbound::Ignored);

        let event = InboundEvent::new("alice", "c", "?describe this")
            .with_attachment(image())
            .with_attachment(AttachmentRef::new("u2", "image/jpeg", "second.jpg"));
        let prompt = prompt(policy().classify(&event));

        assert_eq!(prompt.text, "describe this");
        assert_eq!(prompt.trigger, TriggerKind::Attachment);
        assert_eq!(prompt.attachment, Some(image()));
    }

    #[test]
    fn mention_without_text_or_attachment_is_ignored() {
        let event = InboundEvent::new("alice", "c", "<@bot>").with_mention("bot");
        assert_eq!(policy().classify(&event), Inbound::Ignored);
    }

    #[test]
    fn commands_are_exact_and_case_sensitive() {
        let reset = InboundEvent::new("admin", "c", "!resetgemini");
        let shouting = InboundEvent::new("admin", "c", "!RESETGEMINI");
        let undo = InboundEvent::new("alice", "c", "!undo");
        let revert = InboundEvent::new("alice", "c", "!revert");

        assert_eq!(policy().classify(&reset), Inbound::Command(AdminCommand::Reset));
        assert_eq!(policy().classify(&shouting), Inbound::Ignored);
        assert_eq!(policy().classify(&undo), Inbound::Command(AdminCommand::Revert));
        assert_eq!(policy().classify(&revert), Inbound::Command(AdminCommand::Revert));
    }

    #[test]
    fn privileged_commands_require_admin_when_configured() {
        let reset = InboundEvent::new("alice", "c", "!resetgemini");
        let restart = InboundEvent::new("alice", "c", "!restart");
        let admin_restart = InboundEvent::new("admin", "c", "!restart");

        assert_eq!(policy().classify(&reset), Inbound::Ignored);
        assert_eq!(policy().classify(&restart), Inbound::Ignored);
        assert_eq!(
            policy().classify(&admin_restart),
            Inbound::Command(AdminCommand::Restart)
        );

        let open = TriggerPolicy::new("bot");
        assert_eq!(open.classify(&reset), Inbound::Command(AdminCommand::Reset));
    }
}
