//! Bounded, ordered conversation history with rollback.

use pprovider::Turn;

use crate::ChatError;

pub const DEFAULT_WINDOW: usize = 10;

/// Sliding window over the most recent turns.
///
/// ```rust
/// use pchat::ConversationStore;
///
/// let mut store = ConversationStore::new(2);
/// store.append_user("one");
/// store.append_model("two");
/// store.append_user("three");
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.last_text().expect("has turns"), "three");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationStore {
    turns: Vec<Turn>,
    window: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl ConversationStore {
    pub fn new(window: usize) -> Self {
        Self {
            turns: Vec::new(),
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns how many of the oldest turns were evicted to stay within the window.
    pub fn append_user(&mut self, text: impl Into<String>) -> usize {
        self.push(Turn::user(text))
    }

    pub fn append_model(&mut self, text: impl Into<String>) -> usize {
        self.push(Turn::model(text))
    }

    pub fn rollback_one(&mut self) -> Option<Turn> {
        self.turns.pop()
    }

    /// Removes up to two trailing turns and returns how many were removed.
    pub fn rollback_two(&mut self) -> usize {
        let keep = self.turns.len().saturating_sub(2);
        let removed = self.turns.len() - keep;
        self.turns.truncate(keep);
        removed
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.window);
    }

    pub fn last_text(&self) -> Result<&str, ChatError> {
        self.turns
            .last()
            .map(|turn| turn.text.as_str())
            .ok_or_else(ChatError::empty_conversation)
    }

    fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        let excess = self.turns.len().saturating_sub(self.window);
        if excess > 0 {
            self.turns.drain(..excess);
        }
        excess
    }
}

#[cfg(test)]
mod tests {
    use pprovider::Role;

    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn appends_beyond_window_keep_most_recent_turns_in_order() {
        let mut store = ConversationStore::default();
        for index in 0..25 {
            if index % 2 == 0 {
                store.append_user(format!("turn-{index}"));
            } else {
                store.append_model(format!("turn-{index}"));
            }
        }

        assert_eq!(store.len(), DEFAULT_WINDOW);
        let texts = store
            .turns()
            .iter()
            .map(|turn| turn.text.clone())
            .collect::<Vec<_>>();
        let expected = (15..25).map(|index| format!("turn-{index}")).collect::<Vec<_>>();
        assert_eq!(texts, expected);
        assert_eq!(store.turns()[0].role, Role::Model);
    }

    #[test]
    fn append_reports_evictions() {
        let mut store = ConversationStore::new(2);
        assert_eq!(store.append_user("a"), 0);
        assert_eq!(store.append_model("b"), 0);
        assert_eq!(store.append_user("c"), 1);
    }

    #[test]
    fn rollbacks_on_short_history_never_fail() {
        let mut store = ConversationStore::default();
        assert_eq!(store.rollback_one(), None);
        assert_eq!(store.rollback_one(), None);
        assert_eq!(store.rollback_two(), 0);

        store.append_user("only");
        assert_eq!(store.rollback_two(), 1);
        assert!(store.is_empty());

        store.append_user("again");
        assert_eq!(store.rollback_one(), Some(Turn::user("again")));
        assert!(store.is_empty());
    }

    #[test]
    fn rollback_two_removes_last_exchange_only() {
        let mut store = ConversationStore::default();
        store.append_user("q1");
        store.append_model("a1");
        store.append_user("q2");
        store.append_model("a2");

        assert_eq!(store.rollback_two(), 2);
        assert_eq!(store.turns(), &[Turn::user("q1"), Turn::model("a1")]);
    }

    #[test]
    fn reset_discards_history_and_keeps_window() {
        let mut store = ConversationStore::new(4);
        store.append_user("hello");
        store.reset();

        assert!(store.is_empty());
        assert_eq!(store.window(), 4);
    }

    #[test]
    fn last_text_on_empty_store_is_empty_conversation_error() {
        let store = ConversationStore::default();
        let error = store.last_text().expect_err("should fail");
        assert_eq!(error.kind, ChatErrorKind::EmptyConversation);
    }
}
