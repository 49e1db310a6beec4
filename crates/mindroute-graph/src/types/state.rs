use crate::error::{GraphError, Result};
use crate::node::NodeId;
use crate::types::MessageType;
use mindroute_llm::Message;

/// State threaded through the graph.
///
/// `messages` is append-only: there is no way to remove or reorder entries,
/// so insertion order is always chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    messages: Vec<Message>,
    pub message_type: Option<MessageType>,
    pub next: Option<NodeId>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Add a message to the end of the history
    pub fn append(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Last message tagged `user`
    pub fn latest_user_message(&self) -> Result<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_user())
            .ok_or(GraphError::EmptyHistory)
    }

    /// Merge a node's partial update: messages are appended in order,
    /// scalar fields are overwritten only when the update sets them
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(message_type) = update.message_type {
            self.message_type = Some(message_type);
        }
        if let Some(next) = update.next {
            self.next = Some(next);
        }
    }
}

/// Partial update returned by a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub message_type: Option<MessageType>,
    pub next: Option<NodeId>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = Some(message_type);
        self
    }

    pub fn with_next(mut self, next: NodeId) -> Self {
        self.next = Some(next);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Message> {
        vec![
            Message::human("first"),
            Message::ai("reply"),
            Message::human("second"),
        ]
    }

    #[test]
    fn test_append_preserves_prefix() {
        let before = ConversationState::from_messages(history());
        let after = before.clone().append(Message::human("third"));

        assert_eq!(after.messages().len(), before.messages().len() + 1);
        assert_eq!(&after.messages()[..3], before.messages());
        assert_eq!(after.last_message(), Some(&Message::human("third")));
    }

    #[test]
    fn test_append_to_empty_history() {
        let state = ConversationState::new().append(Message::human("hi"));
        assert_eq!(state.messages(), &[Message::human("hi")]);
    }

    #[test]
    fn test_latest_user_message_skips_assistant() {
        let state = ConversationState::from_messages(history()).append(Message::ai("answer"));
        assert_eq!(state.latest_user_message().unwrap(), &Message::human("second"));
    }

    #[test]
    fn test_latest_user_message_empty_history() {
        let state = ConversationState::new();
        assert!(matches!(state.latest_user_message(), Err(GraphError::EmptyHistory)));

        let only_system = ConversationState::new().append(Message::system("rules"));
        assert!(matches!(only_system.latest_user_message(), Err(GraphError::EmptyHistory)));
    }

    #[test]
    fn test_apply_concatenates_messages() {
        let mut state = ConversationState::from_messages(history());
        state.apply(
            StateUpdate::new()
                .with_message(Message::ai("a"))
                .with_message(Message::ai("b")),
        );

        let tail: Vec<&str> = state.messages()[3..].iter().map(|m| m.content()).collect();
        assert_eq!(tail, vec!["a", "b"]);
    }

    #[test]
    fn test_apply_overwrites_only_set_fields() {
        let mut state = ConversationState::new();
        state.apply(StateUpdate::new().with_message_type(MessageType::Emotional));
        state.apply(StateUpdate::new().with_next(NodeId::Therapist));

        assert_eq!(state.message_type, Some(MessageType::Emotional));
        assert_eq!(state.next, Some(NodeId::Therapist));

        state.apply(StateUpdate::new().with_message_type(MessageType::Logical));
        assert_eq!(state.message_type, Some(MessageType::Logical));
        assert_eq!(state.next, Some(NodeId::Therapist));
    }
}
