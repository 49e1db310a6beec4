use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::types::{ConversationState, LLMConfig, StateUpdate};
use async_trait::async_trait;
use mindroute_llm::{ChatClient, ChatRequest, Message};
use std::sync::Arc;

/// Single-node chatbot: forwards the whole history and appends the reply
pub struct ChatbotNode {
    client: Arc<dyn ChatClient>,
    config: LLMConfig,
}

impl ChatbotNode {
    pub fn new(client: Arc<dyn ChatClient>, config: LLMConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Node for ChatbotNode {
    async fn execute(&self, state: &ConversationState) -> Result<StateUpdate> {
        state.latest_user_message()?;
        tracing::debug!(messages = ?state.messages(), "Messages in state");

        let request = ChatRequest::new(self.config.model.clone(), state.messages().to_vec())
            .with_options(self.config.chat_options());

        let response = self.client.chat(request).await?;
        let reply = response.text()?.to_string();

        Ok(StateUpdate::new().with_message(Message::ai(reply)))
    }

    fn id(&self) -> NodeId {
        NodeId::Chatbot
    }
}
