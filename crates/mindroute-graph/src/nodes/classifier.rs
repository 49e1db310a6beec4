use crate::error::{GraphError, Result};
use crate::node::{Node, NodeId};
use crate::prompts::CLASSIFIER_INSTRUCTION;
use crate::types::{Classification, ConversationState, LLMConfig, StateUpdate};
use async_trait::async_trait;
use mindroute_llm::{ChatClient, ChatClientExt, ChatRequest, LlmError, Message};
use std::sync::Arc;

/// Asks the model whether the latest user message is emotional or logical
pub struct ClassifierNode {
    client: Arc<dyn ChatClient>,
    config: LLMConfig,
}

impl ClassifierNode {
    pub fn new(client: Arc<dyn ChatClient>, config: LLMConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Node for ClassifierNode {
    async fn execute(&self, state: &ConversationState) -> Result<StateUpdate> {
        let latest = state.latest_user_message()?;

        let request = ChatRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(CLASSIFIER_INSTRUCTION),
                Message::human(latest.content()),
            ],
        )
        .with_options(self.config.chat_options());

        let classification: Classification = self
            .client
            .chat_structured(request, Classification::response_format())
            .await
            .map_err(|e| match e {
                // The model answered, but not with one of the two categories
                LlmError::StructuredOutput(reason) => GraphError::Classification(reason),
                LlmError::EmptyResponse => {
                    GraphError::Classification("model returned no classification".to_string())
                }
                other => GraphError::ModelClient(other),
            })?;

        tracing::info!(message_type = %classification.message_type, "Message classified");

        Ok(StateUpdate::new().with_message_type(classification.message_type))
    }

    fn id(&self) -> NodeId {
        NodeId::Classifier
    }
}
