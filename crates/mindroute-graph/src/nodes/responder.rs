use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::prompts::{LOGICAL_PERSONA, THERAPIST_PERSONA};
use crate::types::{ConversationState, LLMConfig, StateUpdate};
use async_trait::async_trait;
use mindroute_llm::{ChatClient, ChatRequest, Message};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    Therapist,
    Logical,
}

impl Persona {
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Therapist => THERAPIST_PERSONA,
            Self::Logical => LOGICAL_PERSONA,
        }
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            Self::Therapist => NodeId::Therapist,
            Self::Logical => NodeId::Logical,
        }
    }
}

/// Answers the latest user message in a fixed persona.
///
/// Only `[persona instruction, latest user message]` is sent; earlier turns
/// never reach the model.
pub struct ResponderNode {
    persona: Persona,
    client: Arc<dyn ChatClient>,
    config: LLMConfig,
}

impl ResponderNode {
    pub fn new(persona: Persona, client: Arc<dyn ChatClient>, config: LLMConfig) -> Self {
        Self {
            persona,
            client,
            config,
        }
    }

    pub fn therapist(client: Arc<dyn ChatClient>, config: LLMConfig) -> Self {
        Self::new(Persona::Therapist, client, config)
    }

    pub fn logical(client: Arc<dyn ChatClient>, config: LLMConfig) -> Self {
        Self::new(Persona::Logical, client, config)
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }
}

#[async_trait]
impl Node for ResponderNode {
    async fn execute(&self, state: &ConversationState) -> Result<StateUpdate> {
        let latest = state.latest_user_message()?;

        let request = ChatRequest::new(
            self.config.model.clone(),
            vec![
                Message::system(self.persona.instruction()),
                Message::human(latest.content()),
            ],
        )
        .with_options(self.config.chat_options());

        let response = self.client.chat(request).await?;
        let reply = response.text()?.to_string();

        tracing::info!(
            persona = ?self.persona,
            reply_chars = reply.len(),
            "Responder replied"
        );

        Ok(StateUpdate::new().with_message(Message::ai(reply)))
    }

    fn id(&self) -> NodeId {
        self.persona.node_id()
    }
}
