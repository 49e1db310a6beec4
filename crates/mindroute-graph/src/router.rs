use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::types::{ConversationState, MessageType, StateUpdate};
use async_trait::async_trait;

/// Routing decision made after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Therapist,
    Logical,
}

impl Route {
    /// Dispatch table: decision -> node that handles it
    pub fn target(self) -> NodeId {
        match self {
            Route::Therapist => NodeId::Therapist,
            Route::Logical => NodeId::Logical,
        }
    }
}

/// Emotional messages go to the therapist; everything else, including an
/// unclassified state, goes to the logical assistant.
pub fn route(message_type: Option<MessageType>) -> Route {
    match message_type {
        Some(MessageType::Emotional) => Route::Therapist,
        Some(MessageType::Logical) | None => Route::Logical,
    }
}

/// Writes the routing decision into `next`
pub struct RouterNode;

#[async_trait]
impl Node for RouterNode {
    async fn execute(&self, state: &ConversationState) -> Result<StateUpdate> {
        let decision = route(state.message_type);
        tracing::debug!(message_type = ?state.message_type, route = ?decision, "Routing message");
        Ok(StateUpdate::new().with_next(decision.target()))
    }

    fn id(&self) -> NodeId {
        NodeId::Router
    }
}
