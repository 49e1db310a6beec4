use crate::error::Result;
use crate::types::{ConversationState, StateUpdate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Core abstraction for a unit of computation in the graph
#[async_trait]
pub trait Node: Send + Sync {
    /// Read the state and return the partial update to merge into it
    async fn execute(&self, state: &ConversationState) -> Result<StateUpdate>;

    /// Which slot of the topology this node fills
    fn id(&self) -> NodeId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Classifier,
    Router,
    Therapist,
    Logical,
    Chatbot,
}

impl NodeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classifier => "classifier",
            Self::Router => "router",
            Self::Therapist => "therapist",
            Self::Logical => "logical",
            Self::Chatbot => "chatbot",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
