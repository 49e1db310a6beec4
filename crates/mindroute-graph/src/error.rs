use crate::node::NodeId;
use mindroute_llm::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Conversation has no user message to act on")]
    EmptyHistory,

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Model client error: {0}")]
    ModelClient(#[from] LlmError),

    #[error("No route out of node '{node}'")]
    MissingRoute { node: NodeId },

    #[error("Node '{node}' would run twice in one invocation")]
    Cycle { node: NodeId },

    #[error("Invalid graph: {0}")]
    Builder(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
