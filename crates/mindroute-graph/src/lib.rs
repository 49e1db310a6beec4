pub mod types;
pub mod error;
pub mod node;
pub mod router;
pub mod prompts;
pub mod nodes;
pub mod graph;
pub mod builder;

pub use node::{Node, NodeId};
pub use router::{route, Route, RouterNode};
pub use graph::{Edge, Graph, Target, Topology};
pub use builder::GraphBuilder;
pub use error::{GraphError, Result};

pub use types::{Classification, ConversationState, LLMConfig, MessageType, StateUpdate};

// Re-export the message type so callers only need this crate for state handling
pub use mindroute_llm::{Message, Role};
