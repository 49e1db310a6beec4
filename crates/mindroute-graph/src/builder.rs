use crate::error::{GraphError, Result};
use crate::graph::{Graph, Topology};
use crate::node::{Node, NodeId};
use crate::nodes::{ChatbotNode, ClassifierNode, ResponderNode};
use crate::router::RouterNode;
use crate::types::LLMConfig;
use mindroute_llm::ChatClient;
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for constructing a Graph.
///
/// The model client is injected here and shared by every node; individual
/// nodes can be swapped out with [`GraphBuilder::node`].
pub struct GraphBuilder {
    llm_client: Option<Arc<dyn ChatClient>>,
    llm_config: LLMConfig,
    topology: Topology,
    overrides: Vec<Arc<dyn Node>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            llm_client: None,
            llm_config: LLMConfig::default(),
            topology: Topology::default(),
            overrides: Vec::new(),
        }
    }

    /// Set the model client
    pub fn llm_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    /// Set the model settings used by every node
    pub fn llm_config(mut self, config: LLMConfig) -> Self {
        self.llm_config = config;
        self
    }

    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Replace the default implementation of the node with the same id
    pub fn node(mut self, node: Arc<dyn Node>) -> Self {
        self.overrides.push(node);
        self
    }

    /// Build the Graph
    pub fn build(self) -> Result<Graph> {
        let client = self
            .llm_client
            .ok_or_else(|| GraphError::Builder("LLM client is required".to_string()))?;
        let config = self.llm_config;

        let mut nodes: HashMap<NodeId, Arc<dyn Node>> = HashMap::new();
        for id in self.topology.nodes() {
            let node: Arc<dyn Node> = match id {
                NodeId::Classifier => Arc::new(ClassifierNode::new(client.clone(), config.clone())),
                NodeId::Router => Arc::new(RouterNode),
                NodeId::Therapist => Arc::new(ResponderNode::therapist(client.clone(), config.clone())),
                NodeId::Logical => Arc::new(ResponderNode::logical(client.clone(), config.clone())),
                NodeId::Chatbot => Arc::new(ChatbotNode::new(client.clone(), config.clone())),
            };
            nodes.insert(*id, node);
        }

        for node in self.overrides {
            let id = node.id();
            if !self.topology.nodes().contains(&id) {
                return Err(GraphError::Builder(format!(
                    "node '{}' is not part of the {:?} topology",
                    id, self.topology
                )));
            }
            nodes.insert(id, node);
        }

        tracing::debug!(topology = ?self.topology, nodes = nodes.len(), "Graph built");

        Ok(Graph::new(self.topology, nodes))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
