use crate::builder::GraphBuilder;
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeId};
use crate::types::ConversationState;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Where an edge leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    End,
}

/// Outgoing edge of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Always continue to the target
    Direct(Target),
    /// Continue to the node named by `state.next`, which must be one of `branches`
    Conditional { branches: &'static [NodeId] },
}

/// The static shapes a graph can take
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Topology {
    /// START -> classifier -> router -> {therapist | logical} -> END
    #[default]
    Conditional,
    /// START -> chatbot -> END
    Sequence,
}

const ROUTER_BRANCHES: &[NodeId] = &[NodeId::Therapist, NodeId::Logical];

impl Topology {
    pub fn entry(self) -> NodeId {
        match self {
            Topology::Conditional => NodeId::Classifier,
            Topology::Sequence => NodeId::Chatbot,
        }
    }

    pub fn nodes(self) -> &'static [NodeId] {
        match self {
            Topology::Conditional => &[
                NodeId::Classifier,
                NodeId::Router,
                NodeId::Therapist,
                NodeId::Logical,
            ],
            Topology::Sequence => &[NodeId::Chatbot],
        }
    }

    /// Edge table; `None` for nodes that are not part of this topology
    pub fn edge(self, from: NodeId) -> Option<Edge> {
        match (self, from) {
            (Topology::Conditional, NodeId::Classifier) => {
                Some(Edge::Direct(Target::Node(NodeId::Router)))
            }
            (Topology::Conditional, NodeId::Router) => Some(Edge::Conditional {
                branches: ROUTER_BRANCHES,
            }),
            (Topology::Conditional, NodeId::Therapist | NodeId::Logical) => {
                Some(Edge::Direct(Target::End))
            }
            (Topology::Sequence, NodeId::Chatbot) => Some(Edge::Direct(Target::End)),
            _ => None,
        }
    }
}

/// Compiled conversation graph
pub struct Graph {
    topology: Topology,
    nodes: HashMap<NodeId, Arc<dyn Node>>,
}

impl Graph {
    pub(crate) fn new(topology: Topology, nodes: HashMap<NodeId, Arc<dyn Node>>) -> Self {
        Self { topology, nodes }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Run one turn: walk the edges from the entry node to END, merging each
    /// node's update into the state.
    ///
    /// The state is consumed; on error nothing is handed back, so a caller
    /// that kept its own copy still holds the pre-turn state.
    pub async fn invoke(&self, state: ConversationState) -> Result<ConversationState> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("graph_run", %run_id, topology = ?self.topology);

        self.execute_loop(state).instrument(span).await
    }

    async fn execute_loop(&self, mut state: ConversationState) -> Result<ConversationState> {
        let start_time = Instant::now();
        let mut visited = HashSet::new();
        let mut current = self.topology.entry();

        loop {
            // Single pass: no node may run twice in one invocation
            if !visited.insert(current) {
                return Err(GraphError::Cycle { node: current });
            }

            let node = self.nodes.get(&current).ok_or_else(|| {
                GraphError::Builder(format!("node '{}' is not registered", current))
            })?;

            let node_start = Instant::now();
            let update = match node.execute(&state).await {
                Ok(update) => update,
                Err(e) => {
                    tracing::error!(node = %current, error = %e, "Node failed, aborting turn");
                    return Err(e);
                }
            };
            state.apply(update);

            tracing::debug!(
                node = %current,
                duration_ms = node_start.elapsed().as_millis() as u64,
                "Node finished"
            );

            let edge = self
                .topology
                .edge(current)
                .ok_or(GraphError::MissingRoute { node: current })?;

            let target = match edge {
                Edge::Direct(target) => target,
                Edge::Conditional { branches } => state
                    .next
                    .filter(|next| branches.contains(next))
                    .map(Target::Node)
                    .ok_or(GraphError::MissingRoute { node: current })?,
            };

            match target {
                Target::End => break,
                Target::Node(next) => current = next,
            }
        }

        tracing::info!(
            total_duration_ms = start_time.elapsed().as_millis() as u64,
            messages = state.messages().len(),
            "Graph run completed"
        );

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_node_has_an_edge() {
        for topology in [Topology::Conditional, Topology::Sequence] {
            for node in topology.nodes() {
                assert!(topology.edge(*node).is_some(), "{} has no edge", node);
            }
        }
    }

    #[test]
    fn test_edges_only_reach_known_nodes() {
        for topology in [Topology::Conditional, Topology::Sequence] {
            for node in topology.nodes() {
                let targets: Vec<NodeId> = match topology.edge(*node).unwrap() {
                    Edge::Direct(Target::Node(next)) => vec![next],
                    Edge::Direct(Target::End) => vec![],
                    Edge::Conditional { branches } => branches.to_vec(),
                };
                for target in targets {
                    assert!(topology.nodes().contains(&target));
                }
            }
        }
    }

    #[test]
    fn test_conditional_shape() {
        let t = Topology::Conditional;
        assert_eq!(t.entry(), NodeId::Classifier);
        assert_eq!(t.edge(NodeId::Classifier), Some(Edge::Direct(Target::Node(NodeId::Router))));
        assert_eq!(t.edge(NodeId::Therapist), Some(Edge::Direct(Target::End)));
        assert_eq!(t.edge(NodeId::Logical), Some(Edge::Direct(Target::End)));
        assert_eq!(t.edge(NodeId::Chatbot), None);
    }
}
