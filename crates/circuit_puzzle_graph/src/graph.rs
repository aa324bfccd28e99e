// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::Connection;
use crate::node::{Node, NodeId, NodeType};
use crate::port::{resolve_inputs, ResolvedInputs};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A circuit graph.
///
/// Level data is never rejected here: connections may reference missing
/// nodes and may form cycles. Node order and connection order are kept as
/// given, since both affect evaluation and port resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes, in listed order
    connections: Vec<Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from level parts.
    ///
    /// A repeated node ID keeps the position of its first occurrence and the
    /// data of its last.
    pub fn from_parts<'a>(
        nodes: impl IntoIterator<Item = &'a Node>,
        connections: impl IntoIterator<Item = &'a Connection>,
    ) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node.clone());
        }
        graph.connections.extend(connections.into_iter().cloned());
        graph
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        if self.nodes.insert(id.clone(), node).is_some() {
            tracing::warn!(node = %id, "duplicate node id, keeping the last definition");
        }
        id
    }

    /// Add a connection. Endpoints are not checked.
    pub fn connect(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Position of a node in insertion order
    pub fn index_of(&self, node_id: &NodeId) -> Option<usize> {
        self.nodes.get_index_of(node_id)
    }

    /// Check if a node exists
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all nodes of one type
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.node_type == node_type)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all connections in listed order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + Clone {
        self.connections.iter()
    }

    /// Get connections into a node, in listed order
    pub fn connections_to<'a>(
        &'a self,
        node_id: &'a NodeId,
    ) -> impl Iterator<Item = &'a Connection> + Clone + 'a {
        self.connections.iter().filter(move |c| c.to == *node_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node<'a>(
        &'a self,
        node_id: &'a NodeId,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Resolve the port sources of a node. Returns `None` for unknown nodes.
    pub fn resolved_inputs<'a>(&'a self, node_id: &'a NodeId) -> Option<ResolvedInputs<'a>> {
        let node = self.nodes.get(node_id)?;
        Some(resolve_inputs(node.node_type, self.connections_to(node_id)))
    }

    /// Existing nodes with a connection into `node_id`, one entry per wire.
    ///
    /// Connections from missing nodes are skipped.
    pub fn predecessors<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.connections_to(node_id)
            .map(|c| &c.from)
            .filter(move |from| self.nodes.contains_key(*from))
    }

    /// Connections whose endpoints are not both present
    pub fn dangling_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| !self.nodes.contains_key(&c.from) || !self.nodes.contains_key(&c.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortId;

    fn and_circuit() -> Graph {
        let nodes = [
            Node::new("A", NodeType::Input, "A"),
            Node::new("B", NodeType::Input, "B"),
            Node::new("AND1", NodeType::And, "AND"),
            Node::new("OUT", NodeType::Output, "Out"),
        ];
        let connections = [
            Connection::to_port("A", "AND1", PortId::Input1),
            Connection::to_port("B", "AND1", PortId::Input2),
            Connection::new("AND1", "OUT"),
        ];
        Graph::from_parts(&nodes, &connections)
    }

    #[test]
    fn test_lookup_tables() {
        let graph = and_circuit();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.connection_count(), 3);
        assert_eq!(graph.nodes_of_type(NodeType::Input).count(), 2);

        let and1 = NodeId::from("AND1");
        assert_eq!(graph.connections_to(&and1).count(), 2);
        assert_eq!(graph.connections_for_node(&and1).count(), 3);
        let preds: Vec<_> = graph.predecessors(&and1).map(NodeId::as_str).collect();
        assert_eq!(preds, vec!["A", "B"]);
    }

    #[test]
    fn test_dangling_connections_are_kept() {
        let mut graph = and_circuit();
        graph.connect(Connection::new("ghost", "OUT"));
        assert_eq!(graph.connection_count(), 4);
        assert_eq!(graph.dangling_connections().count(), 1);
        assert_eq!(graph.predecessors(&NodeId::from("OUT")).count(), 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first_position() {
        let mut graph = and_circuit();
        graph.add_node(Node::new("A", NodeType::Not, "replaced"));
        let first = graph.nodes().next().unwrap();
        assert_eq!(first.id, NodeId::from("A"));
        assert_eq!(first.node_type, NodeType::Not);
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_resolved_inputs() {
        let graph = and_circuit();
        let and1 = NodeId::from("AND1");
        let resolved = graph.resolved_inputs(&and1).unwrap();
        assert_eq!(resolved.source(PortId::Input1), Some(&NodeId::from("A")));
        assert_eq!(resolved.source(PortId::Input2), Some(&NodeId::from("B")));
        assert!(graph.resolved_inputs(&NodeId::from("missing")).is_none());
    }
}
