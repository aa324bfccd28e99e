// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (wire) definitions for the graph.

use crate::node::NodeId;
use crate::port::PortId;
use serde::{Deserialize, Serialize};

/// How a connection addresses the input ports of its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortTarget {
    /// No port tag; filled in listed order
    Untargeted,
    /// Tagged with a known port
    Port(PortId),
    /// Tagged with a port name no node type has
    Unrecognized,
}

/// A wire from one node's output to another node's input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node ID
    pub from: NodeId,
    /// Destination node ID
    pub to: NodeId,
    /// Destination port tag (`"input1"` / `"input2"`)
    #[serde(
        default,
        rename = "targetPort",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_port: Option<String>,
}

impl Connection {
    /// Create an untargeted connection
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            target_port: None,
        }
    }

    /// Create a connection into a specific port
    pub fn to_port(from: impl Into<NodeId>, to: impl Into<NodeId>, port: PortId) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            target_port: Some(port.name().to_string()),
        }
    }

    /// Classify the port tag. An empty tag counts as untargeted.
    pub fn target(&self) -> PortTarget {
        match self.target_port.as_deref() {
            None | Some("") => PortTarget::Untargeted,
            Some(name) => PortId::parse(name).map_or(PortTarget::Unrecognized, PortTarget::Port),
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        self.from == *node_id || self.to == *node_id
    }

    /// Check if this connection feeds a node back into itself
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
