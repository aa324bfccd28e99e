// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input port definitions and port resolution.
//!
//! A destination node exposes at most two logical input ports. Which incoming
//! connection feeds which port is decided by a deterministic two-phase pass:
//!
//! 1. **Named pass** - the first connection tagged `input1` fills port 1, the
//!    first tagged `input2` fills port 2.
//! 2. **Ordered fill** - untargeted connections, in the order they are listed,
//!    fill the first port that is still empty.
//!
//! Single-input nodes ignore tags and take the first incoming connection.

use crate::connection::{Connection, PortTarget};
use crate::node::{NodeId, NodeType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of logical inputs any node type consumes
pub const MAX_PORTS: usize = 2;

/// A logical input port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortId {
    /// First input
    #[serde(rename = "input1")]
    Input1,
    /// Second input
    #[serde(rename = "input2")]
    Input2,
}

impl PortId {
    /// Ports in fill order
    pub const ALL: [PortId; MAX_PORTS] = [PortId::Input1, PortId::Input2];

    /// Parse a port tag
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "input1" => Some(Self::Input1),
            "input2" => Some(Self::Input2),
            _ => None,
        }
    }

    /// Serialized tag of this port
    pub fn name(self) -> &'static str {
        match self {
            Self::Input1 => "input1",
            Self::Input2 => "input2",
        }
    }

    /// Zero-based slot index
    pub fn index(self) -> usize {
        match self {
            Self::Input1 => 0,
            Self::Input2 => 1,
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source node chosen for each input port of one destination node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedInputs<'a> {
    slots: [Option<&'a NodeId>; MAX_PORTS],
    arity: usize,
}

impl<'a> ResolvedInputs<'a> {
    /// Source feeding a port, if any
    pub fn source(&self, port: PortId) -> Option<&'a NodeId> {
        self.slots[port.index()]
    }

    /// Ports the destination type actually consumes, with their sources
    pub fn ports(&self) -> impl Iterator<Item = (PortId, Option<&'a NodeId>)> + '_ {
        PortId::ALL
            .iter()
            .take(self.arity)
            .map(move |port| (*port, self.slots[port.index()]))
    }

    /// Number of ports the destination consumes
    pub fn arity(&self) -> usize {
        self.arity
    }
}

/// Resolve which incoming connection feeds which port of a node.
///
/// `incoming` must be the connections targeting the node, in listed order.
pub fn resolve_inputs<'a, I>(node_type: NodeType, incoming: I) -> ResolvedInputs<'a>
where
    I: IntoIterator<Item = &'a Connection>,
    I::IntoIter: Clone,
{
    let incoming = incoming.into_iter();
    let arity = node_type.arity().min(MAX_PORTS);
    let mut resolved = ResolvedInputs {
        slots: [None; MAX_PORTS],
        arity,
    };

    match arity {
        0 => {}
        1 => {
            resolved.slots[0] = incoming.clone().next().map(|c| &c.from);
        }
        _ => {
            // Named pass
            for conn in incoming.clone() {
                if let PortTarget::Port(port) = conn.target() {
                    let slot = &mut resolved.slots[port.index()];
                    if slot.is_none() {
                        *slot = Some(&conn.from);
                    }
                }
            }

            // Ordered fill
            let mut untargeted = incoming.filter(|c| c.target() == PortTarget::Untargeted);
            for slot in resolved.slots.iter_mut().take(arity) {
                if slot.is_some() {
                    continue;
                }
                match untargeted.next() {
                    Some(conn) => *slot = Some(&conn.from),
                    None => break,
                }
            }
        }
    }

    resolved
}
