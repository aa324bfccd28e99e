// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the circuit graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node within a level
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node ID from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Node type category, used to split nodes into layout rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Player-controlled switches
    Input,
    /// Lamps compared against the level targets
    Output,
    /// Logic gates between the two
    Gate,
}

/// The closed set of node kinds a circuit can contain.
///
/// Every per-type table (arity, boolean function, colour, symbol) is an
/// exhaustive match, so a new variant must be handled everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Boolean source toggled by the player
    Input,
    /// Boolean sink passing its single input through
    Output,
    /// Conjunction
    #[serde(rename = "AND")]
    And,
    /// Disjunction
    #[serde(rename = "OR")]
    Or,
    /// Negation
    #[serde(rename = "NOT")]
    Not,
    /// Exclusive or
    #[serde(rename = "XOR")]
    Xor,
    /// Negated conjunction
    #[serde(rename = "NAND")]
    Nand,
    /// Negated disjunction
    #[serde(rename = "NOR")]
    Nor,
    /// Negated exclusive or
    #[serde(rename = "XNOR")]
    Xnor,
}

impl NodeType {
    /// Number of logical inputs this type consumes
    pub fn arity(self) -> usize {
        match self {
            Self::Input => 0,
            Self::Output | Self::Not => 1,
            Self::And | Self::Or | Self::Xor | Self::Nand | Self::Nor | Self::Xnor => 2,
        }
    }

    /// Layout category of this type
    pub fn category(self) -> NodeCategory {
        match self {
            Self::Input => NodeCategory::Input,
            Self::Output => NodeCategory::Output,
            Self::And | Self::Or | Self::Not | Self::Xor | Self::Nand | Self::Nor | Self::Xnor => {
                NodeCategory::Gate
            }
        }
    }

    /// Check if this type is a logic gate
    pub fn is_gate(self) -> bool {
        self.category() == NodeCategory::Gate
    }

    /// Apply the boolean function of this type.
    ///
    /// Single-input types only look at `in1`.
    pub fn apply(self, in1: bool, in2: bool) -> bool {
        match self {
            Self::Input | Self::Output => in1,
            Self::And => in1 && in2,
            Self::Or => in1 || in2,
            Self::Not => !in1,
            Self::Xor => in1 != in2,
            Self::Nand => !(in1 && in2),
            Self::Nor => !(in1 || in2),
            Self::Xnor => in1 == in2,
        }
    }

    /// Get the display color for this node type (for UI)
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::Input => [14, 165, 233],
            Self::Output => [16, 185, 129],
            Self::And => [239, 68, 68],
            Self::Or => [249, 115, 22],
            Self::Not => [168, 85, 247],
            Self::Xor => [234, 179, 8],
            Self::Nand => [244, 63, 94],
            Self::Nor => [245, 158, 11],
            Self::Xnor => [236, 72, 153],
        }
    }

    /// Short display symbol, matching the serialized name
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Xor => "XOR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xnor => "XNOR",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Where the level author asked a node to be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// No explicit placement
    Unplaced,
    /// Absolute top-left pixel coordinates
    Pixel {
        /// Horizontal coordinate
        x: f32,
        /// Vertical coordinate
        y: f32,
    },
    /// 1-based grid cell, row 1 at the bottom
    Grid {
        /// Row, counted from the bottom
        row: i32,
        /// Column, counted from the left
        col: i32,
    },
}

/// A node instance in a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Explicit horizontal pixel position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Explicit vertical pixel position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Grid row (1-based, from the bottom)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i32>,
    /// Grid column (1-based, from the left)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<i32>,
}

impl Node {
    /// Create an unplaced node
    pub fn new(id: impl Into<NodeId>, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            x: None,
            y: None,
            row: None,
            col: None,
        }
    }

    /// Set the pixel position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Set the grid cell
    pub fn with_cell(mut self, row: i32, col: i32) -> Self {
        self.row = Some(row);
        self.col = Some(col);
        self
    }

    /// Check if both grid coordinates are present
    pub fn has_cell(&self) -> bool {
        self.row.is_some() && self.col.is_some()
    }

    /// Resolve the explicit placement. Grid coordinates win over pixels.
    pub fn placement(&self) -> Placement {
        match (self.row, self.col, self.x, self.y) {
            (Some(row), Some(col), _, _) => Placement::Grid { row, col },
            (_, _, Some(x), Some(y)) => Placement::Pixel { x, y },
            _ => Placement::Unplaced,
        }
    }
}
