// SPDX-License-Identifier: MIT OR Apache-2.0
//! Logic circuit graph for the circuit puzzle game.
//!
//! This crate holds the pure core of a level:
//! - Graph model (nodes, connections, input ports)
//! - Evaluation by bounded iterative relaxation
//! - Automatic layout from an explicit grid or by topological layering
//!
//! ## Architecture
//!
//! Everything here is synchronous and free of I/O. Evaluation and layout
//! read a [`Graph`] and return freshly allocated results, so a graph can be
//! shared between sessions without locking.

pub mod node;
pub mod port;
pub mod connection;
pub mod graph;
pub mod evaluation;
pub mod layout;

pub use node::{Node, NodeCategory, NodeId, NodeType, Placement};
pub use port::{PortId, ResolvedInputs};
pub use connection::{Connection, PortTarget};
pub use graph::Graph;
pub use evaluation::{evaluate, evaluate_nodes, CircuitState, EvaluatedNode, InputValues, TargetValues};
pub use layout::{layout, GridSize, Layout, LayoutConfig, LayoutMode, PlacedNode, Position, Size, Viewport};
