// SPDX-License-Identifier: MIT OR Apache-2.0
//! Level records as authored in the level JSON files.

use crate::scoring::{score, Stars};
use circuit_puzzle_graph::{
    evaluate, layout, CircuitState, Connection, Graph, GridSize, InputValues, Layout,
    LayoutConfig, Node, NodeType, TargetValues, Viewport,
};
use serde::{Deserialize, Serialize};

/// Level group, in unlock order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LevelCategory {
    /// Fundamental gates
    #[default]
    Basic,
    /// Multi-gate puzzles
    Intermediate,
    /// Larger circuits
    Advanced,
    /// Random challenges
    Random,
}

impl LevelCategory {
    /// Every category, in unlock order
    pub fn all() -> &'static [LevelCategory] {
        &[
            LevelCategory::Basic,
            LevelCategory::Intermediate,
            LevelCategory::Advanced,
            LevelCategory::Random,
        ]
    }

    /// Get display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            LevelCategory::Basic => "Basic Circuits",
            LevelCategory::Intermediate => "Intermediate Challenges",
            LevelCategory::Advanced => "Advanced Puzzles",
            LevelCategory::Random => "Random Challenges",
        }
    }

    /// Directory holding this category's level files
    pub fn dir_name(&self) -> &'static str {
        match self {
            LevelCategory::Basic => "basic",
            LevelCategory::Intermediate => "intermediate",
            LevelCategory::Advanced => "advanced",
            LevelCategory::Random => "random",
        }
    }

    /// Category that must be progressed through first
    pub fn previous(&self) -> Option<LevelCategory> {
        match self {
            LevelCategory::Basic => None,
            LevelCategory::Intermediate => Some(LevelCategory::Basic),
            LevelCategory::Advanced => Some(LevelCategory::Intermediate),
            LevelCategory::Random => Some(LevelCategory::Advanced),
        }
    }
}

/// Move-count ceilings per star rating. Non-increasing in stars:
/// `three_stars <= two_stars <= one_star`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarRatings {
    /// Moves allowed for three stars
    pub three_stars: u32,
    /// Moves allowed for two stars
    pub two_stars: u32,
    /// Moves allowed for one star
    pub one_star: u32,
}

/// Authoring constraints carried with a level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Maximum number of gates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_gates: Option<u32>,
    /// Gate types the level may use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_gates: Option<Vec<NodeType>>,
}

/// Informational text shown when a level opens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopUp {
    /// Message body
    pub text: String,
}

/// A puzzle level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    /// Unique level ID
    pub level_id: String,
    /// Display name
    #[serde(default)]
    pub level_name: String,
    /// Short description
    #[serde(default)]
    pub level_description: String,
    /// Group, assigned by the repository from the file location
    #[serde(default)]
    pub category: LevelCategory,
    /// Circuit nodes
    pub nodes: Vec<Node>,
    /// Circuit wires
    pub connections: Vec<Connection>,
    /// Switch values when the level starts
    pub initial_inputs: InputValues,
    /// Output values that solve the level
    pub target_outputs: TargetValues,
    /// Grid dimensions for explicit placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSize>,
    /// Star thresholds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_ratings: Option<StarRatings>,
    /// Authoring constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    /// Informational pop-up
    #[serde(default, rename = "pop_up", skip_serializing_if = "Option::is_none")]
    pub pop_up: Option<PopUp>,
}

impl Level {
    /// Create an empty level
    pub fn new(level_id: impl Into<String>, level_name: impl Into<String>) -> Self {
        Self {
            level_id: level_id.into(),
            level_name: level_name.into(),
            level_description: String::new(),
            category: LevelCategory::default(),
            nodes: Vec::new(),
            connections: Vec::new(),
            initial_inputs: InputValues::new(),
            target_outputs: TargetValues::new(),
            grid: None,
            star_ratings: None,
            constraints: None,
            pop_up: None,
        }
    }

    /// Build the circuit graph of this level
    pub fn graph(&self) -> Graph {
        Graph::from_parts(&self.nodes, &self.connections)
    }

    /// Evaluate the circuit and mark which targets are met
    pub fn evaluate(&self, inputs: &InputValues) -> CircuitState {
        let mut state = evaluate(&self.graph(), inputs);
        state.check_targets(&self.target_outputs);
        state
    }

    /// Check whether an evaluated state solves the level
    pub fn is_solved_by(&self, state: &CircuitState) -> bool {
        state.targets_met(&self.target_outputs)
    }

    /// Lay out the circuit inside a viewport
    pub fn layout(&self, viewport: Viewport, config: &LayoutConfig) -> Layout {
        layout(&self.graph(), self.grid, viewport, config)
    }

    /// Stars earned for solving the level in `moves` toggles
    pub fn score(&self, moves: u32) -> Stars {
        score(self.star_ratings.as_ref(), moves)
    }

    /// Pop-up text, if the level has a non-blank one
    pub fn info_popup(&self) -> Option<&str> {
        self.pop_up
            .as_ref()
            .map(|p| p.text.as_str())
            .filter(|text| !text.trim().is_empty())
    }

    /// Number of logic gates in the circuit
    pub fn gate_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.node_type.is_gate()).count()
    }

    /// Connections naming a missing node, then gates wired into themselves.
    ///
    /// Both still load and evaluate; a missing source reads as `false`.
    pub fn suspect_connections(&self) -> Vec<Connection> {
        let graph = self.graph();
        let mut suspect: Vec<Connection> = graph.dangling_connections().cloned().collect();
        suspect.extend(
            graph
                .connections()
                .filter(|c| c.is_self_loop() && graph.contains(&c.from))
                .cloned(),
        );
        suspect
    }

    /// Builder: set the nodes
    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Builder: set the connections
    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }

    /// Builder: set one target output
    pub fn with_target(mut self, node_id: &str, value: bool) -> Self {
        self.target_outputs.insert(node_id.into(), value);
        self
    }

    /// Builder: set one initial input
    pub fn with_initial_input(mut self, node_id: &str, value: bool) -> Self {
        self.initial_inputs.insert(node_id.into(), value);
        self
    }

    /// Builder: set the star thresholds
    pub fn with_star_ratings(mut self, three_stars: u32, two_stars: u32, one_star: u32) -> Self {
        self.star_ratings = Some(StarRatings {
            three_stars,
            two_stars,
            one_star,
        });
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use circuit_puzzle_graph::PortId;

    /// Two switches into an AND gate into one lamp
    pub fn single_and(level_id: &str) -> Level {
        Level::new(level_id, "Single AND")
            .with_nodes(vec![
                Node::new("InputA", NodeType::Input, "A"),
                Node::new("InputB", NodeType::Input, "B"),
                Node::new("AND1", NodeType::And, "AND"),
                Node::new("Output1", NodeType::Output, "Out"),
            ])
            .with_connections(vec![
                Connection::to_port("InputA", "AND1", PortId::Input1),
                Connection::to_port("InputB", "AND1", PortId::Input2),
                Connection::new("AND1", "Output1"),
            ])
            .with_initial_input("InputA", false)
            .with_initial_input("InputB", false)
            .with_target("Output1", true)
            .with_star_ratings(2, 4, 6)
    }
}
