// SPDX-License-Identifier: MIT OR Apache-2.0
//! Automatic circuit layout.
//!
//! Produces top-left pixel coordinates for every node plus one node size
//! shared by the whole level. Two modes:
//!
//! - **Grid**: every node carries a 1-based `(row, col)` and the level
//!   declares grid dimensions. Row 1 is the bottom row.
//! - **Layered**: inputs along the bottom, outputs along the top, gates in
//!   bands between them ranked by a bounded forward sweep.
//!
//! Nodes left without a position are drawn at the canvas center.

use crate::graph::Graph;
use crate::node::{NodeCategory, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Width and height of a node box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Size {
    /// Create a size
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Top-left corner of a node box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate, growing downwards
    pub y: f32,
}

impl Position {
    /// Create a position
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Drawing surface dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport with no drawable area. Nothing should be rendered.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Grid dimensions declared by a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows
    pub rows: i32,
    /// Number of columns
    pub cols: i32,
}

impl GridSize {
    /// Check that both dimensions are positive
    pub fn is_valid(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    /// Check that a 1-based cell lies inside the grid
    pub fn contains(&self, row: i32, col: i32) -> bool {
        (1..=self.rows).contains(&row) && (1..=self.cols).contains(&col)
    }
}

/// Layout tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Default node size, also the reference aspect ratio in grid mode
    pub node_size: Size,
    /// Margin kept free on every canvas edge
    pub canvas_padding: f32,
    /// Fraction of a grid cell left free on each side of a node
    pub cell_padding_factor: f32,
    /// Floor for each side of a grid-scaled node
    pub min_node_extent: f32,
    /// Height reserved at the top for the output row
    pub output_band: f32,
    /// Height reserved at the bottom for the input row
    pub input_band: f32,
    /// Gate layers before the sweep force-assigns the remainder
    pub max_layers: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let node_size = Size::new(60.0, 80.0);
        Self {
            node_size,
            canvas_padding: 20.0,
            cell_padding_factor: 0.1,
            min_node_extent: 30.0,
            output_band: node_size.height + 10.0,
            input_band: node_size.height + 20.0,
            max_layers: 10,
        }
    }
}

/// Which placement strategy produced a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Viewport had no area; nothing placed
    Degenerate,
    /// Explicit grid cells
    Grid,
    /// Input/gate/output layering
    Layered,
}

/// A node with its computed box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode<'a> {
    /// Node ID
    pub id: &'a NodeId,
    /// Top-left corner
    pub position: Position,
    /// Shared node size
    pub size: Size,
}

/// Result of a layout call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Size shared by every node of the level
    pub node_size: Size,
    /// Top-left position per node, in graph order
    pub positions: IndexMap<NodeId, Position>,
    /// Strategy used
    pub mode: LayoutMode,
}

impl Layout {
    /// Position of one node
    pub fn position(&self, node_id: &NodeId) -> Option<Position> {
        self.positions.get(node_id).copied()
    }

    /// Iterate over placed nodes
    pub fn placed_nodes(&self) -> impl Iterator<Item = PlacedNode<'_>> {
        self.positions.iter().map(move |(id, position)| PlacedNode {
            id,
            position: *position,
            size: self.node_size,
        })
    }

    /// Check if nothing was placed
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Lay out a graph inside a viewport.
pub fn layout(
    graph: &Graph,
    grid: Option<GridSize>,
    viewport: Viewport,
    config: &LayoutConfig,
) -> Layout {
    if viewport.is_degenerate() {
        return Layout {
            node_size: config.node_size,
            positions: IndexMap::new(),
            mode: LayoutMode::Degenerate,
        };
    }

    let grid = grid.filter(|_| graph.nodes().all(|n| n.has_cell()));
    let (node_size, mut positions, mode) = match grid {
        Some(grid) => {
            let (size, positions) = grid_layout(graph, grid, viewport, config);
            (size, positions, LayoutMode::Grid)
        }
        None => (
            config.node_size,
            layered_layout(graph, viewport, config),
            LayoutMode::Layered,
        ),
    };

    let center = Position::new(
        viewport.width / 2.0 - node_size.width / 2.0,
        viewport.height / 2.0 - node_size.height / 2.0,
    );

    // Rebuild in graph order, filling gaps
    let positions = graph
        .nodes()
        .map(|node| {
            let position = positions.remove(&node.id).unwrap_or_else(|| {
                tracing::trace!(node = %node.id, "no computed position, placing at canvas center");
                center
            });
            (node.id.clone(), position)
        })
        .collect();

    Layout {
        node_size,
        positions,
        mode,
    }
}

fn grid_layout(
    graph: &Graph,
    grid: GridSize,
    viewport: Viewport,
    config: &LayoutConfig,
) -> (Size, HashMap<NodeId, Position>) {
    let mut positions = HashMap::new();
    if !grid.is_valid() {
        tracing::debug!(rows = grid.rows, cols = grid.cols, "invalid grid dimensions, skipping grid placement");
        return (config.node_size, positions);
    }

    let margin = config.canvas_padding;
    let cell_width = (viewport.width - 2.0 * margin) / grid.cols as f32;
    let cell_height = (viewport.height - 2.0 * margin) / grid.rows as f32;
    let aspect = config.node_size.aspect_ratio();
    let usable = 1.0 - config.cell_padding_factor * 2.0;
    let max_width = cell_width * usable;
    let max_height = cell_height * usable;

    let (width, height) = if max_width / aspect <= max_height {
        (max_width, max_width / aspect)
    } else {
        (max_height * aspect, max_height)
    };
    let size = Size::new(
        width.max(config.min_node_extent),
        height.max(config.min_node_extent),
    );

    for node in graph.nodes() {
        let (Some(row), Some(col)) = (node.row, node.col) else {
            continue;
        };
        if !grid.contains(row, col) {
            tracing::debug!(node = %node.id, row, col, "grid cell out of range");
            continue;
        }
        let x = margin + (col - 1) as f32 * cell_width + (cell_width - size.width) / 2.0;
        let y = margin + (grid.rows - row) as f32 * cell_height + (cell_height - size.height) / 2.0;
        positions.insert(node.id.clone(), Position::new(x, y));
    }

    (size, positions)
}

fn layered_layout(
    graph: &Graph,
    viewport: Viewport,
    config: &LayoutConfig,
) -> HashMap<NodeId, Position> {
    let mut positions = HashMap::new();
    let margin = config.canvas_padding;
    let size = config.node_size;
    let available_width = viewport.width - 2.0 * margin;
    let gate_band = viewport.height - config.output_band - config.input_band - 2.0 * margin;

    let spread = |index: usize, count: usize| -> f32 {
        if count == 1 {
            margin + (available_width - size.width) / 2.0
        } else {
            margin + index as f32 * (available_width - size.width) / count.saturating_sub(1).max(1) as f32
        }
    };

    let inputs: Vec<_> = graph
        .nodes()
        .filter(|n| n.node_type.category() == NodeCategory::Input)
        .collect();
    let input_y = viewport.height - config.input_band + (config.input_band - size.height) / 2.0
        - margin / 2.0;
    for (i, node) in inputs.iter().enumerate() {
        positions.insert(node.id.clone(), Position::new(spread(i, inputs.len()), input_y));
    }

    let outputs: Vec<_> = graph
        .nodes()
        .filter(|n| n.node_type.category() == NodeCategory::Output)
        .collect();
    let output_y = (config.output_band - size.height) / 2.0 + margin / 2.0;
    for (i, node) in outputs.iter().enumerate() {
        positions.insert(node.id.clone(), Position::new(spread(i, outputs.len()), output_y));
    }

    let layers = gate_layers(graph, config.max_layers);
    let layer_count = layers.len();
    for (k, layer) in layers.iter().enumerate() {
        // Layer 1 sits just above the inputs. Slots are zero-based over
        // `layer_count`, so the highest layer stays inside the gate band.
        let slot = (layer_count - 1 - k) as f32;
        let center_y = config.output_band
            + margin
            + (slot + 0.5) * (gate_band / layer_count as f32);
        for (i, id) in layer.iter().enumerate() {
            positions.insert(
                (*id).clone(),
                Position::new(spread(i, layer.len()), center_y - size.height / 2.0),
            );
        }
    }

    positions
}

/// Rank gate nodes into layers.
///
/// Input nodes are layer 0. A gate joins layer `L` once every existing
/// predecessor already sits in a layer below `L`; gates with no incoming
/// wires join layer 1. When a sweep assigns nothing, or layer `max_layers`
/// is reached, all remaining gates are forced into the current layer.
///
/// Entry `i` of the result holds layer `i + 1`. No entry is empty.
pub fn gate_layers(graph: &Graph, max_layers: usize) -> Vec<Vec<&NodeId>> {
    let mut layer_of: HashMap<&NodeId, usize> = graph
        .nodes()
        .filter(|n| n.node_type.category() == NodeCategory::Input)
        .map(|n| (&n.id, 0))
        .collect();

    let mut remaining: Vec<&NodeId> = graph
        .nodes()
        .filter(|n| n.node_type.is_gate())
        .map(|n| &n.id)
        .collect();

    let mut layers = Vec::new();
    let mut current = 1;
    while !remaining.is_empty() {
        let (ready, waiting): (Vec<&NodeId>, Vec<&NodeId>) =
            remaining.iter().copied().partition(|id| {
                graph
                    .predecessors(id)
                    .all(|pred| layer_of.get(pred).is_some_and(|&l| l < current))
            });

        let mut layer = ready;
        if layer.is_empty() || current >= max_layers.max(1) {
            if !waiting.is_empty() {
                tracing::debug!(
                    layer = current,
                    forced = waiting.len(),
                    "layer sweep stalled, forcing remaining gates"
                );
            }
            layer.extend(waiting);
            remaining = Vec::new();
        } else {
            remaining = waiting;
        }

        for id in &layer {
            layer_of.insert(*id, current);
        }
        layers.push(layer);
        current += 1;
    }

    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::node::{Node, NodeType};

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn assert_near(actual: Option<Position>, x: f32, y: f32) {
        let p = actual.expect("node has a position");
        assert!((p.x - x).abs() < 1e-3 && (p.y - y).abs() < 1e-3, "{p:?} != ({x}, {y})");
    }

    fn two_layer_graph() -> Graph {
        let nodes = [
            Node::new("A", NodeType::Input, "A"),
            Node::new("B", NodeType::Input, "B"),
            Node::new("AND1", NodeType::And, "AND"),
            Node::new("NOT1", NodeType::Not, "NOT"),
            Node::new("OUT", NodeType::Output, "Out"),
        ];
        let connections = [
            Connection::new("A", "AND1"),
            Connection::new("B", "AND1"),
            Connection::new("AND1", "NOT1"),
            Connection::new("NOT1", "OUT"),
        ];
        Graph::from_parts(&nodes, &connections)
    }

    #[test]
    fn test_degenerate_viewport() {
        let config = LayoutConfig::default();
        let result = layout(&two_layer_graph(), None, Viewport::new(0.0, 500.0), &config);
        assert_eq!(result.mode, LayoutMode::Degenerate);
        assert!(result.is_empty());
        assert_eq!(result.node_size, config.node_size);
    }

    #[test]
    fn test_grid_coordinate_law() {
        let nodes = [
            Node::new("bl", NodeType::Input, "bl").with_cell(1, 1),
            Node::new("tr", NodeType::Output, "tr").with_cell(3, 3),
        ];
        let graph = Graph::from_parts(&nodes, &[]);
        let grid = GridSize { rows: 3, cols: 3 };
        let result = layout(&graph, Some(grid), Viewport::new(340.0, 340.0), &LayoutConfig::default());

        assert_eq!(result.mode, LayoutMode::Grid);
        assert!((result.node_size.width - 60.0).abs() < 1e-3);
        assert!((result.node_size.height - 80.0).abs() < 1e-3);
        assert_near(result.position(&id("bl")), 40.0, 230.0);
        assert_near(result.position(&id("tr")), 240.0, 30.0);
    }

    #[test]
    fn test_grid_node_size_has_floor() {
        let nodes = [Node::new("a", NodeType::Input, "a").with_cell(1, 1)];
        let graph = Graph::from_parts(&nodes, &[]);
        let grid = GridSize { rows: 20, cols: 20 };
        let result = layout(&graph, Some(grid), Viewport::new(240.0, 240.0), &LayoutConfig::default());
        assert_eq!(result.node_size, Size::new(30.0, 30.0));
    }

    #[test]
    fn test_out_of_range_cell_falls_back_to_center() {
        let nodes = [
            Node::new("ok", NodeType::Input, "ok").with_cell(1, 1),
            Node::new("off", NodeType::Output, "off").with_cell(4, 1),
        ];
        let graph = Graph::from_parts(&nodes, &[]);
        let grid = GridSize { rows: 3, cols: 3 };
        let result = layout(&graph, Some(grid), Viewport::new(340.0, 340.0), &LayoutConfig::default());
        assert_near(result.position(&id("off")), 140.0, 130.0);
        assert_eq!(result.positions.len(), 2);
    }

    #[test]
    fn test_invalid_grid_dimensions_use_default_size() {
        let nodes = [Node::new("a", NodeType::Input, "a").with_cell(1, 1)];
        let graph = Graph::from_parts(&nodes, &[]);
        let grid = GridSize { rows: 0, cols: 3 };
        let config = LayoutConfig::default();
        let result = layout(&graph, Some(grid), Viewport::new(400.0, 400.0), &config);
        assert_eq!(result.node_size, config.node_size);
        assert_eq!(result.position(&id("a")), Some(Position::new(170.0, 160.0)));
    }

    #[test]
    fn test_incomplete_grid_data_uses_layers() {
        let nodes = [
            Node::new("a", NodeType::Input, "a").with_cell(1, 1),
            Node::new("o", NodeType::Output, "o"),
        ];
        let graph = Graph::from_parts(&nodes, &[]);
        let grid = GridSize { rows: 3, cols: 3 };
        let result = layout(&graph, Some(grid), Viewport::new(400.0, 600.0), &LayoutConfig::default());
        assert_eq!(result.mode, LayoutMode::Layered);
    }

    #[test]
    fn test_layered_rows() {
        let result = layout(
            &two_layer_graph(),
            None,
            Viewport::new(400.0, 600.0),
            &LayoutConfig::default(),
        );
        assert_eq!(result.mode, LayoutMode::Layered);

        // Inputs spread across the bottom row
        assert_near(result.position(&id("A")), 20.0, 500.0);
        assert_near(result.position(&id("B")), 320.0, 500.0);
        // Lone output centered in the top row
        assert_near(result.position(&id("OUT")), 170.0, 15.0);

        // Layer 1 below layer 2, both inside the gate band
        assert_near(result.position(&id("AND1")), 170.0, 347.5);
        assert_near(result.position(&id("NOT1")), 170.0, 162.5);
    }

    #[test]
    fn test_deep_chain_stays_inside_gate_band() {
        let mut nodes = vec![Node::new("in", NodeType::Input, "in")];
        let mut connections = Vec::new();
        let mut previous = "in".to_string();
        for i in 1..=4 {
            let gate = format!("g{i}");
            nodes.push(Node::new(gate.as_str(), NodeType::Not, "NOT"));
            connections.push(Connection::new(previous.as_str(), gate.as_str()));
            previous = gate;
        }
        nodes.push(Node::new("out", NodeType::Output, "out"));
        connections.push(Connection::new(previous.as_str(), "out"));
        let graph = Graph::from_parts(&nodes, &connections);

        let config = LayoutConfig::default();
        let result = layout(&graph, None, Viewport::new(400.0, 600.0), &config);
        assert_eq!(result.mode, LayoutMode::Layered);

        // Gate band spans y = 110..480 on this canvas
        let band_top = config.output_band + config.canvas_padding;
        let band_bottom = 600.0 - config.input_band - config.canvas_padding;
        let centers: Vec<f32> = (1..=4)
            .map(|i| {
                let p = result.position(&id(&format!("g{i}"))).expect("gate placed");
                p.y + config.node_size.height / 2.0
            })
            .collect();
        for center in &centers {
            assert!(*center > band_top && *center < band_bottom, "{center} outside band");
        }
        // Each deeper layer sits higher on the canvas
        assert!(centers.windows(2).all(|w| w[1] < w[0]), "{centers:?}");
    }

    #[test]
    fn test_gate_layers_follow_dependencies() {
        let graph = two_layer_graph();
        let layers = gate_layers(&graph, 10);
        assert_eq!(layers, vec![vec![&id("AND1")], vec![&id("NOT1")]]);
    }

    #[test]
    fn test_cyclic_gates_are_forced() {
        let nodes = [
            Node::new("in", NodeType::Input, "in"),
            Node::new("x", NodeType::Or, "x"),
            Node::new("y", NodeType::Not, "y"),
        ];
        let connections = [
            Connection::new("in", "x"),
            Connection::new("y", "x"),
            Connection::new("x", "y"),
        ];
        let graph = Graph::from_parts(&nodes, &connections);
        let layers = gate_layers(&graph, 10);
        assert_eq!(layers, vec![vec![&id("x"), &id("y")]]);
    }

    #[test]
    fn test_layer_bound_forces_remainder() {
        let mut nodes = vec![Node::new("in", NodeType::Input, "in")];
        let mut connections = Vec::new();
        let mut prev = "in".to_string();
        for i in 0..6 {
            let name = format!("n{i}");
            nodes.push(Node::new(name.as_str(), NodeType::Not, name.as_str()));
            connections.push(Connection::new(prev.as_str(), name.as_str()));
            prev = name;
        }
        let graph = Graph::from_parts(&nodes, &connections);
        let layers = gate_layers(&graph, 3);
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[2].len(), 4);
    }

    #[test]
    fn test_pixel_coordinates_do_not_override_center_fallback() {
        let nodes = [
            Node::new("a", NodeType::Input, "a").with_cell(1, 1),
            Node::new("b", NodeType::Input, "b").with_cell(9, 9).with_position(5.0, 6.0),
        ];
        let graph = Graph::from_parts(&nodes, &[]);
        let grid = GridSize { rows: 3, cols: 3 };
        let result = layout(&graph, Some(grid), Viewport::new(340.0, 340.0), &LayoutConfig::default());
        assert_near(result.position(&id("b")), 140.0, 130.0);
        assert_eq!(result.placed_nodes().count(), 2);
    }
}
