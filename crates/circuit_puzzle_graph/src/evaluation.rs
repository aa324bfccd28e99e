// SPDX-License-Identifier: MIT OR Apache-2.0
//! Circuit evaluation.
//!
//! The evaluator runs a bounded iterative relaxation instead of a topological
//! pass, so feedback circuits are allowed. Each round recomputes every
//! non-input node in node order, reading values already updated in the same
//! round. Evaluation stops at the first round that changes nothing, or after
//! `2 × node count` rounds. A circuit that never settles (a NOT gate feeding
//! itself) returns whatever state the last round left behind.

use crate::connection::Connection;
use crate::graph::Graph;
use crate::node::{Node, NodeId, NodeType};
use crate::port::{PortId, MAX_PORTS};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input assignment: Input node ID to switch value
pub type InputValues = IndexMap<NodeId, bool>;

/// Target pattern: Output node ID to expected value
pub type TargetValues = IndexMap<NodeId, bool>;

/// A node together with its evaluated state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedNode {
    /// The level node
    #[serde(flatten)]
    pub node: Node,
    /// Current logical value
    pub value: bool,
    /// Values read on each resolved port during the last recompute
    #[serde(rename = "inputValues")]
    pub input_values: BTreeMap<PortId, bool>,
    /// For target Output nodes, whether the value matches the target
    #[serde(rename = "isTargetMet", skip_serializing_if = "Option::is_none")]
    pub is_target_met: Option<bool>,
}

/// Result of one evaluation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitState {
    /// Evaluated nodes in graph order
    nodes: IndexMap<NodeId, EvaluatedNode>,
    /// Rounds executed
    rounds: usize,
    /// Whether a round without changes was reached
    converged: bool,
}

impl CircuitState {
    /// Get an evaluated node
    pub fn node(&self, node_id: &NodeId) -> Option<&EvaluatedNode> {
        self.nodes.get(node_id)
    }

    /// Get the value of a node
    pub fn value(&self, node_id: &NodeId) -> Option<bool> {
        self.nodes.get(node_id).map(|n| n.value)
    }

    /// Iterate over evaluated nodes in graph order
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &EvaluatedNode)> {
        self.nodes.iter()
    }

    /// Number of evaluated nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no nodes were evaluated
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rounds of relaxation executed
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Whether the circuit settled before the iteration bound
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Check whether every target is met without marking nodes.
    ///
    /// An empty target map is never met.
    pub fn targets_met(&self, targets: &TargetValues) -> bool {
        !targets.is_empty()
            && targets
                .iter()
                .all(|(id, target)| self.value(id) == Some(*target))
    }

    /// Mark `is_target_met` on every target node and report whether all
    /// targets are met. Missing target nodes count as unmet.
    pub fn check_targets(&mut self, targets: &TargetValues) -> bool {
        let mut all_met = !targets.is_empty();
        for (id, target) in targets {
            match self.nodes.get_mut(id) {
                Some(node) => {
                    let met = node.value == *target;
                    node.is_target_met = Some(met);
                    all_met &= met;
                }
                None => {
                    tracing::debug!(node = %id, "target refers to a missing node");
                    all_met = false;
                }
            }
        }
        all_met
    }
}

/// Precomputed wiring of one non-input node
struct Step {
    index: usize,
    node_type: NodeType,
    arity: usize,
    /// Source node index per port; `None` reads as `false`
    sources: [Option<usize>; MAX_PORTS],
}

/// Evaluate a graph under an input assignment.
///
/// Missing inputs read as `false`. The function is pure: identical arguments
/// give identical results.
pub fn evaluate(graph: &Graph, inputs: &InputValues) -> CircuitState {
    let count = graph.node_count();

    let mut values: Vec<bool> = graph
        .nodes()
        .map(|node| match node.node_type {
            NodeType::Input => inputs.get(&node.id).copied().unwrap_or(false),
            _ => false,
        })
        .collect();

    let steps: Vec<Step> = graph
        .nodes()
        .enumerate()
        .filter(|(_, node)| node.node_type != NodeType::Input)
        .filter_map(|(index, node)| {
            let resolved = graph.resolved_inputs(&node.id)?;
            let mut sources = [None; MAX_PORTS];
            for (port, source) in resolved.ports() {
                sources[port.index()] = source.and_then(|id| graph.index_of(id));
            }
            Some(Step {
                index,
                node_type: node.node_type,
                arity: resolved.arity(),
                sources,
            })
        })
        .collect();

    let mut port_values: Vec<[Option<bool>; MAX_PORTS]> = vec![[None; MAX_PORTS]; count];
    let max_rounds = 2 * count;
    let mut rounds = 0;
    let mut converged = steps.is_empty();

    while rounds < max_rounds {
        rounds += 1;
        let mut changed = false;

        for step in &steps {
            let mut read = [None; MAX_PORTS];
            for (slot, source) in step.sources.iter().enumerate().take(step.arity) {
                read[slot] = source.map(|i| values[i]);
            }
            port_values[step.index] = read;

            let in1 = read[0].unwrap_or(false);
            let in2 = read[1].unwrap_or(false);
            let next = step.node_type.apply(in1, in2);
            if values[step.index] != next {
                values[step.index] = next;
                changed = true;
            }
        }

        if !changed {
            converged = true;
            break;
        }
    }

    if converged {
        tracing::trace!(nodes = count, rounds, "circuit settled");
    } else {
        tracing::debug!(
            nodes = count,
            rounds,
            "iteration bound reached before the circuit settled"
        );
    }

    let nodes = graph
        .nodes()
        .zip(values.iter().zip(port_values.iter()))
        .map(|(node, (&value, ports))| {
            let input_values = PortId::ALL
                .iter()
                .filter_map(|port| ports[port.index()].map(|v| (*port, v)))
                .collect();
            (
                node.id.clone(),
                EvaluatedNode {
                    node: node.clone(),
                    value,
                    input_values,
                    is_target_met: None,
                },
            )
        })
        .collect();

    CircuitState {
        nodes,
        rounds,
        converged,
    }
}

/// Evaluate raw level parts. See [`evaluate`].
pub fn evaluate_nodes(
    nodes: &[Node],
    connections: &[Connection],
    inputs: &InputValues,
) -> CircuitState {
    evaluate(&Graph::from_parts(nodes, connections), inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn inputs(pairs: &[(&str, bool)]) -> InputValues {
        pairs.iter().map(|(k, v)| (id(k), *v)).collect()
    }

    fn single_and() -> (Vec<Node>, Vec<Connection>) {
        let nodes = vec![
            Node::new("InputA", NodeType::Input, "A"),
            Node::new("InputB", NodeType::Input, "B"),
            Node::new("AND1", NodeType::And, "AND"),
            Node::new("Output1", NodeType::Output, "Out"),
        ];
        let connections = vec![
            Connection::to_port("InputA", "AND1", PortId::Input1),
            Connection::to_port("InputB", "AND1", PortId::Input2),
            Connection::new("AND1", "Output1"),
        ];
        (nodes, connections)
    }

    fn gate_circuit(gate: NodeType) -> (Vec<Node>, Vec<Connection>) {
        let nodes = vec![
            Node::new("a", NodeType::Input, "a"),
            Node::new("b", NodeType::Input, "b"),
            Node::new("g", gate, "g"),
        ];
        let connections = vec![Connection::new("a", "g"), Connection::new("b", "g")];
        (nodes, connections)
    }

    #[test]
    fn test_gate_truth_tables() {
        let gates = [
            NodeType::And,
            NodeType::Or,
            NodeType::Xor,
            NodeType::Nand,
            NodeType::Nor,
            NodeType::Xnor,
            NodeType::Not,
            NodeType::Output,
        ];
        for gate in gates {
            let (nodes, connections) = gate_circuit(gate);
            for a in [false, true] {
                for b in [false, true] {
                    let state =
                        evaluate_nodes(&nodes, &connections, &inputs(&[("a", a), ("b", b)]));
                    let expected = match gate {
                        NodeType::And => a && b,
                        NodeType::Or => a || b,
                        NodeType::Xor => a != b,
                        NodeType::Nand => !(a && b),
                        NodeType::Nor => !(a || b),
                        NodeType::Xnor => a == b,
                        NodeType::Not => !a,
                        _ => a,
                    };
                    assert_eq!(state.value(&id("g")), Some(expected), "{gate} {a} {b}");
                }
            }
        }
    }

    #[test]
    fn test_single_and_scenario() {
        let (nodes, connections) = single_and();
        let targets: TargetValues = [(id("Output1"), true)].into_iter().collect();

        let mut state = evaluate_nodes(
            &nodes,
            &connections,
            &inputs(&[("InputA", true), ("InputB", false)]),
        );
        assert_eq!(state.value(&id("Output1")), Some(false));
        assert!(!state.check_targets(&targets));
        assert_eq!(state.node(&id("Output1")).unwrap().is_target_met, Some(false));

        let mut state = evaluate_nodes(
            &nodes,
            &connections,
            &inputs(&[("InputA", true), ("InputB", true)]),
        );
        assert_eq!(state.value(&id("Output1")), Some(true));
        assert!(state.targets_met(&targets));
        assert!(state.check_targets(&targets));
        assert_eq!(state.node(&id("Output1")).unwrap().is_target_met, Some(true));

        let and1 = state.node(&id("AND1")).unwrap();
        assert_eq!(and1.input_values.get(&PortId::Input1), Some(&true));
        assert_eq!(and1.input_values.get(&PortId::Input2), Some(&true));
    }

    #[test]
    fn test_missing_inputs_default_to_false() {
        let (nodes, connections) = single_and();
        let state = evaluate_nodes(&nodes, &connections, &InputValues::new());
        assert_eq!(state.value(&id("InputA")), Some(false));
        assert_eq!(state.value(&id("AND1")), Some(false));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let (nodes, connections) = single_and();
        let assignment = inputs(&[("InputA", true), ("InputB", true)]);
        let first = evaluate_nodes(&nodes, &connections, &assignment);
        let second = evaluate_nodes(&nodes, &connections, &assignment);
        assert_eq!(first, second);
    }

    #[test]
    fn test_acyclic_graph_converges_before_bound() {
        // Chain listed against data flow so every round settles only one node.
        let nodes = vec![
            Node::new("out", NodeType::Output, "out"),
            Node::new("n3", NodeType::Not, "n3"),
            Node::new("n2", NodeType::Not, "n2"),
            Node::new("n1", NodeType::Not, "n1"),
            Node::new("in", NodeType::Input, "in"),
        ];
        let connections = vec![
            Connection::new("in", "n1"),
            Connection::new("n1", "n2"),
            Connection::new("n2", "n3"),
            Connection::new("n3", "out"),
        ];
        let state = evaluate_nodes(&nodes, &connections, &inputs(&[("in", true)]));
        assert!(state.converged());
        assert!(state.rounds() < 2 * nodes.len());
        assert_eq!(state.value(&id("out")), Some(false));
    }

    #[test]
    fn test_untargeted_ports_follow_listing_order() {
        let nodes = vec![
            Node::new("a", NodeType::Input, "a"),
            Node::new("b", NodeType::Input, "b"),
            Node::new("g", NodeType::And, "g"),
        ];
        let connections = vec![Connection::new("a", "g"), Connection::new("b", "g")];
        let state = evaluate_nodes(&nodes, &connections, &inputs(&[("a", true), ("b", false)]));
        let g = state.node(&id("g")).unwrap();
        assert_eq!(g.input_values.get(&PortId::Input1), Some(&true));
        assert_eq!(g.input_values.get(&PortId::Input2), Some(&false));
    }

    #[test]
    fn test_feedback_not_loop_terminates() {
        let nodes = vec![Node::new("NOT1", NodeType::Not, "NOT")];
        let connections = vec![Connection::new("NOT1", "NOT1")];
        let state = evaluate_nodes(&nodes, &connections, &InputValues::new());
        assert!(!state.converged());
        assert_eq!(state.rounds(), 2);
        assert!(state.value(&id("NOT1")).is_some());
    }

    #[test]
    fn test_dangling_source_reads_false() {
        let nodes = vec![
            Node::new("n", NodeType::Not, "n"),
            Node::new("o", NodeType::Output, "o"),
        ];
        let connections = vec![Connection::new("ghost", "n"), Connection::new("n", "o")];
        let state = evaluate_nodes(&nodes, &connections, &InputValues::new());
        assert_eq!(state.value(&id("n")), Some(true));
        assert_eq!(state.value(&id("o")), Some(true));
        assert!(state.node(&id("n")).unwrap().input_values.is_empty());
    }

    #[test]
    fn test_empty_or_missing_targets_are_not_met() {
        let (nodes, connections) = single_and();
        let mut state = evaluate_nodes(&nodes, &connections, &InputValues::new());
        assert!(!state.check_targets(&TargetValues::new()));

        let targets: TargetValues = [(id("nowhere"), false)].into_iter().collect();
        assert!(!state.check_targets(&targets));
        assert!(!state.targets_met(&targets));
    }
}
