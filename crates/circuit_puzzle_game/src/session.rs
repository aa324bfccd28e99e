// SPDX-License-Identifier: MIT OR Apache-2.0
//! A single attempt at a level.

use crate::error::SessionError;
use crate::level::Level;
use crate::scoring::Stars;
use circuit_puzzle_graph::{CircuitState, InputValues, Layout, LayoutConfig, NodeId, NodeType, Viewport};
use serde::{Deserialize, Serialize};

/// Completion state of the current attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    /// Targets not yet met since the last change
    #[default]
    NotCompleted,
    /// Targets met; completion already reported
    CompletedThisAttempt,
}

/// A reported level completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// Completed level
    pub level_id: String,
    /// Stars earned
    pub stars: Stars,
    /// Toggles made in the attempt
    pub moves: u32,
}

/// Something that happened during play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An input switch changed
    InputToggled {
        /// Toggled input
        node: NodeId,
        /// New value
        value: bool,
    },
    /// The level was solved
    Completed(Completion),
}

/// Play state of one level
#[derive(Debug, Clone)]
pub struct PlaySession {
    level: Level,
    inputs: InputValues,
    moves: u32,
    completion: CompletionState,
    circuit: CircuitState,
    layout_config: LayoutConfig,
    layout: Option<Layout>,
    /// Events waiting to be taken
    pending_events: Vec<SessionEvent>,
}

impl PlaySession {
    /// Start a session from the level's initial inputs.
    ///
    /// If the initial inputs already solve the level, a completion with zero
    /// moves is queued.
    pub fn new(level: Level) -> Self {
        let inputs = level.initial_inputs.clone();
        let circuit = level.evaluate(&inputs);
        let mut session = Self {
            level,
            inputs,
            moves: 0,
            completion: CompletionState::NotCompleted,
            circuit,
            layout_config: LayoutConfig::default(),
            layout: None,
            pending_events: Vec::new(),
        };
        session.check_completion();
        session
    }

    /// Builder: use a custom layout configuration
    pub fn with_layout_config(mut self, config: LayoutConfig) -> Self {
        self.layout_config = config;
        self
    }

    /// Flip an input switch and re-evaluate. Returns the new value.
    pub fn toggle_input(&mut self, node_id: &NodeId) -> Result<bool, SessionError> {
        let is_input = self
            .level
            .nodes
            .iter()
            .any(|n| n.id == *node_id && n.node_type == NodeType::Input);
        if !is_input {
            return Err(SessionError::NotAnInput(node_id.clone()));
        }

        let value = self.inputs.entry(node_id.clone()).or_insert(false);
        *value = !*value;
        let value = *value;

        self.moves += 1;
        self.completion = CompletionState::NotCompleted;
        tracing::debug!(node = %node_id, value, moves = self.moves, "input toggled");
        self.pending_events.push(SessionEvent::InputToggled {
            node: node_id.clone(),
            value,
        });

        self.circuit = self.level.evaluate(&self.inputs);
        self.check_completion();
        Ok(value)
    }

    /// Restore the initial inputs and start a fresh attempt
    pub fn reset(&mut self) {
        self.inputs = self.level.initial_inputs.clone();
        self.moves = 0;
        self.completion = CompletionState::NotCompleted;
        self.circuit = self.level.evaluate(&self.inputs);
        self.check_completion();
    }

    fn check_completion(&mut self) {
        if self.completion == CompletionState::CompletedThisAttempt
            || !self.level.is_solved_by(&self.circuit)
        {
            return;
        }

        self.completion = CompletionState::CompletedThisAttempt;
        let completion = Completion {
            level_id: self.level.level_id.clone(),
            stars: self.level.score(self.moves),
            moves: self.moves,
        };
        tracing::info!(
            level = %completion.level_id,
            moves = completion.moves,
            stars = completion.stars.get(),
            "level completed"
        );
        self.pending_events.push(SessionEvent::Completed(completion));
    }

    /// Take events queued since the last call
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Recompute the layout for a new viewport size
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.layout = Some(self.level.layout(Viewport::new(width, height), &self.layout_config));
    }

    /// Layout for the last viewport, if one was set
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Level being played
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Current input values
    pub fn inputs(&self) -> &InputValues {
        &self.inputs
    }

    /// Value of one input switch
    pub fn input_value(&self, node_id: &NodeId) -> bool {
        self.inputs.get(node_id).copied().unwrap_or(false)
    }

    /// Toggles made in this attempt
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Completion state of this attempt
    pub fn completion(&self) -> CompletionState {
        self.completion
    }

    /// Check whether the level is currently solved
    pub fn is_completed(&self) -> bool {
        self.completion == CompletionState::CompletedThisAttempt
    }

    /// Latest evaluated circuit
    pub fn circuit(&self) -> &CircuitState {
        &self.circuit
    }
}
