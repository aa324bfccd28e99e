// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations for the terminal player.

use crate::error::{AppError, Result};
use crate::progress_store::ProgressStore;
use crate::settings::AppSettings;
use crate::sink::LoggingSink;
use circuit_puzzle_game::{
    AchievementTable, DirectorySource, Level, LevelCategory, LevelRepository, PlaySession,
    ProgressRecord, SessionError, SessionEvent,
};
use circuit_puzzle_graph::{CircuitState, InputValues, NodeId, NodeType, Viewport};
use std::io::{BufRead, Write};

/// Everything a command needs
pub struct Player {
    settings: AppSettings,
    repository: LevelRepository<DirectorySource>,
    store: ProgressStore,
    achievements: AchievementTable,
}

impl Player {
    /// Create a player from resolved settings
    pub fn new(settings: AppSettings) -> Self {
        let repository = LevelRepository::new(DirectorySource::new(&settings.levels_dir));
        let store = ProgressStore::new(&settings.progress_file);
        Self {
            settings,
            repository,
            store,
            achievements: AchievementTable::default(),
        }
    }

    fn load_progress(&self) -> Result<ProgressRecord> {
        self.store.load().map_err(|source| AppError::Progress {
            path: self.store.path().to_path_buf(),
            source,
        })
    }

    fn save_progress(&self, progress: &ProgressRecord) -> Result<()> {
        self.store.save(progress).map_err(|source| AppError::Progress {
            path: self.store.path().to_path_buf(),
            source,
        })
    }

    /// Print every category with its levels and best stars
    pub fn list(&self, out: &mut impl Write) -> Result<()> {
        let levels = self.repository.levels()?;
        let progress = self.load_progress()?;

        for &category in LevelCategory::all() {
            let counts = progress.category_progress(&levels, category);
            let lock = if progress.is_category_unlocked(&levels, category) {
                ""
            } else {
                " [locked]"
            };
            writeln!(
                out,
                "{} ({}/{}, {:.0}%){lock}",
                category.display_name(),
                counts.completed,
                counts.total,
                counts.percentage
            )?;
            for level in levels.iter().filter(|l| l.category == category) {
                let stars = progress.stars(&level.level_id).unwrap_or(0);
                let gates = level.gate_count();
                writeln!(
                    out,
                    "  {:<26} {:<3} {} ({gates} gate{})",
                    level.level_id,
                    "*".repeat(usize::from(stars)),
                    level.level_name,
                    if gates == 1 { "" } else { "s" }
                )?;
            }
        }
        Ok(())
    }

    /// Print the progress summary
    pub fn progress(&self, out: &mut impl Write) -> Result<()> {
        let levels = self.repository.levels()?;
        let progress = self.load_progress()?;
        let stats = progress.random_stats(&levels);
        writeln!(out, "Completed levels: {}", progress.completed_levels.len())?;
        writeln!(
            out,
            "Random challenges: {}/{} played, {} stars, {:.2} average",
            stats.played,
            stats.total,
            stats.total_stars,
            stats.average_stars()
        )?;
        for (achievement, _) in progress.awarded_achievements.iter().filter(|(_, v)| **v) {
            writeln!(out, "Achievement: {achievement}")?;
        }
        Ok(())
    }

    /// Evaluate a level with some inputs flipped from their initial values
    pub fn show(&self, level_id: &str, toggles: &[String], json: bool, out: &mut impl Write) -> Result<()> {
        let level = self.repository.level(level_id)?;
        let mut inputs = level.initial_inputs.clone();
        for toggle in toggles {
            let id = NodeId::from(toggle.as_str());
            let is_input = level
                .nodes
                .iter()
                .any(|n| n.id == id && n.node_type == NodeType::Input);
            if !is_input {
                return Err(SessionError::NotAnInput(id).into());
            }
            let value = inputs.entry(id).or_insert(false);
            *value = !*value;
        }

        let state = level.evaluate(&inputs);
        if json {
            serde_json::to_writer_pretty(&mut *out, &state)?;
            writeln!(out)?;
        } else {
            write_state(&level, &inputs, &state, out)?;
        }
        Ok(())
    }

    /// Print node positions for a viewport
    pub fn layout(&self, level_id: &str, viewport: Viewport, json: bool, out: &mut impl Write) -> Result<()> {
        let level = self.repository.level(level_id)?;
        let layout = level.layout(viewport, &self.settings.layout);
        if json {
            serde_json::to_writer_pretty(&mut *out, &layout)?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(
            out,
            "{:?} layout, node size {:.1}x{:.1}",
            layout.mode, layout.node_size.width, layout.node_size.height
        )?;
        for placed in layout.placed_nodes() {
            let Some(node) = level.nodes.iter().find(|n| n.id == *placed.id) else {
                continue;
            };
            let [r, g, b] = node.node_type.color();
            writeln!(
                out,
                "  {:<12} {:<6} #{r:02x}{g:02x}{b:02x} x={:>7.1} y={:>7.1}",
                placed.id.as_str(),
                node.node_type.symbol(),
                placed.position.x,
                placed.position.y
            )?;
        }
        Ok(())
    }

    /// Look up a level by ID
    pub fn level(&self, level_id: &str) -> Result<Level> {
        Ok(self.repository.level(level_id)?)
    }

    /// Pick a random challenge, preferring unplayed ones
    pub fn random_level(&self) -> Result<Option<Level>> {
        let levels = self.repository.levels()?;
        let progress = self.load_progress()?;
        Ok(progress
            .pick_random_level(&levels, &mut rand::thread_rng())
            .cloned())
    }

    /// Interactive play loop.
    ///
    /// Each line names an input to toggle, or one of `reset`, `show`,
    /// `layout`, `next`, `quit`.
    pub fn play(&self, level: Level, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        let mut progress = self.load_progress()?;
        let mut session = self.start(level, out)?;
        write_state(session.level(), session.inputs(), session.circuit(), out)?;
        self.drain_events(&mut session, &mut progress, out)?;

        for line in input.lines() {
            let line = line?;
            let command = line.trim();
            match command {
                "" => continue,
                "quit" | "q" => break,
                "show" => {}
                "layout" => {
                    if let Some(layout) = session.layout() {
                        for placed in layout.placed_nodes() {
                            writeln!(
                                out,
                                "  {:<10} ({:.0}, {:.0})",
                                placed.id.as_str(),
                                placed.position.x,
                                placed.position.y
                            )?;
                        }
                    }
                    continue;
                }
                "reset" => session.reset(),
                "next" => {
                    if !session.is_completed() {
                        writeln!(out, "Solve this level first.")?;
                        continue;
                    }
                    match self.repository.next_level(&session.level().level_id)? {
                        Some(next) => session = self.start(next, out)?,
                        None => {
                            writeln!(out, "No more levels in this category.")?;
                            break;
                        }
                    }
                }
                name => {
                    let name = name.strip_prefix("toggle ").unwrap_or(name).trim();
                    if let Err(e) = session.toggle_input(&NodeId::from(name)) {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                }
            }
            write_state(session.level(), session.inputs(), session.circuit(), out)?;
            self.drain_events(&mut session, &mut progress, out)?;
        }
        Ok(())
    }

    fn start(&self, level: Level, out: &mut impl Write) -> Result<PlaySession> {
        writeln!(out, "== {} ==", level.level_name)?;
        if !level.level_description.is_empty() {
            writeln!(out, "{}", level.level_description)?;
        }
        if let Some(text) = level.info_popup() {
            writeln!(out, "Info: {text}")?;
        }
        let mut session = PlaySession::new(level).with_layout_config(self.settings.layout);
        session.set_viewport(self.settings.viewport.width, self.settings.viewport.height);
        Ok(session)
    }

    fn drain_events(
        &self,
        session: &mut PlaySession,
        progress: &mut ProgressRecord,
        out: &mut impl Write,
    ) -> Result<()> {
        for event in session.take_events() {
            let SessionEvent::Completed(completion) = event else {
                continue;
            };
            let recorded = progress.record_completion(&completion, &self.achievements, &LoggingSink);
            let levels = self.repository.levels()?;
            progress.award_category_unlocks(&levels, &self.achievements, &LoggingSink);
            self.save_progress(progress)?;

            writeln!(
                out,
                "Level complete in {} moves: {}{}",
                completion.moves,
                completion.stars,
                if recorded.is_first_completion { " (first clear)" } else { "" }
            )?;
            if session.level().category == LevelCategory::Random {
                writeln!(out, "Type quit to return to the menu.")?;
            } else {
                writeln!(out, "Type next for the next level.")?;
            }
        }
        Ok(())
    }
}

fn write_state(
    level: &Level,
    inputs: &InputValues,
    state: &CircuitState,
    out: &mut impl Write,
) -> Result<()> {
    for (id, evaluated) in state.iter() {
        let node = &evaluated.node;
        let marker = match (node.node_type, evaluated.is_target_met) {
            (NodeType::Input, _) if inputs.get(id).copied().unwrap_or(false) => " (on)".to_string(),
            (NodeType::Input, _) => " (off)".to_string(),
            (_, Some(true)) => " target met".to_string(),
            (_, Some(false)) => match level.target_outputs.get(id) {
                Some(target) => format!(" needs {}", u8::from(*target)),
                None => String::new(),
            },
            (_, None) => String::new(),
        };
        writeln!(
            out,
            "  {:<10} {:<6} {}{marker}",
            id.as_str(),
            node.node_type.symbol(),
            u8::from(evaluated.value)
        )?;
    }
    Ok(())
}
