// SPDX-License-Identifier: MIT OR Apache-2.0
//! Circuit Puzzle - terminal player
//!
//! Plays logic-circuit puzzle levels from the command line:
//! - Level browser with category unlocks
//! - Interactive play with star scoring
//! - Evaluation and layout inspection for level authors
//!
//! ## Architecture
//!
//! The binary wires settings, the level repository and the progress file
//! around the `circuit_puzzle_game` crate. All puzzle logic lives there.

mod commands;
mod error;
mod progress_store;
mod settings;
mod sink;

use circuit_puzzle_graph::Viewport;
use clap::{Parser, Subcommand};
use commands::Player;
use error::{AppError, Result};
use settings::{AppSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logic circuit puzzles in the terminal.
#[derive(Parser, Debug)]
#[command(name = "circuit-puzzle", author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file
    #[arg(long, global = true, default_value = SETTINGS_FILE_NAME)]
    settings: PathBuf,

    /// Level directory, overriding the settings file
    #[arg(long, global = true)]
    levels: Option<PathBuf>,

    /// Progress file, overriding the settings file
    #[arg(long, global = true)]
    progress: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List categories and levels with best stars.
    List,

    /// Show progress and awarded achievements.
    Progress,

    /// Evaluate a level, optionally toggling inputs first.
    Show {
        /// Level ID
        level: String,

        /// Input to toggle (can be specified multiple times).
        #[arg(short, long)]
        toggle: Vec<String>,

        /// Print the evaluated circuit as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print node positions for a canvas size.
    Layout {
        /// Level ID
        level: String,

        /// Canvas width, defaults to the settings viewport.
        #[arg(long)]
        width: Option<f32>,

        /// Canvas height, defaults to the settings viewport.
        #[arg(long)]
        height: Option<f32>,

        /// Print the layout as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Play a level interactively.
    Play {
        /// Level ID; omit together with --random for a random challenge.
        #[arg(required_unless_present = "random")]
        level: Option<String>,

        /// Play a random challenge, preferring unplayed ones.
        #[arg(long, conflicts_with = "level")]
        random: bool,
    },

    /// Write the effective settings to the settings file.
    SaveSettings,
}

fn main() {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "circuit_puzzle=debug"
    } else {
        "circuit_puzzle=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(directive.parse().unwrap_or_default());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting Circuit Puzzle v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings =
        AppSettings::load_or_default(&cli.settings).map_err(|source| AppError::Settings {
            path: cli.settings.clone(),
            source,
        })?;
    if let Some(levels) = cli.levels {
        settings.levels_dir = levels;
    }
    if let Some(progress) = cli.progress {
        settings.progress_file = progress;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::SaveSettings => {
            settings.save(&cli.settings).map_err(|source| AppError::Settings {
                path: cli.settings.clone(),
                source,
            })?;
            tracing::info!(path = %cli.settings.display(), "settings saved");
            Ok(())
        }
        Commands::List => Player::new(settings).list(&mut out),
        Commands::Progress => Player::new(settings).progress(&mut out),
        Commands::Show { level, toggle, json } => {
            Player::new(settings).show(&level, &toggle, json, &mut out)
        }
        Commands::Layout {
            level,
            width,
            height,
            json,
        } => {
            let viewport = Viewport::new(
                width.unwrap_or(settings.viewport.width),
                height.unwrap_or(settings.viewport.height),
            );
            Player::new(settings).layout(&level, viewport, json, &mut out)
        }
        Commands::Play { level, .. } => {
            let player = Player::new(settings);
            let level = match level {
                Some(id) => player.level(&id)?,
                None => match player.random_level()? {
                    Some(level) => level,
                    None => {
                        tracing::warn!("no random challenges available");
                        return Ok(());
                    }
                },
            };
            player.play(level, std::io::stdin().lock(), &mut out)
        }
    }
}
