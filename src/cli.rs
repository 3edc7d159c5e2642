//! Command-line interface for strictly_chess_arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_chess::Side;
use strictly_chess_arena::{BackendKind, Style};

/// Strictly Chess Arena - play chess against an engine or an LLM
#[derive(Parser, Debug)]
#[command(name = "strictly_chess_arena")]
#[command(about = "Human vs. engine or LLM chess with a persistent leaderboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the arena config file (defaults apply if it does not exist)
    #[arg(short, long, global = true, default_value = "arena.toml")]
    pub config: PathBuf,

    /// SQLite database for the leaderboard (overrides the config file)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game on stdin/stdout
    Play {
        /// Player name recorded on the leaderboard
        #[arg(short, long)]
        name: Option<String>,

        /// Opponent backend: llm ("easy") or engine ("hard")
        #[arg(short, long)]
        backend: Option<BackendKind>,

        /// Opponent style: balanced, aggressive, defensive or chaotic
        #[arg(short, long)]
        style: Option<Style>,

        /// Side the human plays
        #[arg(long)]
        side: Option<Side>,

        /// Seed for the fallback move picker
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the leaderboard
    Leaderboard {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}
