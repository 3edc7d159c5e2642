//! Strictly Chess Arena - Unified CLI
//!
//! Interactive chess against an engine or an LLM, plus the leaderboard.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use std::sync::Arc;
use strictly_chess_arena::{
    ArenaConfig, BackendKind, Command as GameCommand, GameEvent, GameSession, LlmClient,
    LlmOpponent, MemoryReporter, OpponentBackend, OpponentMoveResolver, Orchestrator,
    PlayerProfile, ResultReporter, SqliteReporter, UciEngine,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_chess=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(db_path) = cli.db_path {
        config = config.with_database(db_path);
    }

    match cli.command {
        Command::Play {
            name,
            backend,
            style,
            side,
            seed,
        } => {
            if let Some(name) = name {
                config = config.with_player_name(ArenaConfig::checked_player_name(&name)?);
            }
            if let Some(backend) = backend {
                config = config.with_backend(backend);
            }
            if let Some(style) = style {
                config = config.with_style(style);
            }
            if let Some(side) = side {
                config = config.with_human_side(side);
            }
            if let Some(seed) = seed {
                let resolver = config.resolver().clone().with_seed(seed);
                config = config.with_resolver(resolver);
            }
            play(config).await
        }
        Command::Leaderboard { limit } => show_leaderboard(&config, limit).await,
    }
}

/// Loads the config file, or defaults if it does not exist.
#[instrument]
fn load_config(path: &Path) -> Result<ArenaConfig> {
    if path.exists() {
        Ok(ArenaConfig::from_file(path)?)
    } else {
        debug!("No config file, using defaults");
        Ok(ArenaConfig::default())
    }
}

fn open_reporter(config: &ArenaConfig) -> Result<Arc<dyn ResultReporter>> {
    match config.database() {
        Some(path) => {
            let reporter = SqliteReporter::open(path.to_string_lossy())
                .with_context(|| format!("opening leaderboard at {}", path.display()))?;
            Ok(Arc::new(reporter))
        }
        None => {
            info!("No database configured, leaderboard kept in memory");
            Ok(Arc::new(MemoryReporter::new()))
        }
    }
}

fn build_resolver(config: &ArenaConfig) -> Result<OpponentMoveResolver> {
    let backend = match config.backend() {
        BackendKind::Llm => OpponentBackend::Generative {
            client: Box::new(LlmOpponent::new(LlmClient::new(config.llm_config()?))),
        },
        BackendKind::Engine => OpponentBackend::Engine {
            client: Box::new(UciEngine::spawn(config.engine().command())?),
            depth: *config.engine().depth(),
        },
    };
    let resolver = OpponentMoveResolver::new(backend, config.retry_policy());
    Ok(match config.resolver().seed() {
        Some(seed) => resolver.with_seed(*seed),
        None => resolver,
    })
}

#[instrument(skip(config), fields(player = %config.player_name(), backend = %config.backend()))]
async fn play(config: ArenaConfig) -> Result<()> {
    let reporter = open_reporter(&config)?;
    let resolver = build_resolver(&config)?;
    let session = GameSession::standard(
        PlayerProfile::new(config.player_name().clone()),
        *config.style(),
        *config.human_side(),
    );

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let orchestrator = Orchestrator::new(session, resolver, reporter, event_tx);
    let game = tokio::spawn(orchestrator.run(command_rx));
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    println!("Commands: <move> (e.g. e2e4, e7e8q), moves, reset, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.trim() {
            "" => continue,
            "quit" | "exit" => GameCommand::Quit,
            "reset" => GameCommand::Reset,
            "moves" => GameCommand::Moves,
            other => GameCommand::Move(other.to_string()),
        };
        let quitting = command == GameCommand::Quit;
        if command_tx.send(command).is_err() || quitting {
            break;
        }
    }
    drop(command_tx);

    let session = game.await??;
    printer.await?;
    info!(plies = session.machine().history().len(), "Session ended");
    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::Started {
            position,
            human,
            generation,
        } => {
            println!("New game #{} - you play {}.", generation + 1, human);
            println!("FEN: {}", position);
        }
        GameEvent::HumanMoved(record) => {
            println!("{}", record);
            println!("FEN: {}", record.position());
        }
        GameEvent::MoveRejected { input, error } => println!("Rejected '{}': {}", input, error),
        GameEvent::OpponentThinking { .. } => println!("Opponent is thinking..."),
        GameEvent::OpponentMoved { record, resolution } => {
            if resolution.is_fallback() {
                println!(
                    "{} (random legal move after {} failed attempts)",
                    record,
                    resolution.attempts()
                );
            } else {
                println!("{}", record);
            }
            println!("FEN: {}", record.position());
        }
        GameEvent::LegalMoves(moves) => println!("Legal moves: {}", moves.join(" ")),
        GameEvent::GameOver(outcome) => println!("Game over: {}", outcome),
        GameEvent::ResultSaved(entry) => {
            println!(
                "Leaderboard: {} games, {} wins, {} losses, {} draws",
                entry.games(),
                entry.wins(),
                entry.losses(),
                entry.draws()
            );
        }
        GameEvent::PersistenceFailed(error) => println!("Could not save result: {}", error),
    }
}

#[instrument(skip(config))]
async fn show_leaderboard(config: &ArenaConfig, limit: usize) -> Result<()> {
    let reporter = open_reporter(config)?;
    let entries = tokio::task::spawn_blocking(move || reporter.top_by_wins(limit)).await??;

    println!(
        "{:<20} {:>5} {:>5} {:>5} {:>5}  {}",
        "name", "games", "wins", "loss", "draw", "style"
    );
    for entry in &entries {
        println!("{}", entry);
    }
    if entries.is_empty() {
        println!("(no games recorded)");
    }
    Ok(())
}
