//! Flappy CLI - inspect and drive character selection and scores from a shell.
//!
//! Results go to stdout (human-readable, or JSON with `--json`); logs go to
//! stderr.

mod commands;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use commands::Target;
use flappy_core::{FlappyApi, GameConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "flappy")]
#[command(about = "Character selection and score tools for Flappy Bird")]
struct Args {
    /// Data directory holding assets/ and the score database
    /// (defaults to the platform data directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Player name
    #[arg(short, long, default_value = GameConfig::DEFAULT_USERNAME)]
    username: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List selectable characters, fetching and caching them if needed
    Characters {
        /// Number of catalog characters (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Select a character by name or position
    Select {
        /// Display name, case-insensitive
        #[arg(long, conflicts_with = "index")]
        name: Option<String>,

        /// Zero-based position in the character list
        #[arg(long)]
        index: Option<usize>,
    },
    /// Show the stored selection
    Selection,
    /// Record the score of a finished game
    Score { score: u32 },
    /// Show the best recorded score
    HighScore,
    /// Show recent scores, newest first
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("flappy"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let base_dir = args.base_dir.unwrap_or_else(default_base_dir);
    debug!("Base directory: {}", base_dir.display());

    let api = FlappyApi::builder(&base_dir).auto_create_dirs(true).build()?;
    let username = args.username.as_str();

    match args.command {
        Command::Characters { limit } => {
            let limit = limit.unwrap_or(api.config().character_limit);
            let rows = commands::characters(&api, limit);
            emit(args.json, &rows, |rows| {
                for row in rows {
                    println!(
                        "{:>3}  {:<16} {:<18} {:>5.1} m {:>6.1} kg  {}",
                        row.index, row.name, row.types, row.height_m, row.weight_kg, row.color
                    );
                }
            })?;
        }
        Command::Select { name, index } => {
            let target = match (name, index) {
                (Some(name), _) => Target::Name(name),
                (None, Some(index)) => Target::Index(index),
                (None, None) => bail!("Pass --name or --index"),
            };
            let report = commands::select(&api, username, &target)?;
            emit(args.json, &report, |r| {
                println!("{} now plays as {} ({})", r.username, r.display_name, r.sprite_path);
                if !r.persisted {
                    println!("warning: the choice could not be saved");
                }
            })?;
        }
        Command::Selection => {
            let selection = commands::current_selection(&api, username)?;
            emit(args.json, &selection, |s| {
                println!("{} ({})", s.display_name, s.sprite_id);
            })?;
        }
        Command::Score { score } => {
            let report = commands::record_game(&api, username, score)?;
            emit(args.json, &report, |r| {
                if r.new_high_score {
                    println!("New high score for {}: {}", r.username, r.score);
                } else {
                    println!("Scored {} (high score {})", r.score, r.high_score);
                }
            })?;
        }
        Command::HighScore => {
            let high_score = commands::high_score(&api, username)?;
            emit(args.json, &high_score, |h| println!("{}", h))?;
        }
        Command::History { limit } => {
            let records = commands::history(&api, username, limit)?;
            emit(args.json, &records, |records| {
                for record in records {
                    println!("{:>6}  {}", record.score, record.recorded_at);
                }
            })?;
        }
    }

    Ok(())
}
