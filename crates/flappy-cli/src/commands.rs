//! Subcommand implementations. Each returns data; `main` decides how to print it.

use anyhow::{bail, Context, Result};
use flappy_core::{
    primary_type_color, CharacterEntry, FlappyApi, LoadState, PersistenceStore, PlayerSelection,
    ScoreRecord, SelectionCommand, SelectionOutcome,
};
use serde::Serialize;
use tracing::{debug, info};

/// Which character `select` should commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    Index(usize),
}

/// One row of the `characters` listing.
#[derive(Debug, Serialize)]
pub struct CharacterRow {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub types: String,
    pub height_m: f64,
    pub weight_kg: f64,
    /// `#rrggbb` badge colour of the primary type.
    pub color: String,
    pub sprite_url: Option<String>,
}

impl CharacterRow {
    fn new(index: usize, entry: &CharacterEntry) -> Self {
        let (r, g, b) = primary_type_color(&entry.type_tags);
        Self {
            index,
            id: entry.id.clone(),
            name: entry.display_name.clone(),
            types: entry.type_label(),
            height_m: entry.height_m,
            weight_kg: entry.weight_kg,
            color: format!("#{:02x}{:02x}{:02x}", r, g, b),
            sprite_url: entry.sprite_url().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectionReport {
    pub username: String,
    pub sprite_path: String,
    pub display_name: String,
    pub persisted: bool,
}

#[derive(Debug, Serialize)]
pub struct GameReport {
    pub username: String,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
}

pub fn characters(api: &FlappyApi, limit: usize) -> Vec<CharacterRow> {
    api.resolver()
        .resolve_list(limit)
        .iter()
        .enumerate()
        .map(|(index, entry)| CharacterRow::new(index, entry))
        .collect()
}

/// Run the selection flow non-interactively: page to `target`, then select.
pub fn select(api: &FlappyApi, username: &str, target: &Target) -> Result<SelectionReport> {
    let mut flow = api.selection(username);
    if flow.enter() != LoadState::Ready {
        bail!(
            "Character list could not be loaded: {}",
            flow.session().last_error().unwrap_or("unknown error")
        );
    }

    let wanted = {
        let names: Vec<&str> = flow
            .entries()
            .iter()
            .map(|c| c.entry.display_name.as_str())
            .collect();
        resolve_target(&names, target)?
    };

    while flow.current_index() != wanted {
        flow.handle(SelectionCommand::Next);
    }
    debug!("Paged to {}", flow.page_label());

    match flow.handle(SelectionCommand::Select) {
        SelectionOutcome::Completed(choice) => Ok(SelectionReport {
            username: username.to_string(),
            sprite_path: choice.sprite_path,
            display_name: choice.display_name,
            persisted: choice.persisted,
        }),
        other => bail!("Selection did not complete: {:?}", other),
    }
}

fn resolve_target(names: &[&str], target: &Target) -> Result<usize> {
    match target {
        Target::Index(index) if *index < names.len() => Ok(*index),
        Target::Index(index) => bail!(
            "Index {} is out of range, {} characters available",
            index,
            names.len()
        ),
        Target::Name(name) => names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .with_context(|| format!("No character named {}", name)),
    }
}

pub fn current_selection(api: &FlappyApi, username: &str) -> Result<PlayerSelection> {
    Ok(api.store().get_selection(username)?)
}

/// Record a finished game: one history row, and a new high score if beaten.
pub fn record_game(api: &FlappyApi, username: &str, score: u32) -> Result<GameReport> {
    let mut stats = api.statistics(username)?;
    stats.add_points(score);

    let new_high_score = stats.update_high_score()?;
    if !new_high_score {
        stats.save_score()?;
    }
    info!("Recorded score {} for {}", score, username);

    Ok(GameReport {
        username: username.to_string(),
        score,
        high_score: stats.high_score(),
        new_high_score,
    })
}

pub fn high_score(api: &FlappyApi, username: &str) -> Result<u32> {
    Ok(api.store().get_high_score(username)?)
}

pub fn history(api: &FlappyApi, username: &str, limit: usize) -> Result<Vec<ScoreRecord>> {
    Ok(api.store().score_history(username, limit)?)
}
