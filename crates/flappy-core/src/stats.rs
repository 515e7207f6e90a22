//! Per-run game statistics bound to one player.

use crate::config::GameConfig;
use crate::error::{FlappyError, Result};
use crate::store::PersistenceStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Score, level, lives and high score for the running game.
///
/// Created unbound; [`GameStatistics::init`] attaches a store and a username
/// once and loads the persisted high score. Every later persistence call
/// goes to that binding.
pub struct GameStatistics {
    binding: Option<(Arc<dyn PersistenceStore>, String)>,
    score: u32,
    level: u32,
    life: u32,
    high_score: u32,
    sound_enabled: bool,
}

impl Default for GameStatistics {
    fn default() -> Self {
        Self {
            binding: None,
            score: 0,
            level: GameConfig::STARTING_LEVEL,
            life: GameConfig::STARTING_LIFE,
            high_score: 0,
            sound_enabled: true,
        }
    }
}

impl std::fmt::Debug for GameStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStatistics")
            .field("username", &self.username())
            .field("score", &self.score)
            .field("level", &self.level)
            .field("life", &self.life)
            .field("high_score", &self.high_score)
            .field("sound_enabled", &self.sound_enabled)
            .finish()
    }
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `store` for `username` and load the high score.
    ///
    /// Only the first successful call binds; later calls are no-ops. A failed
    /// read leaves the statistics unbound so the call can be retried.
    pub fn init(&mut self, store: Arc<dyn PersistenceStore>, username: &str) -> Result<()> {
        if let Some((_, bound)) = &self.binding {
            debug!("Statistics already bound to {}, ignoring init for {}", bound, username);
            return Ok(());
        }

        self.high_score = store.get_high_score(username)?;
        self.binding = Some((store, username.to_string()));
        info!("Statistics bound to {} (high score {})", username, self.high_score);
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.binding.as_ref().map(|(_, name)| name.as_str())
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn life(&self) -> u32 {
        self.life
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn is_game_over(&self) -> bool {
        self.life == 0
    }

    fn bound_store(&self) -> Result<(&Arc<dyn PersistenceStore>, &str)> {
        self.binding
            .as_ref()
            .map(|(store, name)| (store, name.as_str()))
            .ok_or_else(|| FlappyError::Config {
                message: "game statistics used before init".to_string(),
            })
    }

    pub fn add_points(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Lose one life; returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.life = self.life.saturating_sub(1);
        self.life
    }

    pub fn level_up(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    /// Back to the starting score, level and lives. The high score and the
    /// binding stay.
    pub fn reset_game(&mut self) {
        self.score = 0;
        self.level = GameConfig::STARTING_LEVEL;
        self.life = GameConfig::STARTING_LIFE;
    }

    /// Record the current score when it beats the high score.
    ///
    /// Each crossing appends one history row, so a run that keeps improving
    /// leaves several rows; the high score stays the maximum either way.
    /// Returns whether a new high score was set. The in-memory high score
    /// only moves once the row is stored.
    pub fn update_high_score(&mut self) -> Result<bool> {
        if self.score <= self.high_score {
            return Ok(false);
        }
        let (store, username) = self.bound_store()?;
        store.record_score(username, self.score)?;
        debug!("New high score {} for {}", self.score, username);
        self.high_score = self.score;
        Ok(true)
    }

    /// Append the current score to the history unconditionally.
    ///
    /// Meant for the end of a game; returns the new row id.
    pub fn save_score(&mut self) -> Result<i64> {
        let (store, username) = self.bound_store()?;
        let id = store.record_score(username, self.score)?;
        info!("Saved score {} for {}", self.score, username);
        self.high_score = self.high_score.max(self.score);
        Ok(id)
    }
}
