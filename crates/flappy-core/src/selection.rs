//! Character selection flow.
//!
//! ```text
//! Loading --enter ok--> Ready
//! Loading --failure---> Error
//! any state --back----> exit (nothing persisted)
//! ```
//!
//! `next`, `previous` and `select` are only honored in `Ready`.

use crate::assets::{AssetSource, Sprite, SpriteSize};
use crate::error::Result;
use crate::models::{with_builtin_first, CharacterEntry};
use crate::store::PersistenceStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Load state of a selection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Error,
}

/// User input understood by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCommand {
    Next,
    Previous,
    Select,
    Back,
}

/// Result of handling a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Command applied; the session continues.
    Stay,
    /// Command not valid in the current state; nothing changed.
    Rejected,
    /// A character was chosen; the session is complete.
    Completed(Selection),
    /// The user left; the caller picks the next screen.
    Exited,
}

/// A committed choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub sprite_path: String,
    pub display_name: String,
    /// False when the store write failed; the choice still holds for this session.
    pub persisted: bool,
}

/// A character together with its sprite, ready to display.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCharacter {
    pub entry: CharacterEntry,
    pub sprite: Sprite,
}

/// Transient state of one selection flow.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    entries: Vec<ResolvedCharacter>,
    current_index: usize,
    load_state: LoadState,
    last_error: Option<String>,
}

impl SelectionSession {
    fn loading() -> Self {
        Self {
            entries: Vec::new(),
            current_index: 0,
            load_state: LoadState::Loading,
            last_error: None,
        }
    }

    pub fn entries(&self) -> &[ResolvedCharacter] {
        &self.entries
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Message of the failure that put the session in `Error`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Drives loading, paging and committing a character choice for one user.
pub struct SelectionStateMachine {
    username: String,
    limit: usize,
    assets: Arc<dyn AssetSource>,
    store: Arc<dyn PersistenceStore>,
    session: SelectionSession,
}

impl SelectionStateMachine {
    pub fn new(
        username: impl Into<String>,
        limit: usize,
        assets: Arc<dyn AssetSource>,
        store: Arc<dyn PersistenceStore>,
    ) -> Self {
        Self {
            username: username.into(),
            limit,
            assets,
            store,
            session: SelectionSession::loading(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn state(&self) -> LoadState {
        self.session.load_state
    }

    pub fn entries(&self) -> &[ResolvedCharacter] {
        &self.session.entries
    }

    pub fn current_index(&self) -> usize {
        self.session.current_index
    }

    /// Character under the cursor, once loading has produced entries.
    pub fn current(&self) -> Option<&ResolvedCharacter> {
        self.session.entries.get(self.session.current_index)
    }

    /// One-based position, e.g. `3/21`.
    pub fn page_label(&self) -> String {
        if self.session.entries.is_empty() {
            return "0/0".to_string();
        }
        format!(
            "{}/{}",
            self.session.current_index + 1,
            self.session.entries.len()
        )
    }

    /// Load the list and every sprite, then position the cursor on the
    /// user's stored choice.
    ///
    /// Runs to completion before returning. Whatever was resolved before a
    /// failure is kept, so the built-in character is always available.
    pub fn enter(&mut self) -> LoadState {
        self.session = SelectionSession::loading();

        let default_sprite = self.assets.default_sprite();
        let size = default_sprite.size();
        let mut resolved = vec![ResolvedCharacter {
            entry: CharacterEntry::builtin(),
            sprite: default_sprite,
        }];

        let state = match self.load_into(&mut resolved, size) {
            Ok(()) => LoadState::Ready,
            Err(e) => {
                error!(
                    "Character selection failed to load after {} entries: {}",
                    resolved.len(),
                    e
                );
                self.session.last_error = Some(e.to_string());
                LoadState::Error
            }
        };

        self.session.entries = resolved;
        self.session.current_index = self.initial_index();
        self.session.load_state = state;
        info!(
            "Character selection {:?} with {} entries for {}",
            state,
            self.session.entries.len(),
            self.username
        );
        state
    }

    fn load_into(&self, resolved: &mut Vec<ResolvedCharacter>, size: SpriteSize) -> Result<()> {
        let entries = self.assets.resolve_list(self.limit)?;
        // Index 0 is the built-in entry, already resolved.
        for entry in with_builtin_first(entries).into_iter().skip(1) {
            let sprite = self.assets.resolve_sprite(&entry.id, size)?;
            resolved.push(ResolvedCharacter { entry, sprite });
        }
        Ok(())
    }

    fn initial_index(&self) -> usize {
        let stored = match self.store.get_selection(&self.username) {
            Ok(selection) => selection,
            Err(e) => {
                warn!("Could not read saved selection for {}: {}", self.username, e);
                return 0;
            }
        };
        self.session
            .entries
            .iter()
            .position(|c| c.entry.display_name == stored.display_name)
            .unwrap_or(0)
    }

    /// Move to the next character, wrapping to the first.
    pub fn next(&mut self) -> bool {
        self.step(1)
    }

    /// Move to the previous character, wrapping to the last.
    pub fn previous(&mut self) -> bool {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> bool {
        if self.session.load_state != LoadState::Ready || self.session.entries.is_empty() {
            debug!("Ignoring navigation in {:?} state", self.session.load_state);
            return false;
        }
        let len = self.session.entries.len() as isize;
        let index = self.session.current_index as isize;
        self.session.current_index = (index + delta).rem_euclid(len) as usize;
        true
    }

    /// Commit the character under the cursor.
    ///
    /// `None` outside `Ready`. A failed store write is logged and reported
    /// through [`Selection::persisted`] rather than as an error.
    pub fn select(&mut self) -> Option<Selection> {
        if self.session.load_state != LoadState::Ready {
            debug!("Ignoring select in {:?} state", self.session.load_state);
            return None;
        }
        let entry = &self.current()?.entry;
        let sprite_path = entry.storage_path();
        let display_name = entry.display_name.clone();

        let persisted = match self
            .store
            .set_selection(&self.username, &sprite_path, &display_name)
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Could not save selection {} for {}: {}",
                    display_name, self.username, e
                );
                false
            }
        };
        info!("{} selected {}", self.username, display_name);

        Some(Selection {
            sprite_path,
            display_name,
            persisted,
        })
    }

    /// Leave the flow. Valid in every state and never writes to the store.
    pub fn back(&mut self) -> SelectionOutcome {
        debug!("Leaving character selection in {:?} state", self.session.load_state);
        SelectionOutcome::Exited
    }

    pub fn handle(&mut self, command: SelectionCommand) -> SelectionOutcome {
        match command {
            SelectionCommand::Back => self.back(),
            SelectionCommand::Next if self.next() => SelectionOutcome::Stay,
            SelectionCommand::Previous if self.previous() => SelectionOutcome::Stay,
            SelectionCommand::Select => match self.select() {
                Some(selection) => SelectionOutcome::Completed(selection),
                None => SelectionOutcome::Rejected,
            },
            SelectionCommand::Next | SelectionCommand::Previous => SelectionOutcome::Rejected,
        }
    }
}
