// Player management: validated create, partial update, delete, lookup,
// listing and bulk roster import over the SQLite store.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crickbase_core::db::Database;
use crickbase_core::import::{load_roster, ImportError};
use crickbase_core::player::{NewPlayer, Player, PlayerError, PlayerUpdate};
use crickbase_core::query::PlayerQuery;

#[derive(Debug, Error)]
pub enum PlayerServiceError {
    /// Bad input or an unknown id. Surfaces to the user as-is.
    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("player store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl PlayerServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlayerServiceError::Player(PlayerError::NotFound { .. }))
    }
}

type Result<T> = std::result::Result<T, PlayerServiceError>;

/// Validate and store a new player.
pub fn create_player(db: &Database, input: NewPlayer) -> Result<Player> {
    let input = input.normalized()?;
    let player = db.insert_player(&input)?;
    info!("created player {} ({})", player.id, player.name);
    Ok(player)
}

pub fn get_player(db: &Database, id: &str) -> Result<Player> {
    db.get_player(id)?.ok_or_else(|| not_found(id))
}

/// Apply a partial update. Fields absent from `update` keep their values.
pub fn update_player(db: &Database, id: &str, update: &PlayerUpdate) -> Result<Player> {
    let mut player = get_player(db, id)?;
    update.apply_to(&mut player)?;
    let saved = db.save_player(&player)?.ok_or_else(|| not_found(id))?;
    info!("updated player {}", saved.id);
    Ok(saved)
}

pub fn delete_player(db: &Database, id: &str) -> Result<()> {
    if !db.delete_player(id)? {
        return Err(not_found(id));
    }
    info!("deleted player {}", id);
    Ok(())
}

pub fn list_players(db: &Database, query: &PlayerQuery) -> Result<Vec<Player>> {
    Ok(db.list_players(query)?)
}

/// Load a CSV or JSON roster and store every valid entry in one transaction.
pub fn import_roster(db: &Database, path: &Path) -> Result<Vec<Player>> {
    let roster = load_roster(path)?;
    let stored = db.import_players(&roster)?;
    info!("imported {} players from {}", stored.len(), path.display());
    Ok(stored)
}

fn not_found(id: &str) -> PlayerServiceError {
    PlayerError::NotFound { id: id.to_string() }.into()
}
