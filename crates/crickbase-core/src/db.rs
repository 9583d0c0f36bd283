// SQLite persistence layer for player records.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};
use tracing::debug;

use crate::player::{NewPlayer, Player, PlayerStats, DEFAULT_ROLE};
use crate::query::PlayerQuery;
use crate::source::PlayerSource;

const PLAYER_COLUMNS: &str = "id, name, country, role, gender, bio, tags, matches, runs, wickets, \
                              average, created_at, updated_at";

/// SQLite-backed player store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral database (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                country    TEXT NOT NULL,
                role       TEXT NOT NULL DEFAULT 'All-rounder',
                gender     TEXT,
                bio        TEXT NOT NULL DEFAULT '',
                tags       TEXT NOT NULL DEFAULT '[]',
                matches    INTEGER NOT NULL DEFAULT 0,
                runs       INTEGER NOT NULL DEFAULT 0,
                wickets    INTEGER NOT NULL DEFAULT 0,
                average    REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert a player that has already passed [`NewPlayer::normalized`].
    pub fn insert_player(&self, player: &NewPlayer) -> Result<Player> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin insert transaction")?;
        let stored = insert_in(&tx, player, Utc::now())?;
        tx.commit().context("failed to commit player insert")?;
        Ok(stored)
    }

    /// Insert many players in a single transaction.
    pub fn import_players(&self, players: &[NewPlayer]) -> Result<Vec<Player>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;
        let now = Utc::now();
        let mut stored = Vec::with_capacity(players.len());
        for player in players {
            stored.push(insert_in(&tx, player, now)?);
        }
        tx.commit().context("failed to commit player import")?;
        debug!("imported {} players", stored.len());
        Ok(stored)
    }

    /// Look up a player by id. Ids that are not row ids yield `None`.
    pub fn get_player(&self, id: &str) -> Result<Option<Player>> {
        let Some(row_id) = parse_row_id(id) else {
            return Ok(None);
        };
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1"))
            .context("failed to prepare get_player query")?;
        let mut rows = stmt
            .query_map(params![row_id], row_to_player)
            .context("failed to query player")?;

        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read player row")?)),
            None => Ok(None),
        }
    }

    /// Persist every editable field of `player` and refresh `updated_at`.
    /// Returns the stored record, or `None` if the id does not exist.
    pub fn save_player(&self, player: &Player) -> Result<Option<Player>> {
        let Some(row_id) = parse_row_id(&player.id) else {
            return Ok(None);
        };
        let now = Utc::now();
        let tags_json = serde_json::to_string(&player.tags).context("failed to serialize tags")?;
        let changed = self
            .conn()
            .execute(
                "UPDATE players SET
                    name = ?1, country = ?2, role = ?3, gender = ?4, bio = ?5, tags = ?6,
                    matches = ?7, runs = ?8, wickets = ?9, average = ?10, updated_at = ?11
                 WHERE id = ?12",
                params![
                    player.name,
                    player.country,
                    player.role,
                    player.gender,
                    player.bio,
                    tags_json,
                    player.stats.matches,
                    player.stats.runs,
                    player.stats.wickets,
                    player.stats.average,
                    now.to_rfc3339(),
                    row_id,
                ],
            )
            .context("failed to update player")?;

        if changed == 0 {
            return Ok(None);
        }
        self.get_player(&player.id)
    }

    /// Delete a player. Returns `false` if no such player existed.
    pub fn delete_player(&self, id: &str) -> Result<bool> {
        let Some(row_id) = parse_row_id(id) else {
            return Ok(false);
        };
        let changed = self
            .conn()
            .execute("DELETE FROM players WHERE id = ?1", params![row_id])
            .context("failed to delete player")?;
        Ok(changed > 0)
    }

    /// All players in insertion order.
    pub fn all_players(&self) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY id"))
            .context("failed to prepare all_players query")?;
        let players = stmt
            .query_map([], row_to_player)
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;
        Ok(players)
    }

    /// Players whose id is in `ids`, in insertion order. Unknown and
    /// malformed ids are skipped.
    pub fn players_by_ids(&self, ids: &[String]) -> Result<Vec<Player>> {
        let row_ids: Vec<i64> = ids.iter().filter_map(|id| parse_row_id(id)).collect();
        if row_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; row_ids.len()].join(", ");
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PLAYER_COLUMNS} FROM players WHERE id IN ({placeholders}) ORDER BY id"
            ))
            .context("failed to prepare players_by_ids query")?;
        let players = stmt
            .query_map(params_from_iter(row_ids.iter()), row_to_player)
            .context("failed to query players by id")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;
        Ok(players)
    }

    /// Filter and sort the stored players.
    pub fn list_players(&self, query: &PlayerQuery) -> Result<Vec<Player>> {
        Ok(query.apply(self.all_players()?))
    }

    pub fn player_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .context("failed to count players")?;
        Ok(count as usize)
    }
}

impl PlayerSource for Database {
    fn all_players(&self) -> Result<Vec<Player>> {
        Database::all_players(self)
    }

    fn players_by_ids(&self, ids: &[String]) -> Result<Vec<Player>> {
        Database::players_by_ids(self, ids)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_row_id(id: &str) -> Option<i64> {
    id.trim().parse().ok()
}

fn insert_in(tx: &Transaction<'_>, player: &NewPlayer, now: DateTime<Utc>) -> Result<Player> {
    let tags_json = serde_json::to_string(&player.tags).context("failed to serialize tags")?;
    let role = player.role.as_deref().unwrap_or(DEFAULT_ROLE);
    let bio = player.bio.as_deref().unwrap_or("");
    let stamp = now.to_rfc3339();

    let id: i64 = tx
        .query_row(
            "INSERT INTO players
                (name, country, role, gender, bio, tags, matches, runs, wickets, average, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             RETURNING id",
            params![
                player.name,
                player.country,
                role,
                player.gender,
                bio,
                tags_json,
                player.stats.matches,
                player.stats.runs,
                player.stats.wickets,
                player.stats.average,
                stamp,
            ],
            |row| row.get(0),
        )
        .context("failed to insert player")?;

    Ok(Player {
        id: id.to_string(),
        name: player.name.clone(),
        country: player.country.clone(),
        role: role.to_string(),
        gender: player.gender.clone(),
        bio: bio.to_string(),
        tags: player.tags.clone(),
        stats: player.stats,
        created_at: Some(now),
        updated_at: Some(now),
    })
}

fn row_to_player(row: &Row<'_>) -> rusqlite::Result<Player> {
    let id: i64 = row.get(0)?;
    let tags_json: String = row.get(6)?;
    let tags = serde_json::from_str::<Vec<String>>(&tags_json).unwrap_or_default();
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;

    Ok(Player {
        id: id.to_string(),
        name: row.get(1)?,
        country: row.get(2)?,
        role: row.get(3)?,
        gender: row.get(4)?,
        bio: row.get(5)?,
        tags,
        stats: PlayerStats {
            matches: row.get(7)?,
            runs: row.get(8)?,
            wickets: row.get(9)?,
            average: row.get(10)?,
        },
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerUpdate;
    use crate::query::{SortField, SortOrder};

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn new_player(name: &str, role: &str, runs: u32, wickets: u32) -> NewPlayer {
        NewPlayer {
            name: name.into(),
            country: "India".into(),
            role: Some(role.into()),
            tags: vec!["test".into()],
            stats: PlayerStats {
                matches: 20,
                runs,
                wickets,
                average: 30.0,
            },
            ..Default::default()
        }
        .normalized()
        .unwrap()
    }

    #[test]
    fn open_creates_players_table() {
        let db = test_db();
        let conn = db.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name = 'players'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tables, vec!["players".to_string()]);
    }

    #[test]
    fn insert_then_get_round_trips_fields() {
        let db = test_db();
        let stored = db.insert_player(&new_player("Rohit Sharma", "Batsman", 10000, 8)).unwrap();
        assert_eq!(stored.id, "1");
        assert!(stored.created_at.is_some());

        let loaded = db.get_player(&stored.id).unwrap().expect("player should exist");
        assert_eq!(loaded.name, "Rohit Sharma");
        assert_eq!(loaded.role, "Batsman");
        assert_eq!(loaded.tags, vec!["test"]);
        assert_eq!(loaded.stats.runs, 10000);
        assert_eq!(loaded.created_at, stored.created_at);
    }

    #[test]
    fn get_unknown_or_malformed_id_is_none() {
        let db = test_db();
        assert!(db.get_player("99").unwrap().is_none());
        assert!(db.get_player("64f1c0ffee").unwrap().is_none());
    }

    #[test]
    fn save_player_applies_partial_update() {
        let db = test_db();
        let stored = db.insert_player(&new_player("Shubman Gill", "Batsman", 2000, 0)).unwrap();

        let mut player = stored.clone();
        PlayerUpdate {
            wickets: Some(3),
            tags: Some(vec!["opener".into()]),
            ..Default::default()
        }
        .apply_to(&mut player)
        .unwrap();

        let saved = db.save_player(&player).unwrap().expect("player should exist");
        assert_eq!(saved.stats.wickets, 3);
        assert_eq!(saved.stats.runs, 2000);
        assert_eq!(saved.tags, vec!["opener"]);
        assert!(saved.updated_at >= stored.updated_at);
    }

    #[test]
    fn save_missing_player_is_none() {
        let db = test_db();
        let ghost = Player::new("42", "Bowler", PlayerStats::default());
        assert!(db.save_player(&ghost).unwrap().is_none());
    }

    #[test]
    fn delete_removes_player() {
        let db = test_db();
        let stored = db.insert_player(&new_player("Kuldeep Yadav", "Bowler", 300, 150)).unwrap();
        assert!(db.delete_player(&stored.id).unwrap());
        assert!(!db.delete_player(&stored.id).unwrap());
        assert_eq!(db.player_count().unwrap(), 0);
    }

    #[test]
    fn players_by_ids_skips_unknown_and_keeps_insertion_order() {
        let db = test_db();
        let batch = vec![
            new_player("A", "Batsman", 100, 0),
            new_player("B", "Bowler", 10, 50),
            new_player("C", "All-rounder", 500, 20),
        ];
        db.import_players(&batch).unwrap();

        let ids = vec!["3".to_string(), "nope".to_string(), "1".to_string(), "77".to_string()];
        let found = db.players_by_ids(&ids).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        assert!(db.players_by_ids(&["x".to_string()]).unwrap().is_empty());
    }

    #[test]
    fn list_players_applies_query() {
        let db = test_db();
        db.import_players(&[
            new_player("A", "Batsman", 100, 0),
            new_player("B", "Bowler", 10, 50),
            new_player("C", "All-rounder", 500, 20),
        ])
        .unwrap();

        let query = PlayerQuery {
            sort_by: SortField::Wickets,
            sort_order: SortOrder::Desc,
            role: Some("o".into()),
            ..Default::default()
        };
        let names: Vec<String> = db
            .list_players(&query)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn source_trait_resolves_through_database() {
        let db = test_db();
        db.insert_player(&new_player("A", "Batsman", 100, 0)).unwrap();
        let source: &dyn PlayerSource = &db;
        assert_eq!(source.all_players().unwrap().len(), 1);
        assert_eq!(source.players_by_ids(&["1".into()]).unwrap().len(), 1);
    }
}
