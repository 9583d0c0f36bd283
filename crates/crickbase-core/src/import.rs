// Roster file loading (CSV or JSON).
//
// CSV files carry one player per row with lower-case headers:
// name,country,role,gender,bio,tags,matches,runs,wickets,average
// Tags inside a CSV field are separated by `;` or `,`. Numeric columns are
// parsed leniently; unparseable values become zero.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::player::{parse_average, parse_count, NewPlayer, Player, PlayerStats};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("unsupported roster format for {path} (expected .csv or .json)")]
    UnsupportedFormat { path: String },
}

// ---------------------------------------------------------------------------
// Raw CSV row
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    gender: String,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    matches: String,
    #[serde(default)]
    runs: String,
    #[serde(default)]
    wickets: String,
    #[serde(default)]
    average: String,
}

impl From<RawRosterRow> for NewPlayer {
    fn from(raw: RawRosterRow) -> Self {
        NewPlayer {
            name: raw.name,
            country: raw.country,
            role: Some(raw.role),
            gender: Some(raw.gender),
            bio: Some(raw.bio),
            tags: raw
                .tags
                .split([';', ','])
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            stats: PlayerStats {
                matches: parse_count(&raw.matches),
                runs: parse_count(&raw.runs),
                wickets: parse_count(&raw.wickets),
                average: parse_average(&raw.average),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn load_csv_from_reader<R: Read>(rdr: R) -> Result<Vec<NewPlayer>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) => {
                if let Some(player) = validated(raw.into()) {
                    players.push(player);
                }
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(players)
}

fn load_json_from_reader<R: Read>(rdr: R) -> Result<Vec<NewPlayer>, serde_json::Error> {
    let raw: Vec<NewPlayer> = serde_json::from_reader(rdr)?;
    Ok(raw.into_iter().filter_map(validated).collect())
}

fn validated(player: NewPlayer) -> Option<NewPlayer> {
    let label = player.name.trim().to_string();
    match player.normalized() {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("skipping roster entry '{}': {}", label, e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Load and validate a roster file. The format is chosen by extension.
pub fn load_roster(path: &Path) -> Result<Vec<NewPlayer>, ImportError> {
    let shown = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: shown.clone(),
        source: e,
    })?;

    let players = match extension.as_deref() {
        Some("csv") => load_csv_from_reader(file).map_err(|e| ImportError::Csv {
            path: shown.clone(),
            source: e,
        })?,
        Some("json") => load_json_from_reader(file).map_err(|e| ImportError::Json {
            path: shown.clone(),
            source: e,
        })?,
        _ => return Err(ImportError::UnsupportedFormat { path: shown }),
    };

    info!("loaded {} players from {}", players.len(), shown);
    Ok(players)
}

/// Turn loaded roster entries into an in-memory pool with ids `1..=n`.
pub fn into_pool(players: Vec<NewPlayer>) -> Vec<Player> {
    players
        .into_iter()
        .enumerate()
        .map(|(i, p)| Player {
            id: (i + 1).to_string(),
            name: p.name,
            country: p.country,
            role: p.role.unwrap_or_default(),
            gender: p.gender,
            bio: p.bio.unwrap_or_default(),
            tags: p.tags,
            stats: p.stats,
            created_at: None,
            updated_at: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
