// Selection parameters: match format, pitch, strategy, locks and lineup size.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crickbase_core::config::PredictorDefaults;

/// Lineup size used when nothing else is configured.
pub const DEFAULT_MAX_XI: i64 = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParamError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Format {
    #[serde(rename = "Test")]
    Test,
    #[default]
    #[serde(rename = "ODI")]
    Odi,
    #[serde(rename = "T20")]
    T20,
}

impl FromStr for Format {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TEST" => Ok(Format::Test),
            "ODI" => Ok(Format::Odi),
            "T20" => Ok(Format::T20),
            _ => Err(ParamError {
                kind: "format",
                value: s.to_string(),
                expected: "Test, ODI, T20",
            }),
        }
    }
}

/// Unrecognised formats behave like the default (no adjustment).
impl From<String> for Format {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Test => "Test",
            Format::Odi => "ODI",
            Format::T20 => "T20",
        })
    }
}

// ---------------------------------------------------------------------------
// Pitch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Pitch {
    #[default]
    Balanced,
    Flat,
    Pace,
    Spin,
}

impl FromStr for Pitch {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "balanced" => Ok(Pitch::Balanced),
            "flat" => Ok(Pitch::Flat),
            "pace" => Ok(Pitch::Pace),
            "spin" => Ok(Pitch::Spin),
            _ => Err(ParamError {
                kind: "pitch",
                value: s.to_string(),
                expected: "balanced, flat, pace, spin",
            }),
        }
    }
}

impl From<String> for Pitch {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pitch::Balanced => "balanced",
            Pitch::Flat => "flat",
            Pitch::Pace => "pace",
            Pitch::Spin => "spin",
        })
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Balanced,
    BatHeavy,
    BowlHeavy,
}

impl FromStr for Strategy {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "balanced" => Ok(Strategy::Balanced),
            "bat-heavy" => Ok(Strategy::BatHeavy),
            "bowl-heavy" => Ok(Strategy::BowlHeavy),
            _ => Err(ParamError {
                kind: "strategy",
                value: s.to_string(),
                expected: "balanced, bat-heavy, bowl-heavy",
            }),
        }
    }
}

impl From<String> for Strategy {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Balanced => "balanced",
            Strategy::BatHeavy => "bat-heavy",
            Strategy::BowlHeavy => "bowl-heavy",
        })
    }
}

// ---------------------------------------------------------------------------
// SelectionParams
// ---------------------------------------------------------------------------

/// Per-request inputs to [`crate::selection::select_team`].
///
/// `max_xi` is signed: zero or negative sizes are accepted and produce an
/// empty lineup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionParams {
    pub format: Format,
    pub pitch: Pitch,
    pub strategy: Strategy,
    pub locks: Vec<String>,
    pub max_xi: i64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        SelectionParams {
            format: Format::default(),
            pitch: Pitch::default(),
            strategy: Strategy::default(),
            locks: Vec::new(),
            max_xi: DEFAULT_MAX_XI,
        }
    }
}

impl SelectionParams {
    /// Parameters seeded from the configured predictor defaults. Values the
    /// config spells wrongly fall back to the built-in defaults.
    pub fn from_defaults(defaults: &PredictorDefaults) -> Self {
        SelectionParams {
            format: defaults.format.clone().into(),
            pitch: defaults.pitch.clone().into(),
            strategy: defaults.strategy.clone().into(),
            locks: Vec::new(),
            max_xi: defaults.max_xi,
        }
    }
}
