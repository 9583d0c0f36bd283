// Player records, role/tag matching and input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Roles a stored player may carry.
pub const ALLOWED_ROLES: &[&str] = &[
    "Batsman",
    "Bowler",
    "All-rounder",
    "Wicket-keeper",
    "Wicket-keeper Batsman",
];

/// Role assigned when a new player is created without one.
pub const DEFAULT_ROLE: &str = "All-rounder";

pub const ALLOWED_GENDERS: &[&str] = &["Male", "Female", "Other"];

/// Lower-case role categories matched as substrings of a player's role text.
pub const KEEPER_CATEGORY: &str = "wicket-keeper";
pub const BATSMAN_CATEGORY: &str = "batsman";
pub const BOWLER_CATEGORY: &str = "bowler";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum PlayerError {
    #[error("`{field}` is required")]
    MissingField { field: &'static str },

    #[error("`{value}` is not a valid role (expected one of: {})", ALLOWED_ROLES.join(", "))]
    InvalidRole { value: String },

    #[error("`{value}` is not a valid gender (expected one of: {})", ALLOWED_GENDERS.join(", "))]
    InvalidGender { value: String },

    #[error("player not found: {id}")]
    NotFound { id: String },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Career statistics. Every field defaults to zero when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    #[serde(deserialize_with = "count_from_number_or_text")]
    pub matches: u32,
    #[serde(deserialize_with = "count_from_number_or_text")]
    pub runs: u32,
    #[serde(deserialize_with = "count_from_number_or_text")]
    pub wickets: u32,
    #[serde(deserialize_with = "average_from_number_or_text")]
    pub average: f64,
}

/// A stored player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: PlayerStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Bare player with just an id, role and stats. Handy for building pools.
    pub fn new(id: impl Into<String>, role: impl Into<String>, stats: PlayerStats) -> Self {
        Player {
            id: id.into(),
            name: String::new(),
            country: String::new(),
            role: role.into(),
            gender: None,
            bio: String::new(),
            tags: Vec::new(),
            stats,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn role_match(&self) -> RoleMatch {
        RoleMatch::of(&self.role)
    }

    /// Case-insensitive substring match of `needle` against any tag.
    pub fn has_tag(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

// ---------------------------------------------------------------------------
// Role matching
// ---------------------------------------------------------------------------

/// Role bucket a player is counted under. Decided by priority:
/// keeper, then batsman, then bowler, otherwise all-rounder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleClass {
    WicketKeeper,
    Batsman,
    Bowler,
    AllRounder,
}

/// Independent substring matches of a role string against each category.
///
/// A role such as "Wicket-keeper Batsman" matches both `keeper` and
/// `batsman`. Callers that need a single bucket use [`RoleMatch::primary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleMatch {
    pub keeper: bool,
    pub batsman: bool,
    pub bowler: bool,
}

impl RoleMatch {
    pub fn of(role: &str) -> Self {
        let role = role.to_lowercase();
        RoleMatch {
            keeper: role.contains(KEEPER_CATEGORY),
            batsman: role.contains(BATSMAN_CATEGORY),
            bowler: role.contains(BOWLER_CATEGORY),
        }
    }

    pub fn is_all_rounder(&self) -> bool {
        !self.keeper && !self.batsman && !self.bowler
    }

    pub fn primary(&self) -> RoleClass {
        if self.keeper {
            RoleClass::WicketKeeper
        } else if self.batsman {
            RoleClass::Batsman
        } else if self.bowler {
            RoleClass::Bowler
        } else {
            RoleClass::AllRounder
        }
    }
}

// ---------------------------------------------------------------------------
// Create / update inputs
// ---------------------------------------------------------------------------

/// Input for creating a player.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlayer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "tags_from_list_or_text")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: PlayerStats,
}

impl NewPlayer {
    /// Trim text fields, apply the default role and check enumerated fields.
    pub fn normalized(self) -> Result<NewPlayer, PlayerError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(PlayerError::MissingField { field: "name" });
        }
        let country = self.country.trim().to_string();
        if country.is_empty() {
            return Err(PlayerError::MissingField { field: "country" });
        }

        let role = match non_blank(self.role) {
            Some(role) => validate_role(&role)?,
            None => DEFAULT_ROLE.to_string(),
        };
        let gender = non_blank(self.gender)
            .map(|g| validate_gender(&g))
            .transpose()?;

        Ok(NewPlayer {
            name,
            country,
            role: Some(role),
            gender,
            bio: Some(self.bio.unwrap_or_default().trim().to_string()),
            tags: clean_tags(self.tags),
            stats: self.stats,
        })
    }
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub country: Option<String>,
    pub role: Option<String>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "optional_tags_from_list_or_text")]
    pub tags: Option<Vec<String>>,
    pub matches: Option<u32>,
    pub runs: Option<u32>,
    pub wickets: Option<u32>,
    pub average: Option<f64>,
}

impl PlayerUpdate {
    /// Apply this update to `player` in place. Blank names and countries are
    /// ignored; role and gender are validated when present.
    pub fn apply_to(&self, player: &mut Player) -> Result<(), PlayerError> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            player.name = name.to_string();
        }
        if let Some(country) = self.country.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            player.country = country.to_string();
        }
        if let Some(role) = &self.role {
            player.role = validate_role(role.trim())?;
        }
        if let Some(gender) = &self.gender {
            player.gender = match gender.trim() {
                "" => None,
                g => Some(validate_gender(g)?),
            };
        }
        if let Some(bio) = &self.bio {
            player.bio = bio.trim().to_string();
        }
        if let Some(tags) = &self.tags {
            player.tags = clean_tags(tags.clone());
        }
        if let Some(matches) = self.matches {
            player.stats.matches = matches;
        }
        if let Some(runs) = self.runs {
            player.stats.runs = runs;
        }
        if let Some(wickets) = self.wickets {
            player.stats.wickets = wickets;
        }
        if let Some(average) = self.average {
            player.stats.average = average;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_role(role: &str) -> Result<String, PlayerError> {
    ALLOWED_ROLES
        .iter()
        .find(|r| **r == role)
        .map(|r| r.to_string())
        .ok_or_else(|| PlayerError::InvalidRole {
            value: role.to_string(),
        })
}

fn validate_gender(gender: &str) -> Result<String, PlayerError> {
    ALLOWED_GENDERS
        .iter()
        .find(|g| **g == gender)
        .map(|g| g.to_string())
        .ok_or_else(|| PlayerError::InvalidGender {
            value: gender.to_string(),
        })
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split a comma-separated tag string, trimming and dropping empty entries.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the leading integer of `text`, treating anything unparseable or
/// negative as zero (`"42 runs"` -> 42, `"3.9"` -> 3, `"abc"` -> 0).
pub fn parse_count(text: &str) -> u32 {
    let text = text.trim();
    let digits: String = text
        .strip_prefix('+')
        .unwrap_or(text)
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Parse the leading decimal number of `text`, falling back to zero.
pub fn parse_average(text: &str) -> f64 {
    let text = text.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
    }
    let value = text[..end].parse::<f64>().unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl From<TagsInput> for Vec<String> {
    fn from(input: TagsInput) -> Self {
        match input {
            TagsInput::List(list) => list,
            TagsInput::Text(text) => parse_tags(&text),
        }
    }
}

fn tags_from_list_or_text<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TagsInput::deserialize(deserializer)?.into())
}

fn optional_tags_from_list_or_text<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TagsInput>::deserialize(deserializer)?.map(Into::into))
}

/// A stat value as it may appear in JSON: any number, a numeric string, or null.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatInput {
    Number(f64),
    Text(String),
}

fn count_from_number_or_text<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StatInput>::deserialize(deserializer)? {
        Some(StatInput::Number(n)) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
        Some(StatInput::Text(text)) => parse_count(&text),
        _ => 0,
    })
}

fn average_from_number_or_text<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StatInput>::deserialize(deserializer)? {
        Some(StatInput::Number(n)) if n.is_finite() && n > 0.0 => n,
        Some(StatInput::Text(text)) => parse_average(&text),
        _ => 0.0,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdInput {
    Text(String),
    Number(i64),
}

impl From<IdInput> for String {
    fn from(input: IdInput) -> Self {
        match input {
            IdInput::Text(text) => text,
            IdInput::Number(n) => n.to_string(),
        }
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(IdInput::deserialize(deserializer)?.into())
}

/// Deserialize a list of ids given as strings or integers.
pub fn ids_from_strings_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<IdInput>::deserialize(deserializer)?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Like [`ids_from_strings_or_numbers`], for an optional list.
pub fn optional_ids_from_strings_or_numbers<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<IdInput>>::deserialize(deserializer)?
        .map(|ids| ids.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
