// Player list filtering and sorting.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::player::Player;

/// Sortable player fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[serde(alias = "stats.runs")]
    Runs,
    #[serde(alias = "stats.wickets")]
    Wickets,
    #[serde(alias = "stats.matches")]
    Matches,
    #[serde(alias = "stats.average")]
    Average,
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    Name,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "runs" | "stats.runs" => Ok(SortField::Runs),
            "wickets" | "stats.wickets" => Ok(SortField::Wickets),
            "matches" | "stats.matches" => Ok(SortField::Matches),
            "average" | "stats.average" => Ok(SortField::Average),
            "created_at" | "createdat" => Ok(SortField::CreatedAt),
            "name" => Ok(SortField::Name),
            other => Err(format!("unknown sort field `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order `{other}`")),
        }
    }
}

/// Inclusive numeric bounds. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Filters and ordering for listing players.
///
/// Text filters are case-insensitive substring matches; `tags` matches a
/// player carrying any of the listed tags exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerQuery {
    pub search: Option<String>,
    pub country: Option<String>,
    pub role: Option<String>,
    pub gender: Option<String>,
    pub tags: Vec<String>,
    pub runs: Range,
    pub wickets: Range,
    pub matches: Range,
    pub average: Range,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl PlayerQuery {
    pub fn matches(&self, player: &Player) -> bool {
        if let Some(search) = non_empty(&self.search) {
            let hit = [&player.name, &player.country, &player.role]
                .iter()
                .any(|field| contains_ci(field, search));
            if !hit {
                return false;
            }
        }
        if let Some(country) = non_empty(&self.country) {
            if !contains_ci(&player.country, country) {
                return false;
            }
        }
        if let Some(role) = non_empty(&self.role) {
            if !contains_ci(&player.role, role) {
                return false;
            }
        }
        if let Some(gender) = non_empty(&self.gender) {
            if !player.gender.as_deref().is_some_and(|g| contains_ci(g, gender)) {
                return false;
            }
        }
        if !self.tags.is_empty() && !player.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }

        let stats = &player.stats;
        self.runs.contains(stats.runs as f64)
            && self.wickets.contains(stats.wickets as f64)
            && self.matches.contains(stats.matches as f64)
            && self.average.contains(stats.average)
    }

    /// Filter `players` and sort the survivors. Ties keep their input order.
    pub fn apply(&self, players: Vec<Player>) -> Vec<Player> {
        let mut selected: Vec<Player> = players.into_iter().filter(|p| self.matches(p)).collect();
        selected.sort_by(|a, b| {
            let ord = compare_by(self.sort_by, a, b);
            match self.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        selected
    }
}

fn compare_by(field: SortField, a: &Player, b: &Player) -> Ordering {
    match field {
        SortField::Runs => a.stats.runs.cmp(&b.stats.runs),
        SortField::Wickets => a.stats.wickets.cmp(&b.stats.wickets),
        SortField::Matches => a.stats.matches.cmp(&b.stats.matches),
        SortField::Average => a
            .stats
            .average
            .partial_cmp(&b.stats.average)
            .unwrap_or(Ordering::Equal),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Name => a.name.cmp(&b.name),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
