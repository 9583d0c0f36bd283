// Team prediction requests: resolve the pool, fill in defaults, select.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crickbase_core::config::PredictorDefaults;
use crickbase_core::player::optional_ids_from_strings_or_numbers;
use crickbase_core::source::PlayerSource;
use crickbase_predictor::{select_team, Format, Pitch, SelectionParams, SelectionResult, Strategy};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No players available to predict team.")]
    NoPlayers,

    #[error("failed to load player pool: {0}")]
    Source(#[from] anyhow::Error),
}

/// A prediction request as received from a client. Every field is optional;
/// omitted parameters take the configured predictor defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Restrict the pool to these players. Empty or absent means every
    /// stored player.
    #[serde(
        default,
        alias = "player_ids",
        deserialize_with = "optional_ids_from_strings_or_numbers"
    )]
    pub player_ids: Option<Vec<String>>,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub pitch: Option<Pitch>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default, deserialize_with = "optional_ids_from_strings_or_numbers")]
    pub locks: Option<Vec<String>>,
    #[serde(default, alias = "maxXI", alias = "max_xi")]
    pub max_xi: Option<i64>,
}

impl PredictRequest {
    /// Selection parameters for this request, falling back to `defaults`.
    pub fn params(&self, defaults: &PredictorDefaults) -> SelectionParams {
        let base = SelectionParams::from_defaults(defaults);
        SelectionParams {
            format: self.format.unwrap_or(base.format),
            pitch: self.pitch.unwrap_or(base.pitch),
            strategy: self.strategy.unwrap_or(base.strategy),
            locks: self.locks.clone().unwrap_or_default(),
            max_xi: self.max_xi.unwrap_or(base.max_xi),
        }
    }
}

/// Resolve the requested pool from `source` and pick a lineup.
pub fn predict_team<S>(
    source: &S,
    request: &PredictRequest,
    defaults: &PredictorDefaults,
) -> Result<SelectionResult, PredictError>
where
    S: PlayerSource + ?Sized,
{
    let players = match request.player_ids.as_deref() {
        Some(ids) if !ids.is_empty() => source.players_by_ids(ids)?,
        _ => source.all_players()?,
    };
    if players.is_empty() {
        return Err(PredictError::NoPlayers);
    }

    let params = request.params(defaults);
    let result = select_team(&players, &params);
    info!(
        "predicted XI from pool of {}: {} selected, {} on bench, {} notes",
        players.len(),
        result.xi.len(),
        result.bench.len(),
        result.notes.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crickbase_core::player::{Player, PlayerStats};

    fn pool() -> Vec<Player> {
        let stats = |runs, wickets| PlayerStats {
            matches: 20,
            runs,
            wickets,
            average: 25.0,
        };
        vec![
            Player::new("1", "Batsman", stats(900, 0)),
            Player::new("2", "Bowler", stats(50, 40)),
            Player::new("3", "Wicket-keeper", stats(600, 0)),
        ]
    }

    #[test]
    fn request_accepts_camel_case_and_numeric_ids() {
        let json = r#"{"playerIds": [1, "2"], "format": "t20", "locks": [3], "maxXI": 2}"#;
        let req: PredictRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.player_ids, Some(vec!["1".to_string(), "2".to_string()]));
        assert_eq!(req.format, Some(Format::T20));
        assert_eq!(req.locks, Some(vec!["3".to_string()]));
        assert_eq!(req.max_xi, Some(2));
    }

    #[test]
    fn omitted_params_take_configured_defaults() {
        let defaults = PredictorDefaults {
            format: "Test".into(),
            pitch: "spin".into(),
            strategy: "bowl-heavy".into(),
            max_xi: 7,
        };
        let req = PredictRequest {
            pitch: Some(Pitch::Flat),
            ..Default::default()
        };
        let params = req.params(&defaults);
        assert_eq!(params.format, Format::Test);
        assert_eq!(params.pitch, Pitch::Flat);
        assert_eq!(params.strategy, Strategy::BowlHeavy);
        assert_eq!(params.max_xi, 7);
        assert!(params.locks.is_empty());
    }

    #[test]
    fn empty_source_is_rejected() {
        let players: Vec<Player> = Vec::new();
        let err = predict_team(
            players.as_slice(),
            &PredictRequest::default(),
            &PredictorDefaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PredictError::NoPlayers));
        assert_eq!(err.to_string(), "No players available to predict team.");
    }

    #[test]
    fn unknown_ids_only_is_rejected() {
        let players = pool();
        let req = PredictRequest {
            player_ids: Some(vec!["99".into()]),
            ..Default::default()
        };
        let err = predict_team(players.as_slice(), &req, &PredictorDefaults::default()).unwrap_err();
        assert!(matches!(err, PredictError::NoPlayers));
    }

    #[test]
    fn empty_id_list_means_whole_pool() {
        let players = pool();
        let req = PredictRequest {
            player_ids: Some(Vec::new()),
            ..Default::default()
        };
        let result = predict_team(players.as_slice(), &req, &PredictorDefaults::default()).unwrap();
        assert_eq!(result.xi.len(), 3);
        assert!(result.bench.is_empty());
    }

    #[test]
    fn id_subset_limits_the_pool() {
        let players = pool();
        let req = PredictRequest {
            player_ids: Some(vec!["1".into(), "3".into()]),
            ..Default::default()
        };
        let result = predict_team(players.as_slice(), &req, &PredictorDefaults::default()).unwrap();
        let mut ids: Vec<&str> = result.xi.iter().map(|p| p.player.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
