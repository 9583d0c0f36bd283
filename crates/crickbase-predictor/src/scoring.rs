// Per-player batting, bowling and role-weighted composite scores.

use crickbase_core::player::{Player, RoleClass, RoleMatch};

use crate::params::{Format, Pitch, SelectionParams, Strategy};
use crate::zscore::{zscore, PoolNormalization};

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

const BAT_RUNS: f64 = 0.6;
const BAT_AVERAGE: f64 = 0.3;
const BAT_MATCHES: f64 = 0.1;

const BOWL_WICKETS: f64 = 0.65;
const BOWL_ECONOMY: f64 = 0.25;
const BOWL_MATCHES: f64 = 0.1;

/// Weight of the per-format extra term.
const FORMAT_TWEAK: f64 = 0.1;

/// Flat bonus for bowlers whose tags suit the pitch.
const PITCH_BOWL_BONUS: f64 = 0.3;
/// Flat batting bonus on a flat pitch.
const PITCH_FLAT_BAT_BONUS: f64 = 0.2;

/// Keepers are judged on batting plus this bonus.
const KEEPER_BONUS: f64 = 0.2;

/// Share of the bat/bowl score added on top by a bat- or bowl-heavy strategy.
const STRATEGY_TILT: f64 = 0.15;

// ---------------------------------------------------------------------------
// ScoredPlayer
// ---------------------------------------------------------------------------

/// A pool member with its scores for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPlayer<'a> {
    pub player: &'a Player,
    pub role: RoleMatch,
    pub bat_score: f64,
    pub bowl_score: f64,
    /// Role-weighted composite used for ranking and selection.
    pub score: f64,
}

/// Score one player against the pool statistics.
pub fn score_player<'a>(
    player: &'a Player,
    norm: &PoolNormalization,
    params: &SelectionParams,
) -> ScoredPlayer<'a> {
    let r = player.stats.runs as f64;
    let w = player.stats.wickets as f64;
    let m = player.stats.matches as f64;
    let av = player.stats.average;

    let mut bat = BAT_RUNS * zscore(r, &norm.runs)
        + BAT_AVERAGE * zscore(av, &norm.average)
        + BAT_MATCHES * zscore(m, &norm.matches);
    // The economy proxy is scored against the batting-average distribution.
    let mut bowl = BOWL_WICKETS * zscore(w, &norm.wickets)
        + BOWL_ECONOMY * zscore(1.0 / av.max(1.0), &norm.average)
        + BOWL_MATCHES * zscore(m, &norm.matches);
    let all_round = 0.5 * bat + 0.5 * bowl;

    match params.format {
        Format::T20 => {
            bat += FORMAT_TWEAK * zscore(r / m.max(1.0), &norm.runs);
            bowl += FORMAT_TWEAK * zscore(w / m.max(1.0), &norm.wickets);
        }
        Format::Test => {
            bat += FORMAT_TWEAK * zscore(av, &norm.average);
            bowl += FORMAT_TWEAK * zscore(m, &norm.matches);
        }
        Format::Odi => {}
    }

    match params.pitch {
        Pitch::Spin if player.has_tag("spin") || player.has_tag("spinner") => {
            bowl += PITCH_BOWL_BONUS;
        }
        Pitch::Pace if player.has_tag("pace") || player.has_tag("seam") => {
            bowl += PITCH_BOWL_BONUS;
        }
        Pitch::Flat => bat += PITCH_FLAT_BAT_BONUS,
        _ => {}
    }

    let role = player.role_match();
    let mut score = match role.primary() {
        RoleClass::WicketKeeper => bat + KEEPER_BONUS,
        RoleClass::Batsman => bat,
        RoleClass::Bowler => bowl,
        RoleClass::AllRounder => all_round,
    };

    match params.strategy {
        Strategy::BatHeavy => score += STRATEGY_TILT * bat,
        Strategy::BowlHeavy => score += STRATEGY_TILT * bowl,
        Strategy::Balanced => {}
    }

    ScoredPlayer {
        player,
        role,
        bat_score: bat,
        bowl_score: bowl,
        score,
    }
}

/// Normalise the pool and score every player, preserving pool order.
pub fn score_pool<'a>(players: &'a [Player], params: &SelectionParams) -> Vec<ScoredPlayer<'a>> {
    let norm = PoolNormalization::from_players(players);
    players
        .iter()
        .map(|p| score_player(p, &norm, params))
        .collect()
}
