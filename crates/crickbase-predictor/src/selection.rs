// Greedy lineup selection under role quotas, locks and a keeper guarantee.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crickbase_core::player::{Player, RoleClass, RoleMatch};

use crate::params::{SelectionParams, Strategy};
use crate::scoring::{score_pool, ScoredPlayer};

/// Number of reserves reported after the lineup.
pub const BENCH_SIZE: usize = 5;

/// Bowlers plus all-rounders below this count trigger a warning.
pub const MIN_BOWLING_OPTIONS: usize = 5;

pub const BOWLING_DEPTH_NOTE: &str =
    "Bowling options below 5; consider adding a bowler/all-rounder.";
pub const MISSING_KEEPER_NOTE: &str = "No wicket-keeper selected; please tag a keeper.";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A selected or benched player with its composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub player: Player,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    pub xi: Vec<Pick>,
    pub bench: Vec<Pick>,
    pub notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Role bookkeeping
// ---------------------------------------------------------------------------

/// Players counted per role bucket while the lineup is assembled.
///
/// Only players added by the lock, keeper and quota passes are counted;
/// backfilled players are not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCounts {
    pub keepers: usize,
    pub batsmen: usize,
    pub bowlers: usize,
    pub all_rounders: usize,
}

impl RoleCounts {
    fn record(&mut self, role: RoleMatch) {
        match role.primary() {
            RoleClass::WicketKeeper => self.keepers += 1,
            RoleClass::Batsman => self.batsmen += 1,
            RoleClass::Bowler => self.bowlers += 1,
            RoleClass::AllRounder => self.all_rounders += 1,
        }
    }

    pub fn bowling_options(&self) -> usize {
        self.bowlers + self.all_rounders
    }
}

/// Target counts for the quota pass. One slot is left flexible, so the
/// all-rounder quota is whatever remains of `max_xi - 1` and may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleQuotas {
    pub batsmen: i64,
    pub bowlers: i64,
    pub all_rounders: i64,
}

impl RoleQuotas {
    pub fn new(strategy: Strategy, max_xi: i64) -> Self {
        let batsmen = if strategy == Strategy::BatHeavy { 6 } else { 5 };
        let bowlers = if strategy == Strategy::BowlHeavy { 5 } else { 4 };
        RoleQuotas {
            batsmen,
            bowlers,
            all_rounders: max_xi.saturating_sub(1 + batsmen + bowlers),
        }
    }

    fn admits(&self, role: RoleMatch, counts: &RoleCounts) -> bool {
        (role.keeper && counts.keepers == 0)
            || (role.batsman && (counts.batsmen as i64) < self.batsmen)
            || (role.bowler && (counts.bowlers as i64) < self.bowlers)
            || (role.is_all_rounder() && (counts.all_rounders as i64) < self.all_rounders)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Score `players` and pick a lineup, bench and advisory notes.
///
/// Never fails: an empty pool gives an empty result, `max_xi <= 0` gives an
/// empty lineup and lock ids missing from the pool are ignored.
pub fn select_team(players: &[Player], params: &SelectionParams) -> SelectionResult {
    let scored = score_pool(players, params);
    let result = select_from_scored(&scored, params);
    debug!(
        "selected {} of {} players ({} {} {}), {} notes",
        result.xi.len(),
        players.len(),
        params.format,
        params.pitch,
        params.strategy,
        result.notes.len()
    );
    result
}

/// Selection phase over an already scored pool.
pub fn select_from_scored(scored: &[ScoredPlayer<'_>], params: &SelectionParams) -> SelectionResult {
    let ranked = rank(scored);
    let capacity = lineup_capacity(params.max_xi);
    let locks: HashSet<&str> = params.locks.iter().map(String::as_str).collect();

    let mut lineup: Vec<&ScoredPlayer<'_>> = Vec::new();
    let mut counts = RoleCounts::default();

    // 1. Locked players, best first.
    for &s in &ranked {
        if lineup.len() >= capacity {
            break;
        }
        if locks.contains(s.player.id.as_str()) {
            lineup.push(s);
            counts.record(s.role);
        }
    }

    // 2. Keeper guarantee. Runs even when the locks filled the lineup; the
    //    keeper then sits past capacity and is dropped from the final XI.
    if counts.keepers == 0 {
        if let Some(&keeper) = ranked
            .iter()
            .find(|s| s.role.keeper && !is_selected(&lineup, s))
        {
            lineup.push(keeper);
            counts.record(keeper.role);
        }
    }

    // 3. Quota pass.
    let quotas = RoleQuotas::new(params.strategy, params.max_xi);
    for &s in &ranked {
        if lineup.len() >= capacity {
            break;
        }
        if is_selected(&lineup, s) {
            continue;
        }
        if quotas.admits(s.role, &counts) {
            lineup.push(s);
            counts.record(s.role);
        }
    }

    // 4. Backfill with the best remaining, ignoring roles.
    for &s in &ranked {
        if lineup.len() >= capacity {
            break;
        }
        if !is_selected(&lineup, s) {
            lineup.push(s);
        }
    }

    // Bench and keeper check see the lineup before it is cut to capacity, so
    // a keeper pushed past the cap counts as selected.
    let bench: Vec<Pick> = ranked
        .iter()
        .filter(|s| !is_selected(&lineup, s))
        .take(BENCH_SIZE)
        .map(|s| to_pick(s))
        .collect();

    let mut notes = Vec::new();
    if counts.bowling_options() < MIN_BOWLING_OPTIONS {
        notes.push(BOWLING_DEPTH_NOTE.to_string());
    }
    if !lineup.iter().any(|s| s.role.keeper) {
        notes.push(MISSING_KEEPER_NOTE.to_string());
    }

    lineup.truncate(capacity);

    SelectionResult {
        xi: lineup.iter().map(|s| to_pick(s)).collect(),
        bench,
        notes,
    }
}

/// Pool sorted by composite score, best first. Equal scores keep pool order.
fn rank<'s, 'p>(scored: &'s [ScoredPlayer<'p>]) -> Vec<&'s ScoredPlayer<'p>> {
    let mut ranked: Vec<&ScoredPlayer<'p>> = scored.iter().collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

fn lineup_capacity(max_xi: i64) -> usize {
    if max_xi <= 0 {
        0
    } else {
        usize::try_from(max_xi).unwrap_or(usize::MAX)
    }
}

fn is_selected(lineup: &[&ScoredPlayer<'_>], candidate: &ScoredPlayer<'_>) -> bool {
    lineup.iter().any(|s| s.player.id == candidate.player.id)
}

fn to_pick(s: &ScoredPlayer<'_>) -> Pick {
    Pick {
        player: s.player.clone(),
        score: s.score,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Format, Pitch};
    use crickbase_core::player::PlayerStats;

    fn stats(matches: u32, runs: u32, wickets: u32, average: f64) -> PlayerStats {
        PlayerStats {
            matches,
            runs,
            wickets,
            average,
        }
    }

    /// 15 players: 1 keeper, 6 batsmen, 5 bowlers, 3 all-rounders.
    fn squad() -> Vec<Player> {
        let mut players = vec![Player::new("wk", "Wicket-keeper", stats(60, 2500, 0, 33.0))];
        for i in 0..6 {
            players.push(Player::new(
                format!("bat{i}"),
                "Batsman",
                stats(50 + i * 5, 2000 + i * 400, i, 35.0 + i as f64),
            ));
        }
        for i in 0..5 {
            players.push(
                Player::new(
                    format!("bowl{i}"),
                    "Bowler",
                    stats(40 + i * 4, 200 + i * 30, 60 + i * 20, 10.0 + i as f64),
                )
                .with_tags([if i % 2 == 0 { "spin" } else { "pace" }]),
            );
        }
        for i in 0..3 {
            players.push(Player::new(
                format!("ar{i}"),
                "All-rounder",
                stats(55, 1500 + i * 200, 50 + i * 10, 28.0),
            ));
        }
        players
    }

    fn ids(picks: &[Pick]) -> Vec<&str> {
        picks.iter().map(|p| p.player.id.as_str()).collect()
    }

    #[test]
    fn fifteen_player_squad_picks_keeper_and_benches_four() {
        let players = squad();
        let result = select_team(&players, &SelectionParams::default());

        assert_eq!(result.xi.len(), 11);
        assert_eq!(result.bench.len(), 4);
        assert!(ids(&result.xi).contains(&"wk"));
        assert!(!result.notes.contains(&MISSING_KEEPER_NOTE.to_string()));

        // Lineup and bench are disjoint and together cover the squad.
        let mut all: Vec<&str> = ids(&result.xi);
        all.extend(ids(&result.bench));
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 15);
    }

    #[test]
    fn balanced_quotas_shape_the_lineup() {
        let players = squad();
        let result = select_team(&players, &SelectionParams::default());
        let batsmen = result.xi.iter().filter(|p| p.player.role == "Batsman").count();
        let bowlers = result.xi.iter().filter(|p| p.player.role == "Bowler").count();
        let all_rounders = result.xi.iter().filter(|p| p.player.role == "All-rounder").count();
        // Quotas 5/4/1 plus one backfilled slot.
        assert!((5..=6).contains(&batsmen));
        assert!((4..=5).contains(&bowlers));
        assert!((1..=2).contains(&all_rounders));
        assert_eq!(batsmen + bowlers + all_rounders, 10);
    }

    #[test]
    fn bench_is_score_ordered() {
        let players = squad();
        let result = select_team(&players, &SelectionParams::default());
        for pair in result.bench.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn single_zero_stat_player_is_selected_with_finite_score() {
        let players = vec![Player::new("solo", "Batsman", PlayerStats::default())];
        let params = SelectionParams {
            max_xi: 1,
            ..Default::default()
        };
        let result = select_team(&players, &params);
        assert_eq!(ids(&result.xi), vec!["solo"]);
        assert!(result.xi[0].score.is_finite());
        assert!(result.bench.is_empty());
    }

    #[test]
    fn empty_pool_gives_empty_result_with_notes() {
        let result = select_team(&[], &SelectionParams::default());
        assert!(result.xi.is_empty());
        assert!(result.bench.is_empty());
        assert_eq!(
            result.notes,
            vec![BOWLING_DEPTH_NOTE.to_string(), MISSING_KEEPER_NOTE.to_string()]
        );
    }

    #[test]
    fn locked_players_are_always_selected() {
        let players = squad();
        // bat0 has the weakest batting numbers; bowl0 the weakest bowling.
        let params = SelectionParams {
            locks: vec!["bat0".into(), "bowl0".into()],
            ..Default::default()
        };
        let result = select_team(&players, &params);
        let xi = ids(&result.xi);
        assert!(xi.contains(&"bat0"));
        assert!(xi.contains(&"bowl0"));
        assert_eq!(xi.len(), 11);
    }

    #[test]
    fn unknown_lock_ids_are_ignored() {
        let players = squad();
        let plain = select_team(&players, &SelectionParams::default());
        let with_ghost = select_team(
            &players,
            &SelectionParams {
                locks: vec!["ghost".into()],
                ..Default::default()
            },
        );
        assert_eq!(plain, with_ghost);
    }

    #[test]
    fn locks_filling_the_lineup_drop_keeper_without_benching_it() {
        let players = squad();
        let locks: Vec<String> = ["bat0", "bat1", "bowl0"].iter().map(|s| s.to_string()).collect();
        let params = SelectionParams {
            locks,
            max_xi: 3,
            ..Default::default()
        };
        let result = select_team(&players, &params);

        let mut xi = ids(&result.xi);
        xi.sort();
        assert_eq!(xi, vec!["bat0", "bat1", "bowl0"]);
        assert!(!ids(&result.xi).contains(&"wk"));
        // The over-cap keeper is neither benched nor reported missing.
        assert!(!ids(&result.bench).contains(&"wk"));
        assert_eq!(result.bench.len(), BENCH_SIZE);
        assert!(!result.notes.contains(&MISSING_KEEPER_NOTE.to_string()));
    }

    #[test]
    fn small_pool_with_locks_filling_lineup_benches_the_rest() {
        let players = vec![
            Player::new("bat0", "Batsman", stats(40, 1500, 0, 30.0)),
            Player::new("bat1", "Batsman", stats(45, 1800, 1, 32.0)),
            Player::new("bowl0", "Bowler", stats(30, 100, 50, 12.0)),
            Player::new("bowl1", "Bowler", stats(35, 150, 70, 14.0)),
            Player::new("wk", "Wicket-keeper", stats(50, 2000, 0, 35.0)),
        ];
        let params = SelectionParams {
            locks: vec!["bat0".into(), "bat1".into(), "bowl0".into()],
            max_xi: 3,
            ..Default::default()
        };
        let result = select_team(&players, &params);
        assert_eq!(result.xi.len(), 3);
        assert_eq!(ids(&result.bench), vec!["bowl1"]);
        assert_eq!(result.notes, vec![BOWLING_DEPTH_NOTE.to_string()]);
    }

    #[test]
    fn keeper_is_added_when_locks_leave_room() {
        let players = squad();
        let params = SelectionParams {
            locks: vec!["bat0".into(), "bat1".into()],
            max_xi: 3,
            ..Default::default()
        };
        let result = select_team(&players, &params);
        assert_eq!(result.xi.len(), 3);
        assert!(ids(&result.xi).contains(&"wk"));
    }

    #[test]
    fn non_positive_max_xi_gives_empty_lineup() {
        let players = squad();
        for max_xi in [0, -4] {
            let result = select_team(
                &players,
                &SelectionParams {
                    max_xi,
                    ..Default::default()
                },
            );
            assert!(result.xi.is_empty());
            assert_eq!(result.bench.len(), BENCH_SIZE);
            assert!(!ids(&result.bench).contains(&"wk"));
            assert!(!result.notes.contains(&MISSING_KEEPER_NOTE.to_string()));
        }
    }

    #[test]
    fn oversized_max_xi_caps_at_pool_size() {
        let players = squad();
        let result = select_team(
            &players,
            &SelectionParams {
                max_xi: 40,
                ..Default::default()
            },
        );
        assert_eq!(result.xi.len(), 15);
        assert!(result.bench.is_empty());
    }

    #[test]
    fn equal_scores_keep_pool_order() {
        let players: Vec<Player> = (0..8)
            .map(|i| Player::new(format!("p{i}"), "Batsman", stats(10, 100, 0, 20.0)))
            .collect();
        let params = SelectionParams {
            max_xi: 3,
            ..Default::default()
        };
        let result = select_team(&players, &params);
        assert_eq!(ids(&result.xi), vec!["p0", "p1", "p2"]);
        assert_eq!(ids(&result.bench), vec!["p3", "p4", "p5", "p6", "p7"]);
    }

    #[test]
    fn selection_is_deterministic() {
        let players = squad();
        let params = SelectionParams {
            format: Format::T20,
            pitch: Pitch::Spin,
            strategy: Strategy::BowlHeavy,
            locks: vec!["ar0".into()],
            max_xi: 11,
        };
        assert_eq!(select_team(&players, &params), select_team(&players, &params));
    }

    #[test]
    fn bowling_depth_note_counts_quota_picks_only() {
        // Seven batsmen and a keeper: no bowling options at all.
        let mut players: Vec<Player> = (0..7)
            .map(|i| Player::new(format!("b{i}"), "Batsman", stats(20, 500 + i * 100, 0, 30.0)))
            .collect();
        players.push(Player::new("wk", "Wicket-keeper", stats(20, 400, 0, 25.0)));
        let result = select_team(&players, &SelectionParams::default());
        assert_eq!(result.xi.len(), 8);
        assert_eq!(result.notes, vec![BOWLING_DEPTH_NOTE.to_string()]);
    }

    #[test]
    fn keeper_batsman_fills_batting_quota_once_keeper_chosen() {
        let players = vec![
            Player::new("wk1", "Wicket-keeper", stats(50, 4000, 0, 45.0)),
            Player::new("wkb", "Wicket-keeper Batsman", stats(50, 3900, 0, 44.0)),
            Player::new("bowl", "Bowler", stats(50, 100, 90, 8.0)),
        ];
        let params = SelectionParams {
            max_xi: 2,
            ..Default::default()
        };
        let result = select_team(&players, &params);
        // After the keeper guarantee, "wkb" still qualifies through its batsman flag.
        assert_eq!(ids(&result.xi), vec!["wk1", "wkb"]);
    }

    #[test]
    fn quotas_follow_strategy() {
        assert_eq!(
            RoleQuotas::new(Strategy::Balanced, 11),
            RoleQuotas {
                batsmen: 5,
                bowlers: 4,
                all_rounders: 1
            }
        );
        assert_eq!(RoleQuotas::new(Strategy::BatHeavy, 11).all_rounders, 0);
        assert_eq!(RoleQuotas::new(Strategy::BowlHeavy, 9).all_rounders, -2);
        assert_eq!(RoleQuotas::new(Strategy::BowlHeavy, 11).bowlers, 5);
        assert_eq!(RoleQuotas::new(Strategy::Balanced, i64::MIN).all_rounders, i64::MIN);
    }
}
