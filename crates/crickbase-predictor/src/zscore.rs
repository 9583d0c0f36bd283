// Z-score normalisation of career statistics across a player pool.

use crickbase_core::player::{Player, PlayerStats};

/// Mean and standard deviation for a single statistic across a player pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

impl PoolStats {
    /// Baseline used for an empty pool.
    pub const NEUTRAL: PoolStats = PoolStats {
        mean: 0.0,
        stdev: 1.0,
    };
}

/// Compute mean and population standard deviation for a slice of values.
///
/// An empty slice yields [`PoolStats::NEUTRAL`]. A standard deviation of
/// exactly zero (one player, or all values equal) is replaced by 1 so that
/// z-scores stay finite.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats::NEUTRAL;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stdev = variance.sqrt();
    PoolStats {
        mean,
        stdev: if stdev == 0.0 || stdev.is_nan() { 1.0 } else { stdev },
    }
}

/// `(value - mean) / stdev`.
pub fn zscore(value: f64, stats: &PoolStats) -> f64 {
    (value - stats.mean) / stats.stdev
}

/// Pool statistics for each of the four career stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolNormalization {
    pub runs: PoolStats,
    pub wickets: PoolStats,
    pub matches: PoolStats,
    pub average: PoolStats,
}

impl PoolNormalization {
    pub fn from_players(players: &[Player]) -> Self {
        let column = |f: fn(&PlayerStats) -> f64| -> Vec<f64> {
            players.iter().map(|p| f(&p.stats)).collect()
        };
        PoolNormalization {
            runs: compute_pool_stats(&column(|s| s.runs as f64)),
            wickets: compute_pool_stats(&column(|s| s.wickets as f64)),
            matches: compute_pool_stats(&column(|s| s.matches as f64)),
            average: compute_pool_stats(&column(|s| s.average)),
        }
    }
}
