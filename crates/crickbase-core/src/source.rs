// Where player pools come from.

use anyhow::Result;

use crate::player::Player;

/// A store that can hand out player pools for selection.
pub trait PlayerSource {
    /// Every player, in store order.
    fn all_players(&self) -> Result<Vec<Player>>;

    /// Players whose id appears in `ids`, in store order. Unknown ids are
    /// skipped rather than reported.
    fn players_by_ids(&self, ids: &[String]) -> Result<Vec<Player>>;
}

/// An in-memory pool, e.g. a roster file loaded without a database.
impl PlayerSource for [Player] {
    fn all_players(&self) -> Result<Vec<Player>> {
        Ok(self.to_vec())
    }

    fn players_by_ids(&self, ids: &[String]) -> Result<Vec<Player>> {
        Ok(self
            .iter()
            .filter(|p| ids.iter().any(|id| *id == p.id))
            .cloned()
            .collect())
    }
}
