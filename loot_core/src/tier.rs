use crate::config::{LootData, TierDistribution};
use crate::types::Tier;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub const MIN_LOOT_LEVEL: u32 = 1;
pub const MAX_LOOT_LEVEL: u32 = 100;

/// Effective loot level: deeper dungeons raise it, overleveled players lower it
pub fn compute_loot_level(player_level: u32, dungeon_level: u32) -> u32 {
    let level = 2 * dungeon_level as i64 - player_level as i64;
    level.clamp(MIN_LOOT_LEVEL as i64, MAX_LOOT_LEVEL as i64) as u32
}

/// Map a percentile roll in `[0, 100)` onto a distribution row
pub fn tier_from_roll(row: &TierDistribution, roll: f64) -> Tier {
    let bands = [row.tier1, row.tier2, row.tier3, row.tier4];
    let mut bound = 0.0;
    for (i, width) in bands.iter().enumerate() {
        bound += width;
        if roll < bound {
            return Tier::clamped(i as i64 + 1);
        }
    }
    Tier::MAX
}

/// Roll the tier for a loot level.
/// Levels without a distribution row always give tier 1.
pub fn resolve_tier(data: &LootData, loot_level: u32, rng: &mut ChaCha8Rng) -> Tier {
    let level = loot_level.clamp(MIN_LOOT_LEVEL, MAX_LOOT_LEVEL);
    let Some(row) = data.tier_distribution(level) else {
        tracing::trace!(level, "no tier distribution row");
        return Tier::MIN;
    };
    let roll = rng.gen::<f64>() * 100.0;
    tier_from_roll(row, roll)
}
