use crate::config::ModificationDieConfig;
use crate::types::Tier;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Chance that a band carrying a special result returns it
pub const SPECIAL_RESULT_CHANCE: f64 = 0.1;

/// Roll a die with `sides` faces, 1-based. Dice with fewer than one face roll 1.
pub fn roll(sides: u32, rng: &mut ChaCha8Rng) -> u32 {
    if sides <= 1 {
        return 1;
    }
    rng.gen_range(1..=sides)
}

/// Roll the modification die for an item of `tier`.
///
/// Higher tiers and bonus points push the percentile roll further along the
/// band table, toward the rarer bands at the end.
pub fn roll_modification(
    tier: Tier,
    bonus: u32,
    config: &ModificationDieConfig,
    rng: &mut ChaCha8Rng,
) -> u32 {
    let shift = (tier.get() as f64 - 1.0) * config.tier_bonus_per_level
        + bonus as f64 * config.bonus_point_effectiveness;
    let percentile = (rng.gen::<f64>() * 100.0 + shift).clamp(0.0, 99.99);
    result_for_percentile(percentile, config, rng)
}

/// Walk the cumulative bands and land on a die result
pub fn result_for_percentile(
    percentile: f64,
    config: &ModificationDieConfig,
    rng: &mut ChaCha8Rng,
) -> u32 {
    let Some(last) = config.bands.last() else {
        return 1;
    };

    let mut threshold = 0.0;
    let band = config
        .bands
        .iter()
        .find(|band| {
            threshold += band.weight;
            percentile < threshold
        })
        .unwrap_or(last);

    if let Some(special) = band.special {
        if rng.gen::<f64>() < SPECIAL_RESULT_CHANCE {
            return special;
        }
    }
    band.first + roll(band.span, rng) - 1
}
