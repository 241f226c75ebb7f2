use crate::actions::select_weapon_action_for_starter;
use crate::bonus::apply_bonuses;
use crate::config::{ConfigError, LootData};
use crate::context::LootRequest;
use crate::dice;
use crate::item::{Item, ItemKind};
use crate::rarity::{apply_rarity_scaling, roll_rarity};
use crate::selector::{choose_category, select_item};
use crate::tier::{compute_loot_level, resolve_tier};
use crate::types::{Tier, WeaponType};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Attack speed bonus per tier when no weapon scaling is configured
const FALLBACK_SPEED_PER_TIER: f64 = 0.1;

/// Loot generator over a shared, read-only set of loot tables.
///
/// The generator never owns randomness: every call takes the caller's RNG,
/// so one generator can serve many threads, each with its own seeded RNG.
#[derive(Debug, Clone)]
pub struct Generator {
    data: Arc<LootData>,
    source: Option<PathBuf>,
}

impl Generator {
    pub fn new(data: LootData) -> Self {
        Generator {
            data: Arc::new(data),
            source: None,
        }
    }

    /// Share already loaded tables with another generator
    pub fn from_shared(data: Arc<LootData>) -> Self {
        Generator { data, source: None }
    }

    /// Load tables from a data directory and remember it for `reload`
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let data = LootData::load_from_dir(dir)?;
        Ok(Generator {
            data: Arc::new(data),
            source: Some(dir.to_path_buf()),
        })
    }

    /// Re-read the data directory. The current tables stay in place when
    /// loading fails or the generator was built from in-memory tables.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let Some(dir) = self.source.as_deref() else {
            return Ok(());
        };
        let data = LootData::load_from_dir(dir)?;
        self.data = Arc::new(data);
        tracing::info!(dir = %dir.display(), "reloaded loot tables");
        Ok(())
    }

    pub fn data(&self) -> &LootData {
        &self.data
    }

    pub fn shared_data(&self) -> Arc<LootData> {
        Arc::clone(&self.data)
    }

    pub fn source_dir(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Create a seeded RNG from a u64 seed
    pub fn make_rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// Probability that a request produces a drop
    pub fn drop_chance(&self, request: &LootRequest) -> f64 {
        let drop = &self.data.tuning.drop;
        if request.guaranteed {
            return drop.guaranteed;
        }
        let chance = drop.base
            + request.player_level as f64 * drop.per_level
            + request.magic_find * drop.magic_find_effectiveness;
        chance.min(drop.max)
    }

    /// Roll one drop. Returns None when the drop gate fails or the catalog
    /// has nothing at the resolved tier.
    pub fn generate_loot(&self, request: &LootRequest, rng: &mut ChaCha8Rng) -> Option<Item> {
        let chance = self.drop_chance(request);
        if rng.gen::<f64>() >= chance {
            tracing::trace!(chance, "no drop");
            return None;
        }

        let data = self.data.as_ref();
        let loot_level = compute_loot_level(request.player_level, request.dungeon_level);
        let category = choose_category(rng);
        let tier = resolve_tier(data, loot_level, rng);
        let Some(mut item) = select_item(data, tier, category, rng) else {
            tracing::debug!(loot_level, %tier, ?category, "catalog has no item for tier");
            return None;
        };

        self.apply_weapon_scaling(&mut item, rng);

        let rarity = roll_rarity(data, request.magic_find, request.player_level, rng);
        item.rarity = rarity.rarity;
        apply_rarity_scaling(&mut item, rarity.rarity);

        let context = request.context.clone().map(|mut ctx| {
            ctx.weapon_type = item.weapon_type();
            ctx
        });
        apply_bonuses(data, &mut item, &rarity, context.as_ref(), rng);

        tracing::debug!(
            name = %item.name,
            %tier,
            rarity = %item.rarity,
            loot_level,
            bonuses = item.bonus_count(),
            "generated loot"
        );
        Some(item)
    }

    /// Roll one drop from a fresh RNG seeded with `seed`
    pub fn generate_seeded(&self, request: &LootRequest, seed: u64) -> Option<Item> {
        let mut rng = Self::make_rng(seed);
        self.generate_loot(request, &mut rng)
    }

    /// Tier-based bonus damage and attack speed for weapons
    pub fn apply_weapon_scaling(&self, item: &mut Item, rng: &mut ChaCha8Rng) {
        let tier = item.tier;
        let ItemKind::Weapon(stats) = &mut item.kind else {
            return;
        };
        match &self.data.tuning.weapon_scaling {
            Some(scaling) => {
                let t = tier.get() as f64;
                stats.bonus_damage = (t * scaling.damage_per_tier).floor() as i32;
                stats.bonus_attack_speed = (t * scaling.speed_bonus_per_tier).floor() as i32;
            }
            None => {
                stats.bonus_damage = fallback_bonus_damage(tier, rng);
                stats.bonus_attack_speed =
                    (tier.get() as f64 * FALLBACK_SPEED_PER_TIER).floor() as i32;
            }
        }
    }

    /// Action for a character's first weapon. Never borrows from other tables.
    pub fn starter_action(&self, weapon_type: WeaponType, rng: &mut ChaCha8Rng) -> Option<String> {
        select_weapon_action_for_starter(&self.data, weapon_type, rng)
    }
}

fn fallback_bonus_damage(tier: Tier, rng: &mut ChaCha8Rng) -> i32 {
    if tier.get() <= 1 {
        1
    } else {
        dice::roll(tier.get().max(2) as u32, rng) as i32
    }
}
