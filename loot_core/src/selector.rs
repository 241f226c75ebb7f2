use crate::config::{ActionDefinition, LootData};
use crate::item::Item;
use crate::types::{ItemCategory, Tier};
use crate::weighted::pick_uniform;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Share of drops that are weapons; everything else is armor
pub const WEAPON_CHANCE: f64 = 0.25;

/// Tags that keep an action off armor pieces
const GEAR_ACTION_EXCLUDED_TAGS: [&str; 3] = ["environment", "enemy", "unique"];

pub fn choose_category(rng: &mut ChaCha8Rng) -> ItemCategory {
    if rng.gen::<f64>() < WEAPON_CHANCE {
        ItemCategory::Weapon
    } else {
        ItemCategory::Armor
    }
}

/// Draw a bare item of the given tier and category from the catalog.
/// Returns None when the catalog has nothing at that tier.
pub fn select_item(
    data: &LootData,
    tier: Tier,
    category: ItemCategory,
    rng: &mut ChaCha8Rng,
) -> Option<Item> {
    match category {
        ItemCategory::Weapon => {
            let candidates: Vec<_> = data.weapons.iter().filter(|w| w.tier == tier).collect();
            pick_uniform(&candidates, rng).map(|w| Item::new_weapon(w))
        }
        ItemCategory::Armor => {
            let candidates: Vec<_> = data.armor.iter().filter(|a| a.tier == tier).collect();
            let base = pick_uniform(&candidates, rng)?;
            let mut item = Item::new_armor(base);
            let gear_action = pick_gear_action(data, rng);
            if let Some(stats) = item.armor_stats_mut() {
                stats.gear_action = gear_action;
            }
            Some(item)
        }
    }
}

fn is_gear_action(action: &ActionDefinition) -> bool {
    action.combo && !GEAR_ACTION_EXCLUDED_TAGS.iter().any(|t| action.has_tag(t))
}

fn pick_gear_action(data: &LootData, rng: &mut ChaCha8Rng) -> Option<String> {
    let pool: Vec<_> = data.actions.iter().filter(|a| is_gear_action(a)).collect();
    pick_uniform(&pool, rng).map(|a| a.name.clone())
}
