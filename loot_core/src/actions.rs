//! Action selection for action bonuses, weighted by class tables.

use crate::config::{ClassActionTable, LootData, WeightedAction};
use crate::types::WeaponType;
use crate::weighted::{pick, pick_uniform};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Pick an action for a weapon bonus slot.
///
/// With the cross-contamination chance the weapon draws from every table.
/// Otherwise it prefers the table of the class wielding its weapon type,
/// then the table of the player's own class, then tagged catalog actions,
/// then every table.
pub fn select_weapon_action(
    data: &LootData,
    weapon_type: WeaponType,
    player_class: Option<&str>,
    rng: &mut ChaCha8Rng,
) -> Option<String> {
    if rng.gen::<f64>() < data.action_tables.cross_contamination {
        tracing::trace!(%weapon_type, "action cross-contamination");
        return select_any_action(data, rng);
    }
    if let Some(table) = wielder_table(data, weapon_type) {
        return pick(&table.actions, rng).map(|a| a.name.clone());
    }
    if let Some(table) = player_class.and_then(|c| data.class_table(c)) {
        if let Some(action) = pick(&table.actions, rng) {
            return Some(action.name.clone());
        }
    }
    tagged_weapon_action(data, weapon_type, rng).or_else(|| select_any_action(data, rng))
}

/// Like `select_weapon_action`, but stays within the weapon's own actions
pub fn select_weapon_action_for_starter(
    data: &LootData,
    weapon_type: WeaponType,
    rng: &mut ChaCha8Rng,
) -> Option<String> {
    weapon_action_from_tables(data, weapon_type, rng)
}

pub fn select_armor_action(data: &LootData, rng: &mut ChaCha8Rng) -> Option<String> {
    pick(&data.action_tables.armor_actions, rng).map(|a| a.name.clone())
}

/// Weighted draw over every class table plus the armor pool
pub fn select_any_action(data: &LootData, rng: &mut ChaCha8Rng) -> Option<String> {
    let pool: Vec<&WeightedAction> = data
        .action_tables
        .classes
        .values()
        .flat_map(|c| c.actions.iter())
        .chain(data.action_tables.armor_actions.iter())
        .collect();
    pick(&pool, rng).map(|a| a.name.clone())
}

fn weapon_action_from_tables(
    data: &LootData,
    weapon_type: WeaponType,
    rng: &mut ChaCha8Rng,
) -> Option<String> {
    match wielder_table(data, weapon_type) {
        Some(table) => pick(&table.actions, rng).map(|a| a.name.clone()),
        None => tagged_weapon_action(data, weapon_type, rng),
    }
}

/// Table of the class that wields `weapon_type`
fn wielder_table(data: &LootData, weapon_type: WeaponType) -> Option<&ClassActionTable> {
    data.action_tables
        .classes
        .values()
        .find(|c| c.weapon_type.eq_ignore_ascii_case(weapon_type.name()))
}

fn tagged_weapon_action(
    data: &LootData,
    weapon_type: WeaponType,
    rng: &mut ChaCha8Rng,
) -> Option<String> {
    let tag = weapon_type.tag();
    let candidates: Vec<_> = data
        .actions
        .iter()
        .filter(|a| a.has_tag("weapon") && a.has_tag(&tag) && !a.has_tag("unique"))
        .collect();
    pick_uniform(&candidates, rng).map(|a| a.name.clone())
}
