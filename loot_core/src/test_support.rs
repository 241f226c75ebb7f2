//! Synthetic catalogs shared by unit tests.

use crate::config::*;
use crate::item::{Modification, StatBonus};
use crate::types::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn tier(value: u8) -> Tier {
    Tier::new(value).expect("valid test tier")
}

pub fn weapon(name: &str, weapon_type: WeaponType, base_damage: i32, t: u8) -> WeaponConfig {
    WeaponConfig {
        name: name.to_string(),
        weapon_type,
        base_damage,
        attack_speed: 1.0,
        tier: tier(t),
    }
}

pub fn armor(name: &str, slot: ArmorSlot, value: i32, t: u8) -> ArmorConfig {
    ArmorConfig {
        name: name.to_string(),
        slot,
        armor: value,
        tier: tier(t),
    }
}

pub fn modification(dice_result: u32, name: &str) -> Modification {
    Modification {
        dice_result,
        item_rank: None,
        name: name.to_string(),
        description: String::new(),
        effect: None,
        min_value: 1.0,
        max_value: 5.0,
        rolled_value: 0.0,
    }
}

pub fn stat_bonus(name: &str) -> StatBonus {
    StatBonus {
        name: name.to_string(),
        description: String::new(),
        value: 1.0,
        weight: 1,
        stat_type: "strength".to_string(),
        min_rarity: None,
    }
}

pub fn action(name: &str, tags: &[&str], combo: bool) -> ActionDefinition {
    ActionDefinition {
        name: name.to_string(),
        description: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        combo,
    }
}

pub fn weighted(name: &str, weight: f64) -> WeightedAction {
    WeightedAction {
        name: name.to_string(),
        weight,
    }
}

pub fn descriptor(rarity: Rarity, weight: f64, counts: (u32, u32, u32)) -> RarityDescriptor {
    RarityDescriptor {
        rarity,
        weight,
        stat_bonuses: counts.0,
        action_bonuses: counts.1,
        modifications: counts.2,
    }
}

pub fn table_entry(name: &str, results: &[u32], weight: f64) -> ModificationTableEntry {
    ModificationTableEntry {
        name: name.to_string(),
        dice_results: results.iter().copied().collect::<BTreeSet<_>>(),
        weight,
    }
}

pub fn full_ladder() -> Vec<RarityDescriptor> {
    vec![
        descriptor(Rarity::Common, 500.0, (1, 0, 0)),
        descriptor(Rarity::Uncommon, 250.0, (1, 1, 1)),
        descriptor(Rarity::Rare, 120.0, (2, 1, 1)),
        descriptor(Rarity::Epic, 50.0, (2, 1, 2)),
        descriptor(Rarity::Legendary, 20.0, (3, 2, 2)),
        descriptor(Rarity::Mythic, 5.0, (3, 2, 3)),
        descriptor(Rarity::Transcendent, 1.0, (4, 3, 3)),
    ]
}

/// A small but complete set of tables: every tier stocked, a modification
/// on every die result, two themed tables and three classes.
pub fn sample_data() -> LootData {
    let mut weapons = Vec::new();
    let mut armor_items = Vec::new();
    for t in 1..=5u8 {
        weapons.push(weapon(&format!("Sword T{}", t), WeaponType::Sword, 5 * t as i32, t));
        weapons.push(weapon(&format!("Wand T{}", t), WeaponType::Wand, 4 * t as i32, t));
        armor_items.push(armor(&format!("Helm T{}", t), ArmorSlot::Head, 2 * t as i32, t));
        armor_items.push(armor(&format!("Mail T{}", t), ArmorSlot::Chest, 4 * t as i32, t));
        armor_items.push(armor(&format!("Boots T{}", t), ArmorSlot::Feet, t as i32, t));
    }

    let modifications = (1..=31).map(|d| modification(d, &format!("Mod{}", d))).collect();

    let tier_distributions = (1..=100)
        .map(|level| TierDistribution {
            level,
            tier1: 40.0,
            tier2: 30.0,
            tier3: 15.0,
            tier4: 10.0,
            tier5: 5.0,
        })
        .collect();

    let mut themes = BTreeMap::new();
    themes.insert(
        "lava".to_string(),
        vec![table_entry("Mod5", &[5, 6], 2.0), table_entry("Mod9", &[9], 1.0)],
    );
    let mut archetypes = BTreeMap::new();
    archetypes.insert("berserker".to_string(), vec![table_entry("Mod13", &[13], 1.0)]);

    let mut classes = BTreeMap::new();
    classes.insert(
        "wizard".to_string(),
        ClassActionTable {
            weapon_type: "Wand".to_string(),
            actions: vec![weighted("ARCANE BLAST", 2.0), weighted("MAGIC BOLT", 1.0)],
        },
    );
    classes.insert(
        "warrior".to_string(),
        ClassActionTable {
            weapon_type: "sword".to_string(),
            actions: vec![weighted("SHIELD BASH", 1.0)],
        },
    );
    classes.insert(
        "rogue".to_string(),
        ClassActionTable {
            weapon_type: "Dagger".to_string(),
            actions: vec![weighted("BACKSTAB", 1.0)],
        },
    );

    let actions = vec![
        action("ARCANE BLAST", &["weapon", "wand"], true),
        action("MAGIC BOLT", &["weapon", "wand"], true),
        action("SHIELD BASH", &["weapon", "sword"], true),
        action("BACKSTAB", &["weapon", "dagger"], true),
        action("CRUSH", &["weapon", "mace"], false),
        action("EXECUTE", &["weapon", "mace", "unique"], true),
        action("LAVA BURST", &["environment"], true),
        action("ROAR", &["enemy"], true),
        action("IRON SKIN", &["armor"], true),
    ];

    LootData {
        tier_distributions,
        weapons,
        armor: armor_items,
        stat_bonuses: vec![stat_bonus("of Might"), stat_bonus("of Agility")],
        actions: Vec::new(),
        action_bonuses: Vec::new(),
        modifications,
        rarities: full_ladder(),
        theme_modifications: themes,
        archetype_modifications: archetypes,
        action_tables: ActionTables {
            classes,
            armor_actions: vec![weighted("IRON SKIN", 1.0)],
            cross_contamination: 0.2,
        },
        tuning: LootTuning::default(),
    }
    .with_actions(actions)
}
