use crate::actions::{select_armor_action, select_weapon_action};
use crate::config::{LootData, RarityDescriptor};
use crate::context::LootContext;
use crate::contextual::{favored_dice_results, select_contextual};
use crate::dice;
use crate::item::{ActionBonus, Item, Modification, StatBonus};
use crate::types::Rarity;
use crate::weighted::pick_uniform;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Chance that a Common item gets its single stat bonus
pub const COMMON_STAT_BONUS_CHANCE: f64 = 0.10;
/// Chance that an Uncommon item gets its modifications at all
pub const UNCOMMON_MODIFICATION_CHANCE: f64 = 0.80;
/// Chance a modification slot tries the context tables first
pub const CONTEXTUAL_MODIFICATION_CHANCE: f64 = 0.70;
/// Die bonus for the extra roll granted by a reroll modification
pub const REROLL_DIE_BONUS: u32 = 3;

/// Bonus counts an item will actually receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Allotment {
    stat_bonuses: u32,
    action_bonuses: u32,
    modifications: u32,
}

/// Dress an item with bonuses for its rarity, then rebuild its name and
/// raise its rarity to whatever the applied bonuses require.
pub fn apply_bonuses(
    data: &LootData,
    item: &mut Item,
    rarity: &RarityDescriptor,
    context: Option<&LootContext>,
    rng: &mut ChaCha8Rng,
) {
    let allotment = allot(rarity, rng);

    for _ in 0..allotment.stat_bonuses {
        if let Some(bonus) = pick_stat_bonus(data, rng) {
            item.stat_bonuses.push(bonus);
        }
    }
    for _ in 0..allotment.action_bonuses {
        if let Some(bonus) = pick_action_bonus(data, item, context, rng) {
            item.action_bonuses.push(bonus);
        }
    }
    for _ in 0..allotment.modifications {
        let Some(modification) = pick_modification(data, item, context, rng) else {
            continue;
        };
        let reroll = modification.is_reroll();
        item.modifications.push(modification);
        if reroll {
            let roll = dice::roll_modification(
                item.tier,
                REROLL_DIE_BONUS,
                &data.tuning.modification_die,
                rng,
            );
            tracing::trace!(roll, "reroll modification granted an extra roll");
            if let Some(extra) = data.modification_for_result(roll) {
                item.modifications.push(with_rolled_value(extra, rng));
            }
        }
    }

    item.name = item.display_name();

    if let Some(required) = item.required_rarity() {
        if required > item.rarity {
            tracing::debug!(from = %item.rarity, to = %required, "bonus requires higher rarity");
            item.rarity = required;
        }
    }
}

fn allot(rarity: &RarityDescriptor, rng: &mut ChaCha8Rng) -> Allotment {
    match rarity.rarity {
        Rarity::Common => {
            if rng.gen::<f64>() < COMMON_STAT_BONUS_CHANCE {
                Allotment {
                    stat_bonuses: 1,
                    ..Allotment::default()
                }
            } else {
                Allotment::default()
            }
        }
        Rarity::Uncommon => {
            let modifications = if rng.gen::<f64>() < UNCOMMON_MODIFICATION_CHANCE {
                rarity.modifications
            } else {
                0
            };
            Allotment {
                stat_bonuses: rarity.stat_bonuses,
                action_bonuses: rarity.action_bonuses,
                modifications,
            }
        }
        _ => Allotment {
            stat_bonuses: rarity.stat_bonuses,
            action_bonuses: rarity.action_bonuses,
            modifications: rarity.modifications,
        },
    }
}

fn pick_stat_bonus(data: &LootData, rng: &mut ChaCha8Rng) -> Option<StatBonus> {
    pick_uniform(&data.stat_bonuses, rng).cloned()
}

fn pick_action_bonus(
    data: &LootData,
    item: &Item,
    context: Option<&LootContext>,
    rng: &mut ChaCha8Rng,
) -> Option<ActionBonus> {
    if let Some(ctx) = context {
        let class = ctx.player_class.as_deref();
        let name = match ctx.weapon_type.or(item.weapon_type()) {
            Some(weapon_type) => select_weapon_action(data, weapon_type, class, rng),
            None => select_armor_action(data, rng),
        };
        if let Some(bonus) = name.and_then(|n| data.action_bonus_named(&n)) {
            return Some(bonus.clone());
        }
    }
    pick_uniform(&data.action_bonuses, rng).cloned()
}

fn pick_modification(
    data: &LootData,
    item: &Item,
    context: Option<&LootContext>,
    rng: &mut ChaCha8Rng,
) -> Option<Modification> {
    if let Some(ctx) = context {
        if rng.gen::<f64>() < CONTEXTUAL_MODIFICATION_CHANCE {
            if let Some(m) = contextual_modification(data, item, ctx, rng) {
                return Some(with_rolled_value(m, rng));
            }
        }
    }
    let roll = dice::roll_modification(item.tier, 0, &data.tuning.modification_die, rng);
    data.modification_for_result(roll)
        .map(|m| with_rolled_value(m, rng))
}

fn contextual_modification<'a>(
    data: &'a LootData,
    item: &Item,
    context: &LootContext,
    rng: &mut ChaCha8Rng,
) -> Option<&'a Modification> {
    let favored = favored_dice_results(data, context);
    if favored.is_empty() {
        return None;
    }

    let roll = dice::roll_modification(item.tier, 0, &data.tuning.modification_die, rng);
    if favored.contains(&roll) {
        let entry = select_contextual(data, context, roll, rng)?;
        return data
            .modification_named(&entry.name)
            .or_else(|| data.modification_for_result(roll));
    }

    let favored: Vec<u32> = favored.into_iter().collect();
    let result = *pick_uniform(&favored, rng)?;
    data.modification_for_result(result)
}

/// Copy a catalog modification with a fresh value inside its range
fn with_rolled_value(catalog: &Modification, rng: &mut ChaCha8Rng) -> Modification {
    let (low, high) = if catalog.min_value <= catalog.max_value {
        (catalog.min_value, catalog.max_value)
    } else {
        (catalog.max_value, catalog.min_value)
    };
    let mut m = catalog.clone();
    m.rolled_value = low + rng.gen::<f64>() * (high - low);
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::types::{ArmorSlot, WeaponType};

    fn sword() -> Item {
        Item::new_weapon(&weapon("Sword", WeaponType::Sword, 10, 3))
    }

    fn dressed(
        data: &LootData,
        counts: (u32, u32, u32),
        rarity: Rarity,
        context: Option<&LootContext>,
        rng: &mut ChaCha8Rng,
    ) -> Item {
        let mut item = sword();
        item.rarity = rarity;
        apply_bonuses(data, &mut item, &descriptor(rarity, 1.0, counts), context, rng);
        item
    }

    #[test]
    fn test_common_single_stat_gate() {
        let data = sample_data();
        let mut rng = rng(2024);
        let mut with_bonus = 0;
        for _ in 0..10_000 {
            let item = dressed(&data, (3, 2, 2), Rarity::Common, None, &mut rng);
            assert!(item.action_bonuses.is_empty());
            assert!(item.modifications.is_empty());
            assert!(item.stat_bonuses.len() <= 1);
            with_bonus += item.stat_bonuses.len();
        }
        assert!((850..=1_150).contains(&with_bonus), "got {}", with_bonus);
    }

    #[test]
    fn test_uncommon_modifications_all_or_nothing() {
        let data = sample_data();
        let mut rng = rng(7);
        let mut gated_in = 0;
        for _ in 0..5_000 {
            let item = dressed(&data, (1, 1, 2), Rarity::Uncommon, None, &mut rng);
            assert_eq!(item.stat_bonuses.len(), 1);
            assert_eq!(item.action_bonuses.len(), 1);
            assert!(matches!(item.modifications.len(), 0 | 2));
            if !item.modifications.is_empty() {
                gated_in += 1;
            }
        }
        assert!((3_800..=4_200).contains(&gated_in), "got {}", gated_in);
    }

    #[test]
    fn test_other_rarities_get_full_counts() {
        let data = sample_data();
        let mut rng = rng(8);
        for _ in 0..200 {
            let item = dressed(&data, (2, 1, 3), Rarity::Rare, None, &mut rng);
            assert_eq!(item.stat_bonuses.len(), 2);
            assert_eq!(item.action_bonuses.len(), 1);
            assert_eq!(item.modifications.len(), 3);
        }
    }

    #[test]
    fn test_rolled_values_within_range() {
        let mut data = sample_data();
        for (i, m) in data.modifications.iter_mut().enumerate() {
            m.min_value = i as f64;
            m.max_value = i as f64 * 2.0 + 0.5;
        }
        let ctx = LootContext::new().with_theme("lava");
        let mut rng = rng(13);
        for _ in 0..500 {
            let item = dressed(&data, (0, 0, 3), Rarity::Epic, Some(&ctx), &mut rng);
            for m in &item.modifications {
                assert!(m.min_value <= m.rolled_value && m.rolled_value <= m.max_value);
            }
        }
    }

    #[test]
    fn test_reroll_grants_extra_modification() {
        let mut data = sample_data();
        for m in data.modifications.iter_mut() {
            m.effect = Some("reroll".to_string());
        }
        let mut rng = rng(1);
        for _ in 0..100 {
            let item = dressed(&data, (0, 0, 1), Rarity::Rare, None, &mut rng);
            assert_eq!(item.modifications.len(), 2);
            let item = dressed(&data, (0, 0, 2), Rarity::Rare, None, &mut rng);
            assert_eq!(item.modifications.len(), 4);
        }
    }

    #[test]
    fn test_context_biases_modifications() {
        let data = sample_data();
        let ctx = LootContext::new().with_theme("Lava");
        let mut rng = rng(99);
        let mut favored = 0;
        let mut total = 0;
        for _ in 0..2_000 {
            let item = dressed(&data, (0, 0, 1), Rarity::Rare, Some(&ctx), &mut rng);
            for m in &item.modifications {
                total += 1;
                if matches!(m.dice_result, 5 | 6 | 9) {
                    favored += 1;
                }
            }
        }
        assert!(favored as f64 / total as f64 > 0.65, "{} of {}", favored, total);
    }

    #[test]
    fn test_contextual_actions_follow_item() {
        let mut data = sample_data();
        data.action_tables.cross_contamination = 0.0;
        let ctx = LootContext::new().with_class("warrior");
        let mut rng = rng(5);

        let item = dressed(&data, (0, 2, 0), Rarity::Rare, Some(&ctx), &mut rng);
        assert!(item.action_bonuses.iter().all(|a| a.name == "SHIELD BASH"));

        let mut helm = Item::new_armor(&armor("Helm", ArmorSlot::Head, 2, 1));
        apply_bonuses(
            &data,
            &mut helm,
            &descriptor(Rarity::Rare, 1.0, (0, 2, 0)),
            Some(&ctx),
            &mut rng,
        );
        assert!(helm.action_bonuses.iter().all(|a| a.name == "IRON SKIN"));
    }

    #[test]
    fn test_context_weapon_type_and_class_drive_actions() {
        let mut data = sample_data();
        data.action_tables.cross_contamination = 0.0;
        let mut rng = rng(8);

        // the context's weapon type overrides the item's own
        let ctx = LootContext::new().with_weapon_type(WeaponType::Dagger);
        let item = dressed(&data, (0, 2, 0), Rarity::Rare, Some(&ctx), &mut rng);
        assert!(item.action_bonuses.iter().all(|a| a.name == "BACKSTAB"));

        // a weapon no class wields draws from the player's class table
        let ctx = LootContext::new()
            .with_weapon_type(WeaponType::Mace)
            .with_class("Wizard");
        for _ in 0..50 {
            let item = dressed(&data, (0, 2, 0), Rarity::Rare, Some(&ctx), &mut rng);
            assert!(item
                .action_bonuses
                .iter()
                .all(|a| a.name == "ARCANE BLAST" || a.name == "MAGIC BOLT"));
        }

        let ctx = LootContext::new().with_weapon_type(WeaponType::Mace);
        let item = dressed(&data, (0, 2, 0), Rarity::Rare, Some(&ctx), &mut rng);
        assert!(item.action_bonuses.iter().all(|a| a.name == "CRUSH"));
    }

    #[test]
    fn test_bonus_requirement_raises_rarity() {
        let mut data = sample_data();
        for m in data.modifications.iter_mut() {
            m.item_rank = Some(Rarity::Legendary);
        }
        let mut rng = rng(3);
        let item = dressed(&data, (0, 0, 1), Rarity::Rare, None, &mut rng);
        assert_eq!(item.rarity, Rarity::Legendary);

        // requirements never lower a rarity
        let item = dressed(&data, (0, 0, 1), Rarity::Transcendent, None, &mut rng);
        assert_eq!(item.rarity, Rarity::Transcendent);
    }

    #[test]
    fn test_name_regenerated() {
        let data = sample_data();
        let mut rng = rng(10);
        let item = dressed(&data, (1, 0, 1), Rarity::Rare, None, &mut rng);
        assert_eq!(item.name, item.display_name());
        assert!(item.name.starts_with("Mod"));
        assert!(item.name.contains("Sword of"));
    }

    #[test]
    fn test_empty_catalogs_leave_item_bare() {
        let mut data = sample_data();
        data.stat_bonuses.clear();
        data.modifications.clear();
        data = data.with_actions(Vec::new());
        let mut rng = rng(10);
        let item = dressed(&data, (2, 2, 2), Rarity::Epic, None, &mut rng);
        assert_eq!(item.bonus_count(), 0);
        assert_eq!(item.name, "Sword");
    }
}
