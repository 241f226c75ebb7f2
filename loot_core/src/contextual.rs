use crate::config::{LootData, ModificationTableEntry};
use crate::context::LootContext;
use crate::weighted::pick;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

/// Theme and archetype table entries that apply to a context
fn context_entries<'a>(
    data: &'a LootData,
    context: &LootContext,
) -> impl Iterator<Item = &'a ModificationTableEntry> {
    let theme = context
        .dungeon_theme
        .as_deref()
        .and_then(|t| data.theme_table(t))
        .unwrap_or_default();
    let archetype = context
        .enemy_archetype
        .as_deref()
        .and_then(|a| data.archetype_table(a))
        .unwrap_or_default();
    theme.iter().chain(archetype.iter())
}

/// Every die result the context's theme and archetype tables lean toward
pub fn favored_dice_results(data: &LootData, context: &LootContext) -> BTreeSet<u32> {
    context_entries(data, context)
        .flat_map(|e| e.dice_results.iter().copied())
        .collect()
}

/// Weighted draw among the context's table entries that claim `dice_roll`
pub fn select_contextual<'a>(
    data: &'a LootData,
    context: &LootContext,
    dice_roll: u32,
    rng: &mut ChaCha8Rng,
) -> Option<&'a ModificationTableEntry> {
    let candidates: Vec<_> = context_entries(data, context)
        .filter(|e| e.dice_results.contains(&dice_roll))
        .collect();
    pick(&candidates, rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_favored_results_union() {
        let data = sample_data();
        let ctx = LootContext::new().with_theme("Lava").with_archetype("BERSERKER");
        let favored = favored_dice_results(&data, &ctx);
        assert_eq!(favored.into_iter().collect::<Vec<_>>(), vec![5, 6, 9, 13]);
    }

    #[test]
    fn test_unknown_context_has_no_favored_results() {
        let data = sample_data();
        let ctx = LootContext::new().with_theme("Ice").with_class("wizard");
        assert!(favored_dice_results(&data, &ctx).is_empty());
        assert!(favored_dice_results(&data, &LootContext::new()).is_empty());
    }

    #[test]
    fn test_select_contextual_matches_roll() {
        let data = sample_data();
        let ctx = LootContext::new().with_theme("lava").with_archetype("berserker");
        let mut rng = rng(6);
        assert_eq!(select_contextual(&data, &ctx, 6, &mut rng).unwrap().name, "Mod5");
        assert_eq!(select_contextual(&data, &ctx, 13, &mut rng).unwrap().name, "Mod13");
        assert!(select_contextual(&data, &ctx, 20, &mut rng).is_none());
    }

    #[test]
    fn test_select_contextual_weights_overlapping_entries() {
        let mut data = sample_data();
        data.theme_modifications.insert(
            "swamp".to_string(),
            vec![table_entry("Mod1", &[1], 3.0), table_entry("Mod2", &[1], 1.0)],
        );
        let ctx = LootContext::new().with_theme("Swamp");
        let mut rng = rng(44);
        let heavy = (0..4_000)
            .filter(|_| select_contextual(&data, &ctx, 1, &mut rng).unwrap().name == "Mod1")
            .count();
        assert!((2_800..3_200).contains(&heavy), "got {}", heavy);
    }
}
