//! Tuning aids: drop simulation, rarity tables and loot-table validation.

use crate::config::{LootData, RarityUpgradeConfig};
use crate::context::LootRequest;
use crate::generator::Generator;
use crate::rarity::{available_rarities, upgrade_chance};
use crate::tier::{MAX_LOOT_LEVEL, MIN_LOOT_LEVEL};
use crate::types::{ItemCategory, Rarity, Tier};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate of many simulated drops for one request
#[derive(Debug, Clone, Default, Serialize)]
pub struct LootReport {
    pub samples: usize,
    pub drops: usize,
    pub no_drops: usize,
    pub by_rarity: BTreeMap<Rarity, usize>,
    pub by_tier: BTreeMap<u8, usize>,
    pub weapons: usize,
    pub armor: usize,
    pub avg_stat_bonuses: f64,
    pub avg_action_bonuses: f64,
    pub avg_modifications: f64,
}

impl LootReport {
    pub fn drop_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.drops as f64 / self.samples as f64
        }
    }

    /// Share of drops with the given rarity, in percent
    pub fn rarity_percent(&self, rarity: Rarity) -> f64 {
        if self.drops == 0 {
            return 0.0;
        }
        self.by_rarity.get(&rarity).copied().unwrap_or(0) as f64 * 100.0 / self.drops as f64
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Roll `samples` drops for `request` from one RNG seeded with `seed`
pub fn simulate(generator: &Generator, request: &LootRequest, samples: usize, seed: u64) -> LootReport {
    let mut rng = Generator::make_rng(seed);
    let mut report = LootReport {
        samples,
        ..LootReport::default()
    };
    let (mut stats, mut actions, mut mods) = (0usize, 0usize, 0usize);

    for _ in 0..samples {
        let Some(item) = generator.generate_loot(request, &mut rng) else {
            report.no_drops += 1;
            continue;
        };
        report.drops += 1;
        *report.by_rarity.entry(item.rarity).or_insert(0) += 1;
        *report.by_tier.entry(item.tier.get()).or_insert(0) += 1;
        match item.category() {
            ItemCategory::Weapon => report.weapons += 1,
            ItemCategory::Armor => report.armor += 1,
        }
        stats += item.stat_bonuses.len();
        actions += item.action_bonuses.len();
        mods += item.modifications.len();
    }

    if report.drops > 0 {
        let drops = report.drops as f64;
        report.avg_stat_bonuses = stats as f64 / drops;
        report.avg_action_bonuses = actions as f64 / drops;
        report.avg_modifications = mods as f64 / drops;
    }
    tracing::debug!(samples, drops = report.drops, seed, "simulation finished");
    report
}

/// One row of the rarity drop-rate table
#[derive(Debug, Clone, Serialize)]
pub struct RarityRate {
    pub rarity: Rarity,
    pub weight: f64,
    /// Share of initial rolls, in percent
    pub share: f64,
    pub expected_per_1000: f64,
    pub total_bonuses: u32,
    pub power: &'static str,
}

/// Initial-roll odds of every rarity a player of `player_level` can roll,
/// before upgrades
pub fn rarity_drop_rates(data: &LootData, player_level: u32) -> Vec<RarityRate> {
    let available = available_rarities(data, player_level);
    let total: f64 = available.iter().map(|d| d.weight.max(0.0)).sum();
    available
        .into_iter()
        .map(|d| {
            let share = if total > 0.0 {
                d.weight.max(0.0) / total * 100.0
            } else {
                0.0
            };
            let total_bonuses = d.stat_bonuses + d.action_bonuses + d.modifications;
            RarityRate {
                rarity: d.rarity,
                weight: d.weight,
                share,
                expected_per_1000: share * 10.0,
                total_bonuses,
                power: power_estimate(d.rarity, total_bonuses),
            }
        })
        .collect()
}

fn power_estimate(rarity: Rarity, total_bonuses: u32) -> &'static str {
    if rarity == Rarity::Common {
        return "Baseline";
    }
    match total_bonuses {
        0 => "Baseline",
        1..=2 => "Slight",
        3..=4 => "Moderate",
        5..=6 => "Strong",
        7..=8 => "Very Strong",
        9..=10 => "Exceptional",
        _ => "Game-Changing",
    }
}

/// One step of the upgrade cascade
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeStep {
    /// 1 for the first upgrade
    pub step: u32,
    /// Chance of this step given the previous one succeeded
    pub chance: f64,
    /// Chance of reaching at least this many upgrades
    pub cumulative: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpgradeTable {
    pub steps: Vec<UpgradeStep>,
    /// Chance of climbing every allowed step
    pub full_cascade: f64,
}

/// Per-step odds of the rarity cascade, ignoring the ladder top and level locks
pub fn upgrade_chances(config: &RarityUpgradeConfig, magic_find: f64) -> UpgradeTable {
    if !config.enabled {
        return UpgradeTable::default();
    }
    let mut cumulative = 1.0;
    let steps: Vec<UpgradeStep> = (0..config.max_upgrade_tiers)
        .map(|made| {
            let chance = upgrade_chance(config, made, magic_find).clamp(0.0, 1.0);
            cumulative *= chance;
            UpgradeStep {
                step: made + 1,
                chance,
                cumulative,
            }
        })
        .collect();
    let full_cascade = steps.last().map(|s| s.cumulative).unwrap_or(0.0);
    UpgradeTable {
        steps,
        full_cascade,
    }
}

/// Problems found in a set of loot tables
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Data the engine will mishandle
    pub errors: Vec<String>,
    /// Data that works but probably is not what was meant
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check loot tables for inconsistencies
pub fn validate(data: &LootData) -> ValidationReport {
    let mut report = ValidationReport::default();

    if data.rarities.is_empty() {
        report
            .warnings
            .push("rarity table is empty; every drop will be Common".to_string());
    }
    let mut seen = BTreeSet::new();
    for d in &data.rarities {
        if d.weight <= 0.0 {
            report
                .errors
                .push(format!("rarity {} has non-positive weight {}", d.rarity, d.weight));
        }
        if !seen.insert(d.rarity) {
            report
                .warnings
                .push(format!("rarity {} is listed more than once", d.rarity));
        }
    }

    for m in &data.modifications {
        if m.min_value > m.max_value {
            report.errors.push(format!(
                "modification '{}' has min {} above max {}",
                m.name, m.min_value, m.max_value
            ));
        }
    }

    for row in &data.tier_distributions {
        if !(MIN_LOOT_LEVEL..=MAX_LOOT_LEVEL).contains(&row.level) {
            report
                .errors
                .push(format!("tier row for level {} is outside 1-100", row.level));
        } else if (row.total() - 100.0).abs() > 0.01 {
            report.warnings.push(format!(
                "tier row for level {} sums to {:.2}, not 100",
                row.level,
                row.total()
            ));
        }
    }

    for tier in Tier::all() {
        if !data.weapons.iter().any(|w| w.tier == tier) {
            report.warnings.push(format!("no weapons at tier {}", tier.get()));
        }
        if !data.armor.iter().any(|a| a.tier == tier) {
            report.warnings.push(format!("no armor at tier {}", tier.get()));
        }
    }

    let tables = data
        .theme_modifications
        .iter()
        .map(|(k, v)| ("theme", k, v))
        .chain(
            data.archetype_modifications
                .iter()
                .map(|(k, v)| ("archetype", k, v)),
        );
    for (kind, key, entries) in tables {
        for entry in entries {
            if data.modification_named(&entry.name).is_none() {
                report.warnings.push(format!(
                    "{} '{}' names unknown modification '{}'",
                    kind, key, entry.name
                ));
            }
        }
    }

    for (class, table) in &data.action_tables.classes {
        for action in &table.actions {
            if data.action_bonus_named(&action.name).is_none() {
                report.warnings.push(format!(
                    "class '{}' names unknown action '{}'",
                    class, action.name
                ));
            }
        }
    }
    for action in &data.action_tables.armor_actions {
        if data.action_bonus_named(&action.name).is_none() {
            report
                .warnings
                .push(format!("armor action pool names unknown action '{}'", action.name));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_simulate_counts_add_up() {
        let generator = Generator::new(sample_data());
        let request = LootRequest::new(10, 10);
        let report = simulate(&generator, &request, 5_000, 1);
        assert_eq!(report.drops + report.no_drops, 5_000);
        assert_eq!(report.weapons + report.armor, report.drops);
        assert_eq!(report.by_rarity.values().sum::<usize>(), report.drops);
        assert_eq!(report.by_tier.values().sum::<usize>(), report.drops);
        // drop chance is 0.45 at level 10
        assert!((report.drop_rate() - 0.45).abs() < 0.03, "{}", report.drop_rate());
        let total: f64 = Rarity::ALL.iter().map(|&r| report.rarity_percent(r)).sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_simulate_is_reproducible() {
        let generator = Generator::new(sample_data());
        let request = LootRequest::new(20, 25).guaranteed();
        let a = simulate(&generator, &request, 500, 9);
        let b = simulate(&generator, &request, 500, 9);
        assert_eq!(a.by_rarity, b.by_rarity);
        assert_eq!(a.avg_modifications, b.avg_modifications);
        assert!(a.to_json().unwrap().contains("\"by_rarity\""));
    }

    #[test]
    fn test_rarity_drop_rates() {
        let data = sample_data();
        let rates = rarity_drop_rates(&data, 1);
        assert_eq!(rates.len(), 3);
        let share: f64 = rates.iter().map(|r| r.share).sum();
        assert!((share - 100.0).abs() < 1e-9);
        // 500 / (500 + 250 + 120)
        assert!((rates[0].share - 57.4712).abs() < 1e-3);
        assert_eq!(rates[0].power, "Baseline");
        assert_eq!(rates[2].power, "Moderate");
        assert_eq!(rarity_drop_rates(&data, 20).len(), 7);
    }

    #[test]
    fn test_upgrade_chances() {
        let config = RarityUpgradeConfig::default();
        let table = upgrade_chances(&config, 0.0);
        assert_eq!(table.steps.len(), 6);
        assert!((table.steps[0].chance - 0.05).abs() < 1e-12);
        assert!((table.steps[1].cumulative - 0.05 * 0.025).abs() < 1e-12);
        assert!(table.full_cascade < 1e-10);

        let disabled = RarityUpgradeConfig {
            enabled: false,
            ..RarityUpgradeConfig::default()
        };
        assert!(upgrade_chances(&disabled, 0.0).steps.is_empty());
    }

    #[test]
    fn test_validate_sample_data_is_clean() {
        let report = validate(&sample_data());
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_shipped_tables_validate() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config");
        let data = LootData::load_from_dir(&dir).unwrap();
        assert_eq!(data.tier_distributions.len(), 100);
        assert_eq!(data.modifications.len(), 31);
        let report = validate(&data);
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);

        let generator = Generator::new(data);
        let request = LootRequest::new(12, 15).guaranteed();
        let report = simulate(&generator, &request, 1_000, 77);
        assert_eq!(report.drops, 1_000);
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut data = sample_data();
        data.rarities[1].weight = 0.0;
        data.modifications[0].min_value = 9.0;
        data.tier_distributions[0].tier1 = 10.0;
        data.weapons.retain(|w| w.tier != tier(5));
        data.theme_modifications
            .insert("ice".to_string(), vec![table_entry("Frozen", &[2], 1.0)]);
        data.action_tables.armor_actions.push(weighted("PHANTOM", 1.0));

        let report = validate(&data);
        assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
        let warnings = report.warnings.join("\n");
        assert!(warnings.contains("level 1 sums to"));
        assert!(warnings.contains("no weapons at tier 5"));
        assert!(warnings.contains("unknown modification 'Frozen'"));
        assert!(warnings.contains("unknown action 'PHANTOM'"));
    }
}
