use crate::config::{ArmorConfig, WeaponConfig};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A generated item. Starts as a bare shell from the catalog and is dressed
/// in place by every later generation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Display name, rebuilt from modification and bonus names
    pub name: String,
    /// Catalog name
    pub base_name: String,
    pub tier: Tier,
    pub rarity: Rarity,
    pub kind: ItemKind,
    pub stat_bonuses: Vec<StatBonus>,
    pub action_bonuses: Vec<ActionBonus>,
    pub modifications: Vec<Modification>,
}

/// Category-specific payload of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon(WeaponStats),
    Head(ArmorStats),
    Chest(ArmorStats),
    Feet(ArmorStats),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub weapon_type: WeaponType,
    pub base_damage: i32,
    pub attack_speed: f64,
    #[serde(default)]
    pub bonus_damage: i32,
    #[serde(default)]
    pub bonus_attack_speed: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorStats {
    pub armor: i32,
    /// Decorative combo action granted by the armor piece
    #[serde(default)]
    pub gear_action: Option<String>,
}

/// A stat bonus catalog entry, copied onto items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBonus {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub weight: u32,
    /// Which stat this affects (strength, armor, health, ...)
    #[serde(default)]
    pub stat_type: String,
    /// Lowest rarity an item carrying this bonus may have
    #[serde(default)]
    pub min_rarity: Option<Rarity>,
}

/// An action bonus catalog entry, copied onto items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBonus {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_action_weight")]
    pub weight: u32,
}

fn default_action_weight() -> u32 {
    1
}

/// A rollable item trait tied to a modification die bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    /// Die bucket this modification answers to
    pub dice_result: u32,
    /// Lowest rarity an item carrying this modification may have
    #[serde(default)]
    pub item_rank: Option<Rarity>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Special effect tag, e.g. "reroll"
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub min_value: f64,
    #[serde(default)]
    pub max_value: f64,
    /// Value rolled inside [min_value, max_value] when applied
    #[serde(default)]
    pub rolled_value: f64,
}

pub const REROLL_EFFECT: &str = "reroll";

impl Modification {
    pub fn is_reroll(&self) -> bool {
        self.effect
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(REROLL_EFFECT))
    }

    fn affects_armor(&self) -> bool {
        self.effect
            .as_deref()
            .is_some_and(|e| e.to_ascii_lowercase().contains("armor"))
    }

    /// Modification names starting with "of " read as suffixes
    pub fn is_suffix(&self) -> bool {
        self.name.to_ascii_lowercase().starts_with("of ")
    }
}

impl Item {
    /// Create an undressed weapon from a catalog entry
    pub fn new_weapon(base: &WeaponConfig) -> Self {
        Item::bare(
            &base.name,
            base.tier,
            ItemKind::Weapon(WeaponStats {
                weapon_type: base.weapon_type,
                base_damage: base.base_damage,
                attack_speed: base.attack_speed,
                bonus_damage: 0,
                bonus_attack_speed: 0,
            }),
        )
    }

    /// Create an undressed armor piece from a catalog entry
    pub fn new_armor(base: &ArmorConfig) -> Self {
        let stats = ArmorStats {
            armor: base.armor,
            gear_action: None,
        };
        let kind = match base.slot {
            ArmorSlot::Head => ItemKind::Head(stats),
            ArmorSlot::Chest => ItemKind::Chest(stats),
            ArmorSlot::Feet => ItemKind::Feet(stats),
        };
        Item::bare(&base.name, base.tier, kind)
    }

    fn bare(name: &str, tier: Tier, kind: ItemKind) -> Self {
        Item {
            name: name.to_string(),
            base_name: name.to_string(),
            tier,
            rarity: Rarity::Common,
            kind,
            stat_bonuses: Vec::new(),
            action_bonuses: Vec::new(),
            modifications: Vec::new(),
        }
    }

    pub fn category(&self) -> ItemCategory {
        match self.kind {
            ItemKind::Weapon(_) => ItemCategory::Weapon,
            ItemKind::Head(_) | ItemKind::Chest(_) | ItemKind::Feet(_) => ItemCategory::Armor,
        }
    }

    pub fn weapon_type(&self) -> Option<WeaponType> {
        match &self.kind {
            ItemKind::Weapon(w) => Some(w.weapon_type),
            _ => None,
        }
    }

    pub fn armor_stats(&self) -> Option<&ArmorStats> {
        match &self.kind {
            ItemKind::Weapon(_) => None,
            ItemKind::Head(a) | ItemKind::Chest(a) | ItemKind::Feet(a) => Some(a),
        }
    }

    pub fn armor_stats_mut(&mut self) -> Option<&mut ArmorStats> {
        match &mut self.kind {
            ItemKind::Weapon(_) => None,
            ItemKind::Head(a) | ItemKind::Chest(a) | ItemKind::Feet(a) => Some(a),
        }
    }

    pub fn gear_action(&self) -> Option<&str> {
        self.armor_stats().and_then(|a| a.gear_action.as_deref())
    }

    pub fn slot_name(&self) -> &'static str {
        match self.kind {
            ItemKind::Weapon(_) => "Weapon",
            ItemKind::Head(_) => "Head",
            ItemKind::Chest(_) => "Chest",
            ItemKind::Feet(_) => "Feet",
        }
    }

    pub fn bonus_count(&self) -> usize {
        self.stat_bonuses.len() + self.action_bonuses.len() + self.modifications.len()
    }

    /// Armor value including armor stat bonuses and armor-effect modifications
    pub fn total_armor(&self) -> Option<i64> {
        let base = self.armor_stats()?.armor as i64;
        let from_bonuses: i64 = self
            .stat_bonuses
            .iter()
            .filter(|b| b.stat_type.eq_ignore_ascii_case("armor"))
            .map(|b| b.value as i64)
            .sum();
        let from_mods: i64 = self
            .modifications
            .iter()
            .filter(|m| m.affects_armor())
            .map(|m| m.rolled_value as i64)
            .sum();
        Some(base.saturating_add(from_bonuses).saturating_add(from_mods))
    }

    /// Rebuild the display name as `[prefixes] base [suffixes]`
    pub fn display_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();

        for m in self.modifications.iter().filter(|m| !m.is_suffix()) {
            parts.push(m.name.trim());
        }
        parts.push(self.base_name.trim());
        for m in self.modifications.iter().filter(|m| m.is_suffix()) {
            parts.push(m.name.trim());
        }
        for b in &self.stat_bonuses {
            parts.push(b.name.trim());
        }

        parts
            .iter()
            .flat_map(|p| p.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Highest minimum-rarity requirement among applied bonuses
    pub fn required_rarity(&self) -> Option<Rarity> {
        let from_mods = self.modifications.iter().filter_map(|m| m.item_rank);
        let from_stats = self.stat_bonuses.iter().filter_map(|b| b.min_rarity);
        from_mods.chain(from_stats).max()
    }

    /// Export item to markdown format
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n", self.name));
        md.push_str(&format!(
            "**{}** ({}, {} {})\n\n",
            self.base_name,
            self.rarity,
            self.tier,
            self.slot_name()
        ));

        match &self.kind {
            ItemKind::Weapon(w) => {
                md.push_str("### Damage\n");
                md.push_str(&format!(
                    "- {} damage: {} (+{})\n",
                    w.weapon_type, w.base_damage, w.bonus_damage
                ));
                md.push_str(&format!(
                    "- Attack Speed: {:.2} (+{})\n\n",
                    w.attack_speed, w.bonus_attack_speed
                ));
            }
            ItemKind::Head(a) | ItemKind::Chest(a) | ItemKind::Feet(a) => {
                md.push_str("### Defense\n");
                md.push_str(&format!("- Armor: {}\n", a.armor));
                if let Some(total) = self.total_armor() {
                    md.push_str(&format!("- Total Armor: {}\n", total));
                }
                if let Some(ref action) = a.gear_action {
                    md.push_str(&format!("- Gear Action: {}\n", action));
                }
                md.push('\n');
            }
        }

        if !self.stat_bonuses.is_empty() {
            md.push_str("### Stat Bonuses\n");
            for b in &self.stat_bonuses {
                md.push_str(&format!("- {} (+{} {})\n", b.name, b.value, b.stat_type));
            }
            md.push('\n');
        }

        if !self.action_bonuses.is_empty() {
            md.push_str("### Action Bonuses\n");
            for b in &self.action_bonuses {
                md.push_str(&format!("- {}\n", b.name));
            }
            md.push('\n');
        }

        if !self.modifications.is_empty() {
            md.push_str("### Modifications\n");
            for m in &self.modifications {
                md.push_str(&format!(
                    "- {} [{}] {:.2} ({:.2}-{:.2})\n",
                    m.name, m.dice_result, m.rolled_value, m.min_value, m.max_value
                ));
            }
            md.push('\n');
        }

        md
    }
}
