use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item rarity ladder, ordered from weakest to strongest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Transcendent,
}

impl Rarity {
    pub const ALL: [Rarity; 7] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
        Rarity::Transcendent,
    ];

    /// Position on the ladder (Common = 0)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The next rung up, or None at the top of the ladder
    pub fn next(&self) -> Option<Rarity> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
            Rarity::Transcendent => "Transcendent",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rarity {
    type Err = UnknownRarity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| UnknownRarity(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rarity: {0}")]
pub struct UnknownRarity(pub String);

/// Coarse item power band, 1 (weakest) to 5 (strongest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    pub const MIN: Tier = Tier(1);
    pub const MAX: Tier = Tier(5);

    pub fn new(value: u8) -> Option<Tier> {
        (1..=5).contains(&value).then_some(Tier(value))
    }

    /// Build a tier, pulling out-of-range values to the nearest bound
    pub fn clamped(value: i64) -> Tier {
        Tier(value.clamp(1, 5) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Tier> {
        (1..=5).map(Tier)
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::MIN
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tier::new(value).ok_or_else(|| format!("tier must be between 1 and 5, got {}", value))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Weapon families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Sword,
    Dagger,
    Mace,
    Wand,
    Staff,
    Axe,
    Bow,
}

impl WeaponType {
    pub const ALL: [WeaponType; 7] = [
        WeaponType::Sword,
        WeaponType::Dagger,
        WeaponType::Mace,
        WeaponType::Wand,
        WeaponType::Staff,
        WeaponType::Axe,
        WeaponType::Bow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponType::Sword => "Sword",
            WeaponType::Dagger => "Dagger",
            WeaponType::Mace => "Mace",
            WeaponType::Wand => "Wand",
            WeaponType::Staff => "Staff",
            WeaponType::Axe => "Axe",
            WeaponType::Bow => "Bow",
        }
    }

    /// Lowercase tag used by the action catalog
    pub fn tag(&self) -> String {
        self.name().to_ascii_lowercase()
    }
}

impl fmt::Display for WeaponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Armor equipment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorSlot {
    Head,
    Chest,
    Feet,
}

/// Top-level drop category decided before the catalog draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Weapon,
    Armor,
}

/// A tag used to filter the action catalog
pub type Tag = String;
