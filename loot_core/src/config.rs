use crate::item::{ActionBonus, Modification, StatBonus};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Every static table the loot engine reads, loaded from TOML files
#[derive(Debug, Clone, Default)]
pub struct LootData {
    pub tier_distributions: Vec<TierDistribution>,
    pub weapons: Vec<WeaponConfig>,
    pub armor: Vec<ArmorConfig>,
    pub stat_bonuses: Vec<StatBonus>,
    /// General action catalog
    pub actions: Vec<ActionDefinition>,
    /// Action bonuses derived from the action catalog
    pub action_bonuses: Vec<ActionBonus>,
    pub modifications: Vec<Modification>,
    pub rarities: Vec<RarityDescriptor>,
    pub theme_modifications: BTreeMap<String, Vec<ModificationTableEntry>>,
    pub archetype_modifications: BTreeMap<String, Vec<ModificationTableEntry>>,
    pub action_tables: ActionTables,
    pub tuning: LootTuning,
}

impl LootData {
    /// Load loot tables from a data directory
    /// Expected structure:
    ///   config/
    ///     tiers.toml          - [[tiers]] tier distribution rows
    ///     weapons.toml        - [[weapons]]
    ///     armor.toml          - [[armor]]
    ///     stat_bonuses.toml   - [[stat_bonuses]]
    ///     actions.toml        - [[actions]]
    ///     modifications.toml  - [[modifications]]
    ///     rarities.toml       - [[rarities]]
    ///     contextual.toml     - [themes.*], [archetypes.*], [classes.*], armor_actions
    ///     tuning.toml         - drop chances, scaling and upgrade tuning
    /// Missing files leave the corresponding table empty.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let tiers: TiersWrapper = Self::load_file(dir, "tiers.toml")?;
        let weapons: WeaponsWrapper = Self::load_file(dir, "weapons.toml")?;
        let armor: ArmorWrapper = Self::load_file(dir, "armor.toml")?;
        let stat_bonuses: StatBonusesWrapper = Self::load_file(dir, "stat_bonuses.toml")?;
        let actions: ActionsWrapper = Self::load_file(dir, "actions.toml")?;
        let modifications: ModificationsWrapper = Self::load_file(dir, "modifications.toml")?;
        let rarities: RaritiesWrapper = Self::load_file(dir, "rarities.toml")?;
        let contextual: ContextualWrapper = Self::load_file(dir, "contextual.toml")?;
        let tuning: LootTuning = Self::load_file(dir, "tuning.toml")?;

        let data = LootData {
            tier_distributions: tiers.tiers,
            weapons: weapons.weapons,
            armor: armor.armor,
            stat_bonuses: stat_bonuses.stat_bonuses,
            actions: Vec::new(),
            action_bonuses: Vec::new(),
            modifications: modifications.modifications,
            rarities: rarities.rarities,
            theme_modifications: lowercase_keys(contextual.themes),
            archetype_modifications: lowercase_keys(contextual.archetypes),
            action_tables: ActionTables {
                classes: lowercase_keys(contextual.classes),
                armor_actions: contextual.armor_actions,
                cross_contamination: contextual.cross_contamination,
            },
            tuning,
        }
        .with_actions(actions.actions);

        tracing::info!(
            dir = %dir.display(),
            weapons = data.weapons.len(),
            armor = data.armor.len(),
            modifications = data.modifications.len(),
            rarities = data.rarities.len(),
            "loaded loot tables"
        );

        Ok(data)
    }

    /// Replace the action catalog and rebuild the action bonuses from it
    pub fn with_actions(mut self, actions: Vec<ActionDefinition>) -> Self {
        self.action_bonuses = actions
            .iter()
            .map(|a| ActionBonus {
                name: a.name.clone(),
                description: a.description.clone(),
                weight: 1,
            })
            .collect();
        self.actions = actions;
        self
    }

    pub fn tier_distribution(&self, level: u32) -> Option<&TierDistribution> {
        self.tier_distributions.iter().find(|d| d.level == level)
    }

    pub fn theme_table(&self, theme: &str) -> Option<&[ModificationTableEntry]> {
        self.theme_modifications
            .get(&theme.to_ascii_lowercase())
            .map(|v| v.as_slice())
    }

    pub fn archetype_table(&self, archetype: &str) -> Option<&[ModificationTableEntry]> {
        self.archetype_modifications
            .get(&archetype.to_ascii_lowercase())
            .map(|v| v.as_slice())
    }

    pub fn class_table(&self, class: &str) -> Option<&ClassActionTable> {
        self.action_tables.classes.get(&class.to_ascii_lowercase())
    }

    /// Catalog modification answering to a die bucket
    pub fn modification_for_result(&self, dice_result: u32) -> Option<&Modification> {
        self.modifications.iter().find(|m| m.dice_result == dice_result)
    }

    pub fn modification_named(&self, name: &str) -> Option<&Modification> {
        self.modifications
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn action_bonus_named(&self, name: &str) -> Option<&ActionBonus> {
        self.action_bonuses
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Theme names in table order, for cycling in front-ends
    pub fn theme_names(&self) -> Vec<&String> {
        self.theme_modifications.keys().collect()
    }

    pub fn archetype_names(&self) -> Vec<&String> {
        self.archetype_modifications.keys().collect()
    }

    pub fn class_names(&self) -> Vec<&String> {
        self.action_tables.classes.keys().collect()
    }

    fn load_file<T: serde::de::DeserializeOwned + Default>(
        dir: &Path,
        file_name: &str,
    ) -> Result<T, ConfigError> {
        let path = dir.join(file_name);
        if !path.exists() {
            tracing::warn!(path = %path.display(), "loot table file missing, using empty table");
            return Ok(T::default());
        }
        let content = Self::read_file_with_context(&path)?;
        Self::parse_toml_with_context(&content, &path)
    }

    // Helper functions for error context

    fn read_file_with_context(path: &Path) -> Result<String, ConfigError> {
        std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })
    }

    fn parse_toml_with_context<T: serde::de::DeserializeOwned>(
        content: &str,
        path: &Path,
    ) -> Result<T, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.to_path_buf(),
        })
    }
}

fn lowercase_keys<V>(map: BTreeMap<String, V>) -> BTreeMap<String, V> {
    map.into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error with optional file path
    #[error("IO error{}: {error}", fmt_path(.path.as_deref()))]
    Io {
        #[source]
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    /// TOML parse error with file path and location details
    #[error("Parse error in '{}': {error}", .path.display())]
    Parse {
        #[source]
        error: toml::de::Error,
        path: PathBuf,
    },
}

fn fmt_path(path: Option<&Path>) -> String {
    path.map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}

impl ConfigError {
    /// Get the file path associated with this error, if any
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => path.as_deref(),
            ConfigError::Parse { path, .. } => Some(path),
        }
    }

    /// Get a user-friendly description of where the error occurred
    pub fn location_description(&self) -> String {
        match self {
            ConfigError::Io { path: Some(p), .. } => format!("File: {}", p.display()),
            ConfigError::Io { path: None, .. } => "Unknown location".to_string(),
            ConfigError::Parse { error, path } => {
                let mut desc = format!("File: {}", path.display());
                if let Some(span) = error.span() {
                    desc.push_str(&format!("\nPosition: bytes {}..{}", span.start, span.end));
                }
                desc
            }
        }
    }

    /// Get the underlying error message without span details
    pub fn error_message(&self) -> String {
        match self {
            ConfigError::Io { error, .. } => error.to_string(),
            ConfigError::Parse { error, .. } => error.message().to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io {
            error: e,
            path: None,
        }
    }
}

// Wrapper types for TOML parsing

#[derive(Deserialize, Default)]
struct TiersWrapper {
    #[serde(default)]
    tiers: Vec<TierDistribution>,
}

#[derive(Deserialize, Default)]
struct WeaponsWrapper {
    #[serde(default)]
    weapons: Vec<WeaponConfig>,
}

#[derive(Deserialize, Default)]
struct ArmorWrapper {
    #[serde(default)]
    armor: Vec<ArmorConfig>,
}

#[derive(Deserialize, Default)]
struct StatBonusesWrapper {
    #[serde(default)]
    stat_bonuses: Vec<StatBonus>,
}

#[derive(Deserialize, Default)]
struct ActionsWrapper {
    #[serde(default)]
    actions: Vec<ActionDefinition>,
}

#[derive(Deserialize, Default)]
struct ModificationsWrapper {
    #[serde(default)]
    modifications: Vec<Modification>,
}

#[derive(Deserialize, Default)]
struct RaritiesWrapper {
    #[serde(default)]
    rarities: Vec<RarityDescriptor>,
}

#[derive(Deserialize)]
struct ContextualWrapper {
    #[serde(default)]
    themes: BTreeMap<String, Vec<ModificationTableEntry>>,
    #[serde(default)]
    archetypes: BTreeMap<String, Vec<ModificationTableEntry>>,
    #[serde(default)]
    classes: BTreeMap<String, ClassActionTable>,
    #[serde(default)]
    armor_actions: Vec<WeightedAction>,
    #[serde(default = "default_cross_contamination")]
    cross_contamination: f64,
}

impl Default for ContextualWrapper {
    fn default() -> Self {
        ContextualWrapper {
            themes: BTreeMap::new(),
            archetypes: BTreeMap::new(),
            classes: BTreeMap::new(),
            armor_actions: Vec::new(),
            cross_contamination: default_cross_contamination(),
        }
    }
}

fn default_cross_contamination() -> f64 {
    0.20
}

/// Tier probabilities for one loot level, in percent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierDistribution {
    pub level: u32,
    #[serde(default)]
    pub tier1: f64,
    #[serde(default)]
    pub tier2: f64,
    #[serde(default)]
    pub tier3: f64,
    #[serde(default)]
    pub tier4: f64,
    #[serde(default)]
    pub tier5: f64,
}

impl TierDistribution {
    pub fn total(&self) -> f64 {
        self.tier1 + self.tier2 + self.tier3 + self.tier4 + self.tier5
    }
}

/// Weapon catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub weapon_type: WeaponType,
    pub base_damage: i32,
    #[serde(default = "default_attack_speed")]
    pub attack_speed: f64,
    pub tier: Tier,
}

fn default_attack_speed() -> f64 {
    1.0
}

/// Armor catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmorConfig {
    pub name: String,
    pub slot: ArmorSlot,
    pub armor: i32,
    pub tier: Tier,
}

/// General action catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Whether the action can be chained in combos
    #[serde(default)]
    pub combo: bool,
}

impl ActionDefinition {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Rarity table row: selection weight and how many bonuses the rarity grants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityDescriptor {
    #[serde(rename = "name")]
    pub rarity: Rarity,
    pub weight: f64,
    #[serde(default)]
    pub stat_bonuses: u32,
    #[serde(default)]
    pub action_bonuses: u32,
    #[serde(default)]
    pub modifications: u32,
}

impl RarityDescriptor {
    /// Descriptor used when the rarity table offers nothing usable
    pub fn fallback_common() -> Self {
        RarityDescriptor {
            rarity: Rarity::Common,
            weight: 500.0,
            stat_bonuses: 1,
            action_bonuses: 0,
            modifications: 0,
        }
    }
}

/// Theme or archetype modification entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationTableEntry {
    /// Name of the catalog modification this entry favors
    pub name: String,
    /// Die buckets this entry claims
    #[serde(default)]
    pub dice_results: BTreeSet<u32>,
    #[serde(default = "default_entry_weight")]
    pub weight: f64,
}

fn default_entry_weight() -> f64 {
    1.0
}

/// Action name with a selection weight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedAction {
    pub name: String,
    #[serde(default = "default_entry_weight")]
    pub weight: f64,
}

/// Actions favored by one player class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassActionTable {
    /// Weapon type the class wields, matched case-insensitively
    pub weapon_type: String,
    #[serde(default)]
    pub actions: Vec<WeightedAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTables {
    pub classes: BTreeMap<String, ClassActionTable>,
    pub armor_actions: Vec<WeightedAction>,
    /// Chance that a weapon ignores its class table
    pub cross_contamination: f64,
}

impl Default for ActionTables {
    fn default() -> Self {
        ActionTables {
            classes: BTreeMap::new(),
            armor_actions: Vec::new(),
            cross_contamination: default_cross_contamination(),
        }
    }
}

/// Tuning knobs for drop chances, scaling and rarity upgrades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootTuning {
    #[serde(default)]
    pub drop: DropChanceConfig,
    /// When absent, weapons use the dice-based bonus fallback
    #[serde(default)]
    pub weapon_scaling: Option<WeaponScalingConfig>,
    #[serde(default)]
    pub rarity_upgrade: RarityUpgradeConfig,
    #[serde(default)]
    pub unlocks: RarityUnlockConfig,
    #[serde(default)]
    pub modification_die: ModificationDieConfig,
}

impl Default for LootTuning {
    fn default() -> Self {
        LootTuning {
            drop: DropChanceConfig::default(),
            weapon_scaling: None,
            rarity_upgrade: RarityUpgradeConfig::default(),
            unlocks: RarityUnlockConfig::default(),
            modification_die: ModificationDieConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropChanceConfig {
    pub base: f64,
    pub per_level: f64,
    pub max: f64,
    /// Chance used for guaranteed drops (dungeon completion)
    pub guaranteed: f64,
    pub magic_find_effectiveness: f64,
}

impl Default for DropChanceConfig {
    fn default() -> Self {
        DropChanceConfig {
            base: 0.35,
            per_level: 0.01,
            max: 0.95,
            guaranteed: 1.0,
            magic_find_effectiveness: 0.01,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponScalingConfig {
    pub damage_per_tier: f64,
    pub speed_bonus_per_tier: f64,
}

impl Default for WeaponScalingConfig {
    fn default() -> Self {
        WeaponScalingConfig {
            damage_per_tier: 2.0,
            speed_bonus_per_tier: 0.5,
        }
    }
}

/// Cascading rarity upgrade tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityUpgradeConfig {
    pub enabled: bool,
    pub base_chance: f64,
    /// Multiplier applied to the chance for every upgrade already made
    pub decay: f64,
    /// Added chance per point of magic find
    pub magic_find_bonus: f64,
    pub max_upgrade_tiers: u32,
}

impl Default for RarityUpgradeConfig {
    fn default() -> Self {
        RarityUpgradeConfig {
            enabled: true,
            base_chance: 0.05,
            decay: 0.5,
            magic_find_bonus: 0.0001,
            max_upgrade_tiers: 6,
        }
    }
}

/// Player levels at which the upper rarities start dropping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityUnlockConfig {
    pub epic: u32,
    pub legendary: u32,
    pub mythic: u32,
    pub transcendent: u32,
}

impl Default for RarityUnlockConfig {
    fn default() -> Self {
        RarityUnlockConfig {
            epic: 5,
            legendary: 10,
            mythic: 15,
            transcendent: 20,
        }
    }
}

impl RarityUnlockConfig {
    pub fn is_unlocked(&self, rarity: Rarity, player_level: u32) -> bool {
        match rarity {
            Rarity::Common | Rarity::Uncommon | Rarity::Rare => true,
            Rarity::Epic => player_level >= self.epic,
            Rarity::Legendary => player_level >= self.legendary,
            Rarity::Mythic => player_level >= self.mythic,
            Rarity::Transcendent => player_level >= self.transcendent,
        }
    }
}

/// Shape of the modification die
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModificationDieConfig {
    pub bands: Vec<DieBand>,
    /// Roll shift per item tier above 1
    pub tier_bonus_per_level: f64,
    /// Roll shift per bonus point
    pub bonus_point_effectiveness: f64,
}

/// One band of the modification die
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DieBand {
    /// Percentage width of the band
    pub weight: f64,
    /// Lowest die result of the band
    pub first: u32,
    /// Number of results in the band
    #[serde(default = "default_band_span")]
    pub span: u32,
    /// Out-of-band result occasionally returned instead
    #[serde(default)]
    pub special: Option<u32>,
}

fn default_band_span() -> u32 {
    4
}

impl Default for ModificationDieConfig {
    fn default() -> Self {
        let band = |weight, first, special| DieBand {
            weight,
            first,
            span: 4,
            special,
        };
        ModificationDieConfig {
            bands: vec![
                band(35.0, 1, Some(29)),
                band(25.0, 5, Some(30)),
                band(20.0, 9, None),
                band(12.0, 13, Some(31)),
                band(6.0, 17, None),
                band(1.8, 21, None),
                band(0.2, 25, None),
            ],
            tier_bonus_per_level: 1.5,
            bonus_point_effectiveness: 1.0,
        }
    }
}
