use crate::types::WeaponType;
use serde::{Deserialize, Serialize};

/// Optional hints that bias modification and action choices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootContext {
    #[serde(default)]
    pub player_class: Option<String>,
    #[serde(default)]
    pub dungeon_theme: Option<String>,
    #[serde(default)]
    pub enemy_archetype: Option<String>,
    /// Filled in from the dropped item when it is a weapon
    #[serde(default)]
    pub weapon_type: Option<WeaponType>,
}

impl LootContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.player_class = Some(class.into());
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.dungeon_theme = Some(theme.into());
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.enemy_archetype = Some(archetype.into());
        self
    }

    pub fn with_weapon_type(mut self, weapon_type: WeaponType) -> Self {
        self.weapon_type = Some(weapon_type);
        self
    }
}

/// Everything the orchestrator needs to roll one drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootRequest {
    pub player_level: u32,
    pub dungeon_level: u32,
    /// Player-side multiplier on drop chance and rarity upgrades
    #[serde(default)]
    pub magic_find: f64,
    #[serde(default)]
    pub context: Option<LootContext>,
    /// Dungeon-completion drops bypass the normal drop chance
    #[serde(default)]
    pub guaranteed: bool,
}

impl LootRequest {
    pub fn new(player_level: u32, dungeon_level: u32) -> Self {
        LootRequest {
            player_level,
            dungeon_level,
            magic_find: 0.0,
            context: None,
            guaranteed: false,
        }
    }

    pub fn guaranteed(mut self) -> Self {
        self.guaranteed = true;
        self
    }

    pub fn with_magic_find(mut self, magic_find: f64) -> Self {
        self.magic_find = magic_find;
        self
    }

    pub fn with_context(mut self, context: LootContext) -> Self {
        self.context = Some(context);
        self
    }
}
