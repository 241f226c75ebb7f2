pub mod actions;
pub mod analysis;
pub mod bonus;
pub mod config;
pub mod context;
pub mod contextual;
pub mod dice;
pub mod generator;
pub mod item;
pub mod rarity;
pub mod selector;
pub mod storage;
pub mod tier;
pub mod types;
pub mod weighted;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConfigError, LootData};
pub use context::{LootContext, LootRequest};
pub use generator::Generator;
pub use item::{Item, ItemKind};
pub use storage::{DropCollection, StoredDrop};
pub use types::*;
