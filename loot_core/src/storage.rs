use crate::context::LootRequest;
use crate::generator::Generator;
use crate::item::Item;
use serde::{Deserialize, Serialize};

/// Compact storage format for a drop: the request plus the RNG seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDrop {
    pub request: LootRequest,
    /// RNG seed for deterministic recreation
    pub seed: u64,
}

impl StoredDrop {
    pub fn new(request: LootRequest, seed: u64) -> Self {
        StoredDrop { request, seed }
    }

    /// Reconstruct the drop by replaying the request with its seed.
    /// Only reproduces the original item while the loot tables are unchanged.
    pub fn reconstruct(&self, generator: &Generator) -> Option<Item> {
        generator.generate_seeded(&self.request, self.seed)
    }

    /// Export to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Collection of stored drops
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropCollection {
    pub drops: Vec<StoredDrop>,
}

impl DropCollection {
    pub fn new() -> Self {
        DropCollection { drops: Vec::new() }
    }

    pub fn add(&mut self, drop: StoredDrop) {
        self.drops.push(drop);
    }

    pub fn remove(&mut self, index: usize) -> Option<StoredDrop> {
        (index < self.drops.len()).then(|| self.drops.remove(index))
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Rebuild every drop, skipping the ones that no longer produce an item
    pub fn reconstruct_all(&self, generator: &Generator) -> Vec<(StoredDrop, Item)> {
        self.drops
            .iter()
            .filter_map(|d| d.reconstruct(generator).map(|item| (d.clone(), item)))
            .collect()
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    pub fn load_from_file(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
