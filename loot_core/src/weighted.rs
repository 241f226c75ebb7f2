//! Weighted draw shared by every weighted choice in the engine.

use crate::config::{ModificationTableEntry, RarityDescriptor, WeightedAction};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Anything that carries a selection weight
pub trait Weighted {
    fn weight(&self) -> f64;
}

impl Weighted for RarityDescriptor {
    fn weight(&self) -> f64 {
        self.weight
    }
}

impl Weighted for ModificationTableEntry {
    fn weight(&self) -> f64 {
        self.weight
    }
}

impl Weighted for WeightedAction {
    fn weight(&self) -> f64 {
        self.weight
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn weight(&self) -> f64 {
        (**self).weight()
    }
}

pub fn total_weight<T: Weighted>(entries: &[T]) -> f64 {
    entries.iter().map(|e| e.weight()).sum()
}

/// Draw one entry proportionally to its weight.
///
/// Returns None only for an empty slice. A non-positive total weight
/// degrades to the first entry without consuming randomness.
pub fn pick<'a, T: Weighted>(entries: &'a [T], rng: &mut ChaCha8Rng) -> Option<&'a T> {
    let first = entries.first()?;
    let total = total_weight(entries);
    if total <= 0.0 {
        return Some(first);
    }
    let roll = rng.gen::<f64>() * total;
    pick_with_roll(entries, roll)
}

/// Resolve a draw `roll` in `[0, total)` to the first entry whose running
/// cumulative weight strictly exceeds it.
pub fn pick_with_roll<T: Weighted>(entries: &[T], roll: f64) -> Option<&T> {
    let first = entries.first()?;
    if total_weight(entries) <= 0.0 {
        return Some(first);
    }

    let mut cumulative = 0.0;
    for entry in entries {
        cumulative += entry.weight();
        if cumulative > roll {
            return Some(entry);
        }
    }
    // Float slack at the top of the range
    entries.last()
}

/// Uniform draw from a slice
pub fn pick_uniform<'a, T>(entries: &'a [T], rng: &mut ChaCha8Rng) -> Option<&'a T> {
    if entries.is_empty() {
        return None;
    }
    Some(&entries[rng.gen_range(0..entries.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeightedAction;
    use rand::SeedableRng;

    fn actions(weights: &[f64]) -> Vec<WeightedAction> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| WeightedAction {
                name: format!("A{}", i),
                weight,
            })
            .collect()
    }

    fn index_of(entries: &[WeightedAction], roll: f64) -> usize {
        let picked = pick_with_roll(entries, roll).unwrap();
        entries.iter().position(|e| e.name == picked.name).unwrap()
    }

    #[test]
    fn test_roll_boundaries() {
        // cumulative bands: [0,1) -> 0, [1,3) -> 1, [3,6) -> 2
        let entries = actions(&[1.0, 2.0, 3.0]);
        assert_eq!(index_of(&entries, 0.0), 0);
        assert_eq!(index_of(&entries, 0.999), 0);
        assert_eq!(index_of(&entries, 1.0), 1);
        assert_eq!(index_of(&entries, 2.5), 1);
        // a roll equal to a cumulative sum belongs to the next band, so r = 3 is entry 2, not 1
        assert_eq!(index_of(&entries, 3.0), 2);
        assert_eq!(index_of(&entries, 5.0), 2);
    }

    #[test]
    fn test_zero_weight_returns_first() {
        let entries = actions(&[0.0, 0.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pick(&entries, &mut rng).unwrap().name, "A0");
        assert_eq!(pick_with_roll(&entries, 12.0).unwrap().name, "A0");
    }

    #[test]
    fn test_empty_returns_none() {
        let entries: Vec<WeightedAction> = Vec::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(pick(&entries, &mut rng).is_none());
        assert!(pick_uniform(&entries, &mut rng).is_none());
    }

    #[test]
    fn test_zero_weight_entry_never_drawn() {
        let entries = actions(&[1.0, 0.0, 1.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..2_000 {
            assert_ne!(pick(&entries, &mut rng).unwrap().name, "A1");
        }
    }

    #[test]
    fn test_pick_follows_weights() {
        let entries = actions(&[1.0, 3.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let heavy = (0..10_000)
            .filter(|_| pick(&entries, &mut rng).unwrap().name == "A1")
            .count();
        assert!((7_200..7_800).contains(&heavy), "got {}", heavy);
    }
}
