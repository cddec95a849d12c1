//! Global Inventory
//!
//! Multiset of every word held by any agent in the minimal model. Its
//! multiplicity for a word always equals the number of agent inventories
//! containing that word.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Resource: word counts across the whole population
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalInventory {
    counts: HashMap<String, usize>,
    total: usize,
}

impl GlobalInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str) {
        *self.counts.entry(word.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    /// Remove one occurrence; returns false when the word was not present
    pub fn remove_one(&mut self, word: &str) -> bool {
        let Some(count) = self.counts.get_mut(word) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(word);
        }
        self.total -= 1;
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    pub fn multiplicity(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Words counted with multiplicity
    pub fn total_words(&self) -> usize {
        self.total
    }

    pub fn distinct_words(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut inventory = GlobalInventory::new();
        assert!(inventory.is_empty());

        inventory.add("kalo");
        inventory.add("kalo");
        inventory.add("mira");
        assert_eq!(inventory.total_words(), 3);
        assert_eq!(inventory.distinct_words(), 2);
        assert_eq!(inventory.multiplicity("kalo"), 2);

        assert!(inventory.remove_one("kalo"));
        assert_eq!(inventory.multiplicity("kalo"), 1);
        assert!(inventory.remove_one("kalo"));
        assert!(!inventory.contains("kalo"));
        assert!(!inventory.remove_one("kalo"));
        assert_eq!(inventory.total_words(), 1);
        assert_eq!(inventory.distinct_words(), 1);
    }
}
