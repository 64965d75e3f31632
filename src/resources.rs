//! Resource types and per-player resource piles.

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

/// The five producible resource types.
///
/// The declaration order is canonical: it drives the round-robin typing of
/// track fields and the payment priority when a corner toll is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Stone,
    Iron,
    Food,
    Water,
    Gold,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Stone,
        Resource::Iron,
        Resource::Food,
        Resource::Water,
        Resource::Gold,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Resource::Stone => "stone",
            Resource::Iron => "iron",
            Resource::Food => "food",
            Resource::Water => "water",
            Resource::Gold => "gold",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A player's held resources. Counts never go below zero; over-spends are
/// rejected without mutating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePile {
    #[serde(default)]
    pub stone: u32,
    #[serde(default)]
    pub iron: u32,
    #[serde(default)]
    pub food: u32,
    #[serde(default)]
    pub water: u32,
    #[serde(default)]
    pub gold: u32,
}

impl ResourcePile {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn count(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Stone => self.stone,
            Resource::Iron => self.iron,
            Resource::Food => self.food,
            Resource::Water => self.water,
            Resource::Gold => self.gold,
        }
    }

    fn count_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Stone => &mut self.stone,
            Resource::Iron => &mut self.iron,
            Resource::Food => &mut self.food,
            Resource::Water => &mut self.water,
            Resource::Gold => &mut self.gold,
        }
    }

    pub fn total(&self) -> u32 {
        Resource::ALL.iter().map(|r| self.count(*r)).sum()
    }

    pub fn gain(&mut self, resource: Resource, amount: u32) {
        *self.count_mut(resource) += amount;
    }

    /// Removes `amount` of `resource`. Returns false (and leaves the pile
    /// untouched) when the pile holds less than `amount`.
    pub fn spend(&mut self, resource: Resource, amount: u32) -> bool {
        let slot = self.count_mut(resource);
        if *slot < amount {
            return false;
        }
        *slot -= amount;
        true
    }

    /// Adds every count of `other` to this pile.
    pub fn gain_all(&mut self, other: &ResourcePile) {
        for resource in Resource::ALL {
            self.gain(resource, other.count(resource));
        }
    }

    /// The first resource (canonical order) with at least one unit held.
    pub fn first_held(&self) -> Option<Resource> {
        Resource::ALL.into_iter().find(|r| self.count(*r) > 0)
    }

    /// Discards up to `count` single units, each drawn uniformly from the
    /// units currently held (so larger stacks lose more often). Returns the
    /// units actually removed.
    pub fn discard_random(&mut self, count: u32, rng: &mut dyn RandomSource) -> u32 {
        let mut units: Vec<Resource> = Vec::with_capacity(self.total() as usize);
        for resource in Resource::ALL {
            for _ in 0..self.count(resource) {
                units.push(resource);
            }
        }
        let mut removed = 0;
        while removed < count && !units.is_empty() {
            let idx = rng.index(units.len());
            let resource = units.swap_remove(idx);
            *self.count_mut(resource) -= 1;
            removed += 1;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;

    #[test]
    fn spend_rejects_overdraw_without_mutation() {
        let mut pile = ResourcePile::empty();
        pile.gain(Resource::Stone, 2);
        assert!(!pile.spend(Resource::Stone, 3));
        assert_eq!(pile.stone, 2);
        assert!(pile.spend(Resource::Stone, 2));
        assert_eq!(pile.stone, 0);
    }

    #[test]
    fn first_held_follows_canonical_order() {
        let mut pile = ResourcePile::empty();
        pile.gain(Resource::Gold, 5);
        pile.gain(Resource::Food, 1);
        assert_eq!(pile.first_held(), Some(Resource::Food));
        pile.gain(Resource::Stone, 1);
        assert_eq!(pile.first_held(), Some(Resource::Stone));
    }

    #[test]
    fn discard_random_caps_at_holdings() {
        let mut rng = SeededSource::new(11);
        let mut pile = ResourcePile::empty();
        pile.gain(Resource::Iron, 1);
        pile.gain(Resource::Water, 2);
        let removed = pile.discard_random(10, &mut rng);
        assert_eq!(removed, 3);
        assert_eq!(pile.total(), 0);
    }

    #[test]
    fn discard_random_removes_exact_count() {
        let mut rng = SeededSource::new(7);
        let mut pile = ResourcePile::empty();
        for resource in Resource::ALL {
            pile.gain(resource, 4);
        }
        let removed = pile.discard_random(6, &mut rng);
        assert_eq!(removed, 6);
        assert_eq!(pile.total(), 14);
    }
}
