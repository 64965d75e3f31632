//! The economy ledger: per-player accounts of resources, population,
//! dominion points, and defense level.
//!
//! Pure bookkeeping. Beyond never letting a resource count go below zero,
//! validation belongs to the callers (building placement, landing
//! resolution, the breach handler).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resources::ResourcePile;

/// Default population record for a new account.
pub const STARTING_POPULATION_MAX: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub max: u32,
    pub used: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAccount {
    pub resources: ResourcePile,
    pub population: Population,
    pub dominion_points: u32,
    pub defense_level: u32,
}

impl PlayerAccount {
    pub fn new() -> Self {
        Self {
            resources: ResourcePile::empty(),
            population: Population {
                max: STARTING_POPULATION_MAX,
                used: 0,
            },
            dominion_points: 0,
            defense_level: 0,
        }
    }
}

impl Default for PlayerAccount {
    fn default() -> Self {
        Self::new()
    }
}

/// All accounts of one game, keyed by player id. Ordered map so snapshots
/// and iteration are stable.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    accounts: BTreeMap<String, PlayerAccount>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the account for a joining player; a no-op when it exists.
    pub fn open_account(&mut self, player_id: &str) {
        self.accounts
            .entry(player_id.to_string())
            .or_insert_with(PlayerAccount::new);
    }

    pub fn account(&self, player_id: &str) -> Option<&PlayerAccount> {
        self.accounts.get(player_id)
    }

    pub fn account_mut(&mut self, player_id: &str) -> Option<&mut PlayerAccount> {
        self.accounts.get_mut(player_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PlayerAccount)> {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resource;

    #[test]
    fn open_account_is_idempotent() {
        let mut ledger = Ledger::new();
        ledger.open_account("p1");
        if let Some(account) = ledger.account_mut("p1") {
            account.resources.gain(Resource::Food, 3);
        }
        ledger.open_account("p1");
        assert_eq!(
            ledger.account("p1").map(|a| a.resources.food),
            Some(3),
            "re-opening must not reset the account"
        );
    }

    #[test]
    fn new_account_has_default_population() {
        let account = PlayerAccount::new();
        assert_eq!(account.population.max, STARTING_POPULATION_MAX);
        assert_eq!(account.population.used, 0);
        assert_eq!(account.resources.total(), 0);
        assert_eq!(account.dominion_points, 0);
        assert_eq!(account.defense_level, 0);
    }
}
