//! Building kinds, the upgrade chain, and placement.
//!
//! Outpost and bastion are base constructions on an empty tile; citadel and
//! capital are in-place upgrades of the preceding tier. The bastion sits
//! outside the chain and raises defense instead of dominion points.

use serde::{Deserialize, Serialize};

use crate::board::Tile;
use crate::error::ActionError;
use crate::ledger::PlayerAccount;
use crate::resources::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Outpost,
    Citadel,
    Capital,
    Bastion,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Outpost,
        BuildingKind::Citadel,
        BuildingKind::Capital,
        BuildingKind::Bastion,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BuildingKind::Outpost => "outpost",
            BuildingKind::Citadel => "citadel",
            BuildingKind::Capital => "capital",
            BuildingKind::Bastion => "bastion",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ActionError> {
        match s {
            "outpost" => Ok(BuildingKind::Outpost),
            "citadel" => Ok(BuildingKind::Citadel),
            "capital" => Ok(BuildingKind::Capital),
            "bastion" => Ok(BuildingKind::Bastion),
            _ => Err(ActionError::InvalidBuildingType),
        }
    }

    pub const fn cost(self) -> &'static [(Resource, u32)] {
        match self {
            BuildingKind::Outpost => &[(Resource::Stone, 1), (Resource::Water, 1)],
            BuildingKind::Citadel => &[(Resource::Stone, 2), (Resource::Food, 2)],
            BuildingKind::Capital => &[
                (Resource::Stone, 3),
                (Resource::Iron, 3),
                (Resource::Gold, 2),
            ],
            BuildingKind::Bastion => &[(Resource::Iron, 1), (Resource::Food, 1)],
        }
    }

    /// The tier this kind upgrades in place, if it is upgrade-only.
    pub const fn upgrades_from(self) -> Option<BuildingKind> {
        match self {
            BuildingKind::Citadel => Some(BuildingKind::Outpost),
            BuildingKind::Capital => Some(BuildingKind::Citadel),
            BuildingKind::Outpost | BuildingKind::Bastion => None,
        }
    }

    /// Population used by a base construction.
    pub const fn population_required(self) -> u32 {
        match self {
            BuildingKind::Outpost | BuildingKind::Bastion => 1,
            BuildingKind::Citadel | BuildingKind::Capital => 0,
        }
    }

    /// Population capacity granted by an upgrade.
    pub const fn population_capacity(self) -> u32 {
        match self {
            BuildingKind::Citadel => 2,
            BuildingKind::Capital => 3,
            BuildingKind::Outpost | BuildingKind::Bastion => 0,
        }
    }

    pub const fn dominion_points(self) -> u32 {
        match self {
            BuildingKind::Outpost => 1,
            BuildingKind::Citadel => 2,
            BuildingKind::Capital => 4,
            BuildingKind::Bastion => 0,
        }
    }

    pub const fn defense(self) -> u32 {
        match self {
            BuildingKind::Bastion => 1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One building record on a tile. At most one per (tile, player); upgrades
/// mutate `kind` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub player_id: String,
    pub kind: BuildingKind,
}

/// Validates and applies a construction or upgrade for `player_id` on
/// `tile`, charging `account`. All checks run before any mutation, so a
/// failure leaves tile and account exactly as they were.
pub fn place(
    tile: &mut Tile,
    account: &mut PlayerAccount,
    player_id: &str,
    kind: BuildingKind,
) -> Result<(), ActionError> {
    let existing = tile.building_of(player_id).map(|b| b.kind);
    let foreign = tile.buildings.iter().any(|b| b.player_id != player_id);

    let prior = match kind.upgrades_from() {
        Some(requires) => {
            if existing != Some(requires) {
                return Err(ActionError::UpgradePrerequisiteNotMet {
                    upgrade: kind,
                    requires,
                });
            }
            Some(requires)
        }
        None => {
            if existing.is_some() || foreign {
                return Err(ActionError::TileOccupied);
            }
            None
        }
    };

    for &(resource, need) in kind.cost() {
        let have = account.resources.count(resource);
        if have < need {
            return Err(ActionError::InsufficientResources {
                resource,
                need,
                have,
            });
        }
    }

    let pop_needed = kind.population_required();
    if pop_needed > 0 && account.population.used + pop_needed > account.population.max {
        return Err(ActionError::InsufficientPopulation {
            need: account.population.used + pop_needed,
            max: account.population.max,
        });
    }

    // Validation complete; apply atomically.
    for &(resource, need) in kind.cost() {
        account.resources.spend(resource, need);
    }

    match prior {
        Some(prior) => {
            account.dominion_points -= prior.dominion_points();
            account.population.used -= prior.population_required();
            account.population.max += kind.population_capacity();
            if let Some(record) = tile
                .buildings
                .iter_mut()
                .find(|b| b.player_id == player_id)
            {
                record.kind = kind;
            }
        }
        None => {
            account.population.used += pop_needed;
            tile.buildings.push(Building {
                player_id: player_id.to_string(),
                kind,
            });
        }
    }
    account.dominion_points += kind.dominion_points();
    account.defense_level += kind.defense();

    Ok(())
}
