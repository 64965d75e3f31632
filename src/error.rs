//! The returned error taxonomy.
//!
//! Every public operation returns these instead of panicking; a failed
//! validation aborts the call with no state mutated, and the transport layer
//! surfaces the message to the acting participant verbatim.

use thiserror::Error;

use crate::buildings::BuildingKind;
use crate::game::Phase;
use crate::resources::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("not the {expected} phase")]
    WrongPhase { expected: Phase },

    #[error("only the current player can act")]
    NotYourTurn,

    #[error("only the creator can start the match")]
    NotCreator,

    #[error("need at least {min} players to start")]
    InsufficientPlayers { min: usize },

    #[error("game is full")]
    GameFull,

    #[error("game not found")]
    GameNotFound,

    #[error("player is not part of this game")]
    UnknownPlayer,

    #[error("invalid building type")]
    InvalidBuildingType,

    #[error("invalid tile")]
    InvalidTile,

    #[error("a building is already present on this tile")]
    TileOccupied,

    #[error("{upgrade} must upgrade an existing {requires}")]
    UpgradePrerequisiteNotMet {
        upgrade: BuildingKind,
        requires: BuildingKind,
    },

    #[error("not enough {resource}: need {need}, have {have}")]
    InsufficientResources {
        resource: Resource,
        need: u32,
        have: u32,
    },

    #[error("not enough population capacity: need {need}, have {max}")]
    InsufficientPopulation { need: u32, max: u32 },

    #[error("already rolled this turn")]
    AlreadyRolledThisTurn,

    /// Kept for the manual block variant's contract: the Market can never be
    /// the blocked tile. The automatic selector enforces the same rule by
    /// filtering candidates.
    #[error("cannot block the Market tile")]
    CannotBlockSpecialTile,

    #[error("game already ended")]
    GameAlreadyEnded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_shortfall() {
        let err = ActionError::InsufficientResources {
            resource: Resource::Gold,
            need: 2,
            have: 0,
        };
        assert_eq!(err.to_string(), "not enough gold: need 2, have 0");

        let err = ActionError::UpgradePrerequisiteNotMet {
            upgrade: BuildingKind::Citadel,
            requires: BuildingKind::Outpost,
        };
        assert_eq!(err.to_string(), "citadel must upgrade an existing outpost");
    }
}
