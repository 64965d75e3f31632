//! The breach: the disruption fired by a roll totalling seven.
//!
//! Every player except the roller takes a resource hit unless immune, then
//! one random tile's production is suppressed until a later breach moves the
//! block elsewhere.

use crate::board::Board;
use crate::buildings::BuildingKind;
use crate::ledger::Ledger;
use crate::rng::RandomSource;

/// Roll total that fires the breach.
pub const BREACH_TOTAL: u8 = 7;

/// Loss for an ordinary player.
const BASE_LOSS: u32 = 2;
/// Loss for a high-scoring, under-defended player.
const RAISED_LOSS: u32 = 4;
/// Dominion points at which the raised loss starts applying.
const RAISED_LOSS_MIN_POINTS: u32 = 8;
/// Defense level that wards off the raised loss.
const RAISED_LOSS_SAFE_DEFENSE: u32 = 2;

/// Why a player took no losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Immunity {
    /// Top-tier building anywhere on the board.
    Capital,
    /// Defensive building anywhere on the board.
    Bastion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerOutcome {
    Immune(Immunity),
    /// Units actually discarded (capped at holdings, so possibly zero).
    Lost(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachReport {
    /// Outcome per non-rolling player, in turn order.
    pub outcomes: Vec<(String, PlayerOutcome)>,
    /// The newly blocked tile.
    pub blocked_tile_id: Option<usize>,
}

/// Resolves a breach rolled by `roller_id`. `player_order` is the seating
/// order; the roller is skipped. Losses are removed by weighted-random
/// single-unit discards, then a uniformly random non-Market, unblocked tile
/// becomes the new blocked tile.
pub fn resolve(
    roller_id: &str,
    player_order: &[String],
    board: &mut Board,
    ledger: &mut Ledger,
    rng: &mut dyn RandomSource,
) -> BreachReport {
    let mut outcomes = Vec::new();
    for player_id in player_order {
        if player_id == roller_id {
            continue;
        }
        let outcome = resolve_player(player_id, board, ledger, rng);
        outcomes.push((player_id.clone(), outcome));
    }

    let candidates = board.blockable_tile_ids();
    let blocked_tile_id = if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.index(candidates.len())])
    };
    if blocked_tile_id.is_some() {
        board.blocked_tile_id = blocked_tile_id;
    }

    BreachReport {
        outcomes,
        blocked_tile_id,
    }
}

fn resolve_player(
    player_id: &str,
    board: &Board,
    ledger: &mut Ledger,
    rng: &mut dyn RandomSource,
) -> PlayerOutcome {
    if board.player_has_building(player_id, BuildingKind::Capital) {
        return PlayerOutcome::Immune(Immunity::Capital);
    }
    if board.player_has_building(player_id, BuildingKind::Bastion) {
        return PlayerOutcome::Immune(Immunity::Bastion);
    }

    let account = match ledger.account_mut(player_id) {
        Some(account) => account,
        None => return PlayerOutcome::Lost(0),
    };

    let loss = if account.dominion_points >= RAISED_LOSS_MIN_POINTS
        && account.defense_level < RAISED_LOSS_SAFE_DEFENSE
    {
        RAISED_LOSS
    } else {
        BASE_LOSS
    };
    let removed = account.resources.discard_random(loss, rng);
    PlayerOutcome::Lost(removed)
}
