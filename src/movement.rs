//! Token movement and landing resolution.
//!
//! The landed field is the single authoritative trigger for movement-based
//! resource gain: a resource field grants one unit of its type, and a corner
//! owned by another player collects a one-unit toll. There is no parallel
//! "roll matches tile number" production path.

use std::collections::HashMap;

use crate::ledger::Ledger;
use crate::resources::Resource;
use crate::track::{track, CornerId, FieldKind, TRACK_LEN};

/// New position after walking `steps` fields clockwise.
pub fn advance(position: usize, steps: u8) -> usize {
    (position + steps as usize) % TRACK_LEN
}

/// What happened when the token came to rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingOutcome {
    /// Landed on a resource field: one unit gained.
    ResourceGain { resource: Resource },
    /// Landed on another player's corner and paid the toll.
    TollPaid { owner_id: String, resource: Resource },
    /// Landed on another player's corner holding nothing to pay with.
    TollWaived { owner_id: String },
    /// Landed on the mover's own corner; no economic effect.
    OwnCorner { corner: CornerId },
    /// Landed on a corner nobody owns; no economic effect.
    UnownedCorner { corner: CornerId },
}

/// Resolves the effect of `mover_id`'s token resting at `position`,
/// mutating the ledger accordingly. Runs exactly once per accepted roll;
/// the caller's turn-sequence guard provides that idempotence.
pub fn resolve_landing(
    mover_id: &str,
    position: usize,
    corner_owners: &HashMap<CornerId, String>,
    ledger: &mut Ledger,
) -> LandingOutcome {
    let field = &track()[position];
    match field.kind {
        FieldKind::Resource(resource) => {
            if let Some(account) = ledger.account_mut(mover_id) {
                account.resources.gain(resource, 1);
            }
            LandingOutcome::ResourceGain { resource }
        }
        FieldKind::Corner(corner) => match corner_owners.get(&corner) {
            Some(owner_id) if owner_id != mover_id => {
                collect_toll(mover_id, owner_id, ledger)
            }
            Some(_) => LandingOutcome::OwnCorner { corner },
            None => LandingOutcome::UnownedCorner { corner },
        },
    }
}

/// Pays one unit of the first held resource (canonical priority order) to
/// the corner's owner. Holding nothing waives the toll.
fn collect_toll(mover_id: &str, owner_id: &str, ledger: &mut Ledger) -> LandingOutcome {
    let payment = ledger
        .account(mover_id)
        .and_then(|account| account.resources.first_held());
    match payment {
        Some(resource) => {
            if let Some(mover) = ledger.account_mut(mover_id) {
                mover.resources.spend(resource, 1);
            }
            if let Some(owner) = ledger.account_mut(owner_id) {
                owner.resources.gain(resource, 1);
            }
            LandingOutcome::TollPaid {
                owner_id: owner_id.to_string(),
                resource,
            }
        }
        None => LandingOutcome::TollWaived {
            owner_id: owner_id.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.open_account("a");
        ledger.open_account("b");
        ledger
    }

    #[test]
    fn advance_wraps_around_the_loop() {
        assert_eq!(advance(0, 5), 5);
        assert_eq!(advance(24, 4), 2);
        assert_eq!(advance(25, 1), 0);
    }

    #[test]
    fn resource_field_grants_one_unit() {
        let mut ledger = two_player_ledger();
        let owners = HashMap::new();
        // Track index 0 is a stone field.
        let outcome = resolve_landing("a", 0, &owners, &mut ledger);
        assert_eq!(
            outcome,
            LandingOutcome::ResourceGain {
                resource: Resource::Stone
            }
        );
        assert_eq!(ledger.account("a").map(|acc| acc.resources.stone), Some(1));
    }

    #[test]
    fn foreign_corner_collects_priority_toll() {
        let mut ledger = two_player_ledger();
        if let Some(account) = ledger.account_mut("a") {
            account.resources.gain(Resource::Gold, 2);
            account.resources.gain(Resource::Iron, 1);
        }
        let mut owners = HashMap::new();
        owners.insert(CornerId::Tr, "b".to_string());

        let outcome = resolve_landing("a", CornerId::Tr.track_index(), &owners, &mut ledger);
        // Iron precedes gold in the canonical priority order.
        assert_eq!(
            outcome,
            LandingOutcome::TollPaid {
                owner_id: "b".to_string(),
                resource: Resource::Iron,
            }
        );
        assert_eq!(ledger.account("a").map(|acc| acc.resources.iron), Some(0));
        assert_eq!(ledger.account("b").map(|acc| acc.resources.iron), Some(1));
    }

    #[test]
    fn empty_handed_toll_is_waived() {
        let mut ledger = two_player_ledger();
        let mut owners = HashMap::new();
        owners.insert(CornerId::Bl, "b".to_string());

        let outcome = resolve_landing("a", CornerId::Bl.track_index(), &owners, &mut ledger);
        assert_eq!(
            outcome,
            LandingOutcome::TollWaived {
                owner_id: "b".to_string()
            }
        );
        assert_eq!(ledger.account("b").map(|acc| acc.resources.total()), Some(0));
    }

    #[test]
    fn own_and_unowned_corners_are_inert() {
        let mut ledger = two_player_ledger();
        if let Some(account) = ledger.account_mut("a") {
            account.resources.gain(Resource::Food, 1);
        }
        let mut owners = HashMap::new();
        owners.insert(CornerId::Tl, "a".to_string());

        let own = resolve_landing("a", CornerId::Tl.track_index(), &owners, &mut ledger);
        assert_eq!(own, LandingOutcome::OwnCorner { corner: CornerId::Tl });

        let unowned = resolve_landing("a", CornerId::Br.track_index(), &owners, &mut ledger);
        assert_eq!(
            unowned,
            LandingOutcome::UnownedCorner {
                corner: CornerId::Br
            }
        );
        assert_eq!(ledger.account("a").map(|acc| acc.resources.total()), Some(1));
    }
}
