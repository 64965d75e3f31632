//! Hex board generation.
//!
//! 19 tiles laid out in a hex pattern: 18 resource tiles plus the Market.
//! Tile types are shuffled into id positions, then the 18 number tokens are
//! dealt so that no two hex-adjacent tiles both carry a hot number (6 or 8).
//! The dealing is a bounded retry loop; on exhaustion the last assignment is
//! accepted and flagged.

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingKind};
use crate::resources::Resource;
use crate::rng::{shuffle, RandomSource};

/// Total tiles on the board, Market included.
pub const TILE_COUNT: usize = 19;

/// Tiles per resource type.
const TILE_DISTRIBUTION: [(Resource, usize); 5] = [
    (Resource::Stone, 5),
    (Resource::Food, 4),
    (Resource::Water, 3),
    (Resource::Iron, 3),
    (Resource::Gold, 3),
];

/// Number tokens for the 18 resource tiles, weighted toward middling sums
/// the way two dice land. No 7: that total triggers the breach instead.
const NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// The two highest-frequency tokens, kept apart on the board.
const HOT_NUMBERS: [u8; 2] = [6, 8];

/// Shuffle attempts before accepting a constraint-violating assignment.
const MAX_NUMBERING_ATTEMPTS: usize = 100;

/// Neighbors of each tile id in the hex layout. Tile 4 sits at the inner
/// center of the upper half, tile 18 at the bottom.
const HEX_ADJACENCY: [&[usize]; TILE_COUNT] = [
    &[1, 3, 4],
    &[0, 2, 4, 5],
    &[1, 5, 6],
    &[0, 4, 7, 8],
    &[0, 1, 3, 5, 8, 9],
    &[1, 2, 4, 6, 9, 10],
    &[2, 5, 10, 11],
    &[3, 8, 12, 13],
    &[3, 4, 7, 9, 13, 14],
    &[4, 5, 8, 10, 14, 15],
    &[5, 6, 9, 11, 15, 16],
    &[6, 10, 16, 17],
    &[7, 13, 18],
    &[7, 8, 12, 14, 18],
    &[8, 9, 13, 15, 18],
    &[9, 10, 14, 16, 18],
    &[10, 11, 15, 17, 18],
    &[11, 16, 18],
    &[12, 13, 14, 15, 16, 17],
];

/// What a tile produces, or Market for the single special tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Resource(Resource),
    Market,
}

impl TileKind {
    pub const fn name(self) -> &'static str {
        match self {
            TileKind::Resource(r) => r.name(),
            TileKind::Market => "market",
        }
    }
}

impl std::fmt::Display for TileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: usize,
    pub kind: TileKind,
    pub number: Option<u8>,
    pub buildings: Vec<Building>,
}

impl Tile {
    pub fn building_of(&self, player_id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.player_id == player_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub tiles: Vec<Tile>,
    pub blocked_tile_id: Option<usize>,
    /// True when the number dealer exhausted its retry budget and accepted a
    /// constraint-violating layout.
    pub numbering_fallback: bool,
}

impl Board {
    /// Generates a fresh board: shuffled tile types, numbers dealt under the
    /// hot-number adjacency constraint, nothing blocked.
    pub fn generate(rng: &mut dyn RandomSource) -> Self {
        let mut kinds: Vec<TileKind> = Vec::with_capacity(TILE_COUNT);
        for (resource, count) in TILE_DISTRIBUTION {
            kinds.extend(std::iter::repeat(TileKind::Resource(resource)).take(count));
        }
        kinds.push(TileKind::Market);
        shuffle(rng, &mut kinds);

        let mut tiles: Vec<Tile> = kinds
            .into_iter()
            .enumerate()
            .map(|(id, kind)| Tile {
                id,
                kind,
                number: None,
                buildings: Vec::new(),
            })
            .collect();

        let numbering_fallback = deal_numbers(&mut tiles, rng);

        Board {
            tiles,
            blocked_tile_id: None,
            numbering_fallback,
        }
    }

    pub fn tile(&self, id: usize) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn tile_mut(&mut self, id: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }

    /// Whether `player_id` has a building of `kind` anywhere on the board.
    pub fn player_has_building(&self, player_id: &str, kind: BuildingKind) -> bool {
        self.tiles.iter().any(|tile| {
            tile.buildings
                .iter()
                .any(|b| b.player_id == player_id && b.kind == kind)
        })
    }

    /// Tile ids eligible to become the blocked tile: not the Market and not
    /// already blocked.
    pub fn blockable_tile_ids(&self) -> Vec<usize> {
        self.tiles
            .iter()
            .filter(|t| t.kind != TileKind::Market && Some(t.id) != self.blocked_tile_id)
            .map(|t| t.id)
            .collect()
    }

    /// Checks the hot-number adjacency constraint over the whole board.
    pub fn hot_numbers_separated(&self) -> bool {
        for tile in &self.tiles {
            if !is_hot(tile.number) {
                continue;
            }
            for &neighbor in HEX_ADJACENCY[tile.id] {
                if is_hot(self.tiles[neighbor].number) {
                    return false;
                }
            }
        }
        true
    }
}

fn is_hot(number: Option<u8>) -> bool {
    matches!(number, Some(n) if HOT_NUMBERS.contains(&n))
}

/// Deals the token multiset onto non-Market tiles, retrying the shuffle until
/// the hot-number constraint holds or the budget runs out. Returns true when
/// the fallback assignment had to be accepted.
fn deal_numbers(tiles: &mut [Tile], rng: &mut dyn RandomSource) -> bool {
    let slots: Vec<usize> = tiles
        .iter()
        .filter(|t| t.kind != TileKind::Market)
        .map(|t| t.id)
        .collect();

    let mut tokens = NUMBER_TOKENS;
    for _ in 0..MAX_NUMBERING_ATTEMPTS {
        shuffle(rng, &mut tokens);
        assign(tiles, &slots, &tokens);
        if constraint_holds(tiles) {
            return false;
        }
    }

    // Best effort: keep the last attempt rather than failing the match.
    shuffle(rng, &mut tokens);
    assign(tiles, &slots, &tokens);
    true
}

fn assign(tiles: &mut [Tile], slots: &[usize], tokens: &[u8; 18]) {
    for (slot, token) in slots.iter().zip(tokens) {
        tiles[*slot].number = Some(*token);
    }
}

fn constraint_holds(tiles: &[Tile]) -> bool {
    for tile in tiles {
        if !is_hot(tile.number) {
            continue;
        }
        for &neighbor in HEX_ADJACENCY[tile.id] {
            if is_hot(tiles[neighbor].number) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;

    #[test]
    fn adjacency_table_is_symmetric() {
        for (id, neighbors) in HEX_ADJACENCY.iter().enumerate() {
            for &n in *neighbors {
                assert!(
                    HEX_ADJACENCY[n].contains(&id),
                    "adjacency {id}->{n} missing its reverse"
                );
            }
        }
    }

    #[test]
    fn generated_board_has_expected_composition() {
        let mut rng = SeededSource::new(1);
        let board = Board::generate(&mut rng);
        assert_eq!(board.tiles.len(), TILE_COUNT);
        assert_eq!(board.blocked_tile_id, None);

        let markets = board
            .tiles
            .iter()
            .filter(|t| t.kind == TileKind::Market)
            .count();
        assert_eq!(markets, 1);

        for tile in &board.tiles {
            match tile.kind {
                TileKind::Market => assert_eq!(tile.number, None),
                TileKind::Resource(_) => assert!(tile.number.is_some()),
            }
            assert!(tile.buildings.is_empty());
        }

        let mut numbers: Vec<u8> = board.tiles.iter().filter_map(|t| t.number).collect();
        numbers.sort_unstable();
        let mut expected = NUMBER_TOKENS.to_vec();
        expected.sort_unstable();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn hot_numbers_are_separated_unless_flagged() {
        for seed in 0..200 {
            let mut rng = SeededSource::new(seed);
            let board = Board::generate(&mut rng);
            if board.numbering_fallback {
                // Tolerated edge case: budget exhausted, layout accepted as-is.
                continue;
            }
            assert!(
                board.hot_numbers_separated(),
                "seed {seed} produced adjacent hot numbers without the fallback flag"
            );
        }
    }

    #[test]
    fn blockable_tiles_exclude_market_and_current_block() {
        let mut rng = SeededSource::new(3);
        let mut board = Board::generate(&mut rng);
        let candidates = board.blockable_tile_ids();
        assert_eq!(candidates.len(), TILE_COUNT - 1);

        let blocked = candidates[0];
        board.blocked_tile_id = Some(blocked);
        let next = board.blockable_tile_ids();
        assert_eq!(next.len(), TILE_COUNT - 2);
        assert!(!next.contains(&blocked));
    }
}
