//! The full state snapshot handed to the transport after every accepted
//! mutating action, and re-emitted to a reconnecting participant.
//!
//! Serializes with camelCase keys so existing renderers consume it as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;
use crate::game::{Game, Phase, Roll};
use crate::ledger::Population;
use crate::log::EventEntry;
use crate::resources::ResourcePile;
use crate::track::{track, FieldKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub color: String,
    pub corner_id: String,
    pub position_index: usize,
    pub population: Population,
    pub dominion_points: u32,
    pub defense_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSnapshot {
    pub player_id: String,
    #[serde(rename = "type")]
    pub kind: BuildingKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSnapshot {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub number: Option<u8>,
    pub buildings: Vec<BuildingSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub tiles: Vec<TileSnapshot>,
    pub blocked_tile_id: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackFieldSnapshot {
    pub index: usize,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub game_id: String,
    pub phase: Phase,
    pub players: Vec<PlayerSnapshot>,
    pub current_turn_player_id: Option<String>,
    pub creator_id: Option<String>,
    pub resources: BTreeMap<String, ResourcePile>,
    pub last_roll: Option<Roll>,
    pub extra_turn: bool,
    pub event_log: Vec<EventEntry>,
    pub board: Option<BoardSnapshot>,
    pub position_index_by_player_id: BTreeMap<String, usize>,
    pub track: Vec<TrackFieldSnapshot>,
    /// Milliseconds since the Unix epoch, if the match started.
    pub match_start_time: Option<i64>,
}

impl GameSnapshot {
    /// Captures the complete observable state of a game.
    pub fn capture(game: &Game) -> Self {
        let players: Vec<PlayerSnapshot> = game
            .players()
            .iter()
            .map(|p| {
                let account = game.ledger().account(&p.id);
                PlayerSnapshot {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    color: p.color.to_string(),
                    corner_id: p.corner.label().to_string(),
                    position_index: p.position,
                    population: account.map(|a| a.population).unwrap_or(Population {
                        max: 0,
                        used: 0,
                    }),
                    dominion_points: account.map(|a| a.dominion_points).unwrap_or(0),
                    defense_level: account.map(|a| a.defense_level).unwrap_or(0),
                }
            })
            .collect();

        let resources: BTreeMap<String, ResourcePile> = game
            .ledger()
            .iter()
            .map(|(id, account)| (id.clone(), account.resources.clone()))
            .collect();

        let position_index_by_player_id: BTreeMap<String, usize> = game
            .players()
            .iter()
            .map(|p| (p.id.clone(), p.position))
            .collect();

        let board = game.board().map(|board| BoardSnapshot {
            tiles: board
                .tiles
                .iter()
                .map(|t| TileSnapshot {
                    id: t.id,
                    kind: t.kind.name().to_string(),
                    number: t.number,
                    buildings: t
                        .buildings
                        .iter()
                        .map(|b| BuildingSnapshot {
                            player_id: b.player_id.clone(),
                            kind: b.kind,
                        })
                        .collect(),
                })
                .collect(),
            blocked_tile_id: board.blocked_tile_id,
        });

        let track = track()
            .iter()
            .map(|field| match field.kind {
                FieldKind::Resource(resource) => TrackFieldSnapshot {
                    index: field.index,
                    kind: "resource".to_string(),
                    resource_type: Some(resource.name().to_string()),
                    corner_id: None,
                },
                FieldKind::Corner(corner) => TrackFieldSnapshot {
                    index: field.index,
                    kind: "corner".to_string(),
                    resource_type: None,
                    corner_id: Some(corner.label().to_string()),
                },
            })
            .collect();

        GameSnapshot {
            game_id: game.id().to_string(),
            phase: game.phase(),
            players,
            current_turn_player_id: game.current_player_id().map(str::to_string),
            creator_id: game.creator_id().map(str::to_string),
            resources,
            last_roll: game.last_roll(),
            extra_turn: game.extra_turn(),
            event_log: game.events().to_vec(),
            board,
            position_index_by_player_id,
            track,
            match_start_time: game.match_start_time().map(|t| t.timestamp_millis()),
        }
    }
}
