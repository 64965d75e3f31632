//! The per-game aggregate and turn/phase state machine.
//!
//! One `Game` owns everything mutable about a match and is mutated
//! synchronously, entirely within the call that receives a player action.
//! Callers must serialize access per game id; see the registry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::breach::{self, BreachReport, Immunity, PlayerOutcome, BREACH_TOTAL};
use crate::buildings::{self, BuildingKind};
use crate::config::GameRules;
use crate::error::ActionError;
use crate::ledger::Ledger;
use crate::log::EventLog;
use crate::movement::{advance, resolve_landing, LandingOutcome};
use crate::rng::RandomSource;
use crate::track::{CornerId, COLOR_POOL};

/// Where a game is in its lifecycle. Exactly one player is current whenever
/// the phase is neither `lobby` nor `ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Roll,
    Main,
    Ended,
}

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Lobby => "lobby",
            Phase::Roll => "roll",
            Phase::Main => "main",
            Phase::Ended => "ended",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A seated player: identity plus the per-match assignments made at join.
#[derive(Debug, Clone)]
pub struct PlayerSeat {
    pub id: String,
    pub name: String,
    pub color: &'static str,
    pub corner: CornerId,
    pub position: usize,
}

/// An accepted dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roll {
    pub d1: u8,
    pub d2: u8,
    pub total: u8,
    pub is_double: bool,
}

/// Everything a single accepted roll did.
#[derive(Debug, Clone)]
pub struct RollOutcome {
    pub roll: Roll,
    pub landing: LandingOutcome,
    pub breach: Option<BreachReport>,
}

#[derive(Debug, Clone)]
pub struct EndTurnOutcome {
    /// True when doubles granted the same player another turn.
    pub repeated: bool,
    pub next_player_id: String,
}

pub struct Game {
    id: String,
    rules: GameRules,
    rng: Box<dyn RandomSource>,
    phase: Phase,
    players: Vec<PlayerSeat>,
    creator_id: Option<String>,
    current_turn_index: usize,
    /// Monotonic counter, advanced each time the acting player's turn
    /// advances (including repeated turns from doubles).
    turn_seq: u64,
    /// `turn_seq` value of the last accepted roll; the replay guard.
    last_rolled_seq: u64,
    extra_turn: bool,
    last_roll: Option<Roll>,
    match_start_time: Option<DateTime<Utc>>,
    board: Option<Board>,
    corner_owners: HashMap<CornerId, String>,
    ledger: Ledger,
    events: EventLog,
}

impl Game {
    pub fn new(id: impl Into<String>, rules: GameRules, rng: Box<dyn RandomSource>) -> Self {
        let events = EventLog::new(rules.event_log_capacity);
        Self {
            id: id.into(),
            rules,
            rng,
            phase: Phase::Lobby,
            players: Vec::new(),
            creator_id: None,
            current_turn_index: 0,
            turn_seq: 0,
            last_rolled_seq: 0,
            extra_turn: false,
            last_roll: None,
            match_start_time: None,
            board: None,
            corner_owners: HashMap::new(),
            ledger: Ledger::new(),
            events,
        }
    }

    /// Seats a player: unique color and starting corner from the fixed
    /// pools, account opened, first player becomes creator. Idempotent when
    /// the id is already seated (reconnects).
    pub fn add_player(&mut self, id: &str, name: &str) -> Result<(), ActionError> {
        if self.players.iter().any(|p| p.id == id) {
            return Ok(());
        }
        if self.phase != Phase::Lobby {
            return Err(ActionError::WrongPhase {
                expected: Phase::Lobby,
            });
        }
        // The color and corner pools bound seating at four regardless of
        // configured limits.
        if self.players.len() >= self.rules.max_players.min(CornerId::POOL.len()) {
            return Err(ActionError::GameFull);
        }

        let seat = self.players.len();
        let corner = CornerId::POOL[seat];
        let player = PlayerSeat {
            id: id.to_string(),
            name: name.to_string(),
            color: COLOR_POOL[seat],
            corner,
            position: corner.track_index(),
        };
        self.corner_owners.insert(corner, player.id.clone());
        self.ledger.open_account(id);
        if self.creator_id.is_none() {
            self.creator_id = Some(id.to_string());
        }
        self.events.push(format!("{name} joined the game."));
        self.players.push(player);
        Ok(())
    }

    /// Starts the match: generates the board, hands out the starting
    /// bundles, and opens the first roll phase.
    pub fn start_match(&mut self, user_id: &str) -> Result<(), ActionError> {
        if self.phase != Phase::Lobby {
            return Err(ActionError::WrongPhase {
                expected: Phase::Lobby,
            });
        }
        if self.creator_id.as_deref() != Some(user_id) {
            return Err(ActionError::NotCreator);
        }
        if self.players.len() < self.rules.min_players {
            return Err(ActionError::InsufficientPlayers {
                min: self.rules.min_players,
            });
        }

        let board = Board::generate(self.rng.as_mut());
        if board.numbering_fallback {
            self.events
                .push("Board numbering fell back after exhausting retries; hot numbers may touch.");
        }
        self.board = Some(board);

        let bundle = self.rules.starting_resources.clone();
        let bundle_label = crate::config::bundle_label(&bundle);
        for player in &self.players {
            if let Some(account) = self.ledger.account_mut(&player.id) {
                account.resources.gain_all(&bundle);
            }
            self.events.push(format!(
                "{} received starting resources: {bundle_label}.",
                player.name
            ));
        }

        self.phase = Phase::Roll;
        self.current_turn_index = 0;
        self.turn_seq = 1;
        self.last_rolled_seq = 0;
        self.extra_turn = false;
        self.match_start_time = Some(Utc::now());
        let first = self.players[self.current_turn_index].name.clone();
        self.events
            .push(format!("Match started! Board generated. {first} goes first."));
        Ok(())
    }

    /// Draws the dice, moves the token, resolves the landing, and runs the
    /// breach on a total of seven. Accepted at most once per logical turn:
    /// a replayed call for the same turn sequence is rejected, which matters
    /// for reconnect-triggered retries.
    pub fn roll_dice(&mut self, user_id: &str) -> Result<RollOutcome, ActionError> {
        if self.phase != Phase::Roll {
            return Err(ActionError::WrongPhase {
                expected: Phase::Roll,
            });
        }
        let seat = self.current_seat_of(user_id)?;
        if self.last_rolled_seq >= self.turn_seq {
            return Err(ActionError::AlreadyRolledThisTurn);
        }

        let d1 = self.rng.die_face();
        let d2 = self.rng.die_face();
        let roll = Roll {
            d1,
            d2,
            total: d1 + d2,
            is_double: d1 == d2,
        };
        self.last_roll = Some(roll);
        self.last_rolled_seq = self.turn_seq;
        self.extra_turn = roll.is_double;

        let mover = self.players[seat].name.clone();
        self.events
            .push(format!("{mover} rolled {} + {}.", roll.d1, roll.d2));

        let position = advance(self.players[seat].position, roll.total);
        self.players[seat].position = position;
        let landing = resolve_landing(user_id, position, &self.corner_owners, &mut self.ledger);
        self.log_landing(&mover, roll.total, &landing);

        let breach_report = if roll.total == BREACH_TOTAL {
            Some(self.run_breach(user_id, &mover))
        } else {
            None
        };

        if roll.is_double {
            self.events
                .push(format!("Doubles! {mover} gets an extra turn."));
        }
        self.phase = Phase::Main;

        Ok(RollOutcome {
            roll,
            landing,
            breach: breach_report,
        })
    }

    /// Constructs or upgrades a building for the current player.
    pub fn place_building(
        &mut self,
        user_id: &str,
        tile_id: usize,
        kind: BuildingKind,
    ) -> Result<(), ActionError> {
        if self.phase != Phase::Main {
            return Err(ActionError::WrongPhase {
                expected: Phase::Main,
            });
        }
        let seat = self.current_seat_of(user_id)?;

        let board = self.board.as_mut().ok_or(ActionError::InvalidTile)?;
        let tile = board.tile_mut(tile_id).ok_or(ActionError::InvalidTile)?;
        let account = self
            .ledger
            .account_mut(user_id)
            .ok_or(ActionError::UnknownPlayer)?;
        buildings::place(tile, account, user_id, kind)?;

        let tile_kind = tile.kind;
        let name = self.players[seat].name.clone();
        self.events
            .push(format!("{name} built {kind} on tile {tile_id} ({tile_kind})."));
        Ok(())
    }

    /// Ends the main phase. Doubles repeat the same player's turn; either
    /// way the turn sequence advances so a fresh roll is accepted.
    pub fn end_turn(&mut self, user_id: &str) -> Result<EndTurnOutcome, ActionError> {
        if self.phase != Phase::Main {
            return Err(ActionError::WrongPhase {
                expected: Phase::Main,
            });
        }
        self.current_seat_of(user_id)?;

        self.turn_seq += 1;
        self.phase = Phase::Roll;
        if self.extra_turn {
            self.extra_turn = false;
            let name = self.players[self.current_turn_index].name.clone();
            self.events
                .push(format!("{name} ends the extra turn. Rolling again."));
            return Ok(EndTurnOutcome {
                repeated: true,
                next_player_id: user_id.to_string(),
            });
        }

        self.current_turn_index = (self.current_turn_index + 1) % self.players.len();
        let next = self.players[self.current_turn_index].clone();
        self.events.push(format!("Turn passed to {}.", next.name));
        Ok(EndTurnOutcome {
            repeated: false,
            next_player_id: next.id,
        })
    }

    /// Terminal transition driven by the external scheduler.
    pub fn end_due_to_inactivity(&mut self) -> Result<(), ActionError> {
        if self.phase == Phase::Ended {
            return Err(ActionError::GameAlreadyEnded);
        }
        self.phase = Phase::Ended;
        self.events.push("Game ended due to inactivity.");
        Ok(())
    }

    fn run_breach(&mut self, roller_id: &str, roller_name: &str) -> BreachReport {
        self.events
            .push(format!("Breach! (rolled {BREACH_TOTAL}) {roller_name} is spared."));
        let order: Vec<String> = self.players.iter().map(|p| p.id.clone()).collect();
        let board = match self.board.as_mut() {
            Some(board) => board,
            None => {
                return BreachReport {
                    outcomes: Vec::new(),
                    blocked_tile_id: None,
                }
            }
        };
        let report = breach::resolve(roller_id, &order, board, &mut self.ledger, self.rng.as_mut());

        for (player_id, outcome) in &report.outcomes {
            let name = self.player_name(player_id);
            match outcome {
                PlayerOutcome::Immune(Immunity::Capital) => {
                    self.events.push(format!("{name} is immune (has capital)."));
                }
                PlayerOutcome::Immune(Immunity::Bastion) => {
                    self.events.push(format!("{name} is protected by a bastion."));
                }
                PlayerOutcome::Lost(0) => {}
                PlayerOutcome::Lost(n) => {
                    self.events
                        .push(format!("{name} lost {n} resource(s) in the breach."));
                }
            }
        }
        if let Some(blocked) = report.blocked_tile_id {
            let label = self
                .board
                .as_ref()
                .and_then(|b| b.tile(blocked))
                .map(|t| t.kind.name())
                .unwrap_or("unknown");
            self.events
                .push(format!("The breach blocked tile {blocked} ({label})."));
        }
        report
    }

    fn log_landing(&mut self, mover: &str, steps: u8, landing: &LandingOutcome) {
        match landing {
            LandingOutcome::ResourceGain { resource } => {
                self.events.push(format!(
                    "{mover} moved {steps} fields and picked up 1 {resource}."
                ));
            }
            LandingOutcome::TollPaid { owner_id, resource } => {
                let owner = self.player_name(owner_id);
                self.events.push(format!(
                    "{mover} landed on {owner}'s corner and paid a 1 {resource} toll."
                ));
            }
            LandingOutcome::TollWaived { owner_id } => {
                let owner = self.player_name(owner_id);
                self.events.push(format!(
                    "{mover} landed on {owner}'s corner with nothing to pay."
                ));
            }
            LandingOutcome::OwnCorner { .. } => {
                self.events.push(format!("{mover} rests at their own corner."));
            }
            LandingOutcome::UnownedCorner { .. } => {
                self.events
                    .push(format!("{mover} landed on an unclaimed corner."));
            }
        }
    }

    fn player_name(&self, player_id: &str) -> String {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| player_id.to_string())
    }

    /// Validates that `user_id` is the current player and returns their
    /// seat index.
    fn current_seat_of(&self, user_id: &str) -> Result<usize, ActionError> {
        match self.players.get(self.current_turn_index) {
            Some(seat) if seat.id == user_id => Ok(self.current_turn_index),
            _ => Err(ActionError::NotYourTurn),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[PlayerSeat] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerSeat> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn creator_id(&self) -> Option<&str> {
        self.creator_id.as_deref()
    }

    pub fn current_player_id(&self) -> Option<&str> {
        if self.phase == Phase::Lobby || self.phase == Phase::Ended {
            return None;
        }
        self.players
            .get(self.current_turn_index)
            .map(|p| p.id.as_str())
    }

    pub fn turn_seq(&self) -> u64 {
        self.turn_seq
    }

    pub fn extra_turn(&self) -> bool {
        self.extra_turn
    }

    pub fn last_roll(&self) -> Option<Roll> {
        self.last_roll
    }

    pub fn match_start_time(&self) -> Option<DateTime<Utc>> {
        self.match_start_time
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn corner_owners(&self) -> &HashMap<CornerId, String> {
        &self.corner_owners
    }
}
