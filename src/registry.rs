//! The game registry: routes actions to game instances and enforces the
//! single-writer discipline the engine assumes.
//!
//! Each game lives behind its own async mutex, so actions for one game id
//! are serialized while different games proceed in parallel. After every
//! accepted mutating action the full snapshot is published on the game's
//! broadcast channel for the transport layer to fan out; a reconnecting
//! participant fetches the current snapshot directly. Each game owns at
//! most one pending inactivity callback, rescheduled by qualifying
//! activity and aborted at teardown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use rand::Rng;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::buildings::BuildingKind;
use crate::config::GameRules;
use crate::error::ActionError;
use crate::game::{EndTurnOutcome, Game, RollOutcome};
use crate::rng::{RandomSource, SeededSource};
use crate::snapshot::GameSnapshot;

const GAME_ID_LEN: usize = 6;
const GAME_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Snapshot broadcast buffer; slow subscribers lag rather than block.
const BROADCAST_CAPACITY: usize = 64;

struct GameEntry {
    id: String,
    game: Mutex<Game>,
    snapshots: broadcast::Sender<String>,
    timer: StdMutex<Option<JoinHandle<()>>>,
}

impl Drop for GameEntry {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.timer.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

struct Inner {
    rules: GameRules,
    games: StdMutex<HashMap<String, Arc<GameEntry>>>,
}

#[derive(Clone)]
pub struct GameRegistry {
    inner: Arc<Inner>,
}

impl GameRegistry {
    pub fn new(rules: GameRules) -> Self {
        Self {
            inner: Arc::new(Inner {
                rules,
                games: StdMutex::new(HashMap::new()),
            }),
        }
    }

    /// Creates a game with an entropy-seeded random source. The creator is
    /// seated as the first player.
    pub async fn create_game(&self, creator_id: &str, creator_name: &str) -> String {
        self.create_game_with_source(creator_id, creator_name, Box::new(SeededSource::from_entropy()))
            .await
    }

    /// Creates a game with an injected random source, for reproducible
    /// matches and tests.
    pub async fn create_game_with_source(
        &self,
        creator_id: &str,
        creator_name: &str,
        source: Box<dyn RandomSource>,
    ) -> String {
        let game_id = self.fresh_game_id();
        let mut game = Game::new(game_id.clone(), self.inner.rules.clone(), source);
        // A fresh game always has room for its creator.
        let _ = game.add_player(creator_id, creator_name);

        let (snapshots, _) = broadcast::channel(BROADCAST_CAPACITY);
        let entry = Arc::new(GameEntry {
            id: game_id.clone(),
            game: Mutex::new(game),
            snapshots,
            timer: StdMutex::new(None),
        });
        if let Ok(mut games) = self.inner.games.lock() {
            games.insert(game_id.clone(), entry.clone());
        }
        self.publish_and_reschedule(&entry).await;
        println!("[registry] created game {game_id} (creator {creator_name})");
        game_id
    }

    /// Seats a player, or accepts a rejoin of an existing member in any
    /// phase.
    pub async fn join_game(
        &self,
        game_id: &str,
        user_id: &str,
        name: &str,
    ) -> Result<(), ActionError> {
        let entry = self.entry(game_id)?;
        {
            let mut game = entry.game.lock().await;
            game.add_player(user_id, name)?;
        }
        self.publish_and_reschedule(&entry).await;
        Ok(())
    }

    pub async fn start_match(&self, game_id: &str, user_id: &str) -> Result<(), ActionError> {
        let entry = self.entry(game_id)?;
        {
            let mut game = entry.game.lock().await;
            game.start_match(user_id)?;
        }
        self.publish_and_reschedule(&entry).await;
        Ok(())
    }

    pub async fn roll_dice(&self, game_id: &str, user_id: &str) -> Result<RollOutcome, ActionError> {
        let entry = self.entry(game_id)?;
        let outcome = {
            let mut game = entry.game.lock().await;
            game.roll_dice(user_id)?
        };
        self.publish_and_reschedule(&entry).await;
        Ok(outcome)
    }

    /// `kind` arrives as the client-sent string; unknown values are
    /// rejected before the game is touched.
    pub async fn place_building(
        &self,
        game_id: &str,
        user_id: &str,
        tile_id: usize,
        kind: &str,
    ) -> Result<(), ActionError> {
        let kind = BuildingKind::parse(kind)?;
        let entry = self.entry(game_id)?;
        {
            let mut game = entry.game.lock().await;
            game.place_building(user_id, tile_id, kind)?;
        }
        self.publish_and_reschedule(&entry).await;
        Ok(())
    }

    pub async fn end_turn(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<EndTurnOutcome, ActionError> {
        let entry = self.entry(game_id)?;
        let outcome = {
            let mut game = entry.game.lock().await;
            game.end_turn(user_id)?
        };
        self.publish_and_reschedule(&entry).await;
        Ok(outcome)
    }

    /// Current snapshot of a game, for reconnect re-emission.
    pub async fn state(&self, game_id: &str) -> Result<GameSnapshot, ActionError> {
        let entry = self.entry(game_id)?;
        let game = entry.game.lock().await;
        Ok(GameSnapshot::capture(&game))
    }

    /// Subscribes to the game's snapshot broadcasts (JSON payloads).
    pub fn subscribe(&self, game_id: &str) -> Result<broadcast::Receiver<String>, ActionError> {
        let entry = self.entry(game_id)?;
        Ok(entry.snapshots.subscribe())
    }

    /// Tears a game down: cancels its timer and drops it from the store.
    pub fn remove_game(&self, game_id: &str) {
        let removed = match self.inner.games.lock() {
            Ok(mut games) => games.remove(game_id),
            Err(_) => None,
        };
        if let Some(entry) = removed {
            if let Ok(mut timer) = entry.timer.lock() {
                if let Some(handle) = timer.take() {
                    handle.abort();
                }
            }
            println!("[registry] removed game {game_id}");
        }
    }

    fn entry(&self, game_id: &str) -> Result<Arc<GameEntry>, ActionError> {
        self.inner
            .games
            .lock()
            .ok()
            .and_then(|games| games.get(game_id).cloned())
            .ok_or(ActionError::GameNotFound)
    }

    /// Broadcasts the post-action snapshot and counts the action as
    /// activity for the inactivity timer.
    async fn publish_and_reschedule(&self, entry: &Arc<GameEntry>) {
        let snapshot = {
            let game = entry.game.lock().await;
            GameSnapshot::capture(&game)
        };
        if let Ok(payload) = serde_json::to_string(&snapshot) {
            let _ = entry.snapshots.send(payload);
        }
        self.reschedule_timer(entry);
    }

    fn reschedule_timer(&self, entry: &Arc<GameEntry>) {
        let timeout = Duration::from_secs(self.inner.rules.inactivity_timeout_secs);
        // Anchor the deadline at the activity itself so the spawned task's
        // first poll time doesn't shift the window.
        let deadline = Instant::now() + timeout;
        let entry_for_task = entry.clone();
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            let ended = {
                let mut game = entry_for_task.game.lock().await;
                game.end_due_to_inactivity().is_ok()
            };
            if ended {
                let snapshot = {
                    let game = entry_for_task.game.lock().await;
                    GameSnapshot::capture(&game)
                };
                if let Ok(payload) = serde_json::to_string(&snapshot) {
                    let _ = entry_for_task.snapshots.send(payload);
                }
                println!(
                    "[registry] game {} ended due to inactivity",
                    entry_for_task.id
                );
            }
        });
        if let Ok(mut timer) = entry.timer.lock() {
            if let Some(previous) = timer.replace(handle) {
                previous.abort();
            }
        }
    }

    fn fresh_game_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..GAME_ID_LEN)
                .map(|_| {
                    let idx = rng.gen_range(0..GAME_ID_ALPHABET.len());
                    GAME_ID_ALPHABET[idx] as char
                })
                .collect();
            let taken = self
                .inner
                .games
                .lock()
                .map(|games| games.contains_key(&id))
                .unwrap_or(false);
            if !taken {
                return id;
            }
        }
    }
}
