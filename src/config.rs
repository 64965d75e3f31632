//! Game rules configuration.
//!
//! Tunables the engine reads at game creation. Defaults mirror the shipped
//! rules; a YAML file can override them for private lobbies or tests.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::log::EVENT_LOG_CAPACITY;
use crate::resources::{Resource, ResourcePile};

fn default_min_players() -> usize {
    1 // solo mode enabled
}

fn default_max_players() -> usize {
    4
}

fn default_inactivity_timeout_secs() -> u64 {
    120
}

fn default_event_log_capacity() -> usize {
    EVENT_LOG_CAPACITY
}

fn default_starting_resources() -> ResourcePile {
    ResourcePile {
        stone: 1,
        water: 1,
        food: 1,
        ..ResourcePile::empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRules {
    #[serde(default = "default_min_players")]
    pub min_players: usize,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Seconds without qualifying activity before the scheduler ends a game.
    #[serde(default = "default_inactivity_timeout_secs")]
    pub inactivity_timeout_secs: u64,
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,
    /// Bundle granted to every player when the match starts.
    #[serde(default = "default_starting_resources")]
    pub starting_resources: ResourcePile,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_players: default_min_players(),
            max_players: default_max_players(),
            inactivity_timeout_secs: default_inactivity_timeout_secs(),
            event_log_capacity: default_event_log_capacity(),
            starting_resources: default_starting_resources(),
        }
    }
}

impl GameRules {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let rules: GameRules = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(rules)
    }

    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), yaml)?;
        Ok(())
    }
}

/// Human-readable listing of a bundle's non-zero counts, in canonical
/// order, for the event log.
pub fn bundle_label(bundle: &ResourcePile) -> String {
    let parts: Vec<String> = Resource::ALL
        .into_iter()
        .filter(|r| bundle.count(*r) > 0)
        .map(|r| format!("{} {r}", bundle.count(r)))
        .collect();
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(", ")
    }
}
