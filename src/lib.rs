pub mod board;
pub mod breach;
pub mod buildings;
pub mod config;
pub mod error;
pub mod game;
pub mod ledger;
pub mod log;
pub mod movement;
pub mod registry;
pub mod resources;
pub mod rng;
pub mod snapshot;
pub mod track;

pub use config::GameRules;
pub use error::ActionError;
pub use game::{Game, Phase};
pub use registry::GameRegistry;
pub use snapshot::GameSnapshot;
