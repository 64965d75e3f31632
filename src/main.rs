use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use soure_engine::board::TileKind;
use soure_engine::buildings::BuildingKind;
use soure_engine::config::GameRules;
use soure_engine::game::{Game, Phase};
use soure_engine::rng::SeededSource;

#[derive(Debug, Parser)]
#[command(author, version, about = "Soure rules engine self-play runner")]
struct Cli {
    /// Seed for the dice and board generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of seated players (1-4)
    #[arg(long, default_value_t = 3)]
    players: usize,

    /// Logical turns to play before printing standings
    #[arg(long, default_value_t = 40)]
    turns: u64,

    /// Optional rules YAML file (defaults baked in when omitted)
    #[arg(long)]
    rules: Option<PathBuf>,
}

const DEMO_NAMES: [&str; 4] = ["Ada", "Blaise", "Kurt", "Emmy"];

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.players == 0 || cli.players > DEMO_NAMES.len() {
        bail!("--players must be between 1 and {}", DEMO_NAMES.len());
    }

    let rules = match &cli.rules {
        Some(path) => GameRules::from_yaml(path)?,
        None => GameRules::default(),
    };

    let mut game = Game::new("selfplay", rules, Box::new(SeededSource::new(cli.seed)));
    for name in DEMO_NAMES.iter().take(cli.players) {
        let id = name.to_lowercase();
        game.add_player(&id, name)
            .map_err(|e| anyhow::anyhow!("seating {name}: {e}"))?;
    }
    let creator = DEMO_NAMES[0].to_lowercase();
    game.start_match(&creator)
        .map_err(|e| anyhow::anyhow!("starting match: {e}"))?;

    for _ in 0..cli.turns {
        if game.phase() == Phase::Ended {
            break;
        }
        let Some(actor) = game.current_player_id().map(String::from) else {
            break;
        };
        if game.roll_dice(&actor).is_err() {
            break;
        }
        bot_build(&mut game, &actor);
        if game.end_turn(&actor).is_err() {
            break;
        }
    }

    print_standings(&game);
    Ok(())
}

/// Greedy build policy for the demo: push the upgrade chain on owned
/// tiles, settle a fresh outpost otherwise, then try for a bastion.
/// Rejections (cost, population, occupancy) are simply skipped.
fn bot_build(game: &mut Game, player_id: &str) {
    let Some(board) = game.board() else { return };

    let mut attempts: Vec<(usize, BuildingKind)> = Vec::new();
    for tile in &board.tiles {
        if tile.kind == TileKind::Market {
            continue;
        }
        match tile.building_of(player_id).map(|b| b.kind) {
            Some(BuildingKind::Outpost) => attempts.push((tile.id, BuildingKind::Citadel)),
            Some(BuildingKind::Citadel) => attempts.push((tile.id, BuildingKind::Capital)),
            Some(_) => {}
            None if tile.buildings.is_empty() => {
                attempts.push((tile.id, BuildingKind::Outpost));
                attempts.push((tile.id, BuildingKind::Bastion));
            }
            None => {}
        }
    }

    for (tile_id, kind) in attempts {
        // First success per turn is enough for the demo.
        if game.place_building(player_id, tile_id, kind).is_ok() {
            return;
        }
    }
}

fn print_standings(game: &Game) {
    println!("== standings after {} logical turns ==", game.turn_seq());
    let mut rows: Vec<_> = game
        .players()
        .iter()
        .filter_map(|p| game.ledger().account(&p.id).map(|a| (p, a)))
        .collect();
    rows.sort_by(|a, b| b.1.dominion_points.cmp(&a.1.dominion_points));
    for (player, account) in rows {
        println!(
            "{:8} dp={:<3} defense={} resources={} population={}/{}",
            player.name,
            account.dominion_points,
            account.defense_level,
            account.resources.total(),
            account.population.used,
            account.population.max,
        );
    }

    println!("== event log ==");
    for entry in game.events().iter() {
        println!("{}", entry.msg);
    }
}
