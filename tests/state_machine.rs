//! Phase, turn-ownership and replay-guard behavior of the game aggregate.

use soure_engine::config::GameRules;
use soure_engine::error::ActionError;
use soure_engine::game::{Game, Phase};
use soure_engine::rng::ScriptedSource;
use soure_engine::track::CornerId;

fn scripted_game(faces: Vec<u8>) -> Game {
    Game::new(
        "test",
        GameRules::default(),
        Box::new(ScriptedSource::with_faces(faces)),
    )
}

fn started_pair(faces: Vec<u8>) -> Game {
    let mut game = scripted_game(faces);
    game.add_player("alice", "Alice").unwrap();
    game.add_player("bob", "Bob").unwrap();
    game.start_match("alice").unwrap();
    game
}

#[test]
fn lobby_seating_rules() {
    let mut game = scripted_game(vec![1, 2]);
    game.add_player("alice", "Alice").unwrap();
    game.add_player("bob", "Bob").unwrap();
    game.add_player("carol", "Carol").unwrap();
    game.add_player("dave", "Dave").unwrap();
    assert_eq!(game.add_player("erin", "Erin"), Err(ActionError::GameFull));

    // Rejoin of a seated player is a no-op, even when the table is full.
    game.add_player("bob", "Bob").unwrap();
    assert_eq!(game.players().len(), 4);
    assert_eq!(game.creator_id(), Some("alice"));
    assert_eq!(game.current_player_id(), None);
}

#[test]
fn only_the_creator_starts() {
    let mut game = scripted_game(vec![1, 2]);
    game.add_player("alice", "Alice").unwrap();
    game.add_player("bob", "Bob").unwrap();
    assert_eq!(game.start_match("bob"), Err(ActionError::NotCreator));
    game.start_match("alice").unwrap();
    assert_eq!(
        game.start_match("alice"),
        Err(ActionError::WrongPhase {
            expected: Phase::Lobby
        })
    );
}

#[test]
fn minimum_player_count_is_enforced() {
    let rules = GameRules {
        min_players: 2,
        ..GameRules::default()
    };
    let mut game = Game::new(
        "test",
        rules,
        Box::new(ScriptedSource::with_faces(vec![1, 2])),
    );
    game.add_player("alice", "Alice").unwrap();
    assert_eq!(
        game.start_match("alice"),
        Err(ActionError::InsufficientPlayers { min: 2 })
    );
    game.add_player("bob", "Bob").unwrap();
    game.start_match("alice").unwrap();
}

#[test]
fn start_assigns_corners_colors_and_bundles() {
    let game = started_pair(vec![1, 2]);
    let seats = game.players();
    assert_eq!(seats[0].corner, CornerId::Tl);
    assert_eq!(seats[1].corner, CornerId::Tr);
    assert_eq!(seats[0].position, CornerId::Tl.track_index());
    assert_eq!(seats[1].position, CornerId::Tr.track_index());
    assert_ne!(seats[0].color, seats[1].color);

    for seat in seats {
        let account = game.ledger().account(&seat.id).unwrap();
        assert_eq!(account.resources.stone, 1);
        assert_eq!(account.resources.water, 1);
        assert_eq!(account.resources.food, 1);
        assert_eq!(account.resources.total(), 3);
        assert_eq!(account.population.max, 3);
        assert_eq!(account.population.used, 0);
    }
    assert_eq!(game.phase(), Phase::Roll);
    assert_eq!(game.current_player_id(), Some("alice"));
    assert!(game.match_start_time().is_some());
}

#[test]
fn phase_and_ownership_guards() {
    let mut game = started_pair(vec![1, 2]);

    // Not bob's turn yet.
    assert_eq!(game.roll_dice("bob").unwrap_err(), ActionError::NotYourTurn);
    // Main-phase actions are rejected before the roll.
    assert_eq!(
        game.end_turn("alice").unwrap_err(),
        ActionError::WrongPhase {
            expected: Phase::Main
        }
    );

    game.roll_dice("alice").unwrap();
    assert_eq!(game.phase(), Phase::Main);
    // A second roll in the same turn is rejected.
    assert_eq!(
        game.roll_dice("alice").unwrap_err(),
        ActionError::WrongPhase {
            expected: Phase::Roll
        }
    );

    let outcome = game.end_turn("alice").unwrap();
    assert!(!outcome.repeated);
    assert_eq!(outcome.next_player_id, "bob");
    assert_eq!(game.current_player_id(), Some("bob"));
    assert_eq!(game.phase(), Phase::Roll);
}

#[test]
fn doubles_repeat_the_turn() {
    // 3+3 is a double; 2+4 is not. Neither totals seven.
    let mut game = started_pair(vec![3, 3, 2, 4]);

    let outcome = game.roll_dice("alice").unwrap();
    assert!(outcome.roll.is_double);
    assert!(game.extra_turn());

    let end = game.end_turn("alice").unwrap();
    assert!(end.repeated);
    assert_eq!(end.next_player_id, "alice");
    assert_eq!(game.current_player_id(), Some("alice"));

    // The repeated turn gets a fresh roll.
    let outcome = game.roll_dice("alice").unwrap();
    assert!(!outcome.roll.is_double);
    let end = game.end_turn("alice").unwrap();
    assert!(!end.repeated);
    assert_eq!(end.next_player_id, "bob");
}

#[test]
fn turn_sequence_is_monotonic() {
    let mut game = started_pair(vec![2, 3, 3, 3, 1, 4]);
    assert_eq!(game.turn_seq(), 1);

    let mut previous = game.turn_seq();
    for _ in 0..6 {
        let actor = game.current_player_id().unwrap().to_string();
        game.roll_dice(&actor).unwrap();
        game.end_turn(&actor).unwrap();
        assert!(game.turn_seq() > previous);
        previous = game.turn_seq();
    }
}

#[test]
fn breach_fires_on_seven() {
    // Alice rolls 3+4.
    let mut game = started_pair(vec![3, 4]);
    let outcome = game.roll_dice("alice").unwrap();
    assert_eq!(outcome.roll.total, 7);

    let report = outcome.breach.expect("a seven should run the breach");
    // Only bob is hit; his whole bundle is three units so he loses two.
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].0, "bob");
    let bob = game.ledger().account("bob").unwrap();
    assert_eq!(bob.resources.total(), 1);
    // Alice, the roller, is spared.
    let alice = game.ledger().account("alice").unwrap();
    assert_eq!(alice.resources.total(), 4);

    let blocked = report.blocked_tile_id.expect("a tile gets blocked");
    let board = game.board().unwrap();
    assert_eq!(board.blocked_tile_id, Some(blocked));
    assert_ne!(board.tile(blocked).unwrap().kind.name(), "market");
}

#[test]
fn ended_game_goes_inert() {
    let mut game = started_pair(vec![1, 2]);
    game.end_due_to_inactivity().unwrap();
    assert_eq!(game.phase(), Phase::Ended);
    assert_eq!(game.current_player_id(), None);

    assert_eq!(
        game.roll_dice("alice").unwrap_err(),
        ActionError::WrongPhase {
            expected: Phase::Roll
        }
    );
    assert_eq!(
        game.end_turn("alice").unwrap_err(),
        ActionError::WrongPhase {
            expected: Phase::Main
        }
    );
    // Members can still reconnect to view the final state.
    game.add_player("bob", "Bob").unwrap();
    assert_eq!(
        game.add_player("erin", "Erin"),
        Err(ActionError::WrongPhase {
            expected: Phase::Lobby
        })
    );
    assert_eq!(
        game.end_due_to_inactivity(),
        Err(ActionError::GameAlreadyEnded)
    );
}
