/// Property-based tests for the session rules using proptest
///
/// Random action scripts (legal and illegal) are thrown at a session and
/// the core invariants are checked after every step.
use ludo_engine::{
    BoardTopology, CAPTURE_PENALTY, Color, DiceRoller, GameSession, PawnPosition, PlayerId,
    SessionSnapshot, game::dice::is_valid_face,
};
use proptest::prelude::*;

/// Die that shows whatever the script says.
struct Scripted(u8);

impl DiceRoller for Scripted {
    fn roll_die(&mut self) -> u8 {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Roll { color: Color, value: u8 },
    Move { color: Color, slot: usize },
}

fn color_strategy() -> impl Strategy<Value = Color> {
    prop::sample::select(Color::ALL.to_vec())
}

// Mostly in-range values, with the occasional broken die or bad slot.
fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (color_strategy(), 0u8..=7).prop_map(|(color, value)| Action::Roll { color, value }),
        (color_strategy(), 0usize..=4).prop_map(|(color, slot)| Action::Move { color, slot }),
    ]
}

// Only the player on turn acts; every script is a legal game.
fn legal_turn_strategy() -> impl Strategy<Value = Vec<(u8, usize)>> {
    prop::collection::vec((1u8..=6, 0usize..4), 1..200)
}

fn session(four_players: bool) -> GameSession {
    let colors: &[Color] = if four_players {
        &Color::ALL
    } else {
        &Color::TWO_PLAYER
    };
    let players = colors
        .iter()
        .map(|&c| (c, PlayerId::new(&format!("{c}-player"))))
        .collect();
    GameSession::new(players, 100).unwrap()
}

fn check_invariants(snapshot: &SessionSnapshot, board: &BoardTopology) -> Result<(), TestCaseError> {
    prop_assert!(snapshot.players.contains_key(&snapshot.turn));
    prop_assert_eq!(snapshot.awaiting_move, snapshot.dice != 0);
    prop_assert!(snapshot.dice == 0 || is_valid_face(snapshot.dice));

    for pawns in snapshot.positions.values() {
        prop_assert_eq!(pawns.len(), 4);
        for pawn in pawns {
            if let PawnPosition::Step(step) = pawn {
                prop_assert!(*step < board.path_len());
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_invariants_hold_under_any_script(
        four_players in any::<bool>(),
        actions in prop::collection::vec(action_strategy(), 1..150),
    ) {
        let board = BoardTopology::standard();
        let mut game = session(four_players);

        for action in actions {
            let before = game.snapshot();
            let result = match action {
                Action::Roll { color, value } => {
                    let rolled = game.roll_with(color, &mut Scripted(value)).map(|_| ());
                    // A roll never passes the turn
                    if rolled.is_ok() {
                        prop_assert_eq!(game.turn(), before.turn);
                        prop_assert_eq!(game.dice(), value);
                    }
                    rolled
                }
                Action::Move { color, slot } => game.apply_move(color, slot, board).map(|_| ()),
            };

            // Rejected calls never mutate anything
            if result.is_err() {
                prop_assert_eq!(&game.snapshot(), &before);
            }
            check_invariants(&game.snapshot(), board)?;
        }
    }

    #[test]
    fn test_only_turn_holder_may_act(
        actions in prop::collection::vec(action_strategy(), 1..150),
    ) {
        let board = BoardTopology::standard();
        let mut game = session(true);

        for action in actions {
            let turn = game.turn();
            let (color, result) = match action {
                Action::Roll { color, value } => {
                    (color, game.roll_with(color, &mut Scripted(value)).map(|_| ()))
                }
                Action::Move { color, slot } => {
                    (color, game.apply_move(color, slot, board).map(|_| ()))
                }
            };
            if color != turn {
                prop_assert!(result.is_err());
            }
        }
    }

    #[test]
    fn test_roll_gates_moves(value in 1u8..=6, slot in 0usize..4) {
        let board = BoardTopology::standard();
        let mut game = session(false);

        prop_assert!(game.apply_move(Color::Red, slot, board).is_err());
        game.roll_with(Color::Red, &mut Scripted(value)).unwrap();
        prop_assert!(game.roll_with(Color::Red, &mut Scripted(value)).is_err());
        prop_assert!(game.apply_move(Color::Red, slot, board).is_ok());
        prop_assert!(!game.awaiting_move());
        prop_assert_eq!(game.dice(), 0);
    }

    #[test]
    fn test_score_accounting(turns in legal_turn_strategy()) {
        let board = BoardTopology::standard();
        let mut game = session(true);

        for (value, slot) in turns {
            let color = game.turn();
            let before = game.snapshot();
            game.roll_with(color, &mut Scripted(value)).unwrap();
            let outcome = game.apply_move(color, slot, board).unwrap();

            prop_assert_eq!(
                game.score(color).unwrap(),
                before.score(color).unwrap() + outcome.points
            );
            for &victim in &outcome.penalized {
                prop_assert_eq!(
                    game.score(victim).unwrap(),
                    before.score(victim).unwrap().saturating_sub(CAPTURE_PENALTY)
                );
            }
            // Safe steps never produce captures
            if board.is_safe(outcome.to) {
                prop_assert!(outcome.captures.is_empty());
            }
            for capture in &outcome.captures {
                prop_assert_eq!(game.position(capture.color, capture.slot).unwrap(), PawnPosition::Base);
            }
            // The turn passes unless a six was thrown or something was captured
            let keeps_turn = value == 6 || outcome.captured();
            prop_assert_eq!(outcome.extra_turn, keeps_turn);
            prop_assert_eq!(game.turn() == color, keeps_turn);
            check_invariants(&game.snapshot(), board)?;
        }
    }

    #[test]
    fn test_leaving_base_lands_on_entry(value in 1u8..=6, slot in 0usize..4) {
        let board = BoardTopology::standard();
        let mut game = session(false);

        game.roll_with(Color::Red, &mut Scripted(value)).unwrap();
        let outcome = game.apply_move(Color::Red, slot, board).unwrap();

        prop_assert_eq!(outcome.to, board.entry_step(Color::Red).unwrap());
        prop_assert_eq!(outcome.points, 1);
    }
}
