//! Property-based tests for the game models and the search engine.

use mcts_games::board::{GameMove, Player, State};
use mcts_games::boards::dots_and_boxes::{Dot, DotsAndBoxesMove, DotsAndBoxesState};
use mcts_games::boards::tic_tac_toe::TicTacToeState;
use mcts_games::error::GameError;
use mcts_games::mcts::MonteCarloTreeSearch;
use mcts_games::random::{RandomGenerator, SeededRandomGenerator};
use proptest::prelude::*;

/// Plays up to `plies` random moves from `state`, stopping at a terminal state.
fn random_play<S: State>(mut state: S, plies: usize, seed: u64) -> S {
    let mut rng = SeededRandomGenerator::new(seed);
    for _ in 0..plies {
        if state.is_terminal() {
            break;
        }
        let moves = state.moves(state.player());
        let Some(mv) = rng.get_random_from_slice(&moves) else {
            break;
        };
        state = state.next(mv).unwrap();
    }
    state
}

fn arb_tic_tac_toe() -> impl Strategy<Value = TicTacToeState> {
    (0usize..9, any::<u64>())
        .prop_map(|(plies, seed)| random_play(TicTacToeState::new(), plies, seed))
}

fn arb_dots_and_boxes() -> impl Strategy<Value = DotsAndBoxesState> {
    (2usize..5, 0usize..40, any::<u64>()).prop_map(|(size, plies, seed)| {
        random_play(DotsAndBoxesState::new(size).unwrap(), plies, seed)
    })
}

fn filled_edges(state: &DotsAndBoxesState) -> usize {
    state.horizontal().iter().chain(state.vertical()).flatten().filter(|&&drawn| drawn).count()
}

proptest! {
    #[test]
    fn tic_tac_toe_next_changes_only_the_named_cell(state in arb_tic_tac_toe()) {
        prop_assume!(!state.is_terminal());
        let player = state.player();
        for mv in state.moves(player) {
            let next = state.next(&mv).unwrap();
            prop_assert_eq!(next.player(), player.opponent());
            for row in 0..3 {
                for col in 0..3 {
                    if (row, col) == (mv.row(), mv.col()) {
                        prop_assert_eq!(state.cell(row, col), None);
                        prop_assert_eq!(next.cell(row, col), Some(player));
                    } else {
                        prop_assert_eq!(next.cell(row, col), state.cell(row, col));
                    }
                }
            }
        }
    }

    #[test]
    fn dots_and_boxes_next_draws_one_edge(state in arb_dots_and_boxes()) {
        prop_assume!(!state.is_terminal());
        let player = state.player();
        for mv in state.moves(player) {
            let next = state.next(&mv).unwrap();
            prop_assert_eq!(filled_edges(&next), filled_edges(&state) + 1);
            prop_assert!(next.is_drawn(&mv).unwrap());

            let gained = next.score(player) - state.score(player);
            prop_assert!(gained <= 2);
            prop_assert_eq!(next.score(player.opponent()), state.score(player.opponent()));
            let expected = if gained > 0 { player } else { player.opponent() };
            prop_assert_eq!(next.player(), expected);
        }
    }

    #[test]
    fn nothing_is_playable_after_the_end(seed in any::<u64>(), size in 2usize..5) {
        let end = random_play(DotsAndBoxesState::new(size).unwrap(), usize::MAX, seed);
        prop_assert!(end.is_terminal());
        prop_assert!(end.moves(end.player()).is_empty());

        let board = random_play(TicTacToeState::new(), usize::MAX, seed);
        prop_assert!(board.is_terminal());
        for mv in board.moves(board.player()) {
            prop_assert_eq!(board.next(&mv), Err(GameError::GameOver));
        }
    }

    #[test]
    fn any_order_fills_every_box(seed in any::<u64>()) {
        let end = random_play(DotsAndBoxesState::new(3).unwrap(), usize::MAX, seed);
        prop_assert!(end.is_terminal());
        prop_assert_eq!(filled_edges(&end), 12);
        prop_assert!(end.boxes().iter().flatten().all(Option::is_some));
        prop_assert_eq!(end.scores().iter().sum::<u32>(), 4);
    }

    #[test]
    fn three_sided_box_yields_its_missing_side(
        (size, row, col) in (2usize..6)
            .prop_flat_map(|size| (Just(size), 0..size - 1, 0..size - 1)),
        missing in 0usize..4,
    ) {
        let sides = [
            (Dot::new(row, col), Dot::new(row, col + 1)),
            (Dot::new(row + 1, col), Dot::new(row + 1, col + 1)),
            (Dot::new(row, col), Dot::new(row + 1, col)),
            (Dot::new(row, col + 1), Dot::new(row + 1, col + 1)),
        ];
        let mut state = DotsAndBoxesState::new(size).unwrap();
        for (side, &(from, to)) in sides.iter().enumerate() {
            if side != missing {
                let player = state.player();
                state = state.next(&DotsAndBoxesMove::new(from, to, player)).unwrap();
            }
        }

        let (from, to) = sides[missing];
        prop_assert_eq!(
            state.box_completing_move(),
            Some(DotsAndBoxesMove::new(from, to, state.player()))
        );
    }

    #[test]
    fn root_playouts_match_iterations(
        state in arb_tic_tac_toe(),
        iterations in 1u32..120,
        seed in any::<u64>(),
    ) {
        let rng = SeededRandomGenerator::new(seed);
        let mut mcts = MonteCarloTreeSearch::builder(state, rng).build();
        mcts.iterate_n_times(iterations).unwrap();
        prop_assert_eq!(mcts.get_root().unwrap().playouts, iterations);
    }

    #[test]
    fn recommended_move_is_legal(state in arb_dots_and_boxes(), seed in any::<u64>()) {
        prop_assume!(!state.is_terminal());
        let rng = SeededRandomGenerator::new(seed);
        let mut mcts = MonteCarloTreeSearch::builder(state.clone(), rng)
            .with_iterations(60)
            .build();
        let mv = mcts.find_best_move().unwrap();
        prop_assert!(mv.is_some_and(|mv| state.moves(state.player()).contains(&mv)));
    }

    #[test]
    fn same_seed_same_search(state in arb_tic_tac_toe(), seed in any::<u64>()) {
        prop_assume!(!state.is_terminal());
        let run = || {
            let rng = SeededRandomGenerator::new(seed);
            let mut mcts = MonteCarloTreeSearch::builder(state.clone(), rng)
                .with_iterations(80)
                .build();
            let mv = mcts.find_best_move().unwrap();
            (mv, mcts.get_tree().fingerprint())
        };
        prop_assert_eq!(run(), run());
    }
}

#[test]
fn opener_can_be_player_two() {
    let state = DotsAndBoxesState::with_opener(3, Player::Two).unwrap();
    assert_eq!(state.player(), Player::Two);
    assert!(state.moves(Player::Two).iter().all(|mv| mv.player() == Player::Two));
}
