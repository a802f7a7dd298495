//! End-to-end games and agent decisions.

use mcts_games::board::{GameOutcome, Player, State};
use mcts_games::boards::dots_and_boxes::{
    Difficulty, Dot, DotsAndBoxesAi, DotsAndBoxesMove, DotsAndBoxesState,
};
use mcts_games::boards::tic_tac_toe::{TicTacToeAi, TicTacToeMove, TicTacToeState};
use mcts_games::game::{Agent, AnyMove, GameState};
use mcts_games::mcts::{FinalMoveSelection, MctsConfig, MonteCarloTreeSearch};
use mcts_games::random::SeededRandomGenerator;
use std::thread;

fn edge(r1: usize, c1: usize, r2: usize, c2: usize, player: Player) -> DotsAndBoxesMove {
    DotsAndBoxesMove::new(Dot::new(r1, c1), Dot::new(r2, c2), player)
}

#[test]
fn completed_row_ends_the_game() {
    let state: TicTacToeState = "X X X\n. O .\n. . O".parse().unwrap();
    assert!(state.is_terminal());
    assert_eq!(state.outcome(), GameOutcome::Win(Player::One));
}

#[test]
fn ai_blocks_the_open_row() {
    let state: TicTacToeState = "X X .\n. O .\n. . .".parse().unwrap();
    let mut rng = SeededRandomGenerator::new(100);
    let ai = TicTacToeAi::new(MctsConfig::default().with_iterations(500));

    let mv = ai.find_best_move(&state, &mut rng).unwrap();

    assert_eq!(mv, Some(TicTacToeMove::new(Player::Two, 0, 2)));
}

#[test]
fn self_play_from_the_start_reaches_an_outcome() {
    let ai = TicTacToeAi::new(MctsConfig::default().with_iterations(300));
    let mut rng = SeededRandomGenerator::new(2024);

    let end = ai.self_play(&TicTacToeState::new(), &mut rng).unwrap();

    assert!(end.is_terminal());
    assert_ne!(end.outcome(), GameOutcome::InProgress);
}

#[test]
fn heuristic_difficulties_take_a_three_sided_box() {
    let state = DotsAndBoxesState::new(3)
        .unwrap()
        .next(&edge(0, 0, 0, 1, Player::One))
        .unwrap()
        .next(&edge(1, 0, 1, 1, Player::Two))
        .unwrap()
        .next(&edge(0, 0, 1, 0, Player::One))
        .unwrap();
    let closing = edge(0, 1, 1, 1, Player::Two);

    for difficulty in [Difficulty::Medium, Difficulty::Hard, Difficulty::Expert] {
        let mut rng = SeededRandomGenerator::new(5);
        let mv = DotsAndBoxesAi::new(difficulty).find_best_move(&state, &mut rng).unwrap();
        assert_eq!(mv, Some(closing), "{difficulty}");
    }

    let mut rng = SeededRandomGenerator::new(5);
    let easy = DotsAndBoxesAi::new(Difficulty::Easy).find_best_move(&state, &mut rng).unwrap();
    assert!(easy.is_some_and(|mv| state.moves(Player::Two).contains(&mv)));
}

#[test]
fn hard_ai_searches_when_no_move_is_safe() {
    // Two sides of the only box are drawn, so every move hands it over.
    let state = DotsAndBoxesState::new(2)
        .unwrap()
        .next(&edge(0, 0, 0, 1, Player::One))
        .unwrap()
        .next(&edge(1, 0, 1, 1, Player::Two))
        .unwrap();
    let mut rng = SeededRandomGenerator::new(5);

    let mv = DotsAndBoxesAi::new(Difficulty::Hard).find_best_move(&state, &mut rng).unwrap();

    assert!(mv.is_some_and(|mv| state.moves(Player::One).contains(&mv)));
}

#[test]
fn dots_and_boxes_game_runs_to_the_end() {
    let ai = DotsAndBoxesAi::with_parameters(100, std::f64::consts::SQRT_2);
    let mut rng = SeededRandomGenerator::new(9);

    let end = ai.self_play(&DotsAndBoxesState::new(4).unwrap(), &mut rng).unwrap();

    assert!(end.is_terminal());
    assert_eq!(end.scores().iter().sum::<u32>(), 9);
    assert_ne!(end.outcome(), GameOutcome::InProgress);
}

#[test]
fn agents_answer_for_their_own_game() {
    let agents = [
        (
            Agent::TicTacToe(TicTacToeAi::new(MctsConfig::default().with_iterations(200))),
            GameState::from(TicTacToeState::new()),
        ),
        (
            Agent::DotsAndBoxes(DotsAndBoxesAi::new(Difficulty::Medium)),
            GameState::from(DotsAndBoxesState::new(3).unwrap()),
        ),
    ];
    let mut rng = SeededRandomGenerator::new(77);

    for (agent, start) in agents {
        let mv = agent.find_best_move(&start, &mut rng).unwrap().unwrap();
        assert!(start.moves(start.player()).contains(&mv));
        assert!(matches!(
            (&start, mv),
            (GameState::TicTacToe(_), AnyMove::TicTacToe(_))
                | (GameState::DotsAndBoxes(_), AnyMove::DotsAndBoxes(_))
        ));
    }
}

#[test]
fn searches_on_separate_threads_are_independent() {
    let state: TicTacToeState = "X . .\n. O .\n. . .".parse().unwrap();
    let search = |seed| {
        let rng = SeededRandomGenerator::new(seed);
        let mut mcts = MonteCarloTreeSearch::builder(state.clone(), rng)
            .with_iterations(300)
            .with_final_move_selection(FinalMoveSelection::MostVisited)
            .build();
        let mv = mcts.find_best_move().unwrap();
        (mv, mcts.get_tree().fingerprint())
    };

    let (left, right) = thread::scope(|scope| {
        let left = scope.spawn(|| search(1));
        let right = scope.spawn(|| search(2));
        (left.join().unwrap(), right.join().unwrap())
    });

    assert_eq!(left, search(1));
    assert_eq!(right, search(2));
}
