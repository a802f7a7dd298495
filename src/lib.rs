//! Monte Carlo tree search for two-player, turn-based games.
//!
//! The engine is generic over any [`board::State`]: it builds a fresh search tree
//! for each decision, runs a fixed number of select/expand/simulate/backpropagate
//! cycles and recommends a move. Two games come with the crate, tic-tac-toe and
//! dots-and-boxes, each with a ready-made AI.
//!
//! All randomness is passed in through [`random::RandomGenerator`], so a seeded
//! generator reproduces the same search.
//!
//! # Example
//!
//! ```rust
//! use mcts_games::board::{Player, State};
//! use mcts_games::boards::tic_tac_toe::{TicTacToeMove, TicTacToeState};
//! use mcts_games::mcts::MonteCarloTreeSearch;
//! use mcts_games::random::SeededRandomGenerator;
//!
//! // X can complete the top row.
//! let state: TicTacToeState = "X X .\nO O .\n. . .".parse()?;
//!
//! let mut mcts = MonteCarloTreeSearch::builder(state, SeededRandomGenerator::new(7))
//!     .with_iterations(500)
//!     .build();
//!
//! let best = mcts.find_best_move()?;
//! assert_eq!(best, Some(TicTacToeMove::new(Player::One, 0, 2)));
//! # Ok::<(), mcts_games::error::MctsError>(())
//! ```

/// The `State` and `GameMove` traits every game implements, plus `Player`.
pub mod board;
/// Ready-made games.
pub mod boards;
/// Error types shared by the games and the engine.
pub mod error;
/// Closed enums over the bundled games, for callers that pick a game at runtime.
pub mod game;
/// Murmur3 fingerprints used to compare search trees.
pub mod hash;
/// The search engine, its builder and configuration.
pub mod mcts;
/// Statistics kept per node of the search tree.
pub mod mcts_node;
/// Random number generation for expansion and rollouts.
pub mod random;
/// Move choice during the simulation phase.
pub mod rollout;
/// The arena-backed search tree.
pub mod tree;

pub use board::{GameMove, GameOutcome, Player, State};
pub use error::{GameError, MctsError, Result};
pub use mcts::{FinalMoveSelection, MctsConfig, MonteCarloTreeSearch};
pub use random::{RandomGenerator, SeededRandomGenerator, StandardRandomGenerator};
