//! Ready-made games.

/// Dots-and-boxes on an N×N grid of dots, with a heuristic-assisted AI.
pub mod dots_and_boxes;
/// Tic-tac-toe on a 3×3 board, with a strategic-rollout AI.
pub mod tic_tac_toe;
