use crate::board::Player;
use ego_tree::NodeId;
use thiserror::Error;

/// Rule violations and malformed input raised by the game models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("coordinate ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("it is {expected}'s turn, not {actual}'s")]
    NotYourTurn { expected: Player, actual: Player },

    #[error("the game is already over")]
    GameOver,

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("board size must be at least 2 dots per side, got {0}")]
    InvalidSize(usize),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("move and state belong to different games")]
    WrongGame,
}

/// Errors that can occur while searching.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MctsError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("node {0:?} is not part of the search tree")]
    MissingNode(NodeId),
}

/// Convenience result type for search operations.
pub type Result<T> = std::result::Result<T, MctsError>;
