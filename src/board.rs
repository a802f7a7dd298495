use crate::error::GameError;
use std::fmt::{self, Debug, Display};

/// The central trait of the library, defining the interface for a game state.
///
/// A state is an immutable snapshot: `next` always produces a new value and never
/// modifies the receiver. Two states compare equal iff every cell or edge and the
/// player to move match.
pub trait State: Clone + PartialEq + Debug {
    /// The type representing a single atomic change to the board.
    type Move: GameMove;

    /// Returns the player whose turn it is to make a move.
    fn player(&self) -> Player;

    /// Returns one candidate move for every unfilled cell or edge, in a fixed order.
    ///
    /// The result depends only on the board contents, so it is not empty just
    /// because the game is over.
    fn moves(&self, player: Player) -> Vec<Self::Move>;

    /// Applies a move, returning the resulting state.
    fn next(&self, mv: &Self::Move) -> Result<Self, GameError>;

    /// Returns `true` once the game has ended.
    fn is_terminal(&self) -> bool;

    /// Returns the player with the strictly greater score, or `None` on a tie or
    /// while the game is still running.
    fn winner(&self) -> Option<Player>;

    /// Returns the current outcome of the game.
    fn outcome(&self) -> GameOutcome {
        if !self.is_terminal() {
            return GameOutcome::InProgress;
        }
        match self.winner() {
            Some(player) => GameOutcome::Win(player),
            None => GameOutcome::Draw,
        }
    }
}

/// A value object naming one atomic change together with the player making it.
pub trait GameMove: Clone + PartialEq + Debug {
    /// The player making this move.
    fn player(&self) -> Player;
}

/// Represents the possible outcomes of a game.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum GameOutcome {
    /// The game is still ongoing.
    InProgress,
    /// The given player has won.
    Win(Player),
    /// The game has ended without a winner.
    Draw,
}

/// One of the two players of a game.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Player {
    /// The opening player (X in tic-tac-toe, player 1 in dots-and-boxes).
    One,
    /// The second player (O in tic-tac-toe, player 2 in dots-and-boxes).
    Two,
}

impl Player {
    /// Returns the other player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Zero-based index, handy for score arrays.
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player 1"),
            Player::Two => write!(f, "player 2"),
        }
    }
}
