use crate::board::{GameMove, Player, State};
use crate::boards::dots_and_boxes::{DotsAndBoxesAi, DotsAndBoxesMove, DotsAndBoxesState};
use crate::boards::tic_tac_toe::{TicTacToeAi, TicTacToeMove, TicTacToeState};
use crate::error::{GameError, Result};
use crate::random::RandomGenerator;
use std::fmt::{self, Display};

/// A position of any of the bundled games.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    TicTacToe(TicTacToeState),
    DotsAndBoxes(DotsAndBoxesState),
}

/// A move of any of the bundled games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyMove {
    TicTacToe(TicTacToeMove),
    DotsAndBoxes(DotsAndBoxesMove),
}

impl From<TicTacToeState> for GameState {
    fn from(state: TicTacToeState) -> Self {
        GameState::TicTacToe(state)
    }
}

impl From<DotsAndBoxesState> for GameState {
    fn from(state: DotsAndBoxesState) -> Self {
        GameState::DotsAndBoxes(state)
    }
}

impl From<TicTacToeMove> for AnyMove {
    fn from(mv: TicTacToeMove) -> Self {
        AnyMove::TicTacToe(mv)
    }
}

impl From<DotsAndBoxesMove> for AnyMove {
    fn from(mv: DotsAndBoxesMove) -> Self {
        AnyMove::DotsAndBoxes(mv)
    }
}

impl GameMove for AnyMove {
    fn player(&self) -> Player {
        match self {
            AnyMove::TicTacToe(mv) => mv.player(),
            AnyMove::DotsAndBoxes(mv) => mv.player(),
        }
    }
}

impl Display for AnyMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyMove::TicTacToe(mv) => Display::fmt(mv, f),
            AnyMove::DotsAndBoxes(mv) => Display::fmt(mv, f),
        }
    }
}

impl State for GameState {
    type Move = AnyMove;

    fn player(&self) -> Player {
        match self {
            GameState::TicTacToe(state) => state.player(),
            GameState::DotsAndBoxes(state) => state.player(),
        }
    }

    fn moves(&self, player: Player) -> Vec<AnyMove> {
        match self {
            GameState::TicTacToe(state) => {
                state.moves(player).into_iter().map(AnyMove::from).collect()
            }
            GameState::DotsAndBoxes(state) => {
                state.moves(player).into_iter().map(AnyMove::from).collect()
            }
        }
    }

    fn next(&self, mv: &AnyMove) -> std::result::Result<Self, GameError> {
        match (self, mv) {
            (GameState::TicTacToe(state), AnyMove::TicTacToe(mv)) => {
                state.next(mv).map(GameState::from)
            }
            (GameState::DotsAndBoxes(state), AnyMove::DotsAndBoxes(mv)) => {
                state.next(mv).map(GameState::from)
            }
            _ => Err(GameError::WrongGame),
        }
    }

    fn is_terminal(&self) -> bool {
        match self {
            GameState::TicTacToe(state) => state.is_terminal(),
            GameState::DotsAndBoxes(state) => state.is_terminal(),
        }
    }

    fn winner(&self) -> Option<Player> {
        match self {
            GameState::TicTacToe(state) => state.winner(),
            GameState::DotsAndBoxes(state) => state.winner(),
        }
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::TicTacToe(state) => Display::fmt(state, f),
            GameState::DotsAndBoxes(state) => Display::fmt(state, f),
        }
    }
}

/// The move-recommending agent of one of the bundled games.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Agent {
    TicTacToe(TicTacToeAi),
    DotsAndBoxes(DotsAndBoxesAi),
}

impl Agent {
    /// Asks the agent for a move. The agent and the state must belong to the same game.
    pub fn find_best_move<K: RandomGenerator>(
        &self,
        state: &GameState,
        rng: &mut K,
    ) -> Result<Option<AnyMove>> {
        match (self, state) {
            (Agent::TicTacToe(ai), GameState::TicTacToe(state)) => {
                Ok(ai.find_best_move(state, rng)?.map(AnyMove::from))
            }
            (Agent::DotsAndBoxes(ai), GameState::DotsAndBoxes(state)) => {
                Ok(ai.find_best_move(state, rng)?.map(AnyMove::from))
            }
            _ => Err(GameError::WrongGame.into()),
        }
    }

    /// Plays the agent against itself from `state` to the end of the game.
    pub fn self_play<K: RandomGenerator>(
        &self,
        state: &GameState,
        rng: &mut K,
    ) -> Result<GameState> {
        match (self, state) {
            (Agent::TicTacToe(ai), GameState::TicTacToe(state)) => {
                Ok(ai.self_play(state, rng)?.into())
            }
            (Agent::DotsAndBoxes(ai), GameState::DotsAndBoxes(state)) => {
                Ok(ai.self_play(state, rng)?.into())
            }
            _ => Err(GameError::WrongGame.into()),
        }
    }
}
