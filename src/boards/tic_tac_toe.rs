use crate::board::{GameMove, Player, State};
use crate::error::{GameError, Result};
use crate::mcts::{MctsConfig, MonteCarloTreeSearch};
use crate::random::RandomGenerator;
use crate::rollout::RolloutPolicy;
use std::fmt::{self, Display};
use std::str::FromStr;
use tracing::debug;

const SIZE: usize = 3;

const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

const CENTER: (usize, usize) = (1, 1);
const CORNERS: [(usize, usize); 4] = [(0, 0), (0, 2), (2, 0), (2, 2)];

/// A 3×3 tic-tac-toe position.
///
/// X is `Player::One` and always opens unless [`TicTacToeState::with_opener`] says
/// otherwise. Cells are addressed by `(row, col)`, both in `0..3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicTacToeState {
    cells: [[Option<Player>; SIZE]; SIZE],
    to_move: Player,
}

impl Default for TicTacToeState {
    fn default() -> Self {
        TicTacToeState::new()
    }
}

impl TicTacToeState {
    /// An empty board with X to move.
    pub fn new() -> Self {
        TicTacToeState::with_opener(Player::One)
    }

    /// An empty board with `opener` to move.
    pub fn with_opener(opener: Player) -> Self {
        Self {
            cells: [[None; SIZE]; SIZE],
            to_move: opener,
        }
    }

    /// Returns the owner of a cell, `None` for empty or out-of-range cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<Player> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// All nine cells, indexed `[row][col]`.
    pub fn cells(&self) -> &[[Option<Player>; SIZE]; SIZE] {
        &self.cells
    }

    /// True when no empty cell is left.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// True if some row, column or diagonal is held by a single player.
    pub fn three_in_a_row(&self) -> bool {
        self.line_owner().is_some()
    }

    fn line_owner(&self) -> Option<Player> {
        LINES.iter().find_map(|line| {
            let [a, b, c] = line.map(|(row, col)| self.cells[row][col]);
            match a {
                Some(player) if a == b && b == c => Some(player),
                _ => None,
            }
        })
    }

    /// The first empty cell, in row-major order, that would give `player` a line.
    pub fn winning_cell(&self, player: Player) -> Option<(usize, usize)> {
        self.empty_cells().find(|&(row, col)| {
            LINES
                .iter()
                .filter(|line| line.contains(&(row, col)))
                .any(|line| {
                    line.iter()
                        .filter(|&&cell| cell != (row, col))
                        .all(|&(r, c)| self.cells[r][c] == Some(player))
                })
        })
    }

    fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.cells[row][col].is_none())
    }
}

impl State for TicTacToeState {
    type Move = TicTacToeMove;

    fn player(&self) -> Player {
        self.to_move
    }

    fn moves(&self, player: Player) -> Vec<TicTacToeMove> {
        self.empty_cells()
            .map(|(row, col)| TicTacToeMove::new(player, row, col))
            .collect()
    }

    fn next(&self, mv: &TicTacToeMove) -> std::result::Result<Self, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if mv.row >= SIZE || mv.col >= SIZE {
            return Err(GameError::OutOfBounds { row: mv.row, col: mv.col });
        }
        if mv.player != self.to_move {
            return Err(GameError::NotYourTurn {
                expected: self.to_move,
                actual: mv.player,
            });
        }
        if self.cells[mv.row][mv.col].is_some() {
            return Err(GameError::IllegalMove(format!(
                "cell ({}, {}) is occupied",
                mv.row, mv.col
            )));
        }

        let mut cells = self.cells;
        cells[mv.row][mv.col] = Some(mv.player);
        Ok(Self {
            cells,
            to_move: self.to_move.opponent(),
        })
    }

    fn is_terminal(&self) -> bool {
        self.three_in_a_row() || self.is_full()
    }

    fn winner(&self) -> Option<Player> {
        self.line_owner()
    }
}

fn symbol(player: Option<Player>) -> char {
    match player {
        Some(Player::One) => 'X',
        Some(Player::Two) => 'O',
        None => '.',
    }
}

impl Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(|&cell| symbol(cell).to_string()).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl FromStr for TicTacToeState {
    type Err = GameError;

    /// Parses a grid such as `"X . O\n. X .\n. . O"`; rows may also be separated by `/`.
    ///
    /// The player to move is X when both players have the same number of marks and
    /// O when X is one ahead.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .split(['\n', '/'])
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();
        if rows.len() != SIZE {
            return Err(GameError::InvalidPosition(format!(
                "expected {SIZE} rows, got {}",
                rows.len()
            )));
        }

        let mut cells = [[None; SIZE]; SIZE];
        for (row, text) in rows.iter().enumerate() {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.len() != SIZE {
                return Err(GameError::InvalidPosition(format!(
                    "row {row} has {} cells",
                    tokens.len()
                )));
            }
            for (col, token) in tokens.iter().enumerate() {
                cells[row][col] = match *token {
                    "X" | "x" | "1" => Some(Player::One),
                    "O" | "o" | "0" => Some(Player::Two),
                    "." => None,
                    other => {
                        return Err(GameError::InvalidPosition(format!("unknown cell {other:?}")));
                    }
                };
            }
        }

        let count = |player| cells.iter().flatten().filter(|&&cell| cell == Some(player)).count();
        let (xs, os) = (count(Player::One), count(Player::Two));
        let to_move = if xs == os {
            Player::One
        } else if xs == os + 1 {
            Player::Two
        } else {
            return Err(GameError::InvalidPosition(format!("{xs} X marks against {os} O marks")));
        };

        Ok(Self { cells, to_move })
    }
}

/// Places a mark of `player` at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicTacToeMove {
    player: Player,
    row: usize,
    col: usize,
}

impl TicTacToeMove {
    /// Creates a move of `player` into `(row, col)`.
    pub fn new(player: Player, row: usize, col: usize) -> Self {
        Self { player, row, col }
    }

    /// Zero-based row of the target cell.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Zero-based column of the target cell.
    pub fn col(&self) -> usize {
        self.col
    }

    fn cell(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl GameMove for TicTacToeMove {
    fn player(&self) -> Player {
        self.player
    }
}

impl Display for TicTacToeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ({}, {})", symbol(Some(self.player)), self.row, self.col)
    }
}

/// Rollout policy that plays sensible tic-tac-toe.
///
/// In order of priority: win now, block the opponent's win, take the centre,
/// take a corner, otherwise play at random.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrategicRollout;

impl RolloutPolicy<TicTacToeState> for StrategicRollout {
    fn choose<K: RandomGenerator>(
        &self,
        state: &TicTacToeState,
        moves: &[TicTacToeMove],
        rng: &mut K,
    ) -> Option<TicTacToeMove> {
        let at = |cell: Option<(usize, usize)>| {
            cell.and_then(|cell| moves.iter().find(|mv| mv.cell() == cell))
        };
        let me = state.player();

        at(state.winning_cell(me))
            .or_else(|| at(state.winning_cell(me.opponent())))
            .or_else(|| at(Some(CENTER)))
            .or_else(|| moves.iter().find(|mv| CORNERS.contains(&mv.cell())))
            .copied()
            .or_else(|| rng.get_random_from_slice(moves).copied())
    }
}

/// Recommends tic-tac-toe moves with a strategic-rollout search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TicTacToeAi {
    config: MctsConfig,
}

impl Default for TicTacToeAi {
    fn default() -> Self {
        TicTacToeAi::new(MctsConfig::default())
    }
}

impl TicTacToeAi {
    /// Creates an AI searching with `config`.
    pub fn new(config: MctsConfig) -> Self {
        Self { config }
    }

    /// Default parameters with a custom iteration budget.
    pub fn with_iterations(iterations: u32) -> Self {
        TicTacToeAi::new(MctsConfig::default().with_iterations(iterations))
    }

    /// Returns the search parameters.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Runs one search from `state` and returns the recommended move.
    pub fn find_best_move<K: RandomGenerator>(
        &self,
        state: &TicTacToeState,
        rng: &mut K,
    ) -> Result<Option<TicTacToeMove>> {
        MonteCarloTreeSearch::builder(state.clone(), rng)
            .with_config(self.config)
            .with_rollout(StrategicRollout)
            .build()
            .find_best_move()
    }

    /// Lets the AI play both sides from `state` until the game ends.
    pub fn self_play<K: RandomGenerator>(
        &self,
        state: &TicTacToeState,
        rng: &mut K,
    ) -> Result<TicTacToeState> {
        let mut state = state.clone();
        while !state.is_terminal() {
            let Some(mv) = self.find_best_move(&state, rng)? else {
                break;
            };
            debug!(%mv, "tic-tac-toe move");
            state = state.next(&mv)?;
        }
        Ok(state)
    }
}
