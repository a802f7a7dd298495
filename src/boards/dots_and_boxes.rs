use crate::board::{GameMove, Player, State};
use crate::error::{GameError, Result};
use crate::mcts::{FinalMoveSelection, MctsConfig, MonteCarloTreeSearch};
use crate::random::RandomGenerator;
use std::f64::consts::SQRT_2;
use std::fmt::{self, Display};
use std::str::FromStr;
use tracing::debug;

/// Smallest playable board: one box.
pub const MIN_SIZE: usize = 2;

/// A dot on the grid, addressed by `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dot {
    pub row: usize,
    pub col: usize,
}

impl Dot {
    /// Creates the dot at `(row, col)`.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Display for Dot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Draws the edge between two adjacent dots.
///
/// The dots may be given in either order; `(0, 1)-(0, 0)` and `(0, 0)-(0, 1)`
/// name the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DotsAndBoxesMove {
    from: Dot,
    to: Dot,
    player: Player,
}

impl DotsAndBoxesMove {
    /// Creates a move of `player` joining `from` and `to`.
    pub fn new(from: Dot, to: Dot, player: Player) -> Self {
        Self { from, to, player }
    }

    /// The first dot, as given.
    pub fn from(&self) -> Dot {
        self.from
    }

    /// The second dot, as given.
    pub fn to(&self) -> Dot {
        self.to
    }

    /// True if both dots lie on the same row.
    pub fn is_horizontal(&self) -> bool {
        self.from.row == self.to.row
    }
}

impl GameMove for DotsAndBoxesMove {
    fn player(&self) -> Player {
        self.player
    }
}

impl Display for DotsAndBoxesMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}-{}", self.player, self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Horizontal { row: usize, col: usize },
    Vertical { row: usize, col: usize },
}

/// A dots-and-boxes position on a `size`×`size` grid of dots.
///
/// `horizontal[r][c]` joins `(r, c)` and `(r, c + 1)`, `vertical[r][c]` joins
/// `(r, c)` and `(r + 1, c)`. Box `(r, c)` has its top-left corner at dot `(r, c)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotsAndBoxesState {
    size: usize,
    horizontal: Vec<Vec<bool>>,
    vertical: Vec<Vec<bool>>,
    boxes: Vec<Vec<Option<Player>>>,
    scores: [u32; 2],
    to_move: Player,
}

impl DotsAndBoxesState {
    /// An empty board with player 1 to move.
    pub fn new(size: usize) -> std::result::Result<Self, GameError> {
        DotsAndBoxesState::with_opener(size, Player::One)
    }

    /// An empty board with `opener` to move. Fails for fewer than two dots per side.
    pub fn with_opener(size: usize, opener: Player) -> std::result::Result<Self, GameError> {
        if size < MIN_SIZE {
            return Err(GameError::InvalidSize(size));
        }
        Ok(Self {
            size,
            horizontal: vec![vec![false; size - 1]; size],
            vertical: vec![vec![false; size]; size - 1],
            boxes: vec![vec![None; size - 1]; size - 1],
            scores: [0, 0],
            to_move: opener,
        })
    }

    /// Dots per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Horizontal edges, `size` rows of `size - 1`.
    pub fn horizontal(&self) -> &[Vec<bool>] {
        &self.horizontal
    }

    /// Vertical edges, `size - 1` rows of `size`.
    pub fn vertical(&self) -> &[Vec<bool>] {
        &self.vertical
    }

    /// Owner of each box, `None` while it is open.
    pub fn boxes(&self) -> &[Vec<Option<Player>>] {
        &self.boxes
    }

    /// Boxes owned by player 1 and player 2.
    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    /// Boxes owned by `player`.
    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    /// True if the edge named by `mv` is already drawn.
    pub fn is_drawn(&self, mv: &DotsAndBoxesMove) -> std::result::Result<bool, GameError> {
        Ok(self.is_edge_drawn(self.edge(mv)?))
    }

    /// Finds an edge that closes a box with three drawn sides, for the player to move.
    ///
    /// Boxes are scanned row by row; the missing side is looked up in the order
    /// top, bottom, left, right.
    pub fn box_completing_move(&self) -> Option<DotsAndBoxesMove> {
        let player = self.to_move;
        for i in 0..self.size - 1 {
            for j in 0..self.size - 1 {
                let sides = [
                    self.horizontal[i][j],
                    self.horizontal[i + 1][j],
                    self.vertical[i][j],
                    self.vertical[i][j + 1],
                ];
                if sides.iter().filter(|&&drawn| drawn).count() != 3 {
                    continue;
                }
                let (from, to) = match sides.iter().position(|&drawn| !drawn) {
                    Some(0) => (Dot::new(i, j), Dot::new(i, j + 1)),
                    Some(1) => (Dot::new(i + 1, j), Dot::new(i + 1, j + 1)),
                    Some(2) => (Dot::new(i, j), Dot::new(i + 1, j)),
                    _ => (Dot::new(i, j + 1), Dot::new(i + 1, j + 1)),
                };
                return Some(DotsAndBoxesMove::new(from, to, player));
            }
        }
        None
    }

    fn edge(&self, mv: &DotsAndBoxesMove) -> std::result::Result<Edge, GameError> {
        for dot in [mv.from, mv.to] {
            if dot.row >= self.size || dot.col >= self.size {
                return Err(GameError::OutOfBounds {
                    row: dot.row,
                    col: dot.col,
                });
            }
        }

        let (a, b) = (mv.from.min(mv.to), mv.from.max(mv.to));
        if a.row == b.row && b.col == a.col + 1 {
            Ok(Edge::Horizontal { row: a.row, col: a.col })
        } else if a.col == b.col && b.row == a.row + 1 {
            Ok(Edge::Vertical { row: a.row, col: a.col })
        } else {
            Err(GameError::IllegalMove(format!(
                "dots {} and {} are not adjacent",
                mv.from, mv.to
            )))
        }
    }

    fn is_edge_drawn(&self, edge: Edge) -> bool {
        match edge {
            Edge::Horizontal { row, col } => self.horizontal[row][col],
            Edge::Vertical { row, col } => self.vertical[row][col],
        }
    }

    fn is_box_closed(&self, row: usize, col: usize) -> bool {
        self.horizontal[row][col]
            && self.horizontal[row + 1][col]
            && self.vertical[row][col]
            && self.vertical[row][col + 1]
    }

    /// Boxes that touch `edge`.
    fn adjacent_boxes(&self, edge: Edge) -> Vec<(usize, usize)> {
        let last = self.size - 1;
        let mut boxes = Vec::with_capacity(2);
        match edge {
            Edge::Horizontal { row, col } => {
                if row > 0 {
                    boxes.push((row - 1, col));
                }
                if row < last {
                    boxes.push((row, col));
                }
            }
            Edge::Vertical { row, col } => {
                if col > 0 {
                    boxes.push((row, col - 1));
                }
                if col < last {
                    boxes.push((row, col));
                }
            }
        }
        boxes
    }
}

impl State for DotsAndBoxesState {
    type Move = DotsAndBoxesMove;

    fn player(&self) -> Player {
        self.to_move
    }

    fn moves(&self, player: Player) -> Vec<DotsAndBoxesMove> {
        let size = self.size;
        let horizontal = (0..size)
            .flat_map(|i| (0..size - 1).map(move |j| (i, j)))
            .filter(|&(i, j)| !self.horizontal[i][j])
            .map(|(i, j)| DotsAndBoxesMove::new(Dot::new(i, j), Dot::new(i, j + 1), player));
        let vertical = (0..size - 1)
            .flat_map(|i| (0..size).map(move |j| (i, j)))
            .filter(|&(i, j)| !self.vertical[i][j])
            .map(|(i, j)| DotsAndBoxesMove::new(Dot::new(i, j), Dot::new(i + 1, j), player));
        horizontal.chain(vertical).collect()
    }

    fn next(&self, mv: &DotsAndBoxesMove) -> std::result::Result<Self, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        let edge = self.edge(mv)?;
        if mv.player != self.to_move {
            return Err(GameError::NotYourTurn {
                expected: self.to_move,
                actual: mv.player,
            });
        }
        if self.is_edge_drawn(edge) {
            return Err(GameError::IllegalMove(format!(
                "edge {}-{} is already drawn",
                mv.from, mv.to
            )));
        }

        let mut next = self.clone();
        match edge {
            Edge::Horizontal { row, col } => next.horizontal[row][col] = true,
            Edge::Vertical { row, col } => next.vertical[row][col] = true,
        }

        let mut closed = 0;
        for (row, col) in next.adjacent_boxes(edge) {
            if next.boxes[row][col].is_none() && next.is_box_closed(row, col) {
                next.boxes[row][col] = Some(mv.player);
                closed += 1;
            }
        }
        next.scores[mv.player.index()] += closed;
        if closed == 0 {
            next.to_move = self.to_move.opponent();
        }
        Ok(next)
    }

    fn is_terminal(&self) -> bool {
        self.boxes.iter().flatten().all(Option::is_some)
    }

    fn winner(&self) -> Option<Player> {
        if !self.is_terminal() {
            return None;
        }
        let [one, two] = self.scores;
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl Display for DotsAndBoxesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.size {
            let mut dots = String::from("*");
            for j in 0..self.size - 1 {
                dots.push_str(if self.horizontal[i][j] { "---" } else { "   " });
                dots.push('*');
            }
            writeln!(f, "{}", dots.trim_end())?;

            if i + 1 == self.size {
                break;
            }
            let mut sides = String::new();
            for j in 0..self.size {
                sides.push(if self.vertical[i][j] { '|' } else { ' ' });
                if j + 1 < self.size {
                    sides.push_str(match self.boxes[i][j] {
                        Some(Player::One) => " 1 ",
                        Some(Player::Two) => " 2 ",
                        None => "   ",
                    });
                }
            }
            writeln!(f, "{}", sides.trim_end())?;
        }
        write!(
            f,
            "player 1: {}  player 2: {}  to move: {}",
            self.scores[0], self.scores[1], self.to_move
        )
    }
}

/// Preset strength levels of [`DotsAndBoxesAi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Every level, weakest first.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Search iterations per decision.
    pub fn iterations(self) -> u32 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 1000,
            Difficulty::Hard => 5000,
            Difficulty::Expert => 15000,
        }
    }

    /// UCT exploration constant.
    pub fn exploration(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            _ => SQRT_2,
        }
    }

    /// Whether an available box is taken without searching.
    pub fn uses_heuristics(self) -> bool {
        self != Difficulty::Easy
    }

    /// Whether a move that gives the opponent no box is preferred over searching.
    pub fn uses_safe_move(self) -> bool {
        matches!(self, Difficulty::Hard | Difficulty::Expert)
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::Expert => "EXPERT",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::UnknownDifficulty(s.to_string()))
    }
}

/// Recommends dots-and-boxes moves.
///
/// With heuristics on, an open box is always taken; with the safe-move rule on,
/// the first move that leaves no box for the opponent is played. Otherwise the
/// move comes from a random-rollout search ranked by win rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotsAndBoxesAi {
    config: MctsConfig,
    heuristics: bool,
    safe_move: bool,
    difficulty: Option<Difficulty>,
}

impl Default for DotsAndBoxesAi {
    fn default() -> Self {
        DotsAndBoxesAi::new(Difficulty::Medium)
    }
}

impl DotsAndBoxesAi {
    /// Creates an AI with the preset of `difficulty`.
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            config: search_config(difficulty.iterations(), difficulty.exploration()),
            heuristics: difficulty.uses_heuristics(),
            safe_move: difficulty.uses_safe_move(),
            difficulty: Some(difficulty),
        }
    }

    /// Custom search budget with the box-completing heuristic on and the
    /// safe-move rule off.
    pub fn with_parameters(iterations: u32, exploration: f64) -> Self {
        Self {
            config: search_config(iterations, exploration),
            heuristics: true,
            safe_move: false,
            difficulty: None,
        }
    }

    /// The preset this AI was built from, `None` for custom parameters.
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Returns the search parameters.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Whether open boxes are taken without searching.
    pub fn uses_heuristics(&self) -> bool {
        self.heuristics
    }

    /// Whether the safe-move rule runs before the search.
    pub fn uses_safe_move(&self) -> bool {
        self.safe_move
    }

    /// Returns the recommended move, or `None` if the game is over.
    pub fn find_best_move<K: RandomGenerator>(
        &self,
        state: &DotsAndBoxesState,
        rng: &mut K,
    ) -> Result<Option<DotsAndBoxesMove>> {
        if state.is_terminal() {
            return Ok(None);
        }

        if self.heuristics {
            if let Some(mv) = state.box_completing_move() {
                debug!(%mv, "taking open box");
                return Ok(Some(mv));
            }
            if self.safe_move {
                if let Some(mv) = find_safe_move(state)? {
                    debug!(%mv, "playing safe move");
                    return Ok(Some(mv));
                }
            }
        }

        MonteCarloTreeSearch::builder(state.clone(), rng)
            .with_config(self.config)
            .build()
            .find_best_move()
    }

    /// Lets the AI play both sides from `state` until every box is owned.
    pub fn self_play<K: RandomGenerator>(
        &self,
        state: &DotsAndBoxesState,
        rng: &mut K,
    ) -> Result<DotsAndBoxesState> {
        let mut state = state.clone();
        while !state.is_terminal() {
            let Some(mv) = self.find_best_move(&state, rng)? else {
                break;
            };
            debug!(%mv, "dots-and-boxes move");
            state = state.next(&mv)?;
        }
        Ok(state)
    }
}

fn search_config(iterations: u32, exploration: f64) -> MctsConfig {
    MctsConfig::default()
        .with_iterations(iterations)
        .with_exploration(exploration)
        .with_final_move(FinalMoveSelection::BestWinRate)
}

/// The first move, in enumeration order, after which the opponent has no box to close.
pub fn find_safe_move(state: &DotsAndBoxesState) -> Result<Option<DotsAndBoxesMove>> {
    for mv in state.moves(state.player()) {
        if state.next(&mv)?.box_completing_move().is_none() {
            return Ok(Some(mv));
        }
    }
    Ok(None)
}
