use crate::board::{Player, State};

/// Reward for a win, seen from the player who moved into a node.
pub const WIN_REWARD: f64 = 1.0;
/// Reward for a draw.
pub const DRAW_REWARD: f64 = 0.5;
/// Reward for a loss.
pub const LOSS_REWARD: f64 = 0.0;

/// Represents a single node in the Monte Carlo search tree.
///
/// Statistics are always kept from the perspective of `mover`, the player whose
/// move produced this node's state. A parent choosing between its children
/// therefore reads `wins / playouts` directly as its own win rate.
#[derive(Debug, Clone)]
pub struct MctsNode<S: State> {
    /// The game state that this node represents.
    pub state: S,
    /// The player who moved into this state. For the root it is the opponent of
    /// the player to move.
    pub mover: Player,
    /// Accumulated reward.
    pub wins: f64,
    /// The number of playouts that passed through this node.
    pub playouts: u32,
    /// Legal moves that do not have a child yet.
    pub unexpanded: Vec<S::Move>,
    /// Number of legal moves at construction time.
    pub legal_moves: usize,
}

impl<S: State> MctsNode<S> {
    /// Creates the root node for a search starting at `state`.
    ///
    /// Unlike a terminal child, a terminal root starts without statistics, so its
    /// playout count always equals the number of iterations run.
    pub fn root(state: S) -> Self {
        let mover = state.player().opponent();
        let mut node = MctsNode::new(state, mover);
        node.wins = 0.0;
        node.playouts = 0;
        node
    }

    /// Creates a node reached by a move of `mover`.
    ///
    /// A terminal state gets its statistics right away: one playout scored from
    /// the winner, with no rollout.
    pub fn new(state: S, mover: Player) -> Self {
        if state.is_terminal() {
            let wins = reward_for(mover, state.winner());
            return MctsNode {
                state,
                mover,
                wins,
                playouts: 1,
                unexpanded: Vec::new(),
                legal_moves: 0,
            };
        }

        let unexpanded = state.moves(state.player());
        let legal_moves = unexpanded.len();
        MctsNode {
            state,
            mover,
            wins: 0.0,
            playouts: 0,
            unexpanded,
            legal_moves,
        }
    }

    /// True if the state is terminal or some legal move has not been expanded.
    pub fn is_leaf(&self) -> bool {
        self.state.is_terminal() || !self.unexpanded.is_empty()
    }

    /// True if the game is over in this node's state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Calculates the win rate of this node.
    pub fn wins_rate(&self) -> f64 {
        if self.playouts == 0 {
            0.0
        } else {
            self.wins / self.playouts as f64
        }
    }

    /// Records one playout that ended with `winner`.
    pub fn record(&mut self, winner: Option<Player>) {
        self.playouts += 1;
        self.wins += reward_for(self.mover, winner);
    }
}

/// Reward credited to `perspective` when a playout ends with `winner`.
pub fn reward_for(perspective: Player, winner: Option<Player>) -> f64 {
    match winner {
        None => DRAW_REWARD,
        Some(player) if player == perspective => WIN_REWARD,
        Some(_) => LOSS_REWARD,
    }
}
