use crate::board::{Player, State};
use crate::error::Result;
use crate::mcts_node::MctsNode;
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::rollout::{RandomRollout, RolloutPolicy};
use crate::tree::SearchTree;
use ego_tree::NodeId;
use tracing::{debug, trace};

/// Iteration budget used when none is configured.
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// How the recommended move is picked once the budget is spent.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum FinalMoveSelection {
    /// The most visited child (robust child); ignores the win rate.
    MostVisited,
    /// The child with the best win rate among those with at least one playout.
    BestWinRate,
}

/// Search parameters.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct MctsConfig {
    /// Number of select/expand/simulate/backpropagate cycles per decision.
    pub iterations: u32,
    /// The `C` constant of the UCT formula.
    pub exploration: f64,
    /// Rule used to extract the recommended move.
    pub final_move: FinalMoveSelection,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            exploration: std::f64::consts::SQRT_2,
            final_move: FinalMoveSelection::MostVisited,
        }
    }
}

impl MctsConfig {
    /// Sets the number of iterations per decision.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the UCT exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Sets the rule used to extract the recommended move.
    pub fn with_final_move(mut self, final_move: FinalMoveSelection) -> Self {
        self.final_move = final_move;
        self
    }
}

/// The main struct for running the Monte Carlo Tree Search algorithm.
///
/// It owns the search tree for one decision, the random number generator and the
/// rollout policy. Build a new instance for every decision; trees are never reused.
pub struct MonteCarloTreeSearch<S: State, K: RandomGenerator, P: RolloutPolicy<S> = RandomRollout> {
    tree: SearchTree<S>,
    random: K,
    rollout: P,
    config: MctsConfig,
    next_action: MctsAction,
}

/// A builder for creating instances of `MonteCarloTreeSearch`.
pub struct MonteCarloTreeSearchBuilder<
    S: State,
    K: RandomGenerator,
    P: RolloutPolicy<S> = RandomRollout,
> {
    state: S,
    random_generator: K,
    rollout: P,
    config: MctsConfig,
}

impl<S: State, K: RandomGenerator> MonteCarloTreeSearchBuilder<S, K> {
    /// Creates a new builder with the given initial state and random source.
    pub fn new(state: S, random_generator: K) -> Self {
        Self {
            state,
            random_generator,
            rollout: RandomRollout,
            config: MctsConfig::default(),
        }
    }
}

impl<S: State, K: RandomGenerator, P: RolloutPolicy<S>> MonteCarloTreeSearchBuilder<S, K, P> {
    /// Replaces all search parameters at once.
    pub fn with_config(mut self, config: MctsConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the iteration budget.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Sets the UCT exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.config.exploration = exploration;
        self
    }

    /// Sets the rule used to pick the final move.
    pub fn with_final_move_selection(mut self, final_move: FinalMoveSelection) -> Self {
        self.config.final_move = final_move;
        self
    }

    /// Sets the policy used during simulation.
    pub fn with_rollout<Q: RolloutPolicy<S>>(
        self,
        rollout: Q,
    ) -> MonteCarloTreeSearchBuilder<S, K, Q> {
        MonteCarloTreeSearchBuilder {
            state: self.state,
            random_generator: self.random_generator,
            rollout,
            config: self.config,
        }
    }

    /// Builds the `MonteCarloTreeSearch` instance with the configured parameters.
    pub fn build(self) -> MonteCarloTreeSearch<S, K, P> {
        MonteCarloTreeSearch::new(self.state, self.random_generator, self.rollout, self.config)
    }
}

impl<S: State, K: RandomGenerator> MonteCarloTreeSearch<S, K> {
    /// Returns a new builder for `MonteCarloTreeSearch`.
    pub fn builder(state: S, random_generator: K) -> MonteCarloTreeSearchBuilder<S, K> {
        MonteCarloTreeSearchBuilder::new(state, random_generator)
    }
}

impl<S: State, K: RandomGenerator, P: RolloutPolicy<S>> MonteCarloTreeSearch<S, K, P> {
    /// Creates a new `MonteCarloTreeSearch` instance.
    ///
    /// It is recommended to use the builder pattern via `MonteCarloTreeSearch::builder()` instead.
    pub fn new(state: S, random: K, rollout: P, config: MctsConfig) -> Self {
        Self {
            tree: SearchTree::new(state),
            random,
            rollout,
            config,
            next_action: MctsAction::Selection { path: vec![] },
        }
    }

    /// Returns an immutable reference to the underlying search tree.
    pub fn get_tree(&self) -> &SearchTree<S> {
        &self.tree
    }

    /// Returns the search parameters.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Returns the next MCTS action to be performed. Useful for debugging and visualization.
    pub fn get_next_mcts_action(&self) -> &MctsAction {
        &self.next_action
    }

    /// Returns the root node of the search tree.
    pub fn get_root(&self) -> Result<&MctsNode<S>> {
        self.tree.data(self.tree.root_id())
    }

    /// Returns the ids of the root's children in creation order.
    pub fn root_children(&self) -> Result<Vec<NodeId>> {
        self.tree.children(self.tree.root_id())
    }

    /// Executes a single step of the MCTS algorithm (Selection, Expansion, Simulation,
    /// or Backpropagation).
    pub fn execute_action(&mut self) -> Result<()> {
        self.next_action = match std::mem::take(&mut self.next_action) {
            MctsAction::Selection { path: _ } => MctsAction::Expansion {
                leaf: self.select_next_node()?,
            },
            MctsAction::Expansion { leaf } => {
                let node = self.tree.explore(leaf, &mut self.random)?.unwrap_or(leaf);
                MctsAction::Simulation { node }
            }
            MctsAction::Simulation { node } => {
                let winner = self.simulate(node)?;
                MctsAction::Backpropagation { node, winner }
            }
            MctsAction::Backpropagation { node, winner } => MctsAction::Selection {
                path: self.tree.record_playout(node, winner)?,
            },
        };
        Ok(())
    }

    /// Performs one full iteration of the MCTS algorithm (Selection, Expansion,
    /// Simulation, Backpropagation).
    /// Returns the path of nodes that were updated during backpropagation.
    pub fn do_iteration(&mut self) -> Result<Vec<NodeId>> {
        loop {
            self.execute_action()?;
            if let MctsAction::Selection { path } = &self.next_action {
                return Ok(path.clone());
            }
        }
    }

    /// Runs the MCTS search for a specified number of iterations.
    pub fn iterate_n_times(&mut self, n: u32) -> Result<()> {
        for _ in 0..n {
            self.do_iteration()?;
        }
        Ok(())
    }

    /// Runs the configured budget and returns the recommended move.
    ///
    /// Returns `None` for a terminal root or when no legal move exists. If the
    /// search created no child, the first enumerated move is returned.
    pub fn find_best_move(&mut self) -> Result<Option<S::Move>> {
        let root_state = self.get_root()?.state.clone();
        if root_state.is_terminal() {
            return Ok(None);
        }

        self.iterate_n_times(self.config.iterations)?;

        let Some(best) = self.get_best_child()? else {
            return Ok(root_state.moves(root_state.player()).into_iter().next());
        };

        let best_node = self.tree.data(best)?;
        debug!(
            iterations = self.config.iterations,
            root_playouts = self.get_root()?.playouts,
            child_playouts = best_node.playouts,
            win_rate = best_node.wins_rate(),
            "search finished"
        );

        match find_move_to_state(&root_state, &best_node.state)? {
            Some(mv) => Ok(Some(mv)),
            None => Ok(root_state.moves(root_state.player()).into_iter().next()),
        }
    }

    /// Returns the root child chosen by the configured final-move rule.
    pub fn get_best_child(&self) -> Result<Option<NodeId>> {
        let root = self.tree.root_id();
        let mut best: Option<NodeId> = None;
        let mut best_score = f64::NEG_INFINITY;

        for child_id in self.tree.children(root)? {
            let child = self.tree.data(child_id)?;
            let score = match self.config.final_move {
                FinalMoveSelection::MostVisited => child.playouts as f64,
                FinalMoveSelection::BestWinRate => {
                    if child.playouts == 0 {
                        continue;
                    }
                    child.wins_rate()
                }
            };
            if best.is_none() || score > best_score {
                best_score = score;
                best = Some(child_id);
            }
        }

        Ok(best)
    }

    /// Descends from the root while nodes are fully expanded and not terminal,
    /// following the best UCT child.
    fn select_next_node(&self) -> Result<NodeId> {
        let mut current = self.tree.root_id();
        loop {
            if self.tree.data(current)?.is_terminal() || !self.tree.is_fully_expanded(current)? {
                return Ok(current);
            }
            match self.tree.best_uct_child(current, self.config.exploration)? {
                Some(child) => current = child,
                None => return Ok(current),
            }
        }
    }

    /// Plays the rollout policy from a node until the game ends.
    ///
    /// A state with no legal moves that is not terminal ends the playout as a draw.
    fn simulate(&mut self, node_id: NodeId) -> Result<Option<Player>> {
        let mut state = self.tree.data(node_id)?.state.clone();
        let mut depth = 0;
        while !state.is_terminal() {
            let moves = state.moves(state.player());
            let Some(mv) = self.rollout.choose(&state, &moves, &mut self.random) else {
                break;
            };
            state = state.next(&mv)?;
            depth += 1;
        }

        let winner = state.winner();
        trace!(depth, ?winner, "rollout complete");
        Ok(winner)
    }
}

impl<S: State> MonteCarloTreeSearch<S, StandardRandomGenerator> {
    /// Creates a search with default parameters, random rollouts and the thread-local generator.
    pub fn from_state(state: S) -> Self {
        MonteCarloTreeSearchBuilder::new(state, StandardRandomGenerator::default()).build()
    }
}

/// Finds the legal move of `from` whose result equals `to`.
pub fn find_move_to_state<S: State>(from: &S, to: &S) -> Result<Option<S::Move>> {
    for mv in from.moves(from.player()) {
        if from.next(&mv)? == *to {
            return Ok(Some(mv));
        }
    }
    Ok(None)
}

/// Represents the four main stages of the MCTS algorithm.
///
/// This enum is used to manage the state of the search process.
#[derive(Debug, PartialEq, Clone)]
pub enum MctsAction {
    /// **Selection**: Start from the root and descend through fully expanded nodes.
    Selection {
        /// The path of nodes updated during the last backpropagation phase.
        path: Vec<NodeId>,
    },
    /// **Expansion**: Add one child to the selected `leaf`.
    Expansion {
        /// The node reached by selection.
        leaf: NodeId,
    },
    /// **Simulation**: Run a playout from the newly created `node`.
    Simulation {
        /// The node the playout starts from.
        node: NodeId,
    },
    /// **Backpropagation**: Update the statistics of the nodes on the path from `node` to the root.
    Backpropagation {
        /// The node the playout started from.
        node: NodeId,
        /// The winner of the playout, `None` for a draw.
        winner: Option<Player>,
    },
}

impl Default for MctsAction {
    fn default() -> Self {
        MctsAction::Selection { path: vec![] }
    }
}

impl MctsAction {
    /// Returns the name of the current MCTS action.
    pub fn get_name(&self) -> &'static str {
        match self {
            MctsAction::Selection { .. } => "Selection",
            MctsAction::Expansion { .. } => "Expansion",
            MctsAction::Simulation { .. } => "Simulation",
            MctsAction::Backpropagation { .. } => "Backpropagation",
        }
    }
}
