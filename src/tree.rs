//! Arena-allocated search tree.
//!
//! Nodes live in an `ego_tree::Tree` and refer to each other through `NodeId`s,
//! so a parent owns its children while children only hold an index back to it.

use crate::board::{Player, State};
use crate::error::{MctsError, Result};
use crate::hash::MurMurHasher;
use crate::mcts_node::{MctsNode, WIN_REWARD};
use crate::random::RandomGenerator;
use ego_tree::{NodeId, NodeRef, Tree};
use std::fmt::Write;

/// The tree built by one search. It is discarded once the decision is made.
pub struct SearchTree<S: State> {
    tree: Tree<MctsNode<S>>,
    root_id: NodeId,
}

impl<S: State> SearchTree<S> {
    /// Creates a tree holding only a root for `state`.
    pub fn new(state: S) -> Self {
        let tree = Tree::new(MctsNode::root(state));
        let root_id = tree.root().id();
        Self { tree, root_id }
    }

    /// Id of the node for the searched position.
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_, MctsNode<S>>> {
        self.tree.get(id).ok_or(MctsError::MissingNode(id))
    }

    /// Returns the statistics and state stored at `id`.
    pub fn data(&self, id: NodeId) -> Result<&MctsNode<S>> {
        Ok(self.node(id)?.value())
    }

    fn update<F: FnOnce(&mut MctsNode<S>)>(&mut self, id: NodeId, f: F) -> Result<()> {
        let mut node = self.tree.get_mut(id).ok_or(MctsError::MissingNode(id))?;
        f(node.value());
        Ok(())
    }

    /// Returns the ids of the children of `id`, in creation order.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.node(id)?.children().map(|child| child.id()).collect())
    }

    /// Returns the parent of `id`, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent().map(|parent| parent.id()))
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.tree.nodes().count()
    }

    /// True if the tree holds no node at all.
    pub fn is_empty(&self) -> bool {
        self.tree.nodes().next().is_none()
    }

    /// True if the state at `id` is terminal or it still has unexpanded moves.
    pub fn is_leaf(&self, id: NodeId) -> Result<bool> {
        Ok(self.data(id)?.is_leaf())
    }

    /// True once every legal move at `id` has a child.
    pub fn is_fully_expanded(&self, id: NodeId) -> Result<bool> {
        let node = self.node(id)?;
        Ok(node.children().count() >= node.value().legal_moves)
    }

    /// Expands one random move from the frontier of `id`.
    ///
    /// Returns the new child, or `None` when the state is terminal or every move
    /// already has a child.
    pub fn explore<K: RandomGenerator>(
        &mut self,
        id: NodeId,
        rng: &mut K,
    ) -> Result<Option<NodeId>> {
        let mut node = self.tree.get_mut(id).ok_or(MctsError::MissingNode(id))?;
        let data = node.value();
        if data.is_terminal() || data.unexpanded.is_empty() {
            return Ok(None);
        }

        let index = rng.next_index(data.unexpanded.len());
        let child_state = data.state.next(&data.unexpanded[index])?;
        data.unexpanded.remove(index);
        let mover = data.state.player();

        let child = node.append(MctsNode::new(child_state, mover));
        Ok(Some(child.id()))
    }

    /// Recomputes the statistics of `id` from its current children alone.
    ///
    /// A child's value is inverted when it was reached by the other player and
    /// taken as is when the same player kept the turn. Nodes without children are
    /// left untouched.
    pub fn back_propagate(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        let mover = node.value().mover;
        if node.children().next().is_none() {
            return Ok(());
        }

        let mut wins = 0.0;
        let mut playouts = 0;
        for child in node.children() {
            let child = child.value();
            wins += if child.mover == mover {
                child.wins
            } else {
                child.playouts as f64 * WIN_REWARD - child.wins
            };
            playouts += child.playouts;
        }

        self.update(id, |data| {
            data.wins = wins;
            data.playouts = playouts;
        })
    }

    /// Adds one playout ending with `winner` to every node from `id` up to the root.
    ///
    /// Returns the updated path, leaf first.
    pub fn record_playout(&mut self, id: NodeId, winner: Option<Player>) -> Result<Vec<NodeId>> {
        let mut branch = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current)? {
            branch.push(parent);
            current = parent;
        }

        for &node_id in &branch {
            self.update(node_id, |data| data.record(winner))?;
        }
        Ok(branch)
    }

    /// UCT score of `child` from its parent's point of view.
    ///
    /// Unvisited children score `+inf`. The parent's playout count is clamped to 1
    /// so the logarithm never goes negative.
    pub fn uct(&self, child: NodeId, exploration: f64) -> Result<f64> {
        let node = self.node(child)?;
        let data = node.value();
        if data.playouts == 0 {
            return Ok(f64::INFINITY);
        }

        let parent_playouts = node
            .parent()
            .map(|parent| parent.value().playouts)
            .unwrap_or(0)
            .max(1);
        let playouts = data.playouts as f64;
        Ok(data.wins / playouts + exploration * ((parent_playouts as f64).ln() / playouts).sqrt())
    }

    /// Selects the child of `id` with the greatest UCT score; ties go to the first.
    pub fn best_uct_child(&self, id: NodeId, exploration: f64) -> Result<Option<NodeId>> {
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for child in self.children(id)? {
            let score = self.uct(child, exploration)?;
            if best.is_none() || score > best_score {
                best = Some(child);
                best_score = score;
            }
        }
        Ok(best)
    }

    /// A hash of every node's statistics and state in pre-order.
    ///
    /// Two searches with the same seed and configuration produce the same
    /// fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut dump = String::new();
        for node in self.tree.root().descendants() {
            let data = node.value();
            let _ = write!(
                dump,
                "{}|{}|{:.6}|{}|{:?};",
                node.children().count(),
                data.playouts,
                data.wins,
                data.unexpanded.len(),
                data.state
            );
        }
        MurMurHasher::digest(&dump)
    }
}
