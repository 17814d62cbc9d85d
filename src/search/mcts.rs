//! Monte Carlo tree search
//!
//! Nodes live in an arena and refer to each other by index. A node keeps the
//! index of its parent for the upward walk during backpropagation and owns
//! the indices of its children.
//!
//! Statistics are always from White's point of view: a rollout is worth +1
//! when White wins, -1 when Black wins and 0 otherwise.

use rand::seq::SliceRandom;
use rand::RngCore;
use shakmaty::{Chess, Color, Move, Position};
use tracing::debug;

use super::params::MctsParams;
use super::MoveSearch;
use crate::board::move_to_uci;
use crate::error::{EngineError, EngineResult};

/// Halfmove clock value at which the 75-move rule ends a rollout
const SEVENTY_FIVE_MOVE_HALFMOVES: u32 = 150;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
struct Node {
    position: Chess,
    parent: Option<NodeId>,
    /// Move that led here from the parent, `None` at the root
    mv: Option<Move>,
    visits: u32,
    wins: i64,
    children: Vec<NodeId>,
}

impl Node {
    fn new(position: Chess, parent: Option<NodeId>, mv: Option<Move>) -> Self {
        Self {
            position,
            parent,
            mv,
            visits: 0,
            wins: 0,
            children: Vec::new(),
        }
    }
}

/// One search tree, discarded after the move is chosen
#[derive(Debug)]
pub struct Mcts {
    nodes: Vec<Node>,
    params: MctsParams,
}

impl Mcts {
    pub fn new(root: Chess, params: MctsParams) -> Self {
        Self {
            nodes: vec![Node::new(root, None, None)],
            params,
        }
    }

    /// Run `iterations` rounds of select, expand, simulate and backpropagate
    pub fn run(&mut self, iterations: u32, rng: &mut dyn RngCore) {
        for _ in 0..iterations {
            let leaf = self.select(rng);
            self.expand(leaf);
            let result = self.simulate(leaf, rng);
            self.backpropagate(leaf, result);
        }
        debug!(
            iterations,
            nodes = self.nodes.len(),
            root_visits = self.nodes[ROOT].visits,
            "mcts finished"
        );
    }

    /// Descend from the root to a node without children
    ///
    /// An unvisited child is taken uniformly at random as soon as one exists;
    /// otherwise the child with the best UCT value is followed.
    fn select(&self, rng: &mut dyn RngCore) -> NodeId {
        let mut current = ROOT;
        loop {
            let node = &self.nodes[current];
            if node.children.is_empty() {
                return current;
            }

            let unvisited: Vec<NodeId> = node
                .children
                .iter()
                .copied()
                .filter(|&c| self.nodes[c].visits == 0)
                .collect();
            if let Some(&child) = unvisited.choose(&mut *rng) {
                return child;
            }

            current = self.best_uct_child(current);
        }
    }

    fn best_uct_child(&self, parent: NodeId) -> NodeId {
        let node = &self.nodes[parent];
        let mut best = node.children[0];
        let mut best_value = f64::NEG_INFINITY;
        for &child in &node.children {
            let value = self.uct(parent, child);
            if value > best_value {
                best_value = value;
                best = child;
            }
        }
        best
    }

    /// `wins/visits + C * sqrt(ln(parent.visits + 1) / (child.visits + 1))`
    fn uct(&self, parent: NodeId, child: NodeId) -> f64 {
        let parent_visits = self.nodes[parent].visits as f64;
        let child = &self.nodes[child];
        let visits = child.visits as f64;
        let exploitation = child.wins as f64 / visits;
        let exploration = ((parent_visits + 1.0).ln() / (visits + 1.0)).sqrt();
        exploitation + self.params.exploration * exploration
    }

    /// Add one child per legal move; a node is expanded at most once
    fn expand(&mut self, id: NodeId) {
        if !self.nodes[id].children.is_empty() {
            return;
        }
        let position = self.nodes[id].position.clone();
        for mv in position.legal_moves() {
            let mut child = position.clone();
            child.play_unchecked(&mv);
            let child_id = self.nodes.len();
            self.nodes.push(Node::new(child, Some(id), Some(mv)));
            self.nodes[id].children.push(child_id);
        }
    }

    /// Play uniformly random moves until the game ends
    fn simulate(&self, id: NodeId, rng: &mut dyn RngCore) -> i64 {
        let mut pos = self.nodes[id].position.clone();
        let mut plies = 0;
        loop {
            if pos.is_checkmate() {
                return match pos.turn() {
                    Color::White => -1,
                    Color::Black => 1,
                };
            }
            if pos.is_game_over()
                || pos.halfmoves() >= SEVENTY_FIVE_MOVE_HALFMOVES
                || plies >= self.params.max_rollout_plies
            {
                return 0;
            }

            let moves = pos.legal_moves();
            match moves.choose(&mut *rng) {
                Some(mv) => pos.play_unchecked(mv),
                None => return 0,
            }
            plies += 1;
        }
    }

    /// Credit the result to `id` and all its ancestors
    fn backpropagate(&mut self, id: NodeId, result: i64) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id];
            node.visits += 1;
            node.wins += result;
            current = node.parent;
        }
    }

    /// Pick the root move by visit count
    ///
    /// White takes the most visited child, Black the least visited one. On a
    /// tie the child generated first wins.
    pub fn best_move(&self) -> EngineResult<Move> {
        let root = &self.nodes[ROOT];
        let white = root.position.turn() == Color::White;

        let mut best: Option<&Node> = None;
        for node in root.children.iter().map(|&c| &self.nodes[c]) {
            let better = match best {
                None => true,
                Some(b) if white => node.visits > b.visits,
                Some(b) => node.visits < b.visits,
            };
            if better {
                best = Some(node);
            }
        }

        best.and_then(|n| n.mv.clone())
            .ok_or(EngineError::NoLegalMoves)
    }

    pub fn root_visits(&self) -> u32 {
        self.nodes[ROOT].visits
    }

    /// Visit count of each root move, in generation order
    pub fn root_children(&self) -> Vec<(Move, u32)> {
        self.nodes[ROOT]
            .children
            .iter()
            .filter_map(|&c| {
                let node = &self.nodes[c];
                node.mv.clone().map(|mv| (mv, node.visits))
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Stateless MCTS strategy: every request builds and drops its own tree
#[derive(Debug, Clone, Default)]
pub struct MctsSearch {
    params: MctsParams,
}

impl MctsSearch {
    pub fn new(params: MctsParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MctsParams {
        &self.params
    }
}

impl MoveSearch for MctsSearch {
    fn find_move(&mut self, pos: &Chess, rng: &mut dyn RngCore) -> EngineResult<Move> {
        if pos.legal_moves().is_empty() {
            return Err(EngineError::NoLegalMoves);
        }
        let mut tree = Mcts::new(pos.clone(), self.params.clone());
        tree.run(self.params.iterations, rng);
        let mv = tree.best_move()?;
        debug!(best = %move_to_uci(&mv), "mcts move");
        Ok(mv)
    }
}
