use ct_game::board::Board;

use crate::network::ZeroEvaluation;
use crate::util::sequence::zip_eq_exact;
use crate::zero::node::{ActionStats, Node, UctWeights};
use crate::zero::tree::Tree;

/// An action taken on the way down, identified by the node key and the index of the action in that node.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PathStep {
    pub key: u64,
    pub index: usize,
}

/// A position that needs a network evaluation before the simulation can finish.
#[derive(Debug)]
pub struct ZeroRequest {
    pub key: u64,
    pub board: Board,
    path: Vec<PathStep>,
}

impl ZeroRequest {
    pub fn path(&self) -> &[PathStep] {
        &self.path
    }
}

/// The first half of a simulation, walks down the tree from `root_board` until either:
/// * a **terminal** position is reached.
/// Its value is immediately propagated back to the root and `None` is returned.
/// * an **unexpanded** position is reached.
/// This position is returned in a [ZeroRequest], nothing in the tree changes yet.
pub fn zero_step_gather(tree: &mut Tree, root_board: &Board, weights: UctWeights) -> Option<ZeroRequest> {
    let mut board = root_board.clone();
    let mut path = vec![];

    loop {
        let key = board.position_key();

        if let Some(outcome) = board.outcome() {
            tree_propagate_values(tree, &path, outcome.pov_value(board.next_player()));
            return None;
        }

        let node = match tree.node(key) {
            None => return Some(ZeroRequest { key, board, path }),
            Some(node) => node,
        };

        let index = match node.select(weights) {
            Some(index) => index,
            None => {
                // an expanded position without actions is always terminal, this is just a fallback
                tree_propagate_values(tree, &path, 0.0);
                return None;
            }
        };

        board.apply(node.actions[index].action);
        path.push(PathStep { key, index });
    }
}

/// The second half of a simulation. Expands the requested position with the network evaluation
/// and propagates its value back to the root.
pub fn zero_step_apply(tree: &mut Tree, request: ZeroRequest, eval: ZeroEvaluation) {
    let ZeroRequest { key, board, path } = request;
    let value = expand_node(tree, key, &board, eval);
    tree_propagate_values(tree, &path, value);
}

/// Insert the node for `board` and return the network value.
pub fn expand_node(tree: &mut Tree, key: u64, board: &Board, eval: ZeroEvaluation) -> f32 {
    let ZeroEvaluation { value, policy } = eval;

    let actions = zip_eq_exact(board.legal_actions(), policy)
        .map(|(action, p)| ActionStats::new(action, p))
        .collect();

    tracing::trace!("Expanding {:#018x} with value {:.3}", key, value);
    tree.insert(key, Node::new(value, actions));
    value
}

/// Walk the path backwards, flipping `value` at each step since the player to move alternates.
/// `value` is from the point of view of the player to move at the end of the path.
pub fn tree_propagate_values(tree: &mut Tree, path: &[PathStep], mut value: f32) {
    for step in path.iter().rev() {
        value = -value;

        let node = tree
            .node_mut(step.key)
            .unwrap_or_else(|| panic!("Node {:#x} on the path is not in the tree", step.key));
        let stats = &mut node.actions[step.index];
        stats.visits += 1;
        stats.sum_value += value;
    }
}
