use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use itertools::Itertools;

use ct_game::action::Action;
use ct_game::board::Board;

use crate::zero::node::Node;

/// Transposition table of expanded positions, keyed by [Board::position_key].
///
/// Nodes are only ever added, the tree persists across searches until it is cleared by its owner.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: IndexMap<u64, Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn node(&self, key: u64) -> Option<&Node> {
        self.nodes.get(&key)
    }

    pub(crate) fn node_mut(&mut self, key: u64) -> Option<&mut Node> {
        self.nodes.get_mut(&key)
    }

    pub fn contains(&self, key: u64) -> bool {
        self.nodes.contains_key(&key)
    }

    pub(crate) fn insert(&mut self, key: u64, node: Node) {
        let prev = self.nodes.insert(key, node);
        assert!(prev.is_none(), "Node {:#x} was already expanded", key);
    }

    pub fn root_node(&self, board: &Board) -> Option<&Node> {
        self.node(board.position_key())
    }

    pub fn root_visits(&self, board: &Board) -> u64 {
        self.root_node(board).map_or(0, |node| node.total_visits())
    }

    /// The most visited action of `board`, `None` if the position was never expanded or has no actions.
    pub fn best_action(&self, board: &Board) -> Option<Action> {
        self.root_node(board).and_then(|node| node.best_action())
    }

    /// The visit-weighted mean value of `board` for the player to move, zero if unvisited.
    pub fn root_value(&self, board: &Board) -> f32 {
        self.root_node(board).map_or(0.0, |node| node.value())
    }

    /// The visit distribution over the actions of `board`, in legal action order.
    pub fn policy(&self, board: &Board) -> Option<Vec<f32>> {
        let node = self.root_node(board)?;
        let total = node.total_visits();
        if total == 0 {
            return None;
        }
        Some(node.actions.iter().map(|a| a.visits as f32 / total as f32).collect())
    }

    pub fn display_root<'a>(&'a self, board: &Board, max_children: usize) -> RootDisplay<'a> {
        RootDisplay {
            key: board.position_key(),
            node: self.root_node(board),
            max_children,
        }
    }
}

#[derive(Debug)]
pub struct RootDisplay<'a> {
    key: u64,
    node: Option<&'a Node>,
    max_children: usize,
}

impl Display for RootDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let node = match self.node {
            None => return write!(f, "{:#018x}: not expanded", self.key),
            Some(node) => node,
        };

        writeln!(
            f,
            "{:#018x}: visits {}, value {:.3}, net value {:.3}",
            self.key,
            node.total_visits(),
            node.value(),
            node.net_value
        )?;

        let sorted = node
            .actions
            .iter()
            .sorted_by_key(|a| std::cmp::Reverse(a.visits))
            .take(self.max_children);
        for stats in sorted {
            writeln!(
                f,
                "  {:<14} N {:>6}  Q {:>6.3}  P {:.3} (net {:.3})",
                stats.action.to_string(),
                stats.visits,
                stats.q(),
                stats.policy,
                stats.net_policy
            )?;
        }

        let hidden = node.actions.len().saturating_sub(self.max_children);
        if hidden > 0 {
            writeln!(f, "  ... {} more", hidden)?;
        }
        Ok(())
    }
}
