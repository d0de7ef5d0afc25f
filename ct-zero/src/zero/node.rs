use ct_game::action::Action;
use serde::{Deserialize, Serialize};

use crate::util::sequence::first_max_index;

/// The search statistics of a single action of an expanded position.
#[derive(Debug, Clone)]
pub struct ActionStats {
    pub action: Action,

    /// The prior as returned by the network when the position was expanded.
    pub net_policy: f32,
    /// The prior used for selection, equal to `net_policy` except at the root where noise is mixed in.
    pub policy: f32,

    /// The number of completed simulations that took this action.
    pub visits: u64,
    /// The sum of the values found after this action, from the point of view of the player taking it.
    pub sum_value: f32,
}

#[derive(Debug, Copy, Clone)]
pub struct Uct {
    /// value, range -1..1
    pub q: f32,
    /// exploration, range 0..inf
    pub u: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct UctWeights {
    /// The `c_puct` constant.
    pub exploration_weight: f32,
}

impl Default for UctWeights {
    fn default() -> Self {
        UctWeights { exploration_weight: 2.5 }
    }
}

impl Uct {
    pub fn total(self, weights: UctWeights) -> f32 {
        let Uct { q, u } = self;
        q + weights.exploration_weight * u
    }
}

impl ActionStats {
    pub fn new(action: Action, net_policy: f32) -> Self {
        ActionStats {
            action,
            net_policy,
            policy: net_policy,
            visits: 0,
            sum_value: 0.0,
        }
    }

    /// The mean value, zero if unvisited.
    pub fn q(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.sum_value / self.visits as f32
        }
    }

    pub fn uct(&self, parent_visits: u64) -> Uct {
        // the first selection at a fresh node still follows the prior
        let parent_visits = parent_visits.max(1);
        let u = self.policy * (parent_visits as f32).sqrt() / (1 + self.visits) as f32;
        Uct { q: self.q(), u }
    }
}

/// An expanded position in the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// The value returned by the network for this position, from the point of view of the player to move.
    pub net_value: f32,
    /// One entry per legal action, in [Board::legal_actions](ct_game::board::Board::legal_actions) order.
    pub actions: Vec<ActionStats>,
}

impl Node {
    pub fn new(net_value: f32, actions: Vec<ActionStats>) -> Self {
        Node { net_value, actions }
    }

    pub fn total_visits(&self) -> u64 {
        self.actions.iter().map(|a| a.visits).sum()
    }

    pub fn total_value(&self) -> f32 {
        self.actions.iter().map(|a| a.sum_value).sum()
    }

    /// The visit-weighted mean value of the actions, zero if unvisited.
    pub fn value(&self) -> f32 {
        let visits = self.total_visits();
        if visits == 0 {
            0.0
        } else {
            self.total_value() / visits as f32
        }
    }

    /// The index of the action maximizing the PUCT score, ties go to the first one.
    pub fn select(&self, weights: UctWeights) -> Option<usize> {
        let parent_visits = self.total_visits();
        first_max_index(self.actions.iter().map(|a| a.uct(parent_visits).total(weights)))
    }

    /// The index of the most visited action, ties go to the first one.
    pub fn best_index(&self) -> Option<usize> {
        first_max_index(self.actions.iter().map(|a| a.visits as f32))
    }

    pub fn best_action(&self) -> Option<Action> {
        self.best_index().map(|i| self.actions[i].action)
    }

    /// Mix `noise` into the network policy: `policy = (1 - eps) * net_policy + eps * noise`.
    pub fn set_noise(&mut self, noise: &[f32], epsilon: f32) {
        assert_eq!(noise.len(), self.actions.len(), "Noise length mismatch");
        for (stats, &n) in self.actions.iter_mut().zip(noise) {
            stats.policy = (1.0 - epsilon) * stats.net_policy + epsilon * n;
        }
    }

    pub fn clear_noise(&mut self) {
        for stats in &mut self.actions {
            stats.policy = stats.net_policy;
        }
    }
}
