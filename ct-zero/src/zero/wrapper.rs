use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use ct_game::action::Action;
use ct_game::board::Board;

use crate::network::Network;
use crate::util::stable_dirichlet::StableDirichlet;
use crate::zero::node::UctWeights;
use crate::zero::step::{expand_node, zero_step_apply, zero_step_gather};
use crate::zero::tree::Tree;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroSettings {
    pub weights: UctWeights,
    pub dirichlet_alpha: f32,
    /// The fraction of noise mixed into the root policy, zero disables noise.
    pub dirichlet_epsilon: f32,
}

impl Default for ZeroSettings {
    fn default() -> Self {
        ZeroSettings {
            weights: UctWeights::default(),
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
        }
    }
}

/// Counters for a single search call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SearchStats {
    pub simulations: u64,
    /// Network evaluations, including the one for the root if it was new.
    pub expansions: u64,
    /// Simulations that ended in a terminal position.
    pub terminal_hits: u64,
}

impl ZeroSettings {
    /// The default settings without root noise.
    pub fn for_evaluation() -> Self {
        ZeroSettings::default().with_dirichlet_epsilon(0.0)
    }

    pub fn with_exploration_weight(self, exploration_weight: f32) -> Self {
        ZeroSettings {
            weights: UctWeights { exploration_weight },
            ..self
        }
    }

    pub fn with_dirichlet_alpha(self, dirichlet_alpha: f32) -> Self {
        ZeroSettings { dirichlet_alpha, ..self }
    }

    pub fn with_dirichlet_epsilon(self, dirichlet_epsilon: f32) -> Self {
        ZeroSettings {
            dirichlet_epsilon,
            ..self
        }
    }

    /// Construct a new tree from scratch and search `board` in it.
    pub fn build_tree(
        self,
        board: &Board,
        network: &mut impl Network,
        rng: &mut impl Rng,
        simulations: u64,
    ) -> Tree {
        let mut tree = Tree::new();
        self.expand_tree(&mut tree, board, network, rng, simulations);
        tree
    }

    /// Run `simulations` simulations from `board`, reusing and extending the existing nodes in `tree`.
    ///
    /// Does nothing if `board` is terminal. Otherwise the root is expanded first if needed,
    /// and fresh Dirichlet noise is mixed into the root policy.
    // TODO gather multiple leaves per network call once selection supports virtual visits
    pub fn expand_tree(
        self,
        tree: &mut Tree,
        board: &Board,
        network: &mut impl Network,
        rng: &mut impl Rng,
        simulations: u64,
    ) -> SearchStats {
        let mut stats = SearchStats::default();
        if board.is_done() {
            tracing::debug!("Skipping search for terminal position {:?}", board.outcome());
            return stats;
        }

        let root_key = board.position_key();
        if !tree.contains(root_key) {
            let eval = network.evaluate(board);
            expand_node(tree, root_key, board, eval);
            stats.expansions += 1;
        }

        self.add_root_noise(tree, root_key, rng);

        for _ in 0..simulations {
            stats.simulations += 1;

            match zero_step_gather(tree, board, self.weights) {
                Some(request) => {
                    let eval = network.evaluate(&request.board);
                    zero_step_apply(tree, request, eval);
                    stats.expansions += 1;
                }
                None => stats.terminal_hits += 1,
            }
        }

        tracing::debug!(
            "Searched {:#018x}: {:?}, best {:?}, value {:.3}",
            root_key,
            stats,
            tree.best_action(board),
            tree.root_value(board)
        );
        stats
    }

    fn add_root_noise(self, tree: &mut Tree, root_key: u64, rng: &mut impl Rng) {
        let root = match tree.node_mut(root_key) {
            Some(root) => root,
            None => return,
        };

        let len = root.actions.len();
        if self.dirichlet_epsilon == 0.0 || len < 2 {
            root.clear_noise();
            return;
        }

        match StableDirichlet::new(self.dirichlet_alpha, len) {
            Ok(distr) => {
                let noise = distr.sample(rng);
                root.set_noise(&noise, self.dirichlet_epsilon);
            }
            Err(_) => {
                tracing::warn!("Invalid dirichlet alpha {}, skipping root noise", self.dirichlet_alpha);
                root.clear_noise();
            }
        }
    }
}

/// A player that runs a fixed number of simulations per move, keeping its tree between moves.
#[derive(Debug)]
pub struct ZeroBot<N: Network, R: Rng> {
    network: N,
    settings: ZeroSettings,
    simulations: u64,
    rng: R,
    tree: Tree,
}

impl<N: Network, R: Rng> ZeroBot<N, R> {
    pub fn new(network: N, settings: ZeroSettings, simulations: u64, rng: R) -> Self {
        ZeroBot {
            network,
            settings,
            simulations,
            rng,
            tree: Tree::new(),
        }
    }

    /// Search `board` and return the most visited action together with the root value,
    /// `None` if the game is already over.
    pub fn think(&mut self, board: &Board) -> (Option<Action>, f32) {
        self.settings
            .expand_tree(&mut self.tree, board, &mut self.network, &mut self.rng, self.simulations);
        (self.tree.best_action(board), self.tree.root_value(board))
    }

    pub fn select_action(&mut self, board: &Board) -> Option<Action> {
        self.think(board).0
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn reset_tree(&mut self) {
        self.tree.clear();
    }
}
