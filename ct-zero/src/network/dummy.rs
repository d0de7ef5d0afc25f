use std::borrow::Borrow;

use ct_game::board::Board;

use crate::network::common::uniform_policy;
use crate::network::{Network, ZeroEvaluation};

/// A [Network] that always returns value zero and a uniform policy.
#[derive(Debug, Clone, Copy)]
pub struct DummyNetwork;

impl Network for DummyNetwork {
    fn evaluate_batch(&mut self, boards: &[impl Borrow<Board>]) -> Vec<ZeroEvaluation> {
        boards
            .iter()
            .map(|board| ZeroEvaluation {
                value: 0.0,
                policy: uniform_policy(board.borrow().legal_actions().len()),
            })
            .collect()
    }
}
