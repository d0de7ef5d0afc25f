use std::borrow::Borrow;
use std::fmt::Debug;

use ct_game::board::Board;

pub mod common;
pub mod cpu;
pub mod dummy;

/// A board evaluation as returned by a network.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroEvaluation {
    /// The value for the player to move, range `-1..1`.
    pub value: f32,
    /// The normalized policy, only containing the legal actions in the order they are returned by [Board::legal_actions].
    pub policy: Vec<f32>,
}

pub trait Network: Debug {
    fn evaluate_batch(&mut self, boards: &[impl Borrow<Board>]) -> Vec<ZeroEvaluation>;

    fn evaluate(&mut self, board: &Board) -> ZeroEvaluation {
        let mut result = self.evaluate_batch(&[board]);
        assert_eq!(result.len(), 1);
        result.pop().expect("Length was checked to be one")
    }
}

impl<N: Network> Network for &mut N {
    fn evaluate_batch(&mut self, boards: &[impl Borrow<Board>]) -> Vec<ZeroEvaluation> {
        (**self).evaluate_batch(boards)
    }
}
