use std::borrow::Borrow;

use ct_game::board::Board;
use ct_game::mapping::ContrastMapper;
use ct_net::model::NetOutput;

use crate::network::ZeroEvaluation;

/// Turn the raw network output into an evaluation per board.
/// The logit of an action is the sum of its move logit and its tile logit.
pub fn decode_output(mapper: ContrastMapper, boards: &[impl Borrow<Board>], output: &NetOutput) -> Vec<ZeroEvaluation> {
    let move_logits = output.move_logits.view2();
    let tile_logits = output.tile_logits.view2();
    assert_eq!(boards.len(), output.values.len(), "Batch size mismatch");

    boards
        .iter()
        .enumerate()
        .map(|(bi, board)| {
            let board = board.borrow();

            let mut policy: Vec<f32> = board
                .legal_actions()
                .into_iter()
                .map(|action| {
                    let (move_index, tile_index) = mapper.policy_indices(board, action);
                    move_logits[(bi, move_index)] + tile_logits[(bi, tile_index)]
                })
                .collect();

            if !policy.is_empty() {
                softmax_in_place(&mut policy);
            }

            ZeroEvaluation {
                value: output.values[bi],
                policy,
            }
        })
        .collect()
}

pub fn softmax_in_place(slice: &mut [f32]) {
    let max = slice.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));

    let mut sum = 0.0;
    for v in slice.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    assert!(sum > 0.0, "Softmax input sum must be strictly positive, was {}", sum);
    for v in slice.iter_mut() {
        *v /= sum;
    }
}

pub fn uniform_policy(available_actions: usize) -> Vec<f32> {
    vec![1.0 / available_actions as f32; available_actions]
}
