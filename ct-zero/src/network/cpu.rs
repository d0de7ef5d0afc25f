use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};

use ct_game::board::Board;
use ct_game::mapping::ContrastMapper;
use ct_net::model::{ContrastNet, NetOutput};

use crate::network::common::decode_output;
use crate::network::{Network, ZeroEvaluation};

/// A [Network] backed by [ContrastNet] running on the cpu.
pub struct CpuNetwork {
    mapper: ContrastMapper,
    net: ContrastNet,
}

impl CpuNetwork {
    pub fn new(net: ContrastNet) -> Self {
        let shape = net.shape();
        let mapper = ContrastMapper;
        assert_eq!(
            mapper.input_shape(1),
            shape.input_shape(1),
            "Network input shape does not match the board encoding"
        );

        CpuNetwork { mapper, net }
    }

    pub fn evaluate_batch_raw(&self, boards: &[impl Borrow<Board>]) -> NetOutput {
        let boards: Vec<&Board> = boards.iter().map(|b| b.borrow()).collect();

        let mut input = Vec::with_capacity(boards.len() * self.mapper.input_len());
        for board in &boards {
            self.mapper.encode_input_full(&mut input, board);
        }
        let input = ct_net::tensor::Tensor::from_data(self.mapper.input_shape(boards.len()), input);

        self.net.forward(&input)
    }

    pub fn net(&self) -> &ContrastNet {
        &self.net
    }
}

impl Network for CpuNetwork {
    fn evaluate_batch(&mut self, boards: &[impl Borrow<Board>]) -> Vec<ZeroEvaluation> {
        let output = self.evaluate_batch_raw(boards);
        decode_output(self.mapper, boards, &output)
    }
}

impl Debug for CpuNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuNetwork")
            .field("shape", &self.net.shape())
            .field("mapper", &self.mapper)
            .finish()
    }
}
