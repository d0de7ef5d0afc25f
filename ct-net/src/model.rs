use std::fmt::{Display, Formatter};

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::layers::{relu_in_place, Conv2d, ConvDetails, Linear, ResidualBlock};
use crate::shape;
use crate::shape::Shape;
use crate::tensor::Tensor;

/// The hyperparameters of the residual tower and its three heads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TowerShape {
    pub board_size: usize,
    pub input_channels: usize,

    pub tower_depth: usize,
    pub tower_channels: usize,

    pub move_channels: usize,
    pub tile_channels: usize,
    pub value_channels: usize,
    pub value_hidden_size: usize,

    pub move_policy_len: usize,
    pub tile_policy_len: usize,
}

impl Default for TowerShape {
    fn default() -> Self {
        TowerShape {
            board_size: 5,
            input_channels: 66,
            tower_depth: 8,
            tower_channels: 64,
            move_channels: 32,
            tile_channels: 16,
            value_channels: 4,
            value_hidden_size: 32,
            move_policy_len: 625,
            tile_policy_len: 51,
        }
    }
}

impl TowerShape {
    pub fn with_depth(self, tower_depth: usize) -> Self {
        TowerShape { tower_depth, ..self }
    }

    pub fn input_shape(&self, batch_size: usize) -> Shape {
        shape![batch_size, self.input_channels, self.board_size, self.board_size]
    }

    fn stem_details(&self) -> ConvDetails {
        ConvDetails::new(self.input_channels, self.tower_channels, 3, 1, 1)
    }

    fn block_details(&self) -> ConvDetails {
        ConvDetails::new(self.tower_channels, self.tower_channels, 3, 1, 1)
    }

    fn head_details(&self, channels: usize) -> ConvDetails {
        ConvDetails::new(self.tower_channels, channels, 1, 1, 0)
    }

    fn area(&self) -> usize {
        self.board_size * self.board_size
    }

    /// The name and shape of every parameter, in the order they appear in a weight file.
    pub fn param_shapes(&self) -> Vec<(String, Shape)> {
        let mut result = vec![];

        let conv = |result: &mut Vec<(String, Shape)>, name: &str, details: ConvDetails| {
            result.push((format!("{}_w", name), details.kernel_shape()));
            result.push((format!("{}_b", name), details.bias_shape()));
        };
        let linear = |result: &mut Vec<(String, Shape)>, name: &str, input: usize, output: usize| {
            result.push((format!("{}_w", name), shape![output, input]));
            result.push((format!("{}_b", name), shape![output]));
        };

        conv(&mut result, "input_conv", self.stem_details());
        for i in 0..self.tower_depth {
            conv(&mut result, &format!("res{}_conv1", i), self.block_details());
            conv(&mut result, &format!("res{}_conv2", i), self.block_details());
        }

        conv(&mut result, "move_head_conv", self.head_details(self.move_channels));
        linear(&mut result, "move_head_fc", self.move_channels * self.area(), self.move_policy_len);

        conv(&mut result, "tile_head_conv", self.head_details(self.tile_channels));
        linear(&mut result, "tile_head_fc", self.tile_channels * self.area(), self.tile_policy_len);

        conv(&mut result, "val_head_conv", self.head_details(self.value_channels));
        linear(&mut result, "val_head_fc1", self.value_channels * self.area(), self.value_hidden_size);
        linear(&mut result, "val_head_fc2", self.value_hidden_size, 1);

        result
    }
}

/// The raw outputs of a forward pass for a batch of `n` positions.
#[derive(Debug, Clone)]
pub struct NetOutput {
    /// Shape `[n, move_policy_len]`, indexed by `from * 25 + to`.
    pub move_logits: Tensor,
    /// Shape `[n, tile_policy_len]`, index 0 means no placement.
    pub tile_logits: Tensor,
    /// One `tanh`-squashed value per position, from the point of view of the player to move.
    pub values: Vec<f32>,
}

impl NetOutput {
    pub fn single_value(&self) -> f32 {
        assert_eq!(1, self.values.len(), "Expected a single position");
        self.values[0]
    }
}

#[derive(Debug, Clone)]
pub struct ContrastNet {
    shape: TowerShape,

    input_conv: Conv2d,
    blocks: Vec<ResidualBlock>,

    move_conv: Conv2d,
    move_fc: Linear,

    tile_conv: Conv2d,
    tile_fc: Linear,

    value_conv: Conv2d,
    value_fc1: Linear,
    value_fc2: Linear,
}

impl ContrastNet {
    /// Build a network from its parameters, given in weight file order.
    /// Panics if the count or any shape does not match `shape`.
    pub fn from_params(shape: TowerShape, params: Vec<Tensor>) -> Self {
        let expected = shape.param_shapes();
        assert_eq!(expected.len(), params.len(), "Wrong parameter count");
        for ((name, expected_shape), param) in expected.iter().zip(&params) {
            assert_eq!(expected_shape, param.shape(), "Wrong shape for parameter {}", name);
        }

        let mut params = params.into_iter();
        let params = &mut params;

        let input_conv = take_conv(params, shape.stem_details());
        let blocks = (0..shape.tower_depth)
            .map(|_| {
                let conv1 = take_conv(params, shape.block_details());
                let conv2 = take_conv(params, shape.block_details());
                ResidualBlock::new(conv1, conv2)
            })
            .collect();

        let move_conv = take_conv(params, shape.head_details(shape.move_channels));
        let move_fc = take_linear(params);

        let tile_conv = take_conv(params, shape.head_details(shape.tile_channels));
        let tile_fc = take_linear(params);

        let value_conv = take_conv(params, shape.head_details(shape.value_channels));
        let value_fc1 = take_linear(params);
        let value_fc2 = take_linear(params);

        ContrastNet {
            shape,
            input_conv,
            blocks,
            move_conv,
            move_fc,
            tile_conv,
            tile_fc,
            value_conv,
            value_fc1,
            value_fc2,
        }
    }

    /// A network with normally distributed weights scaled by the fan-in of each layer, and zero biases.
    pub fn random(shape: TowerShape, rng: &mut impl Rng) -> Self {
        let params = shape
            .param_shapes()
            .into_iter()
            .map(|(name, param_shape)| {
                if name.ends_with("_b") {
                    return Tensor::zeros(param_shape);
                }

                let fan_in = param_shape.size() / param_shape.dims[0];
                let std = (1.0 / fan_in as f32).sqrt();
                let normal = Normal::new(0.0, std).expect("Standard deviation is finite and positive");

                let data = (0..param_shape.size()).map(|_| normal.sample(rng)).collect();
                Tensor::from_data(param_shape, data)
            })
            .collect();

        Self::from_params(shape, params)
    }

    pub fn shape(&self) -> TowerShape {
        self.shape
    }

    /// All parameters with their names, in weight file order.
    pub fn named_params(&self) -> Vec<(String, &Tensor)> {
        fn push_conv<'a>(tensors: &mut Vec<&'a Tensor>, conv: &'a Conv2d) {
            tensors.push(conv.weight());
            tensors.push(conv.bias().expect("Every convolution in this network has a bias"));
        }

        let mut tensors: Vec<&Tensor> = vec![];

        push_conv(&mut tensors, &self.input_conv);
        for block in &self.blocks {
            push_conv(&mut tensors, block.conv1());
            push_conv(&mut tensors, block.conv2());
        }
        push_conv(&mut tensors, &self.move_conv);
        tensors.extend([self.move_fc.weight(), self.move_fc.bias()]);
        push_conv(&mut tensors, &self.tile_conv);
        tensors.extend([self.tile_fc.weight(), self.tile_fc.bias()]);
        push_conv(&mut tensors, &self.value_conv);
        tensors.extend([self.value_fc1.weight(), self.value_fc1.bias()]);
        tensors.extend([self.value_fc2.weight(), self.value_fc2.bias()]);

        let names = self.shape.param_shapes().into_iter().map(|(name, _)| name);
        names.zip(tensors).collect()
    }

    pub fn param_count(&self) -> usize {
        self.named_params().iter().map(|(_, t)| t.len()).sum()
    }

    /// Evaluate a batch of encoded positions with shape `[n, input_channels, board_size, board_size]`.
    pub fn forward(&self, input: &Tensor) -> NetOutput {
        let [batch_size, _, _, _] = input.shape().unwrap_4();
        assert_eq!(&self.shape.input_shape(batch_size), input.shape(), "Wrong input shape");

        let mut tower = self.input_conv.forward(input);
        relu_in_place(&mut tower);
        for block in &self.blocks {
            tower = block.forward(&tower);
        }

        let mut moves = self.move_conv.forward(&tower);
        relu_in_place(&mut moves);
        let move_logits = self.move_fc.forward(&moves);

        let mut tiles = self.tile_conv.forward(&tower);
        relu_in_place(&mut tiles);
        let tile_logits = self.tile_fc.forward(&tiles);

        let mut value = self.value_conv.forward(&tower);
        relu_in_place(&mut value);
        let mut value = self.value_fc1.forward(&value);
        relu_in_place(&mut value);
        let value = self.value_fc2.forward(&value);
        let values = value.data().iter().map(|v| v.tanh()).collect();

        NetOutput {
            move_logits,
            tile_logits,
            values,
        }
    }
}

fn take_conv(params: &mut impl Iterator<Item = Tensor>, details: ConvDetails) -> Conv2d {
    let weight = params.next().expect("Parameter count was checked");
    let bias = params.next().expect("Parameter count was checked");
    Conv2d::new(details, weight, Some(bias))
}

fn take_linear(params: &mut impl Iterator<Item = Tensor>) -> Linear {
    let weight = params.next().expect("Parameter count was checked");
    let bias = params.next().expect("Parameter count was checked");
    Linear::new(weight, bias)
}

impl Display for ContrastNet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ContrastNet {{")?;
        writeln!(f, "  shape: {:?}", self.shape)?;
        for (name, tensor) in self.named_params() {
            writeln!(f, "  {}: {}", name, tensor.shape())?;
        }
        writeln!(f, "  total: {} parameters", self.param_count())?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::model::{ContrastNet, TowerShape};
    use crate::tensor::Tensor;

    #[test]
    fn param_order() {
        let shape = TowerShape::default().with_depth(2);
        let names: Vec<String> = shape.param_shapes().into_iter().map(|(n, _)| n).collect();

        assert_eq!(names.len(), 2 + 2 * 4 + 4 + 4 + 6);
        assert_eq!(names[0], "input_conv_w");
        assert_eq!(names[2], "res0_conv1_w");
        assert_eq!(names[9], "res1_conv2_b");
        assert_eq!(names[10], "move_head_conv_w");
        assert_eq!(names.last().unwrap(), "val_head_fc2_b");
    }

    #[test]
    fn named_params_match_shapes() {
        let shape = TowerShape::default().with_depth(1);
        let net = ContrastNet::random(shape, &mut StdRng::seed_from_u64(0));

        let expected = shape.param_shapes();
        let actual = net.named_params();
        assert_eq!(expected.len(), actual.len());
        for ((en, es), (an, at)) in expected.iter().zip(&actual) {
            assert_eq!(en, an);
            assert_eq!(es, at.shape());
        }
    }

    #[test]
    fn forward_shapes_and_range() {
        let shape = TowerShape::default().with_depth(2);
        let net = ContrastNet::random(shape, &mut StdRng::seed_from_u64(1));

        let mut input = Tensor::zeros(shape.input_shape(2));
        input.data_mut().iter_mut().enumerate().for_each(|(i, x)| *x = (i % 7) as f32 / 7.0);

        let output = net.forward(&input);
        assert_eq!(output.move_logits.shape().dims, vec![2, 625]);
        assert_eq!(output.tile_logits.shape().dims, vec![2, 51]);
        assert_eq!(output.values.len(), 2);
        assert!(output.values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn forward_is_deterministic() {
        let shape = TowerShape::default().with_depth(1);
        let net = ContrastNet::random(shape, &mut StdRng::seed_from_u64(2));
        let input = Tensor::full(shape.input_shape(1), 0.5);

        let a = net.forward(&input);
        let b = net.forward(&input);
        assert_eq!(a.move_logits, b.move_logits);
        assert_eq!(a.tile_logits, b.tile_logits);
        assert_eq!(a.values, b.values);
    }
}
