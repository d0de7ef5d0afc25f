#![warn(missing_debug_implementations)]

//! A small CPU inference kernel for the Contrast dual-policy network.
//!
//! The core type of this crate is [ContrastNet](model::ContrastNet), a residual tower with separate move, tile and
//! value heads. Its weights are read from the flat binary format described in [weights].
//!
//! ```no_run
//! # use ct_net::model::TowerShape;
//! # use ct_net::shape;
//! # use ct_net::tensor::Tensor;
//! # use ct_net::weights::load_weights_from_path;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // load the weights for the default tower shape
//! let shape = TowerShape::default();
//! let net = load_weights_from_path("model.bin", shape)?;
//!
//! // run a single position through the network
//! let input = Tensor::zeros(shape![1, shape.input_channels, shape.board_size, shape.board_size]);
//! let output = net.forward(&input);
//! println!("value: {}", output.single_value());
//! # Ok(())
//! # }
//! ```

/// The [ndarray] crate is used for the convolution and matrix kernels, and re-exported for convenience.
pub use ndarray;

/// The [Shape](shape::Shape) type and the [shape!] macro.
pub mod shape;
/// The dense [Tensor](tensor::Tensor) type.
pub mod tensor;

/// Convolution, affine, rectification and residual layers.
pub mod layers;
/// The fixed network topology and its forward pass.
pub mod model;

/// Reading and writing the binary weight format.
pub mod weights;
