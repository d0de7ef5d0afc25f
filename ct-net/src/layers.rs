use std::borrow::Cow;

use ndarray::{s, Array4, ArrayView2, Axis};

use crate::shape;
use crate::shape::Shape;
use crate::tensor::Tensor;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConvDetails {
    pub input_channels: usize,
    pub output_channels: usize,

    pub kernel_size: usize,
    pub stride: usize,
    pub padding: usize,
}

impl ConvDetails {
    pub fn new(input_channels: usize, output_channels: usize, kernel_size: usize, stride: usize, padding: usize) -> Self {
        assert!(stride > 0, "Stride must be positive");
        assert_eq!(1, kernel_size % 2, "Kernel size must be odd, got {}", kernel_size);

        ConvDetails {
            input_channels,
            output_channels,
            kernel_size,
            stride,
            padding,
        }
    }

    pub fn kernel_shape(&self) -> Shape {
        shape![self.output_channels, self.input_channels, self.kernel_size, self.kernel_size]
    }

    pub fn bias_shape(&self) -> Shape {
        shape![self.output_channels]
    }

    pub fn output_size(&self, input_size: usize) -> usize {
        let padded = input_size + 2 * self.padding;
        assert!(padded >= self.kernel_size, "Kernel must fit inside of padded input");

        // operations are ordered to avoid underflow
        (padded - self.kernel_size) / self.stride + 1
    }

    pub fn keeps_spatial_shape(&self) -> bool {
        self.stride == 1 && 2 * self.padding + 1 == self.kernel_size
    }
}

/// Square 2D convolution with optional bias.
#[derive(Debug, Clone)]
pub struct Conv2d {
    details: ConvDetails,
    weight: Tensor,
    bias: Option<Tensor>,
}

impl Conv2d {
    pub fn new(details: ConvDetails, weight: Tensor, bias: Option<Tensor>) -> Self {
        assert_eq!(weight.shape(), &details.kernel_shape(), "Conv weight shape mismatch");
        if let Some(bias) = &bias {
            assert_eq!(bias.shape(), &details.bias_shape(), "Conv bias shape mismatch");
        }

        Conv2d { details, weight, bias }
    }

    pub fn details(&self) -> ConvDetails {
        self.details
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// Input shape `[n, Ci, h, w]` results in an output with shape `[n, Co, h', w']`.
    pub fn forward(&self, input: &Tensor) -> Tensor {
        let details = self.details;
        let [batch_size, input_channels, input_h, input_w] = input.shape().unwrap_4();
        assert_eq!(details.input_channels, input_channels, "Input channel mismatch");

        let output_h = details.output_size(input_h);
        let output_w = details.output_size(input_w);
        let k = details.kernel_size;
        let stride = details.stride;

        let padded = pad_spatial(input, details.padding);
        let padded = padded.view4();
        let filter = self.weight.view4();

        let mut result = Array4::zeros((batch_size, details.output_channels, output_h, output_w));

        for b in 0..batch_size {
            for oc in 0..details.output_channels {
                let kernel = filter.index_axis(Axis(0), oc);
                let bias = self.bias.as_ref().map_or(0.0, |bias| bias[oc]);

                for y in 0..output_h {
                    for x in 0..output_w {
                        let (y0, x0) = (y * stride, x * stride);
                        let window = padded.slice(s![b, .., y0..y0 + k, x0..x0 + k]);

                        // window and kernel are both [Ci, k, k], iterated in the same logical order
                        let sum: f32 = window.iter().zip(kernel.iter()).map(|(&a, &w)| a * w).sum();
                        result[(b, oc, y, x)] = sum + bias;
                    }
                }
            }
        }

        Tensor::from_array(&result)
    }
}

/// Materialize a zero-padded copy of the spatial axes of an `[n, c, h, w]` tensor.
/// A padding of zero borrows the input as-is.
pub fn pad_spatial(input: &Tensor, padding: usize) -> Cow<Tensor> {
    if padding == 0 {
        return Cow::Borrowed(input);
    }

    let [n, c, h, w] = input.shape().unwrap_4();
    let mut result = Array4::zeros((n, c, h + 2 * padding, w + 2 * padding));
    result
        .slice_mut(s![.., .., padding..padding + h, padding..padding + w])
        .assign(&input.view4());

    Cow::Owned(Tensor::from_array(&result))
}

/// Affine transform `y = x W^T + b` with `W` shaped `[out, in]`.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
}

impl Linear {
    pub fn new(weight: Tensor, bias: Tensor) -> Self {
        let [output_features, _] = weight.shape().unwrap_2();
        assert_eq!(bias.shape(), &shape![output_features], "Linear bias shape mismatch");
        Linear { weight, bias }
    }

    pub fn input_features(&self) -> usize {
        self.weight.shape().unwrap_2()[1]
    }

    pub fn output_features(&self) -> usize {
        self.weight.shape().unwrap_2()[0]
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    /// Every axis after the first is flattened, so `[n, c, h, w]` inputs are accepted directly.
    pub fn forward(&self, input: &Tensor) -> Tensor {
        let batch_size = input.shape().dims[0];
        let features = input.shape().dims[1..].iter().product::<usize>();
        assert_eq!(self.input_features(), features, "Linear input feature mismatch");

        let input = ArrayView2::from_shape((batch_size, features), input.data())
            .expect("Feature count was checked against the buffer length");

        let mut result = input.dot(&self.weight.view2().t());
        result += &self.bias.view1();

        Tensor::from_array(&result)
    }
}

pub fn relu(input: &Tensor) -> Tensor {
    let mut result = input.clone();
    relu_in_place(&mut result);
    result
}

pub fn relu_in_place(tensor: &mut Tensor) {
    tensor.data_mut().iter_mut().for_each(|x| *x = x.max(0.0));
}

/// `relu(conv2(relu(conv1(x))) + x)`, both convolutions keep the shape of `x`.
#[derive(Debug, Clone)]
pub struct ResidualBlock {
    conv1: Conv2d,
    conv2: Conv2d,
}

impl ResidualBlock {
    pub fn new(conv1: Conv2d, conv2: Conv2d) -> Self {
        for conv in [&conv1, &conv2] {
            let details = conv.details();
            assert!(details.keeps_spatial_shape(), "Residual convolution must keep the spatial shape");
            assert_eq!(
                details.input_channels, details.output_channels,
                "Residual convolution must keep the channel count"
            );
        }
        ResidualBlock { conv1, conv2 }
    }

    pub fn conv1(&self) -> &Conv2d {
        &self.conv1
    }

    pub fn conv2(&self) -> &Conv2d {
        &self.conv2
    }

    pub fn forward(&self, input: &Tensor) -> Tensor {
        let mut hidden = self.conv1.forward(input);
        relu_in_place(&mut hidden);

        let mut result = self.conv2.forward(&hidden);
        assert_eq!(result.shape(), input.shape(), "Residual shape mismatch");
        for (r, &x) in result.data_mut().iter_mut().zip(input.data()) {
            *r += x;
        }

        relu_in_place(&mut result);
        result
    }
}
