use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

use ndarray::{ArrayBase, ArrayView1, ArrayView2, ArrayView4, Data, Dimension};

use crate::shape::Shape;

/// A dense float tensor stored as a flat row-major buffer next to its [Shape].
///
/// Constructing a tensor whose buffer length does not match the shape is a bug in the caller and panics.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    pub fn zeros(shape: Shape) -> Self {
        Self::full(shape, 0.0)
    }

    pub fn full(shape: Shape, value: f32) -> Self {
        let data = vec![value; shape.size()];
        Tensor { shape, data }
    }

    pub fn from_data(shape: Shape, data: Vec<f32>) -> Self {
        assert_eq!(
            shape.size(),
            data.len(),
            "Data length {} does not match shape {:?}",
            data.len(),
            shape
        );
        Tensor { shape, data }
    }

    /// Copy any ndarray into a new tensor, in logical order.
    pub fn from_array<S: Data<Elem = f32>, D: Dimension>(array: &ArrayBase<S, D>) -> Self {
        let shape = Shape::new(array.shape().to_vec());
        let data = array.iter().copied().collect();
        Tensor { shape, data }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// The linear index of element `(n, c, h, w)` of a rank 4 tensor.
    pub fn index(&self, n: usize, c: usize, h: usize, w: usize) -> usize {
        let [_, dc, dh, dw] = self.shape.unwrap_4();
        debug_assert!(c < dc && h < dh && w < dw, "Index out of bounds for {:?}", self.shape);
        ((n * dc + c) * dh + h) * dw + w
    }

    /// Reinterpret the buffer with a new shape of the same size.
    pub fn reshape(self, shape: Shape) -> Tensor {
        Tensor::from_data(shape, self.data)
    }

    pub fn view1(&self) -> ArrayView1<f32> {
        ArrayView1::from(self.data.as_slice())
    }

    pub fn view2(&self) -> ArrayView2<f32> {
        let dims = self.shape.unwrap_2();
        ArrayView2::from_shape(dims, &self.data).expect("Buffer length was checked on construction")
    }

    pub fn view4(&self) -> ArrayView4<f32> {
        let dims = self.shape.unwrap_4();
        ArrayView4::from_shape(dims, &self.data).expect("Buffer length was checked on construction")
    }
}

impl Index<usize> for Tensor {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.data[index]
    }
}

impl IndexMut<usize> for Tensor {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.data[index]
    }
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use ndarray::Array2;

    use crate::shape;
    use crate::tensor::Tensor;

    #[test]
    fn index_matches_strides() {
        let shape = shape![2, 3, 4, 5];
        let tensor = Tensor::zeros(shape.clone());

        for n in 0..2 {
            for c in 0..3 {
                for h in 0..4 {
                    for w in 0..5 {
                        assert_eq!(tensor.index(n, c, h, w), shape.flat_index(&[n, c, h, w]));
                    }
                }
            }
        }
    }

    #[test]
    #[should_panic]
    fn size_mismatch_panics() {
        Tensor::from_data(shape![2, 2], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn from_transposed_array() {
        let array = Array2::from_shape_vec((2, 3), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let tensor = Tensor::from_array(&array.t());

        assert_eq!(tensor.shape(), &shape![3, 2]);
        assert_eq!(tensor.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }
}
