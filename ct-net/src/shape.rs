use std::fmt::{Debug, Display, Formatter};

use itertools::Itertools;

#[macro_export]
macro_rules! shape {
    [$($value:expr),* $(,)?] => {
        $crate::shape::Shape::new(vec![$($value as usize),*])
    };
}

/// The dimensions of a [Tensor](crate::tensor::Tensor), outermost first.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Shape {
    pub dims: Vec<usize>,
}

impl Shape {
    pub const SCALAR: Shape = Shape { dims: Vec::new() };

    pub fn new(dims: Vec<usize>) -> Shape {
        Shape { dims }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// The total number of elements.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Row-major strides, the last axis has stride 1.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.rank()];
        for i in (0..self.rank().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    pub fn unwrap_2(&self) -> [usize; 2] {
        self.dims
            .as_slice()
            .try_into()
            .unwrap_or_else(|_| panic!("Expected rank 2 shape, got {:?}", self))
    }

    pub fn unwrap_4(&self) -> [usize; 4] {
        self.dims
            .as_slice()
            .try_into()
            .unwrap_or_else(|_| panic!("Expected rank 4 shape, got {:?}", self))
    }

    /// The linear index of the element at `coords`.
    pub fn flat_index(&self, coords: &[usize]) -> usize {
        assert_eq!(self.rank(), coords.len(), "Wrong coordinate count for {:?}", self);

        self.strides()
            .iter()
            .zip(coords)
            .zip(&self.dims)
            .map(|((&stride, &c), &d)| {
                assert!(c < d, "Coordinate {:?} out of bounds for {:?}", coords, self);
                stride * c
            })
            .sum()
    }
}

impl Debug for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Shape{}", self)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.dims.iter().join(" x "))
    }
}

#[cfg(test)]
mod test {
    use crate::shape::Shape;

    #[test]
    fn strides() {
        assert_eq!(shape![2, 3, 4, 5].strides(), vec![60, 20, 5, 1]);
        assert_eq!(shape![7].strides(), vec![1]);
        assert_eq!(Shape::SCALAR.strides(), Vec::<usize>::new());
    }

    #[test]
    fn flat_index() {
        let shape = shape![1, 66, 5, 5];
        assert_eq!(shape.flat_index(&[0, 0, 0, 0]), 0);
        assert_eq!(shape.flat_index(&[0, 2, 1, 3]), 2 * 25 + 5 + 3);
        assert_eq!(shape.size(), 66 * 25);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", shape![64, 66, 3, 3]), "(64 x 66 x 3 x 3)");
        assert_eq!(format!("{:?}", shape![625]), "Shape(625)");
    }
}
