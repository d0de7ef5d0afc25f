use std::io;
use std::path::{Path, PathBuf};

use crate::shape::Shape;

pub type WeightsResult<T> = Result<T, WeightsError>;

#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error("failed to access weight file {0:?}")]
    IO(PathBuf, #[source] io::Error),

    #[error("weight data ended while reading array {name}")]
    Truncated { name: String },
    #[error("array {name} has invalid rank {rank}")]
    InvalidRank { name: String, rank: i32 },
    #[error("array {name} has invalid dimensions {dims:?}")]
    InvalidDim { name: String, dims: Vec<i32> },
    #[error("array {name} has shape {actual}, expected {expected}")]
    ShapeMismatch { name: String, expected: Shape, actual: Shape },

    #[error("{count} bytes left over after the last array")]
    TrailingData { count: usize },
}

pub trait ToWeightsResult {
    type T;
    fn to_weights_result(self, path: impl AsRef<Path>) -> WeightsResult<Self::T>;
}

impl<T> ToWeightsResult for Result<T, io::Error> {
    type T = T;
    fn to_weights_result(self, path: impl AsRef<Path>) -> WeightsResult<T> {
        self.map_err(|e| WeightsError::IO(path.as_ref().to_owned(), e))
    }
}
