pub mod node;
pub mod step;
pub mod tree;
pub mod wrapper;
