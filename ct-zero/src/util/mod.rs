pub mod sequence;
pub mod stable_dirichlet;
