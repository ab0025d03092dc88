pub mod container;
pub mod sequence;
