//! Per-node checks, one module per plan step

pub mod cardinality;
pub mod choices;
pub mod primitives;
pub mod required;
pub mod structure;
