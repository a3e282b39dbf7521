//! Utility modules: in-memory storage and boundary validation

pub mod memory_storage;
pub mod validation;

pub use memory_storage::*;
pub use validation::*;
