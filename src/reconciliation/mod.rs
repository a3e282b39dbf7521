//! Bank account reconciliation: checkpoint creation, removal, and the
//! calendar-interval labels shown in the checkpoint history

pub mod engine;
pub mod interval;

pub use engine::{BulkRemoval, BulkRemovalFailure, ReconciliationEngine};
