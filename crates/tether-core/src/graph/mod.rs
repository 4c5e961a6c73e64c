//! Graph-level abstractions for task blocking relationships.
//!
//! Every function here operates over a snapshot of tasks supplied by the
//! caller. Nothing retains a long-lived graph: build a fresh [`TaskIndex`]
//! from the current task collection before each validate step.
//!
//! ## Submodules
//!
//! - [`index`]: id → task lookup built per operation.
//! - [`cycles`]: cycle detection for a candidate blocking edge.
//! - [`link`]: symmetric, copy-on-write edge mutation.
//! - [`audit`]: invariant checks and repair over a whole collection.
//!
//! [`TaskIndex`]: index::TaskIndex

pub mod audit;
pub mod cycles;
pub mod index;
pub mod link;
