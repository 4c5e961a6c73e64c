//! Task model consumed and produced by the dependency engine.

pub mod task;

pub use task::Task;
