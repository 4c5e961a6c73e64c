//! tether-core: the task dependency graph engine.
//!
//! # Overview
//!
//! Tasks reference each other through symmetric blocking edges: a blocker
//! lists the blocked task in `blocks`, the blocked task lists the blocker in
//! `dependsOn`. This crate decides which edges may exist and keeps both
//! sides in step.
//!
//! - [`policy`]: [`can_link`], the configurable linking policy.
//! - [`graph::cycles`]: [`would_create_cycle`] over a task snapshot.
//! - [`graph::link`]: [`link_pair`] / [`unlink_pair`], copy-on-write mutation.
//! - [`graph::audit`]: invariant report and repair for a whole collection.
//! - [`linker`]: validate-then-mutate orchestration addressed by id.
//! - [`config`]: `.tether/config.toml` loading.
//!
//! # Conventions
//!
//! - **Errors**: [`error::TetherError`] for engine failures, `anyhow::Result`
//!   for config and I/O.
//! - **Logging**: `tracing` macros (`warn!`, `info!`, `debug!`, `trace!`).

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod graph;
pub mod linker;
pub mod model;
pub mod policy;

pub use graph::cycles::{CycleWarning, find_cycle_path, would_create_cycle};
pub use graph::index::{TaskIndex, TaskLookup};
pub use graph::link::{LinkedPair, link_pair, unlink_pair};
pub use linker::{LinkOutcome, LinkRejection, Linker, UnlinkOutcome};
pub use model::Task;
pub use policy::{KindPair, LinkDecision, LinkPolicy, PolicyConfig, RejectReason, can_link};
