//! Pathway Test Utilities
//!
//! Centralized test infrastructure for the Pathway Core workspace:
//! - Proptest generators for envelope fields and the 14 event payloads
//! - Fixtures assembling literal event streams from the scenario battery
//! - Custom assertions for Pathway-specific invariants (confidence bounds,
//!   seq-gaplessness)
//!
//! None of this crate depends on `pathway-events` or `pathway-storage`: it
//! only builds `pathway-core` values, so both of those crates can use it as
//! a dev-dependency without forming a real build cycle.

pub mod assertions;
pub mod fixtures;
pub mod generators;

pub use pathway_core::*;
