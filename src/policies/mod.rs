//! Scheduling policies.
//!
//! This module groups the knobs that decide **which** candidate event wins a step.
//!
//! ## Contents
//! - [`SelectionStrategy`] how one winner is chosen (priority / chaos / randomized / custom)
//! - [`Candidate`]         one unblocked requested event offered to the strategy
//!
//! ## Quick wiring
//! ```text
//! ProgramConfig { strategy: SelectionStrategy, .. }
//!      └─► core::program::Program uses:
//!           - strategy.select(&candidates) once per internal step
//! ```
//!
//! ## Defaults
//! - `SelectionStrategy::Priority` (deterministic: lowest priority, then registration order).

mod selection;

pub use selection::{Candidate, SelectionStrategy};
