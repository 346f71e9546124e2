//! Snapshot messages describing what the scheduler decided.
//!
//! Snapshots are pure observations: they are built from registry state before a
//! resolution pass and published to subscribers. They never influence which
//! event is selected.
//!
//! ## Contents
//! - [`SnapshotMessage`] every message kind published by a program
//! - [`SelectionEntry`]  one row of a selection snapshot
//! - `format_selection` (crate-private) pure formatter for a step's rows

mod format;
mod message;

pub(crate) use format::{Proposal, format_selection};
pub use message::{SelectionEntry, SnapshotMessage};
