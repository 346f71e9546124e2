//! # Snapshot subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out
//! that delivers [`SnapshotMessage`](crate::SnapshotMessage)s to them.
//!
//! ## Architecture
//! ```text
//! Program step ── publish(SnapshotMessage) ──► SubscriberSet
//!                                                 │
//!                                                 ├──► [queue] ─► worker ─► on_snapshot()
//!                                                 ├──► [queue] ─► worker ─► on_snapshot()
//!                                                 └──► ...
//!                                                        │
//!                                              ┌─────────┼──────────┐
//!                                              ▼         ▼          ▼
//!                                          LogWriter  Inspector   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use bthreads::{Subscribe, SnapshotMessage};
//! use async_trait::async_trait;
//!
//! struct Inspector;
//!
//! #[async_trait]
//! impl Subscribe for Inspector {
//!     async fn on_snapshot(&self, msg: &SnapshotMessage) {
//!         if let SnapshotMessage::Selection { entries } = msg {
//!             // forward entries to a devtools socket
//!             let _ = entries;
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "inspector"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
