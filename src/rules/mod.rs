//! B-thread rules: bids, composition and cursors.
//!
//! ## Contents
//! - [`Bid`] / [`Request`] what a thread declares at one synchronization point
//! - [`Rule`] and the factories [`sync`], [`thread`], [`repeat`], [`repeat_while`], [`shuffle`]
//! - `Cursor` (crate-private) explicit walk state of one registered thread
//!
//! ## Quick wiring
//! ```text
//! Program::add_threads([(name, Rule)])
//!      └─► core::registry builds Cursor::new(&rule) and primes the first Bid
//! ```

mod bid;
pub(crate) mod cursor;
mod rule;

pub use bid::{Bid, Request};
pub use rule::{Condition, Rule, repeat, repeat_while, shuffle, sync, thread};
