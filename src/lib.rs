//! # bthreads
//!
//! **bthreads** is a behavioral-programming synchronization engine for Rust.
//!
//! Independent "b-threads" each describe one aspect of a system's behavior as a
//! sequence of bids: events they **request**, events they **wait for**, events
//! they **block**, and events that **interrupt** them. A cooperative scheduler
//! picks exactly one winning event per step, advances every thread that cared
//! about it, and runs the side effect (feedback action) bound to it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Rule (sync / │   │ Rule (thread │   │ Rule (repeat │
//!     │  one bid)    │   │  sequence)   │   │  loop)       │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ add_threads      ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Program (scheduler)                                              │
//! │  - ThreadRegistry   (name → cursor + current bid, ordered)        │
//! │  - FeedbackRegistry (event type → Action)                         │
//! │  - SelectionStrategy (Priority / Chaos / Randomized / Custom)     │
//! │  - SubscriberSet    (snapshot fan-out)                            │
//! │  - Spawn            (executor for async actions)                  │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        ▲ trigger(Event)                               │ publish
//!        │                                              ▼
//! ┌──────┴───────────────────────┐        ┌──────────────────────────┐
//! │ PublicTrigger / Restricted-  │        │ SnapshotMessage          │
//! │ Trigger (gates)              │        │  Selection / errors      │
//! └──────────────────────────────┘        └────────────┬─────────────┘
//!                                                      ▼
//!                                         worker1  worker2  workerN
//!                                             ▼        ▼        ▼
//!                                        sub.on_snapshot() (per subscriber)
//! ```
//!
//! ### Step lifecycle
//! ```text
//! trigger(event) ──► blocked? ──yes──► warn, drop
//!                        │ no
//!                        ▼
//! resolve(event) ──► feedback(event)
//!
//! loop {
//!   ├─► gather: every request of every current bid
//!   ├─► drop candidates matched by any block listener
//!   ├─► none left ──► quiescence, return
//!   ├─► strategy.select(candidates) ──► winner
//!   ├─► resolve(winner):
//!   │       ├─ interrupt matches ─► thread removed
//!   │       └─ request / wait_for matches ─► cursor advances (or thread finishes)
//!   └─► feedback(winner): Sync inline | Spawn detached
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                         |
//! |-------------------|------------------------------------------------------------|--------------------------------------------|
//! | **Rules**         | Compose bids into b-threads.                               | [`Bid`], [`Rule`], [`sync`], [`thread`], [`repeat`] |
//! | **Scheduling**    | Run threads to quiescence, one event per step.             | [`Program`], [`SelectionStrategy`]         |
//! | **Side effects**  | Bind sync or async actions to event types.                 | [`Action`], [`Spawn`]                      |
//! | **Gates**         | Filter external events before they reach a program.        | [`Trigger`], [`with_public_events`], [`with_restricted_events`] |
//! | **Observability** | Selection snapshots and error reports for subscribers.     | [`Subscribe`], [`SnapshotMessage`]         |
//! | **Errors**        | Typed errors for events and actions.                       | [`EventError`], [`FeedbackError`]          |
//! | **Configuration** | Centralize program settings.                               | [`ProgramConfig`]                          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use bthreads::{Action, Bid, Event, Program, ProgramConfig, repeat, sync};
//!
//! let program = Program::new(ProgramConfig::default());
//! let moves = Arc::new(Mutex::new(Vec::new()));
//!
//! program.add_threads([
//!     // X and O must alternate.
//!     ("enforceTurns", repeat([
//!         sync(Bid::new().with_wait_for("X").with_block("O")),
//!         sync(Bid::new().with_wait_for("O").with_block("X")),
//!     ])),
//! ]);
//! let m = moves.clone();
//! program.feedback([("X", Action::sync(move |_| {
//!     m.lock().unwrap().push("X");
//!     Ok(())
//! }))]);
//!
//! program.trigger(Event::new("O")); // blocked: X moves first
//! program.trigger(Event::new("X"));
//! program.trigger(Event::new("X")); // blocked: O's turn
//!
//! assert_eq!(*moves.lock().unwrap(), vec!["X"]);
//! ```

mod core;
mod error;
mod events;
mod policies;
mod rules;
mod snapshot;
mod subscribers;
mod trigger;

// ---- Public re-exports ----

pub use crate::core::{
    Action, FeedbackHandle, Program, ProgramBuilder, ProgramConfig, Spawn, SpawnAction,
    SubscriptionHandle, SyncAction, TRIGGER_THREAD, TokioSpawner, WeakProgram,
};
pub use error::{EventError, FeedbackError};
pub use events::{Event, EventTemplate, Matcher, Predicate, random_event};
pub use policies::{Candidate, SelectionStrategy};
pub use rules::{Bid, Condition, Request, Rule, repeat, repeat_while, shuffle, sync, thread};
pub use snapshot::{SelectionEntry, SnapshotMessage};
pub use subscribers::{Subscribe, SubscriberSet};
pub use trigger::{
    PublicTrigger, RestrictedTrigger, Trigger, with_public_events, with_restricted_events,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
