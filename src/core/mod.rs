//! Runtime core: the scheduler and its registries.
//!
//! The public API from this module is [`Program`] (plus its builder, config and
//! action types).
//!
//! Internal modules:
//! - [`program`]: step loop, resolution and feedback dispatch;
//! - [`registry`]: name-keyed set of active b-threads;
//! - [`feedback`]: event type → action registry;
//! - [`handle`]: detach handles for subscribers and feedback registrations;
//! - [`spawn`]: executor seam for asynchronous actions;
//! - [`builder`] / [`config`]: construction and settings.

mod builder;
mod config;
mod feedback;
mod handle;
mod program;
mod registry;
mod spawn;


pub use builder::ProgramBuilder;
pub use config::ProgramConfig;
pub use feedback::{Action, SpawnAction, SyncAction};
pub use handle::{FeedbackHandle, SubscriptionHandle};
pub use program::{Program, TRIGGER_THREAD, WeakProgram};
pub use spawn::{Spawn, TokioSpawner};
