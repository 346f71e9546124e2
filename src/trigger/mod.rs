//! # Triggers and trigger gates.
//!
//! [`Trigger`] is anything that accepts external events: a [`Program`](crate::Program),
//! a [`WeakProgram`](crate::WeakProgram), or a gate wrapping one of those.
//!
//! Gates filter **before** the scheduler sees the event:
//! - [`with_public_events`]: only allow-listed types pass;
//! - [`with_restricted_events`]: deny-listed types are refused and reported.
//!
//! Gates never panic and never return errors; a refused event is a warning.
//!
//! ## Example
//! ```rust
//! use bthreads::{Event, Program, ProgramConfig, Trigger, with_public_events};
//!
//! let program = Program::new(ProgramConfig::default());
//! let public = with_public_events(program.clone(), ["click"]);
//!
//! public.trigger(Event::new("click"));   // delivered
//! public.trigger(Event::new("reset"));   // dropped with a warning
//! ```

mod public;
mod restricted;

pub use public::{PublicTrigger, with_public_events};
pub use restricted::{RestrictedTrigger, with_restricted_events};

use crate::core::{Program, WeakProgram};
use crate::events::Event;
use crate::snapshot::SnapshotMessage;

/// Accepts external events.
pub trait Trigger: Send + Sync {
    /// Delivers an event.
    fn trigger(&self, event: Event);

    /// Reports a message to the underlying program's subscribers, if any.
    fn report(&self, _msg: SnapshotMessage) {}
}

impl Trigger for Program {
    fn trigger(&self, event: Event) {
        Program::trigger(self, event);
    }

    fn report(&self, msg: SnapshotMessage) {
        self.publish(msg);
    }
}

impl Trigger for WeakProgram {
    fn trigger(&self, event: Event) {
        WeakProgram::trigger(self, event);
    }

    fn report(&self, msg: SnapshotMessage) {
        if let Some(program) = self.upgrade() {
            program.publish(msg);
        }
    }
}

impl<T: Trigger + ?Sized> Trigger for std::sync::Arc<T> {
    fn trigger(&self, event: Event) {
        (**self).trigger(event);
    }

    fn report(&self, msg: SnapshotMessage) {
        (**self).report(msg);
    }
}
