//! Events: data model and listeners.
//!
//! This module groups the event **data model** and the **matchers** that b-thread
//! bids use to observe, block and interrupt on events.
//!
//! ## Contents
//! - [`Event`] `{ type, detail? }` value passed through triggers and feedback
//! - [`EventTemplate`] lazily produced request, matched by identity
//! - [`Matcher`] literal-type or predicate listener
//! - [`random_event`] template picking one of several events per step

mod event;
mod matcher;

pub use event::{Event, EventTemplate, random_event};
pub use matcher::{Matcher, Predicate};
