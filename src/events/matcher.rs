//! # Event listeners used by `wait_for`, `block` and `interrupt`.
//!
//! A [`Matcher`] is either a literal type comparison or a predicate over the whole
//! event. Literal matchers hold an `Arc<str>`, so cloning bids never allocates.
//!
//! Predicates run inside the scheduler's step and must not call back into the
//! program that evaluates them.

use std::fmt;
use std::sync::Arc;

use super::event::Event;

/// Shared predicate over an event.
pub type Predicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Listener matching selected events.
#[derive(Clone)]
pub enum Matcher {
    /// Matches events whose type equals this string.
    Type(Arc<str>),
    /// Matches events for which the predicate returns `true`.
    Predicate(Predicate),
}

impl Matcher {
    /// Literal type matcher.
    pub fn kind(kind: impl Into<Arc<str>>) -> Self {
        Matcher::Type(kind.into())
    }

    /// Predicate matcher.
    ///
    /// ```
    /// use bthreads::{Event, Matcher};
    ///
    /// let hot = Matcher::predicate(|ev| ev.kind().starts_with("hot"));
    /// assert!(hot.matches(&Event::new("hot_1")));
    /// assert!(!hot.matches(&Event::new("cold_1")));
    /// ```
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Arc::new(f))
    }

    /// Matches every event.
    pub fn any() -> Self {
        Matcher::predicate(|_| true)
    }

    /// Evaluates the matcher against an event.
    #[inline]
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Matcher::Type(kind) => **kind == *event.kind,
            Matcher::Predicate(f) => f(event),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Type(kind) => f.debug_tuple("Type").field(kind).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Matcher {
    fn from(kind: &str) -> Self {
        Matcher::Type(kind.into())
    }
}

impl From<String> for Matcher {
    fn from(kind: String) -> Self {
        Matcher::Type(kind.into())
    }
}

impl From<Arc<str>> for Matcher {
    fn from(kind: Arc<str>) -> Self {
        Matcher::Type(kind)
    }
}
