//! # Bids: what a b-thread declares at a synchronization point.
//!
//! A [`Bid`] bundles four idioms plus a priority hint:
//! - **request**: events the thread proposes and advances on when selected;
//! - **wait_for**: events the thread advances on without proposing them;
//! - **block**: events nobody may select while this bid is current;
//! - **interrupt**: events that terminate the thread instead of advancing it.
//!
//! ## Example
//! ```rust
//! use bthreads::{Bid, Event, Matcher};
//!
//! let bid = Bid::new()
//!     .with_request(Event::new("X"))
//!     .with_wait_for("reset")
//!     .with_block(Matcher::predicate(|ev| ev.kind() == "O"))
//!     .with_interrupt("game_over")
//!     .with_priority(2);
//!
//! assert_eq!(bid.priority(), 2);
//! assert!(bid.blocks(&Event::new("O")));
//! ```

use crate::events::{Event, EventTemplate, Matcher};

/// One requested event (or template) within a bid.
#[derive(Clone, Debug)]
pub enum Request {
    /// A concrete event; `priority` overrides the bid's priority when set.
    Event {
        /// Requested event.
        event: Event,
        /// Per-entry priority.
        priority: Option<i32>,
    },
    /// An event produced at gather time, matched by template identity.
    Template(EventTemplate),
}

impl Request {
    /// True when this entry is satisfied by the selected event.
    ///
    /// Concrete entries compare types; templates compare identity with the
    /// template that produced the selected event.
    pub(crate) fn is_satisfied_by(
        &self,
        selected: &Event,
        template: Option<&EventTemplate>,
    ) -> bool {
        match self {
            Request::Event { event, .. } => event.kind == selected.kind,
            Request::Template(own) => template.is_some_and(|t| own.same(t)),
        }
    }
}

impl From<Event> for Request {
    fn from(event: Event) -> Self {
        Request::Event {
            event,
            priority: None,
        }
    }
}

impl From<EventTemplate> for Request {
    fn from(template: EventTemplate) -> Self {
        Request::Template(template)
    }
}

/// Declaration emitted by a b-thread at one synchronization point.
#[derive(Clone, Debug, Default)]
pub struct Bid {
    request: Vec<Request>,
    wait_for: Vec<Matcher>,
    block: Vec<Matcher>,
    interrupt: Vec<Matcher>,
    priority: i32,
}

impl Bid {
    /// Empty bid: requests nothing, waits for nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a requested event or template.
    #[inline]
    pub fn with_request(mut self, request: impl Into<Request>) -> Self {
        self.request.push(request.into());
        self
    }

    /// Adds a requested event with its own priority.
    #[inline]
    pub fn with_prioritized_request(mut self, event: Event, priority: i32) -> Self {
        self.request.push(Request::Event {
            event,
            priority: Some(priority),
        });
        self
    }

    /// Adds a `wait_for` listener.
    #[inline]
    pub fn with_wait_for(mut self, matcher: impl Into<Matcher>) -> Self {
        self.wait_for.push(matcher.into());
        self
    }

    /// Adds a `block` listener.
    #[inline]
    pub fn with_block(mut self, matcher: impl Into<Matcher>) -> Self {
        self.block.push(matcher.into());
        self
    }

    /// Adds an `interrupt` listener.
    #[inline]
    pub fn with_interrupt(mut self, matcher: impl Into<Matcher>) -> Self {
        self.interrupt.push(matcher.into());
        self
    }

    /// Sets the bid-level priority (lower wins under the default strategy).
    #[inline]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Requested entries.
    pub fn requests(&self) -> &[Request] {
        &self.request
    }

    /// Bid-level priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// True if any `block` listener matches.
    pub fn blocks(&self, event: &Event) -> bool {
        self.block.iter().any(|m| m.matches(event))
    }

    /// True if any `interrupt` listener matches.
    pub fn is_interrupted_by(&self, event: &Event) -> bool {
        self.interrupt.iter().any(|m| m.matches(event))
    }

    /// True if the selected event satisfies a request or a `wait_for` listener.
    pub fn advances_on(&self, event: &Event, template: Option<&EventTemplate>) -> bool {
        self.request
            .iter()
            .any(|r| r.is_satisfied_by(event, template))
            || self.wait_for.iter().any(|m| m.matches(event))
    }

    pub(crate) fn has_blocks(&self) -> bool {
        !self.block.is_empty()
    }

    pub(crate) fn has_interrupts(&self) -> bool {
        !self.interrupt.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_entries_match_by_type() {
        let bid = Bid::new().with_request(Event::new("X"));
        assert!(bid.advances_on(&Event::new("X"), None));
        assert!(!bid.advances_on(&Event::new("O"), None));
    }

    #[test]
    fn template_entries_match_by_identity_only() {
        let tpl = EventTemplate::new(|| Event::new("roll"));
        let other = EventTemplate::new(|| Event::new("roll"));
        let bid = Bid::new().with_request(tpl.clone());

        assert!(bid.advances_on(&Event::new("roll"), Some(&tpl)));
        assert!(!bid.advances_on(&Event::new("roll"), Some(&other)));
        // a triggered event with the same type carries no template
        assert!(!bid.advances_on(&Event::new("roll"), None));
    }

    #[test]
    fn wait_for_and_block_are_independent() {
        let bid = Bid::new().with_wait_for("X").with_block("O");
        assert!(bid.advances_on(&Event::new("X"), None));
        assert!(!bid.advances_on(&Event::new("O"), None));
        assert!(bid.blocks(&Event::new("O")));
        assert!(!bid.blocks(&Event::new("X")));
        assert!(!bid.is_interrupted_by(&Event::new("O")));
    }
}
