//! # Events exchanged between b-threads, triggers and feedback actions.
//!
//! An [`Event`] is a `{ type, detail? }` pair. The type is a cheap-to-clone
//! `Arc<str>`; the optional detail is an arbitrary JSON value so events can cross
//! process boundaries (workers, sockets, tool bridges) unchanged.
//!
//! An [`EventTemplate`] produces an event lazily, each time the scheduler gathers
//! candidates. Templates are matched by **identity**: a thread requesting a template
//! advances only when that very template (same `Arc`) won the step.
//!
//! ## Example
//! ```rust
//! use bthreads::Event;
//! use serde_json::json;
//!
//! let ev = Event::new("X").with_detail(json!({ "square": 4 }));
//!
//! assert_eq!(ev.kind(), "X");
//! assert_eq!(ev.detail(), Some(&json!({ "square": 4 })));
//! ```

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventError;

/// A named occurrence with an optional JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type. Empty means "missing".
    #[serde(rename = "type")]
    pub kind: Arc<str>,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl Event {
    /// Creates an event of the given type without detail.
    pub fn new(kind: impl Into<Arc<str>>) -> Self {
        Self {
            kind: kind.into(),
            detail: None,
        }
    }

    /// Attaches a detail payload.
    #[inline]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Returns the event type.
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the detail payload, if any.
    #[inline]
    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    /// True when the event carries a non-empty type.
    #[inline]
    pub fn has_kind(&self) -> bool {
        !self.kind.is_empty()
    }
}

impl TryFrom<Value> for Event {
    type Error = EventError;

    /// Decodes `{ "type": string, "detail"?: any }`.
    ///
    /// ```
    /// use bthreads::{Event, EventError};
    /// use serde_json::json;
    ///
    /// let ev = Event::try_from(json!({ "type": "ping", "detail": 1 })).unwrap();
    /// assert_eq!(ev.kind(), "ping");
    ///
    /// assert_eq!(Event::try_from(json!({ "detail": 1 })), Err(EventError::MissingType));
    /// ```
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let has_type = value.get("type").is_some_and(|t| !t.is_null());
        if !has_type {
            return Err(EventError::MissingType);
        }
        let ev: Event = serde_json::from_value(value).map_err(|e| EventError::Malformed {
            reason: e.to_string(),
        })?;
        if ev.has_kind() {
            Ok(ev)
        } else {
            Err(EventError::MissingType)
        }
    }
}

/// Lazily produced event, compared by identity.
#[derive(Clone)]
pub struct EventTemplate(Arc<dyn Fn() -> Event + Send + Sync>);

impl EventTemplate {
    /// Wraps a closure producing an event.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Event + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Produces the event for the current step.
    #[inline]
    pub fn produce(&self) -> Event {
        (self.0)()
    }

    /// True if both handles point at the same template.
    #[inline]
    pub fn same(&self, other: &EventTemplate) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventTemplate")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Returns a template that picks one of `events` uniformly at random every time
/// it is produced. Returns `None` for an empty list.
///
/// ```
/// use bthreads::{random_event, Event};
///
/// let coin = random_event(vec![Event::new("heads"), Event::new("tails")]).unwrap();
/// let side = coin.produce();
/// assert!(side.kind() == "heads" || side.kind() == "tails");
/// ```
pub fn random_event(events: Vec<Event>) -> Option<EventTemplate> {
    if events.is_empty() {
        return None;
    }
    let events: Arc<[Event]> = events.into();
    Some(EventTemplate::new(move || {
        let idx = rand::rng().random_range(0..events.len());
        events[idx].clone()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_kind_as_type() {
        let ev = Event::new("X").with_detail(json!({ "square": 1 }));
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v, json!({ "type": "X", "detail": { "square": 1 } }));

        let bare = serde_json::to_value(Event::new("O")).unwrap();
        assert_eq!(bare, json!({ "type": "O" }));
    }

    #[test]
    fn try_from_rejects_missing_or_empty_type() {
        assert_eq!(Event::try_from(json!({})), Err(EventError::MissingType));
        assert_eq!(
            Event::try_from(json!({ "type": null })),
            Err(EventError::MissingType)
        );
        assert_eq!(
            Event::try_from(json!({ "type": "" })),
            Err(EventError::MissingType)
        );
        assert!(matches!(
            Event::try_from(json!({ "type": 5 })),
            Err(EventError::Malformed { .. })
        ));
        assert!(matches!(
            Event::try_from(json!("ping")),
            Err(EventError::MissingType)
        ));
    }

    #[test]
    fn templates_compare_by_identity() {
        let a = EventTemplate::new(|| Event::new("a"));
        let a2 = a.clone();
        let b = EventTemplate::new(|| Event::new("a"));

        assert!(a.same(&a2));
        assert!(!a.same(&b));
        assert_eq!(a.produce(), b.produce());
    }

    #[test]
    fn random_event_only_yields_listed_events() {
        assert!(random_event(Vec::new()).is_none());

        let t = random_event(vec![Event::new("a"), Event::new("b")]).unwrap();
        let mut seen_a = false;
        let mut seen_b = false;
        for _ in 0..200 {
            match t.produce().kind() {
                "a" => seen_a = true,
                "b" => seen_b = true,
                other => panic!("unexpected event {other}"),
            }
        }
        assert!(seen_a && seen_b);
    }
}
