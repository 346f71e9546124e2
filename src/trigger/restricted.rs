use std::sync::Arc;

use crate::events::Event;
use crate::snapshot::SnapshotMessage;

use super::Trigger;

/// Trigger that refuses deny-listed event types.
pub struct RestrictedTrigger<T> {
    inner: T,
    denied: Vec<Arc<str>>,
}

/// Wraps `inner` so events whose type is in `denied` never reach it.
///
/// A refused event is logged and reported as
/// [`SnapshotMessage::RestrictedTrigger`]. An empty list allows everything.
pub fn with_restricted_events<T, I, S>(inner: T, denied: I) -> RestrictedTrigger<T>
where
    T: Trigger,
    I: IntoIterator<Item = S>,
    S: Into<Arc<str>>,
{
    let mut list: Vec<Arc<str>> = Vec::new();
    for kind in denied {
        let kind = kind.into();
        if !list.contains(&kind) {
            list.push(kind);
        }
    }
    RestrictedTrigger { inner, denied: list }
}

impl<T: Trigger> RestrictedTrigger<T> {
    /// True if events of this type are refused.
    pub fn denies(&self, kind: &str) -> bool {
        self.denied.iter().any(|d| **d == *kind)
    }

    fn refusal(&self, kind: &str) -> String {
        let set = self
            .denied
            .iter()
            .map(|d| &**d)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Event type \"{kind}\" is in the restricted set: [{set}]")
    }
}

impl<T: Trigger> Trigger for RestrictedTrigger<T> {
    fn trigger(&self, event: Event) {
        if !self.denies(event.kind()) {
            self.inner.trigger(event);
            return;
        }
        let error = self.refusal(event.kind());
        tracing::warn!(kind = %event.kind, "{error}");
        self.inner.report(SnapshotMessage::RestrictedTrigger {
            event_type: event.kind,
            detail: event.detail,
            error,
        });
    }

    fn report(&self, msg: SnapshotMessage) {
        self.inner.report(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        triggered: Mutex<Vec<Event>>,
        reported: Mutex<Vec<SnapshotMessage>>,
    }

    impl Trigger for Recorder {
        fn trigger(&self, event: Event) {
            self.triggered.lock().unwrap().push(event);
        }

        fn report(&self, msg: SnapshotMessage) {
            self.reported.lock().unwrap().push(msg);
        }
    }

    #[test]
    fn refusal_lists_whole_set_in_order() {
        let rec = Arc::new(Recorder::default());
        let gate = with_restricted_events(rec.clone(), ["alpha", "beta", "gamma", "alpha"]);

        gate.trigger(Event::new("alpha").with_detail(serde_json::json!({ "id": 99 })));
        gate.trigger(Event::new("delta"));

        let triggered = rec.triggered.lock().unwrap();
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].kind(), "delta");

        let reported = rec.reported.lock().unwrap();
        assert_eq!(
            *reported,
            vec![SnapshotMessage::RestrictedTrigger {
                event_type: Arc::from("alpha"),
                detail: Some(serde_json::json!({ "id": 99 })),
                error: "Event type \"alpha\" is in the restricted set: [alpha, beta, gamma]".into(),
            }]
        );
    }

    #[test]
    fn empty_deny_list_allows_everything() {
        let rec = Arc::new(Recorder::default());
        let gate = with_restricted_events(rec.clone(), Vec::<&str>::new());
        gate.trigger(Event::new("anything"));
        assert_eq!(rec.triggered.lock().unwrap().len(), 1);
        assert!(rec.reported.lock().unwrap().is_empty());
    }

    #[test]
    fn public_gate_passes_allow_list_only() {
        let rec = Arc::new(Recorder::default());
        let gate = super::super::with_public_events(rec.clone(), ["a"]);
        gate.trigger(Event::new("b"));
        gate.trigger(Event::new("a"));
        let triggered = rec.triggered.lock().unwrap();
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].kind(), "a");
    }
}
