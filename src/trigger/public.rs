use std::collections::HashSet;
use std::sync::Arc;

use crate::events::Event;
use crate::snapshot::SnapshotMessage;

use super::Trigger;

/// Trigger that only forwards allow-listed event types.
pub struct PublicTrigger<T> {
    inner: T,
    allowed: HashSet<Arc<str>>,
}

/// Wraps `inner` so only events whose type is in `allowed` reach it.
pub fn with_public_events<T, I, S>(inner: T, allowed: I) -> PublicTrigger<T>
where
    T: Trigger,
    I: IntoIterator<Item = S>,
    S: Into<Arc<str>>,
{
    PublicTrigger {
        inner,
        allowed: allowed.into_iter().map(Into::into).collect(),
    }
}

impl<T: Trigger> PublicTrigger<T> {
    /// True if events of this type pass the gate.
    pub fn allows(&self, kind: &str) -> bool {
        self.allowed.contains(kind)
    }
}

impl<T: Trigger> Trigger for PublicTrigger<T> {
    fn trigger(&self, event: Event) {
        if self.allows(event.kind()) {
            self.inner.trigger(event);
        } else {
            tracing::warn!(kind = %event.kind, "event type is not public; dropped");
        }
    }

    fn report(&self, msg: SnapshotMessage) {
        self.inner.report(msg);
    }
}
