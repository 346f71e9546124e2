//! Handles returned by registrations on a live [`Program`](super::Program).
//!
//! Both hold a [`WeakProgram`], so keeping a handle around never keeps the
//! program alive. Dropping a handle does nothing; detaching is explicit.

use std::sync::Arc;

use super::program::WeakProgram;

/// Detaches a subscriber attached with [`Program::subscribe`](super::Program::subscribe).
pub struct SubscriptionHandle {
    pub(super) program: WeakProgram,
    pub(super) id: u64,
}

impl SubscriptionHandle {
    /// Detaches the subscriber. Once the last subscriber is gone the program
    /// stops formatting selection snapshots.
    ///
    /// Returns `false` if the program is gone or the subscriber was already detached.
    pub fn unsubscribe(self) -> bool {
        self.program
            .upgrade()
            .is_some_and(|program| program.unsubscribe(self.id))
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle").field("id", &self.id).finish()
    }
}

/// Removes the actions registered by one [`Program::feedback`](super::Program::feedback) call.
pub struct FeedbackHandle {
    pub(super) program: WeakProgram,
    pub(super) registrations: Vec<(Arc<str>, u64)>,
}

impl FeedbackHandle {
    /// Removes every action of this registration that has not been replaced since.
    ///
    /// Returns how many actions were removed.
    pub fn disconnect(self) -> usize {
        let Some(program) = self.program.upgrade() else {
            return 0;
        };
        program.remove_registrations(&self.registrations)
    }

    /// Event types covered by this registration.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|(kind, _)| &**kind)
    }
}

impl std::fmt::Debug for FeedbackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
