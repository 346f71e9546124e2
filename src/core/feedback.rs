//! # Feedback actions and their registry.
//!
//! A feedback action is the side effect bound to an event type. When an event is
//! selected (or triggered), the program looks up the action for its type and runs
//! it with the event's detail, **after** releasing the registry lock, so actions
//! may call back into the program.
//!
//! Two flavors:
//! - [`Action::sync`]: runs to completion inline, in step order.
//! - [`Action::spawn`]: the closure body runs inline; the future it returns is
//!   handed to the program's [`Spawn`](super::spawn::Spawn) seam and never awaited.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use bthreads::{Action, Event, FeedbackError, Program, ProgramConfig};
//!
//! let program = Program::new(ProgramConfig::default());
//! let weak = program.downgrade();
//!
//! program.feedback([
//!     ("save", Action::sync(|detail| {
//!         detail.ok_or_else(|| FeedbackError::fail("nothing to save"))?;
//!         Ok(())
//!     })),
//!     ("init", Action::spawn(move |_| {
//!         let weak = weak.clone();
//!         async move {
//!             tokio::time::sleep(Duration::from_millis(100)).await;
//!             weak.trigger(Event::new("update"));
//!             Ok(())
//!         }
//!     })),
//! ]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::FeedbackError;

/// Synchronous action body.
pub type SyncAction = Arc<dyn Fn(Option<&Value>) -> Result<(), FeedbackError> + Send + Sync>;

/// Asynchronous action body: inline part plus returned future.
pub type SpawnAction =
    Arc<dyn Fn(Option<Value>) -> BoxFuture<'static, Result<(), FeedbackError>> + Send + Sync>;

/// Side effect bound to an event type.
#[derive(Clone)]
pub enum Action {
    /// Runs inline.
    Sync(SyncAction),
    /// Runs inline up to the returned future, which is spawned.
    Spawn(SpawnAction),
}

impl Action {
    /// Wraps a synchronous closure.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<(), FeedbackError> + Send + Sync + 'static,
    {
        Action::Sync(Arc::new(f))
    }

    /// Wraps a closure returning a future.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), FeedbackError>> + Send + 'static,
    {
        Action::Spawn(Arc::new(move |detail| f(detail).boxed()))
    }

    /// True for [`Action::Spawn`].
    pub fn is_async(&self) -> bool {
        matches!(self, Action::Spawn(_))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Sync(_) => f.write_str("Action::Sync(..)"),
            Action::Spawn(_) => f.write_str("Action::Spawn(..)"),
        }
    }
}

/// Event type → action. Later registrations overwrite earlier ones.
#[derive(Default)]
pub(crate) struct FeedbackRegistry {
    actions: HashMap<Arc<str>, (u64, Action)>,
    next_id: u64,
}

impl FeedbackRegistry {
    /// Registers an action and returns its registration id.
    pub(crate) fn insert(&mut self, kind: Arc<str>, action: Action) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.actions.insert(Arc::clone(&kind), (id, action)).is_some() {
            tracing::debug!(kind = %kind, "feedback action replaced");
        }
        id
    }

    pub(crate) fn remove(&mut self, kind: &str) -> bool {
        self.actions.remove(kind).is_some()
    }

    /// Removes the action for `kind` only if it is still registration `id`.
    pub(crate) fn remove_registration(&mut self, kind: &str, id: u64) -> bool {
        if self.actions.get(kind).is_some_and(|(current, _)| *current == id) {
            self.actions.remove(kind);
            return true;
        }
        false
    }

    pub(crate) fn get(&self, kind: &str) -> Option<Action> {
        self.actions.get(kind).map(|(_, action)| action.clone())
    }
}
