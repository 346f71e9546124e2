//! # Program: the behavioral scheduler.
//!
//! The [`Program`] owns the thread registry, the feedback registry, the selection
//! strategy, the snapshot subscribers and the async executor seam. Everything a
//! behavioral program does happens inside [`Program::trigger`].
//!
//! ## High-level architecture
//! ```text
//! trigger(event)
//!   ├─ missing type ───────────────► warn + TriggerRejected, no-op
//!   └─ run gate (one run at a time; same-thread re-entry allowed)
//!      run(triggered):
//!        loop {
//!          lock ─┬─ first pass: blocked by an active bid ─► warn + TriggerRejected, return
//!                ├─ gather proposals (requests, blocked_by, interrupts)
//!                ├─ winner = triggered event (first pass) | strategy.select(unblocked)
//!                ├─ none ─────────────► quiescence, return
//!                ├─ Selection snapshot (if subscribers)
//!                ├─ resolve: interrupt ─► advance ─► finish
//!                └─ look up feedback action
//!          unlock
//!          publish snapshots, report thread failures
//!          dispatch action:
//!            Sync  ─► run inline (errors/panics ─► FeedbackError snapshot)
//!            Spawn ─► run closure inline, spawn its future via Spawn seam
//!        }
//! ```
//!
//! ## Rules
//! - The registry lock is never held while actions run: handlers may call
//!   `trigger`, `add_threads`, `delete` on the same program.
//! - Runs are serialized across OS threads. A `trigger` from another thread
//!   waits until the run in progress reaches quiescence, so an action must not
//!   block on work that triggers the same program from another thread.
//! - Matchers, templates and loop conditions run **under** the lock and must not
//!   call back into the program.
//! - Async actions are never awaited by the scheduler.
//! - Failing actions and panicking rules are reported and the run continues.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use bthreads::{Action, Bid, Event, Program, ProgramConfig, sync, thread};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let program = Program::new(ProgramConfig::default());
//!
//! program.add_threads([
//!     ("a", sync(Bid::new().with_request(Event::new("a")))),
//!     ("b", thread([
//!         sync(Bid::new().with_wait_for("a")),
//!         sync(Bid::new().with_request(Event::new("b"))),
//!     ])),
//! ]);
//! let l = log.clone();
//! program.feedback([("b", Action::sync(move |_| {
//!     l.lock().unwrap().push("b");
//!     Ok(())
//! }))]);
//!
//! program.trigger(Event::new("start"));
//! assert_eq!(*log.lock().unwrap(), vec!["b"]);
//! assert!(program.thread_names().is_empty());
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::{Mutex, MutexGuard, ReentrantMutex, RwLock};
use serde_json::Value;

use crate::error::{FeedbackError, panic_message};
use crate::events::Event;
use crate::policies::Candidate;
use crate::rules::Rule;
use crate::snapshot::{Proposal, SnapshotMessage, format_selection};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::builder::ProgramBuilder;
use super::config::ProgramConfig;
use super::feedback::{Action, FeedbackRegistry};
use super::handle::{FeedbackHandle, SubscriptionHandle};
use super::registry::{Inserted, ThreadFailure, ThreadRegistry};
use super::spawn::Spawn;

/// Thread name used for externally triggered events in snapshots.
pub const TRIGGER_THREAD: &str = "trigger";

type Disconnect = Box<dyn FnOnce() + Send>;

struct State {
    threads: ThreadRegistry,
    feedback: FeedbackRegistry,
}

struct Inner {
    cfg: ProgramConfig,
    state: Mutex<State>,
    run_gate: ReentrantMutex<()>,
    subs: RwLock<SubscriberSet>,
    spawner: Arc<dyn Spawn>,
    disconnects: Mutex<Vec<Disconnect>>,
}

/// Handle to one behavioral program. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Program {
    inner: Arc<Inner>,
}

/// Non-owning handle to a [`Program`], for use inside feedback actions.
#[derive(Clone)]
pub struct WeakProgram {
    inner: Weak<Inner>,
}

/// What the locked part of a step hands to the unlocked part.
struct StepOutcome {
    event: Event,
    action: Option<Action>,
    snapshot: Option<SnapshotMessage>,
    failures: Vec<ThreadFailure>,
}

impl Program {
    /// Creates a program without subscribers, spawning on the current Tokio runtime.
    pub fn new(cfg: ProgramConfig) -> Self {
        ProgramBuilder::new(cfg).build()
    }

    /// Starts a [`ProgramBuilder`].
    pub fn builder(cfg: ProgramConfig) -> ProgramBuilder {
        ProgramBuilder::new(cfg)
    }

    pub(super) fn from_parts(
        cfg: ProgramConfig,
        subs: SubscriberSet,
        spawner: Arc<dyn Spawn>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                state: Mutex::new(State {
                    threads: ThreadRegistry::default(),
                    feedback: FeedbackRegistry::default(),
                }),
                run_gate: ReentrantMutex::new(()),
                subs: RwLock::new(subs),
                spawner,
                disconnects: Mutex::new(Vec::new()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock()
    }

    fn observed(&self) -> bool {
        !self.inner.subs.read().is_empty()
    }

    /// Configuration this program was built with.
    pub fn config(&self) -> &ProgramConfig {
        &self.inner.cfg
    }

    /// Non-owning handle.
    pub fn downgrade(&self) -> WeakProgram {
        WeakProgram {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ---- threads ----

    /// Registers or replaces threads, priming each one's first bid.
    ///
    /// Replacing keeps the original registration order. A rule that yields no bid
    /// registers nothing.
    pub fn add_threads<N, I>(&self, threads: I)
    where
        N: Into<Arc<str>>,
        I: IntoIterator<Item = (N, Rule)>,
    {
        let mut failures = Vec::new();
        {
            let mut st = self.lock();
            for (name, rule) in threads {
                let name: Arc<str> = name.into();
                match st.threads.insert(Arc::clone(&name), &rule) {
                    Inserted::Active => tracing::debug!(thread = %name, "thread added"),
                    Inserted::Empty => {
                        tracing::debug!(thread = %name, "thread yields no bid; not registered")
                    }
                    Inserted::Failed(f) => failures.push(f),
                }
            }
        }
        self.report_failures(failures);
    }

    /// True if a thread with this name is active.
    pub fn has(&self, name: &str) -> bool {
        self.lock().threads.contains(name)
    }

    /// Removes a thread; `false` if it was not active.
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.lock().threads.remove(name);
        if removed {
            tracing::debug!(thread = %name, "thread deleted");
        }
        removed
    }

    /// Removes every thread.
    pub fn clear(&self) {
        self.lock().threads.clear();
        tracing::debug!("threads cleared");
    }

    /// Active thread names in registration order.
    pub fn thread_names(&self) -> Vec<Arc<str>> {
        self.lock().threads.names()
    }

    // ---- feedback ----

    /// Registers actions by event type; a later registration replaces an earlier one.
    ///
    /// The returned handle removes exactly these actions, leaving alone any that
    /// replaced them since.
    pub fn feedback<N, I>(&self, actions: I) -> FeedbackHandle
    where
        N: Into<Arc<str>>,
        I: IntoIterator<Item = (N, Action)>,
    {
        let mut st = self.lock();
        let registrations = actions
            .into_iter()
            .map(|(kind, action)| {
                let kind: Arc<str> = kind.into();
                let id = st.feedback.insert(Arc::clone(&kind), action);
                (kind, id)
            })
            .collect();
        FeedbackHandle {
            program: self.downgrade(),
            registrations,
        }
    }

    /// Removes the action for an event type; `false` if none was registered.
    pub fn remove_feedback(&self, kind: &str) -> bool {
        self.lock().feedback.remove(kind)
    }

    pub(super) fn remove_registrations(&self, registrations: &[(Arc<str>, u64)]) -> usize {
        let mut st = self.lock();
        registrations
            .iter()
            .filter(|(kind, id)| st.feedback.remove_registration(kind, *id))
            .count()
    }

    // ---- subscribers ----

    /// Attaches a snapshot subscriber to a live program.
    ///
    /// Selection snapshots are only formatted while at least one subscriber is
    /// attached.
    ///
    /// # Panics
    /// Must be called inside a Tokio runtime, since the subscriber's worker is
    /// spawned here.
    pub fn subscribe(&self, sub: Arc<dyn Subscribe>) -> SubscriptionHandle {
        let id = self.inner.subs.write().add(sub);
        SubscriptionHandle {
            program: self.downgrade(),
            id,
        }
    }

    pub(super) fn unsubscribe(&self, id: u64) -> bool {
        self.inner.subs.write().remove(id)
    }

    /// True if at least one subscriber is attached.
    pub fn has_subscribers(&self) -> bool {
        self.observed()
    }

    // ---- disconnect ----

    /// Registers a teardown callback run by [`Program::disconnect`].
    pub fn add_disconnect<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.disconnects.lock().push(Box::new(f));
    }

    /// Runs and clears every registered teardown callback.
    pub fn disconnect(&self) {
        let callbacks = std::mem::take(&mut *self.inner.disconnects.lock());
        for cb in callbacks {
            if let Err(p) = catch_unwind(AssertUnwindSafe(cb)) {
                tracing::error!(info = %panic_message(p.as_ref()), "disconnect callback panicked");
            }
        }
    }

    // ---- triggering ----

    /// Injects an external event and runs the program to quiescence.
    ///
    /// Missing-type and blocked events are dropped with a warning. Called from a
    /// feedback action, the nested run completes before the action resumes; called
    /// from another thread, it waits for the run in progress.
    pub fn trigger(&self, event: Event) {
        if !event.has_kind() {
            tracing::warn!("trigger ignored: event has no type");
            self.publish(SnapshotMessage::TriggerRejected {
                event_type: event.kind,
                reason: "missing type".to_string(),
            });
            return;
        }

        let _run = self.inner.run_gate.lock();
        self.run(Candidate {
            event,
            thread: Arc::from(TRIGGER_THREAD),
            priority: 0,
            order: 0,
            template: None,
        });
    }

    /// Parses `{ "type": .., "detail"?: .. }` and triggers it.
    ///
    /// Invalid input is dropped with a warning.
    pub fn trigger_value(&self, value: Value) {
        match Event::try_from(value) {
            Ok(event) => self.trigger(event),
            Err(e) => {
                tracing::warn!(label = e.as_label(), error = %e.as_message(), "trigger ignored");
                self.publish(SnapshotMessage::TriggerRejected {
                    event_type: Arc::from(""),
                    reason: e.as_message(),
                });
            }
        }
    }

    fn run(&self, triggered: Candidate) {
        let limit = self.inner.cfg.step_limit();
        let mut pending = Some(triggered);
        let mut steps = 0usize;

        loop {
            let Some(outcome) = self.step(pending.take(), &mut steps, limit) else {
                break;
            };
            if let Some(msg) = outcome.snapshot {
                self.publish(msg);
            }
            self.report_failures(outcome.failures);
            if let Some(action) = outcome.action {
                self.dispatch(action, outcome.event);
            }
        }
    }

    /// Locked part of one step. `None` means the run is over.
    fn step(
        &self,
        triggered: Option<Candidate>,
        steps: &mut usize,
        limit: Option<usize>,
    ) -> Option<StepOutcome> {
        let observed = self.observed();
        let mut st = self.lock();

        let (winner, proposals, mut failures) = match triggered {
            Some(winner) => {
                let (blocker, mut failures) = st.threads.blocking_thread(&winner.event);
                if let Some(by) = blocker {
                    drop(st);
                    self.report_failures(failures);
                    tracing::warn!(
                        kind = %winner.event.kind,
                        blocked_by = %by,
                        "trigger dropped: event is blocked"
                    );
                    self.publish(SnapshotMessage::TriggerRejected {
                        event_type: winner.event.kind,
                        reason: format!("blocked by {by}"),
                    });
                    return None;
                }
                let proposals = if observed {
                    let (mut gathered, more) = st.threads.gather();
                    failures.extend(more);
                    let mut own = Proposal {
                        candidate: winner.clone(),
                        trigger: true,
                        blocked_by: None,
                        interrupts: None,
                    };
                    st.threads.annotate(&mut own);
                    gathered.insert(0, own);
                    gathered
                } else {
                    Vec::new()
                };
                (winner, proposals, failures)
            }
            None => {
                let (proposals, failures) = st.threads.gather();
                let candidates: Vec<Candidate> = proposals
                    .iter()
                    .filter(|p| p.blocked_by.is_none())
                    .map(|p| p.candidate.clone())
                    .collect();
                let picked = self
                    .inner
                    .cfg
                    .strategy
                    .select(&candidates)
                    .and_then(|i| candidates.get(i).cloned());
                let Some(winner) = picked else {
                    drop(st);
                    self.report_failures(failures);
                    tracing::trace!("quiescent");
                    return None;
                };

                *steps += 1;
                if let Some(max) = limit.filter(|max| *steps > *max) {
                    drop(st);
                    self.report_failures(failures);
                    tracing::warn!(limit = max, "step limit exceeded; run stopped");
                    self.publish(SnapshotMessage::StepLimitExceeded { limit: max });
                    return None;
                }
                (winner, proposals, failures)
            }
        };

        let snapshot = observed.then(|| SnapshotMessage::Selection {
            entries: format_selection(&proposals, &winner),
        });

        let res = st.threads.resolve(&winner.event, winner.template.as_ref());
        tracing::trace!(
            kind = %winner.event.kind,
            thread = %winner.thread,
            advanced = res.advanced,
            interrupted = res.interrupted.len(),
            finished = res.finished.len(),
            "step resolved"
        );
        failures.extend(res.failures);
        let action = st.feedback.get(winner.event.kind());

        Some(StepOutcome {
            event: winner.event,
            action,
            snapshot,
            failures,
        })
    }

    fn dispatch(&self, action: Action, event: Event) {
        match action {
            Action::Sync(f) => {
                let detail = event.detail.as_ref();
                match catch_unwind(AssertUnwindSafe(|| f(detail))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => self.feedback_failed(&event, e),
                    Err(p) => self.feedback_failed(
                        &event,
                        FeedbackError::Panicked {
                            info: panic_message(p.as_ref()),
                        },
                    ),
                }
            }
            Action::Spawn(f) => {
                let fut = match catch_unwind(AssertUnwindSafe(|| f(event.detail.clone()))) {
                    Ok(fut) => fut,
                    Err(p) => {
                        self.feedback_failed(
                            &event,
                            FeedbackError::Panicked {
                                info: panic_message(p.as_ref()),
                            },
                        );
                        return;
                    }
                };

                let weak = self.downgrade();
                let failed_event = event.clone();
                let task = async move {
                    let res = match AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(res) => res,
                        Err(p) => Err(FeedbackError::Panicked {
                            info: panic_message(p.as_ref()),
                        }),
                    };
                    if let Err(e) = res {
                        match weak.upgrade() {
                            Some(program) => program.feedback_failed(&failed_event, e),
                            None => tracing::error!(
                                kind = %failed_event.kind,
                                label = e.as_label(),
                                error = %e.as_message(),
                                "feedback action failed after program was dropped"
                            ),
                        }
                    }
                }
                .boxed();

                if let Err(e) = self.inner.spawner.spawn(task) {
                    self.feedback_failed(&event, e);
                }
            }
        }
    }

    fn feedback_failed(&self, event: &Event, err: FeedbackError) {
        tracing::error!(
            kind = %event.kind,
            label = err.as_label(),
            error = %err.as_message(),
            "feedback action failed"
        );
        self.publish(SnapshotMessage::FeedbackError {
            event_type: Arc::clone(&event.kind),
            detail: event.detail.clone(),
            error: err.as_message(),
        });
    }

    fn report_failures(&self, failures: Vec<ThreadFailure>) {
        for f in failures {
            tracing::error!(
                thread = %f.thread,
                error = %f.error,
                "thread rules panicked; thread removed"
            );
            self.publish(SnapshotMessage::ThreadError {
                thread: f.thread,
                error: f.error,
            });
        }
    }

    /// Sends a message to every attached subscriber.
    pub(crate) fn publish(&self, msg: SnapshotMessage) {
        self.inner.subs.read().emit(msg);
    }
}

impl WeakProgram {
    /// Upgrades to a [`Program`] if it is still alive.
    pub fn upgrade(&self) -> Option<Program> {
        self.inner.upgrade().map(|inner| Program { inner })
    }

    /// Triggers on the program if it is still alive.
    pub fn trigger(&self, event: Event) {
        match self.upgrade() {
            Some(program) => program.trigger(event),
            None => tracing::debug!(kind = %event.kind, "trigger ignored: program dropped"),
        }
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("strategy", &self.inner.cfg.strategy)
            .field("threads", &self.lock().threads.len())
            .finish()
    }
}
