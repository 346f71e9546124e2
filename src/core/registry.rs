//! # Thread registry - name-keyed set of active b-threads.
//!
//! The registry owns every active [`BThread`]: its cursor and its current bid.
//! It answers the three questions a step asks:
//! - **gather**: which events are requested, and by whom are they blocked?
//! - **blocking_thread**: is this externally triggered event blocked?
//! - **resolve**: given the selected event, who is interrupted, who advances?
//!
//! ## Rules
//! - Names are unique; re-adding a name replaces the thread but keeps its
//!   registration order (tie-break position).
//! - An active thread always has exactly one current bid (primed on insert).
//! - A thread whose rules panic while being evaluated (loop condition, template,
//!   matcher) is removed and reported as a [`ThreadFailure`].

use std::collections::{BTreeMap, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::panic_message;
use crate::events::{Event, EventTemplate};
use crate::policies::Candidate;
use crate::rules::cursor::Cursor;
use crate::rules::{Bid, Request, Rule};
use crate::snapshot::Proposal;

/// One active b-thread.
struct BThread {
    order: u64,
    cursor: Cursor,
    bid: Arc<Bid>,
}

/// A thread removed because evaluating its rules panicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ThreadFailure {
    pub(crate) thread: Arc<str>,
    pub(crate) error: String,
}

/// What happened to the threads during one resolution pass.
#[derive(Debug, Default)]
pub(crate) struct Resolution {
    pub(crate) advanced: usize,
    pub(crate) interrupted: Vec<Arc<str>>,
    pub(crate) finished: Vec<Arc<str>>,
    pub(crate) failures: Vec<ThreadFailure>,
}

/// Result of registering one thread.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Inserted {
    /// Primed and active.
    Active,
    /// The rule yielded no bid; nothing registered.
    Empty,
    /// Priming panicked; nothing registered.
    Failed(ThreadFailure),
}

fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|p| panic_message(p.as_ref()))
}

/// Name-keyed registry of active b-threads, iterated in registration order.
#[derive(Default)]
pub(crate) struct ThreadRegistry {
    threads: HashMap<Arc<str>, BThread>,
    index: BTreeMap<u64, Arc<str>>,
    next_order: u64,
    failed: Vec<ThreadFailure>,
}

impl ThreadRegistry {
    /// Registers (or replaces) a thread and primes its first bid.
    pub(crate) fn insert(&mut self, name: Arc<str>, rule: &Rule) -> Inserted {
        let previous = self.remove_entry(&name);
        let mut cursor = Cursor::new(rule);

        let bid = match guarded(|| cursor.next_bid()) {
            Ok(Some(bid)) => bid,
            Ok(None) => return Inserted::Empty,
            Err(error) => {
                return Inserted::Failed(ThreadFailure {
                    thread: name,
                    error,
                });
            }
        };

        let order = previous.unwrap_or_else(|| {
            let o = self.next_order;
            self.next_order += 1;
            o
        });
        self.index.insert(order, Arc::clone(&name));
        self.threads.insert(name, BThread { order, cursor, bid });
        Inserted::Active
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.threads.contains_key(name)
    }

    /// Removes a thread; `false` if it did not exist.
    pub(crate) fn remove(&mut self, name: &str) -> bool {
        self.remove_entry(name).is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.threads.clear();
        self.index.clear();
    }

    /// Active thread names in registration order.
    pub(crate) fn names(&self) -> Vec<Arc<str>> {
        self.index.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.threads.len()
    }

    fn remove_entry(&mut self, name: &str) -> Option<u64> {
        let t = self.threads.remove(name)?;
        self.index.remove(&t.order);
        Some(t.order)
    }

    /// Removes every thread recorded in `failed` and returns the records.
    fn reap(&mut self) -> Vec<ThreadFailure> {
        let failures = std::mem::take(&mut self.failed);
        for f in &failures {
            self.remove_entry(&f.thread);
        }
        failures
    }

    /// First thread (registration order) whose bid satisfies `f`.
    fn first_matching<F>(&mut self, f: F) -> Option<Arc<str>>
    where
        F: Fn(&Bid) -> bool,
    {
        for name in self.index.values() {
            let Some(t) = self.threads.get(name) else {
                continue;
            };
            if self.failed.iter().any(|x| x.thread == *name) {
                continue;
            }
            match guarded(|| f(&t.bid)) {
                Ok(true) => return Some(Arc::clone(name)),
                Ok(false) => {}
                Err(error) => self.failed.push(ThreadFailure {
                    thread: Arc::clone(name),
                    error,
                }),
            }
        }
        None
    }

    /// First thread whose current bid blocks `event`.
    pub(crate) fn blocking_thread(
        &mut self,
        event: &Event,
    ) -> (Option<Arc<str>>, Vec<ThreadFailure>) {
        let mut failures = Vec::new();
        loop {
            let hit = self.first_matching(|bid| bid.blocks(event));
            if self.failed.is_empty() {
                return (hit, failures);
            }
            failures.extend(self.reap());
        }
    }

    /// Fills `blocked_by` / `interrupts` for a proposal.
    pub(crate) fn annotate(&mut self, p: &mut Proposal) {
        let event = &p.candidate.event;
        let blocked_by = if self.threads.values().any(|t| t.bid.has_blocks()) {
            self.first_matching(|bid| bid.blocks(event))
        } else {
            None
        };
        let interrupts = if self.threads.values().any(|t| t.bid.has_interrupts()) {
            self.first_matching(|bid| bid.is_interrupted_by(event))
        } else {
            None
        };
        p.blocked_by = blocked_by;
        p.interrupts = interrupts;
    }

    fn try_gather(&mut self) -> Vec<Proposal> {
        let mut proposals = Vec::new();
        for name in self.index.values() {
            let Some(t) = self.threads.get(name) else {
                continue;
            };
            let base = t.bid.priority();
            let produced = guarded(|| {
                t.bid
                    .requests()
                    .iter()
                    .map(|r| match r {
                        Request::Event { event, priority } => {
                            (event.clone(), priority.unwrap_or(base), None)
                        }
                        Request::Template(tpl) => (tpl.produce(), base, Some(tpl.clone())),
                    })
                    .collect::<Vec<_>>()
            });
            match produced {
                Ok(list) => proposals.extend(list.into_iter().map(|(event, priority, template)| {
                    Proposal {
                        candidate: Candidate {
                            event,
                            thread: Arc::clone(name),
                            priority,
                            order: t.order,
                            template,
                        },
                        trigger: false,
                        blocked_by: None,
                        interrupts: None,
                    }
                })),
                Err(error) => self.failed.push(ThreadFailure {
                    thread: Arc::clone(name),
                    error,
                }),
            }
        }
        for p in &mut proposals {
            self.annotate(p);
        }
        proposals
    }

    /// Every requested event with its blocking/interrupting threads.
    ///
    /// Threads failing during evaluation are removed and the gather restarts,
    /// so the returned proposals only reference live threads.
    pub(crate) fn gather(&mut self) -> (Vec<Proposal>, Vec<ThreadFailure>) {
        let mut failures = Vec::new();
        loop {
            let proposals = self.try_gather();
            if self.failed.is_empty() {
                return (proposals, failures);
            }
            failures.extend(self.reap());
        }
    }

    /// Applies the selected event: interrupt, then advance or finish.
    pub(crate) fn resolve(
        &mut self,
        selected: &Event,
        template: Option<&EventTemplate>,
    ) -> Resolution {
        let mut res = Resolution::default();
        let names: Vec<Arc<str>> = self.index.values().cloned().collect();

        for name in names {
            if self.failed.iter().any(|f| f.thread == name) {
                continue;
            }
            let Some(t) = self.threads.get_mut(&name) else {
                continue;
            };

            let step = guarded(|| {
                if t.bid.is_interrupted_by(selected) {
                    return Step::Interrupted;
                }
                if !t.bid.advances_on(selected, template) {
                    return Step::Idle;
                }
                match t.cursor.next_bid() {
                    Some(bid) => {
                        t.bid = bid;
                        Step::Advanced
                    }
                    None => Step::Finished,
                }
            });

            match step {
                Ok(Step::Idle) => {}
                Ok(Step::Advanced) => res.advanced += 1,
                Ok(Step::Interrupted) => {
                    self.remove_entry(&name);
                    res.interrupted.push(name);
                }
                Ok(Step::Finished) => {
                    self.remove_entry(&name);
                    res.finished.push(name);
                }
                Err(error) => self.failed.push(ThreadFailure {
                    thread: name,
                    error,
                }),
            }
        }

        res.failures = self.reap();
        res
    }
}

enum Step {
    Idle,
    Advanced,
    Interrupted,
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{repeat, repeat_while, sync, thread};

    fn reg_with(threads: &[(&str, Rule)]) -> ThreadRegistry {
        let mut reg = ThreadRegistry::default();
        for (name, rule) in threads {
            assert_eq!(reg.insert(Arc::from(*name), rule), Inserted::Active);
        }
        reg
    }

    fn kinds(ps: &[Proposal]) -> Vec<(&str, &str)> {
        ps.iter()
            .map(|p| (&*p.candidate.thread, p.candidate.event.kind()))
            .collect()
    }

    #[test]
    fn empty_rules_are_not_registered() {
        let mut reg = ThreadRegistry::default();
        assert_eq!(reg.insert(Arc::from("x"), &thread([])), Inserted::Empty);
        assert!(!reg.contains("x"));
    }

    #[test]
    fn panicking_prime_is_reported() {
        let mut reg = ThreadRegistry::default();
        let rule = repeat_while([sync(Bid::new())], || panic!("bad condition"));
        match reg.insert(Arc::from("x"), &rule) {
            Inserted::Failed(f) => assert_eq!(f.error, "bad condition"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn overwrite_keeps_registration_order() {
        let req = |k: &str| sync(Bid::new().with_request(Event::new(k)));
        let mut reg = reg_with(&[("a", req("A")), ("b", req("B"))]);
        assert_eq!(reg.insert(Arc::from("a"), &req("A2")), Inserted::Active);

        assert_eq!(reg.names().len(), 2);
        let (ps, _) = reg.gather();
        assert_eq!(kinds(&ps), vec![("a", "A2"), ("b", "B")]);
    }

    #[test]
    fn gather_marks_first_blocker() {
        let mut reg = reg_with(&[
            ("req", sync(Bid::new().with_request(Event::new("X")))),
            ("g1", sync(Bid::new().with_block("X"))),
            ("g2", sync(Bid::new().with_block("X"))),
        ]);
        let (ps, failures) = reg.gather();
        assert!(failures.is_empty());
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].blocked_by.as_deref(), Some("g1"));
    }

    #[test]
    fn panicking_template_removes_thread_only() {
        let bad = crate::events::EventTemplate::new(|| panic!("no dice"));
        let mut reg = reg_with(&[
            ("bad", sync(Bid::new().with_request(bad))),
            ("good", sync(Bid::new().with_request(Event::new("ok")))),
        ]);
        let (ps, failures) = reg.gather();
        assert_eq!(kinds(&ps), vec![("good", "ok")]);
        assert_eq!(failures.len(), 1);
        assert_eq!(&*failures[0].thread, "bad");
        assert!(!reg.contains("bad"));
    }

    #[test]
    fn resolve_interrupts_before_advancing() {
        let mut reg = reg_with(&[
            (
                "worker",
                repeat([sync(Bid::new().with_wait_for("tick").with_interrupt("stop"))]),
            ),
            (
                "both",
                sync(Bid::new().with_wait_for("stop").with_interrupt("stop")),
            ),
            ("listener", thread([sync(Bid::new().with_wait_for("stop"))])),
        ]);

        let res = reg.resolve(&Event::new("tick"), None);
        assert_eq!(res.advanced, 1);
        assert!(reg.contains("worker"));

        let res = reg.resolve(&Event::new("stop"), None);
        let interrupted: Vec<&str> = res.interrupted.iter().map(|n| &**n).collect();
        let finished: Vec<&str> = res.finished.iter().map(|n| &**n).collect();
        assert_eq!(interrupted, vec!["worker", "both"]);
        assert_eq!(finished, vec!["listener"]);
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn blocking_thread_finds_blocker() {
        let mut reg = reg_with(&[("guard", repeat([sync(Bid::new().with_block("O"))]))]);
        assert_eq!(reg.blocking_thread(&Event::new("O")).0.as_deref(), Some("guard"));
        assert_eq!(reg.blocking_thread(&Event::new("X")).0, None);
    }

    #[test]
    fn remove_and_clear() {
        let mut reg = reg_with(&[
            ("a", sync(Bid::new())),
            ("b", sync(Bid::new())),
        ]);
        assert!(reg.remove("a"));
        assert!(!reg.remove("a"));
        reg.clear();
        assert_eq!(reg.len(), 0);
        assert!(reg.names().is_empty());
    }
}
