//! # Cursor: explicit state machine over a rule tree.
//!
//! A [`Cursor`] walks a [`Rule`] depth-first and hands out one bid per call to
//! [`Cursor::next_bid`]. The walk state is a stack of frames, one per nested
//! `thread` / `repeat`. Dropping the cursor terminates the b-thread.
//!
//! ## Rules
//! - `Sync` yields its bid once.
//! - `Thread` frames pop when their last child completes.
//! - `Repeat` frames check their condition when (re)entering a cycle; a cycle that
//!   yields no bid at all ends the loop.

use std::sync::Arc;

use super::bid::Bid;
use super::rule::{Condition, Rule};

enum Frame {
    Seq {
        rules: Arc<[Rule]>,
        next: usize,
    },
    Repeat {
        rules: Arc<[Rule]>,
        condition: Option<Condition>,
        next: usize,
        started: bool,
        yielded: bool,
    },
}

impl Frame {
    fn enter(rule: &Rule) -> Option<Frame> {
        match rule {
            Rule::Sync(_) => None,
            Rule::Thread(rules) => Some(Frame::Seq {
                rules: Arc::clone(rules),
                next: 0,
            }),
            Rule::Repeat { rules, condition } => Some(Frame::Repeat {
                rules: Arc::clone(rules),
                condition: condition.clone(),
                next: 0,
                started: false,
                yielded: false,
            }),
        }
    }
}

/// Progress of one b-thread through its rule.
pub(crate) struct Cursor {
    stack: Vec<Frame>,
}

impl Cursor {
    /// Fresh cursor positioned before the rule's first bid.
    pub(crate) fn new(rule: &Rule) -> Self {
        let root: Arc<[Rule]> = Arc::from(vec![rule.clone()]);
        Self {
            stack: vec![Frame::Seq {
                rules: root,
                next: 0,
            }],
        }
    }

    /// Advances to the next bid; `None` once the rule is exhausted.
    ///
    /// May run user loop conditions, which may panic; callers guard for that.
    pub(crate) fn next_bid(&mut self) -> Option<Arc<Bid>> {
        loop {
            let frame = self.stack.last_mut()?;
            let rule = match frame {
                Frame::Seq { rules, next } => match rules.get(*next) {
                    Some(rule) => {
                        *next += 1;
                        rule.clone()
                    }
                    None => {
                        self.stack.pop();
                        continue;
                    }
                },
                Frame::Repeat {
                    rules,
                    condition,
                    next,
                    started,
                    yielded,
                } => {
                    if *next == 0 {
                        let empty_cycle = *started && !*yielded;
                        if empty_cycle || !condition.as_ref().is_none_or(|c| c()) {
                            self.stack.pop();
                            continue;
                        }
                        *started = true;
                        *yielded = false;
                    }
                    match rules.get(*next) {
                        Some(rule) => {
                            *next = (*next + 1) % rules.len();
                            rule.clone()
                        }
                        None => {
                            // empty body: the next pass sees an empty cycle
                            continue;
                        }
                    }
                }
            };

            match rule {
                Rule::Sync(bid) => {
                    self.mark_yielded();
                    return Some(bid);
                }
                nested => {
                    if let Some(frame) = Frame::enter(&nested) {
                        self.stack.push(frame);
                    }
                }
            }
        }
    }

    fn mark_yielded(&mut self) {
        for frame in &mut self.stack {
            if let Frame::Repeat { yielded, .. } = frame {
                *yielded = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::rules::rule::{repeat, repeat_while, sync, thread};

    fn prio(bid: Option<Arc<Bid>>) -> Option<i32> {
        bid.map(|b| b.priority())
    }

    fn p(n: i32) -> Rule {
        sync(Bid::new().with_priority(n))
    }

    #[test]
    fn sync_yields_once() {
        let mut c = Cursor::new(&p(1));
        assert_eq!(prio(c.next_bid()), Some(1));
        assert_eq!(prio(c.next_bid()), None);
        assert_eq!(prio(c.next_bid()), None);
    }

    #[test]
    fn thread_flattens_nested_sequences() {
        let rule = thread([p(1), thread([p(2), p(3)]), p(4)]);
        let mut c = Cursor::new(&rule);
        let seen: Vec<i32> = std::iter::from_fn(|| prio(c.next_bid())).collect();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_thread_yields_nothing() {
        let mut c = Cursor::new(&thread([]));
        assert!(c.next_bid().is_none());
    }

    #[test]
    fn repeat_cycles_forever() {
        let rule = repeat([p(1), p(2)]);
        let mut c = Cursor::new(&rule);
        let seen: Vec<i32> = (0..7).filter_map(|_| prio(c.next_bid())).collect();
        assert_eq!(seen, vec![1, 2, 1, 2, 1, 2, 1]);
    }

    #[test]
    fn repeat_while_checks_condition_each_cycle() {
        let checks = Arc::new(AtomicUsize::new(0));
        let c2 = checks.clone();
        let rule = repeat_while([p(1), p(2)], move || c2.fetch_add(1, Ordering::SeqCst) < 2);
        let mut c = Cursor::new(&rule);
        let seen: Vec<i32> = std::iter::from_fn(|| prio(c.next_bid())).collect();
        assert_eq!(seen, vec![1, 2, 1, 2]);
        // two passing checks plus the failing one
        assert_eq!(checks.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn repeat_while_false_from_start_is_empty() {
        let mut c = Cursor::new(&repeat_while([p(1)], || false));
        assert!(c.next_bid().is_none());
    }

    #[test]
    fn empty_repeat_terminates() {
        let mut c = Cursor::new(&repeat([]));
        assert!(c.next_bid().is_none());

        let mut c = Cursor::new(&repeat([thread([])]));
        assert!(c.next_bid().is_none());
    }

    #[test]
    fn repeat_then_sibling_runs_after_loop_ends() {
        let flag = Arc::new(AtomicUsize::new(0));
        let f2 = flag.clone();
        let rule = thread([
            repeat_while([p(1)], move || f2.fetch_add(1, Ordering::SeqCst) == 0),
            p(9),
        ]);
        let mut c = Cursor::new(&rule);
        let seen: Vec<i32> = std::iter::from_fn(|| prio(c.next_bid())).collect();
        assert_eq!(seen, vec![1, 9]);
    }

    #[test]
    fn cursors_from_same_rule_are_independent() {
        let rule = thread([p(1), p(2)]);
        let mut a = Cursor::new(&rule);
        let mut b = Cursor::new(&rule);
        assert_eq!(prio(a.next_bid()), Some(1));
        assert_eq!(prio(a.next_bid()), Some(2));
        assert_eq!(prio(a.next_bid()), None);
        assert_eq!(prio(b.next_bid()), Some(1));
    }
}
