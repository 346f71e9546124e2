//! # Selection strategy for candidate events.
//!
//! [`SelectionStrategy`] picks exactly one winner among the unblocked requested
//! events of a step.
//!
//! - [`SelectionStrategy::Priority`]: smallest priority wins, ties by registration order
//! - [`SelectionStrategy::Chaos`]: uniform random pick, priority ignored
//! - [`SelectionStrategy::Randomized`]: shuffle, then stable sort by priority
//! - [`SelectionStrategy::Custom`]: caller-provided pure function

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::panic_message;
use crate::events::{Event, EventTemplate};

/// One unblocked requested event offered to the strategy.
#[derive(Clone, Debug)]
pub struct Candidate {
    /// Proposed event (templates already produced).
    pub event: Event,
    /// Name of the requesting thread.
    pub thread: Arc<str>,
    /// Effective priority (entry priority, else bid priority).
    pub priority: i32,
    pub(crate) order: u64,
    pub(crate) template: Option<EventTemplate>,
}

impl Candidate {
    /// Registration order of the requesting thread.
    #[inline]
    pub fn order(&self) -> u64 {
        self.order
    }

    /// True if the event was produced by a template.
    #[inline]
    pub fn from_template(&self) -> bool {
        self.template.is_some()
    }
}

/// Caller-provided selection function; returns an index into the slice.
pub type SelectFn = Arc<dyn Fn(&[Candidate]) -> usize + Send + Sync>;

/// Policy choosing the winning candidate of a step.
///
/// ## Trade-offs
/// - **Priority**: fully deterministic, reproducible runs
/// - **Chaos**: explores interleavings, ignores priorities entirely
/// - **Randomized**: respects priority classes, random within a class
#[derive(Clone, Default)]
pub enum SelectionStrategy {
    /// Lowest priority wins; ties broken by registration order.
    #[default]
    Priority,

    /// Uniform random pick among all candidates.
    Chaos,

    /// Random order within each priority class.
    Randomized,

    /// Custom pick. An out-of-range index or a panic falls back to
    /// [`SelectionStrategy::Priority`].
    Custom(SelectFn),
}

impl SelectionStrategy {
    /// Wraps a custom selection function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[Candidate]) -> usize + Send + Sync + 'static,
    {
        SelectionStrategy::Custom(Arc::new(f))
    }

    /// Returns the index of the winner, or `None` for an empty slice.
    pub fn select(&self, candidates: &[Candidate]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        match self {
            SelectionStrategy::Priority => by_priority(candidates),
            SelectionStrategy::Chaos => Some(rand::rng().random_range(0..candidates.len())),
            SelectionStrategy::Randomized => {
                let mut idx: Vec<usize> = (0..candidates.len()).collect();
                idx.shuffle(&mut rand::rng());
                idx.sort_by_key(|&i| candidates[i].priority);
                idx.first().copied()
            }
            SelectionStrategy::Custom(f) => {
                match catch_unwind(AssertUnwindSafe(|| f(candidates))) {
                    Ok(picked) if picked < candidates.len() => Some(picked),
                    Ok(picked) => {
                        tracing::warn!(
                            picked,
                            candidates = candidates.len(),
                            "custom strategy returned out-of-range index; using priority"
                        );
                        by_priority(candidates)
                    }
                    Err(p) => {
                        tracing::error!(
                            info = %panic_message(p.as_ref()),
                            "custom strategy panicked; using priority"
                        );
                        by_priority(candidates)
                    }
                }
            }
        }
    }
}

fn by_priority(candidates: &[Candidate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(i, c)| (c.priority, c.order, *i))
        .map(|(i, _)| i)
}

impl fmt::Debug for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::Priority => f.write_str("Priority"),
            SelectionStrategy::Chaos => f.write_str("Chaos"),
            SelectionStrategy::Randomized => f.write_str("Randomized"),
            SelectionStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(kind: &str, priority: i32, order: u64) -> Candidate {
        Candidate {
            event: Event::new(kind),
            thread: Arc::from(kind),
            priority,
            order,
            template: None,
        }
    }

    #[test]
    fn empty_has_no_winner() {
        for s in [
            SelectionStrategy::Priority,
            SelectionStrategy::Chaos,
            SelectionStrategy::Randomized,
            SelectionStrategy::custom(|_| 0),
        ] {
            assert_eq!(s.select(&[]), None, "{s:?}");
        }
    }

    #[test]
    fn priority_prefers_lowest_then_earliest() {
        let c = vec![cand("a", 2, 0), cand("b", 1, 2), cand("c", 1, 1)];
        assert_eq!(SelectionStrategy::Priority.select(&c), Some(2));
    }

    #[test]
    fn priority_is_deterministic() {
        let c = vec![cand("a", 0, 0), cand("b", 0, 1), cand("c", 0, 2)];
        for _ in 0..100 {
            assert_eq!(SelectionStrategy::Priority.select(&c), Some(0));
        }
    }

    #[test]
    fn randomized_stays_within_best_class() {
        let c = vec![cand("a", 3, 0), cand("b", 1, 1), cand("c", 1, 2), cand("d", 2, 3)];
        for _ in 0..100 {
            let i = SelectionStrategy::Randomized.select(&c).unwrap();
            assert!(i == 1 || i == 2, "picked {i}");
        }
    }

    #[test]
    fn chaos_stays_in_range() {
        let c = vec![cand("a", 0, 0), cand("b", 9, 1)];
        for _ in 0..100 {
            assert!(SelectionStrategy::Chaos.select(&c).unwrap() < 2);
        }
    }

    #[test]
    fn custom_out_of_range_falls_back_to_priority() {
        let c = vec![cand("a", 5, 0), cand("b", 1, 1)];
        assert_eq!(SelectionStrategy::custom(|_| 0).select(&c), Some(0));
        assert_eq!(SelectionStrategy::custom(|_| 7).select(&c), Some(1));
    }

    #[test]
    fn panicking_custom_falls_back_to_priority() {
        let c = vec![cand("a", 5, 0), cand("b", 1, 1)];
        let s = SelectionStrategy::custom(|_| panic!("bad pick"));
        assert_eq!(s.select(&c), Some(1));
    }
}
