//! # Rule composition: `sync`, `thread`, `repeat`.
//!
//! A [`Rule`] is an immutable description of a b-thread's bid sequence. Rules are
//! cheap to clone (everything is behind `Arc`) and act as **factories**: every
//! registration builds a fresh [`Cursor`](super::cursor::Cursor), so adding the
//! same rule twice never shares progress between the two threads.
//!
//! ```text
//! sync(bid)              → yields `bid` once, then completes
//! thread([r1, r2, ..])   → runs r1 to completion, then r2, ...
//! repeat([r1, ..])       → thread([r1, ..]) forever
//! repeat_while([..], c)  → thread([..]) while c() holds at the start of a cycle
//! ```
//!
//! ## Example
//! ```rust
//! use bthreads::{repeat, sync, Bid};
//!
//! // X and O alternate forever.
//! let enforce_turns = repeat([
//!     sync(Bid::new().with_wait_for("X").with_block("O")),
//!     sync(Bid::new().with_wait_for("O").with_block("X")),
//! ]);
//! # let _ = enforce_turns;
//! ```

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;

use super::bid::Bid;

/// Loop condition evaluated at the start of each `repeat_while` cycle.
pub type Condition = Arc<dyn Fn() -> bool + Send + Sync>;

/// Composable b-thread description.
#[derive(Clone)]
pub enum Rule {
    /// A single synchronization point.
    Sync(Arc<Bid>),
    /// Sub-rules run in order.
    Thread(Arc<[Rule]>),
    /// Sub-rules run in order, cycle after cycle.
    Repeat {
        /// Body of one cycle.
        rules: Arc<[Rule]>,
        /// `None` repeats forever.
        condition: Option<Condition>,
    },
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Sync(bid) => f.debug_tuple("Sync").field(bid).finish(),
            Rule::Thread(rules) => f.debug_tuple("Thread").field(rules).finish(),
            Rule::Repeat { rules, condition } => f
                .debug_struct("Repeat")
                .field("rules", rules)
                .field("conditional", &condition.is_some())
                .finish(),
        }
    }
}

/// A rule that yields exactly one bid.
pub fn sync(bid: Bid) -> Rule {
    Rule::Sync(Arc::new(bid))
}

/// A rule running `rules` one after another.
pub fn thread(rules: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Thread(rules.into_iter().collect())
}

/// A rule running `rules` in a loop forever.
pub fn repeat(rules: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Repeat {
        rules: rules.into_iter().collect(),
        condition: None,
    }
}

/// A rule running `rules` in a loop while `condition()` holds.
///
/// The condition is checked before every cycle, including the first one.
pub fn repeat_while<F>(rules: impl IntoIterator<Item = Rule>, condition: F) -> Rule
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    Rule::Repeat {
        rules: rules.into_iter().collect(),
        condition: Some(Arc::new(condition)),
    }
}

/// Returns `rules` in a uniformly random order (Fisher–Yates).
pub fn shuffle(mut rules: Vec<Rule>) -> Vec<Rule> {
    rules.shuffle(&mut rand::rng());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_keeps_every_rule() {
        let rules: Vec<Rule> = (0..5)
            .map(|i| sync(Bid::new().with_priority(i)))
            .collect();
        let shuffled = shuffle(rules);
        let mut priorities: Vec<i32> = shuffled
            .iter()
            .map(|r| match r {
                Rule::Sync(bid) => bid.priority(),
                _ => unreachable!(),
            })
            .collect();
        priorities.sort_unstable();
        assert_eq!(priorities, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn debug_hides_closures() {
        let r = repeat_while([sync(Bid::new())], || true);
        assert!(format!("{r:?}").contains("conditional: true"));
    }
}
