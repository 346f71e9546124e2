//! # Selection snapshot formatter.
//!
//! Turns the proposals gathered for one step into [`SelectionEntry`] rows:
//! - rows are sorted by priority (stable, so registration order survives ties);
//! - `selected` marks rows of the winning thread proposing the winning event;
//! - `blocked_by` / `interrupts` carry the first matching thread, resolved by the
//!   registry at gather time.

use std::sync::Arc;

use crate::policies::Candidate;

use super::SelectionEntry;

/// A requested event plus what the registry knows about it this step.
#[derive(Clone, Debug)]
pub(crate) struct Proposal {
    pub(crate) candidate: Candidate,
    pub(crate) trigger: bool,
    pub(crate) blocked_by: Option<Arc<str>>,
    pub(crate) interrupts: Option<Arc<str>>,
}

fn is_winner(c: &Candidate, winner: &Candidate) -> bool {
    if c.thread != winner.thread {
        return false;
    }
    match (&c.template, &winner.template) {
        (Some(a), Some(b)) => a.same(b),
        (None, None) => c.event.kind == winner.event.kind,
        _ => false,
    }
}

/// Builds the rows of a selection snapshot.
pub(crate) fn format_selection(proposals: &[Proposal], winner: &Candidate) -> Vec<SelectionEntry> {
    let mut rows: Vec<SelectionEntry> = proposals
        .iter()
        .map(|p| SelectionEntry {
            thread: Arc::clone(&p.candidate.thread),
            kind: Arc::clone(&p.candidate.event.kind),
            detail: p.candidate.event.detail.clone(),
            priority: p.candidate.priority,
            selected: is_winner(&p.candidate, winner),
            trigger: p.trigger,
            blocked_by: p.blocked_by.clone(),
            interrupts: p.interrupts.clone(),
        })
        .collect();
    rows.sort_by_key(|r| r.priority);
    rows
}
