//! # LogWriter: snapshot printer
//!
//! A minimal subscriber that renders incoming [`SnapshotMessage`]s through
//! `tracing`. Use it for tests or demos.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO [selection] thread=trigger kind=X priority=0 selected=true trigger=true ...
//! INFO [selection] thread=detectWins kind=win priority=0 selected=false blocked_by=Some("stopGame") ...
//! INFO [feedback-error] kind=save err=disk full
//! INFO [trigger-rejected] kind=O reason=blocked by enforceTurns
//! INFO [step-limit] limit=1000
//! ```

use async_trait::async_trait;

use crate::snapshot::{SelectionEntry, SnapshotMessage};
use crate::subscribers::Subscribe;

/// Snapshot writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn write_row(row: &SelectionEntry) {
    tracing::info!(
        thread = %row.thread,
        kind = %row.kind,
        detail = ?row.detail,
        priority = row.priority,
        selected = row.selected,
        trigger = row.trigger,
        blocked_by = ?row.blocked_by,
        interrupts = ?row.interrupts,
        "[selection]"
    );
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_snapshot(&self, msg: &SnapshotMessage) {
        match msg {
            SnapshotMessage::Selection { entries } => entries.iter().for_each(write_row),
            SnapshotMessage::FeedbackError {
                event_type, error, ..
            } => {
                tracing::info!(kind = %event_type, err = %error, "[feedback-error]");
            }
            SnapshotMessage::ThreadError { thread, error } => {
                tracing::info!(thread = %thread, err = %error, "[thread-error]");
            }
            SnapshotMessage::TriggerRejected { event_type, reason } => {
                tracing::info!(kind = %event_type, reason = %reason, "[trigger-rejected]");
            }
            SnapshotMessage::RestrictedTrigger {
                event_type, error, ..
            } => {
                tracing::info!(kind = %event_type, err = %error, "[restricted]");
            }
            SnapshotMessage::StepLimitExceeded { limit } => {
                tracing::info!(limit, "[step-limit]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
