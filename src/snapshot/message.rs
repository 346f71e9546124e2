//! # Snapshot message model.
//!
//! [`SnapshotMessage`] is serialized with an internal `kind` tag so external
//! inspectors can consume it as plain JSON:
//!
//! ```text
//! {"kind":"selection","bids":[{"thread":"a","type":"X","priority":0,"selected":true,"trigger":false}]}
//! {"kind":"feedback_error","type":"save","detail":null,"error":"disk full"}
//! {"kind":"step_limit_exceeded","limit":1000}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One proposed event as seen at a selection step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    /// Requesting thread (`"trigger"` for externally triggered events).
    pub thread: Arc<str>,
    /// Event type.
    #[serde(rename = "type")]
    pub kind: Arc<str>,
    /// Event detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    /// Effective priority.
    pub priority: i32,
    /// True for the entry that won the step.
    pub selected: bool,
    /// True if the entry came from `trigger()`.
    pub trigger: bool,
    /// First thread (registration order) blocking this event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<Arc<str>>,
    /// First thread (registration order) this event would interrupt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupts: Option<Arc<str>>,
}

/// Everything a program publishes to its subscribers.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotMessage {
    /// Proposed events of one step, sorted by priority.
    Selection {
        /// Rows, winner marked with `selected`.
        #[serde(rename = "bids")]
        entries: Vec<SelectionEntry>,
    },

    /// A feedback action failed or panicked.
    FeedbackError {
        /// Event type the action was registered for.
        #[serde(rename = "type")]
        event_type: Arc<str>,
        /// Detail passed to the action.
        detail: Option<Value>,
        /// Error text.
        error: String,
    },

    /// Evaluating a thread's rules panicked; the thread was removed.
    ThreadError {
        /// Removed thread.
        thread: Arc<str>,
        /// Panic text.
        error: String,
    },

    /// `trigger()` dropped an event (missing type, or blocked).
    TriggerRejected {
        /// Event type (may be empty).
        #[serde(rename = "type")]
        event_type: Arc<str>,
        /// Why the event was dropped.
        reason: String,
    },

    /// A restricted trigger refused an event from its deny-list.
    #[serde(rename = "restricted_trigger_error")]
    RestrictedTrigger {
        /// Refused event type.
        #[serde(rename = "type")]
        event_type: Arc<str>,
        /// Detail of the refused event.
        detail: Option<Value>,
        /// Error text.
        error: String,
    },

    /// The internal loop hit `max_steps` and stopped.
    StepLimitExceeded {
        /// Configured limit.
        limit: usize,
    },
}

impl SnapshotMessage {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SnapshotMessage::Selection { .. } => "selection",
            SnapshotMessage::FeedbackError { .. } => "feedback_error",
            SnapshotMessage::ThreadError { .. } => "thread_error",
            SnapshotMessage::TriggerRejected { .. } => "trigger_rejected",
            SnapshotMessage::RestrictedTrigger { .. } => "restricted_trigger_error",
            SnapshotMessage::StepLimitExceeded { .. } => "step_limit_exceeded",
        }
    }
}
