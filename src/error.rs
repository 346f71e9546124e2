//! Error types used by the behavioral program and its feedback actions.
//!
//! This module defines two main error enums:
//!
//! - [`EventError`]: errors raised while decoding an event at a process boundary.
//! - [`FeedbackError`]: errors raised by (or around) feedback actions.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/snapshots.
//! Neither error ever stops the scheduler: the program reports them and keeps running.

use thiserror::Error;

/// # Errors produced while turning untyped input into an [`Event`](crate::Event).
///
/// Raised by `Event::try_from(serde_json::Value)` and surfaced as warnings by
/// [`Program::trigger_value`](crate::Program::trigger_value).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The value has no `type` field, or the field is an empty string.
    #[error("event has no type")]
    MissingType,

    /// The value is not shaped like `{ "type": string, "detail"?: any }`.
    #[error("malformed event: {reason}")]
    Malformed {
        /// Decoder message.
        reason: String,
    },
}

impl EventError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use bthreads::EventError;
    ///
    /// assert_eq!(EventError::MissingType.as_label(), "event_missing_type");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EventError::MissingType => "event_missing_type",
            EventError::Malformed { .. } => "event_malformed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EventError::MissingType => "missing type".to_string(),
            EventError::Malformed { reason } => format!("malformed: {reason}"),
        }
    }
}

/// # Errors produced by feedback actions.
///
/// Actions return `Result<(), FeedbackError>`; the runtime additionally synthesizes
/// [`FeedbackError::Panicked`] and [`FeedbackError::NoExecutor`] around them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    /// Action reported a failure.
    #[error("action failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Action panicked (sync body or spawned future).
    #[error("action panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// A spawned action could not be scheduled because no executor is available.
    #[error("no executor available to spawn action")]
    NoExecutor,
}

impl FeedbackError {
    /// Convenience constructor for [`FeedbackError::Fail`].
    ///
    /// # Example
    /// ```
    /// use bthreads::FeedbackError;
    ///
    /// let err = FeedbackError::fail("disk full");
    /// assert_eq!(err.as_message(), "disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        FeedbackError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FeedbackError::Fail { .. } => "feedback_failed",
            FeedbackError::Panicked { .. } => "feedback_panicked",
            FeedbackError::NoExecutor => "feedback_no_executor",
        }
    }

    /// Returns the bare error text, as published in snapshot messages.
    pub fn as_message(&self) -> String {
        match self {
            FeedbackError::Fail { error } => error.clone(),
            FeedbackError::Panicked { info } => info.clone(),
            FeedbackError::NoExecutor => "no executor available".to_string(),
        }
    }
}

/// Renders a panic payload (`Box<dyn Any>`) as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            EventError::Malformed { reason: "x".into() }.as_label(),
            "event_malformed"
        );
        assert_eq!(FeedbackError::fail("x").as_label(), "feedback_failed");
        assert_eq!(
            FeedbackError::Panicked { info: "x".into() }.as_label(),
            "feedback_panicked"
        );
        assert_eq!(FeedbackError::NoExecutor.as_label(), "feedback_no_executor");
    }

    #[test]
    fn panic_message_handles_common_payloads() {
        let static_str = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(static_str.as_ref()), "boom");

        let owned = std::panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other = std::panic::catch_unwind(|| std::panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
