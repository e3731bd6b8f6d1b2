#![forbid(unsafe_code)]

//! Error taxonomy shared by every vmkit crate.
//!
//! # Failure Modes
//!
//! | Error | Raised by | Meaning |
//! |-------|-----------|---------|
//! | `InvalidArgument` | binder construction | execution context absent or shut down |
//! | `UnsupportedChange` | forwarding callback | source emitted a kind other than add/remove/reset |
//! | `KeyNotFound` | transformed removal | no recorded counterpart for the removed element |
//! | `ContextUnavailable` | `ExecutionContext::invoke` | owning run-loop no longer accepts work |
//! | `PoisonedLock` | any shared container | a thread panicked while holding the lock |
//! | `IndexOutOfRange` | positional list mutation | index past the end of the list |
//!
//! None of these are retried. They surface at the point of detection and are
//! propagated with `?` to whoever triggered the failing path.

use crate::change::ChangeAction;

/// Errors raised while binding or forwarding collection changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// A required constructor argument was missing or unusable.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },
    /// The source emitted a notification kind the synchronizer does not forward.
    #[error("unsupported collection change: {0}")]
    UnsupportedChange(ChangeAction),
    /// A removed source element had no recorded transformed counterpart.
    #[error("no transformed element recorded for removed source element")]
    KeyNotFound,
    /// The execution context has shut down and no longer runs work.
    #[error("execution context is no longer available")]
    ContextUnavailable,
    /// An internal lock was poisoned by a panicking thread.
    #[error("{0} lock was poisoned")]
    PoisonedLock(&'static str),
    /// A positional mutation referenced an index outside the list.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result alias used throughout vmkit.
pub type Result<T> = std::result::Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = BindError::InvalidArgument {
            name: "context",
            reason: "execution context may not be absent",
        };
        assert_eq!(
            e.to_string(),
            "invalid argument `context`: execution context may not be absent"
        );

        let e = BindError::UnsupportedChange(ChangeAction::Move);
        assert_eq!(e.to_string(), "unsupported collection change: move");

        let e = BindError::PoisonedLock("observable vec");
        assert_eq!(e.to_string(), "observable vec lock was poisoned");

        let e = BindError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(e.to_string(), "index 4 out of range for length 2");
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(BindError::KeyNotFound, BindError::KeyNotFound);
        assert_ne!(BindError::KeyNotFound, BindError::ContextUnavailable);
    }
}
