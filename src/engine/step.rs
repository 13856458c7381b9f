//! Two-phase results of host actions.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// The part of an action that runs after its first suspension point.
///
/// The engine never polls continuations itself. It queues them so the host
/// can drive them with
/// [`Interpreter::settle`](crate::engine::Interpreter::settle) or
/// [`Interpreter::take_pending`](crate::engine::Interpreter::take_pending).
pub type Continuation = Pin<Box<dyn Future<Output = ()>>>;

/// What a host action (or hook) reports when its synchronous segment ends.
pub enum Step {
    /// The action ran to completion.
    Complete,
    /// The action reached a suspension point; the rest runs later.
    Suspended(Continuation),
}

impl Step {
    /// Suspend with the given continuation.
    pub fn suspend<F>(continuation: F) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        Step::Suspended(Box::pin(continuation))
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, Step::Suspended(_))
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Complete => f.write_str("Complete"),
            Step::Suspended(_) => f.write_str("Suspended(..)"),
        }
    }
}
