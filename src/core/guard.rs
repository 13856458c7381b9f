//! Guard predicates for controlling targeted transitions.
//!
//! Guards are pure boolean functions over the host's external state. They
//! decide whether a targeted transition (and the action attached to it)
//! proceeds. Guards never see the chart configuration, only the state view
//! the host hands out at the instant of dispatch.

use std::fmt;
use std::sync::Arc;

/// Pure predicate that determines if a targeted transition can run.
///
/// # Example
///
/// ```rust
/// use chartgate::core::Guard;
///
/// struct Form {
///     username: String,
///     password: String,
/// }
///
/// let can_login = Guard::new(|f: &Form| !f.username.is_empty() && !f.password.is_empty());
///
/// let empty = Form { username: String::new(), password: String::new() };
/// let filled = Form { username: "a".into(), password: "b".into() };
///
/// assert!(!can_login.check(&empty));
/// assert!(can_login.check(&filled));
/// ```
pub struct Guard<S> {
    predicate: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S> Guard<S> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this state view.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

impl<S> Clone for Guard<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S> fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// Evaluate an optional guard against a state view.
///
/// An absent guard always passes.
pub fn evaluate<S>(guard: Option<&Guard<S>>, state: &S) -> bool {
    guard.is_none_or(|g| g.check(state))
}
