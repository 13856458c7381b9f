//! Transition history tracking.
//!
//! Every transition the interpreter applies is recorded here so a host can
//! inspect what happened and when. History is an immutable value: `record`
//! returns a new history with the transition appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single applied transition.
///
/// # Example
///
/// ```rust
/// use chartgate::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     region: "root".to_string(),
///     action: "login".to_string(),
///     from: "LOGIN".to_string(),
///     to: "AUTHENTICATING".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "AUTHENTICATING");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Region id (as used in snapshots) that changed its active state
    pub region: String,
    /// The action that caused the transition
    pub action: String,
    /// The state being vacated
    pub from: String,
    /// The state being entered
    pub to: String,
    /// When the transition was applied
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of applied transitions.
///
/// An optional limit keeps only the most recent records, since charts run
/// for the lifetime of the host.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionHistory {
    transitions: VecDeque<TransitionRecord>,
    limit: Option<usize>,
}

impl TransitionHistory {
    /// Create a new empty, unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty history keeping at most `limit` records.
    pub fn bounded(limit: usize) -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// ```rust
    /// use chartgate::core::{TransitionHistory, TransitionRecord};
    /// use chrono::Utc;
    ///
    /// let history = TransitionHistory::new();
    /// let next = history.record(TransitionRecord {
    ///     region: "root".into(),
    ///     action: "logout".into(),
    ///     from: "AUTHENTICATED".into(),
    ///     to: "LOGIN".into(),
    ///     timestamp: Utc::now(),
    /// });
    ///
    /// assert_eq!(next.transitions().len(), 1);
    /// assert_eq!(history.transitions().len(), 0); // Original unchanged
    /// ```
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut next = self.clone();
        next.push(transition);
        next
    }

    /// Append a transition in place, dropping the oldest records beyond
    /// the limit.
    pub fn push(&mut self, transition: TransitionRecord) {
        self.transitions.push_back(transition);
        if let Some(limit) = self.limit {
            while self.transitions.len() > limit {
                self.transitions.pop_front();
            }
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// States traversed by one region, in order.
    ///
    /// Returns the `from` of the first recorded transition of that region,
    /// then the `to` of each of its transitions.
    pub fn path(&self, region: &str) -> Vec<&str> {
        let mut path = Vec::new();
        let mut records = self.transitions.iter().filter(|t| t.region == region);
        if let Some(first) = records.next() {
            path.push(first.from.as_str());
            path.push(first.to.as_str());
        }
        path.extend(records.map(|t| t.to.as_str()));
        path
    }

    /// Duration between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// All recorded transitions, oldest first.
    pub fn transitions(&self) -> &VecDeque<TransitionRecord> {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
