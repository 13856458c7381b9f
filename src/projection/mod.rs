//! Read-only projections of the active configuration.
//!
//! - **Enabled actions**: which action names are structurally reachable from
//!   an active state's action map
//! - **Matches**: whether a nested boolean query holds for the configuration
//!
//! Both are pure functions of the chart and the configuration. Guards are
//! deliberately ignored by the enabled-action map: they depend on external
//! state at dispatch time, while this projection only reflects structure.

mod macros;
mod query;

pub use query::{Query, QueryNode};

use crate::chart::Chart;
use crate::configuration::{Configuration, Cursor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every action name of a chart set, mapped to whether it is enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledActions(BTreeMap<String, bool>);

impl EnabledActions {
    /// Compute the map for `config`.
    pub fn compute<S>(chart: &Chart<S>, config: &Configuration) -> Self {
        let mut enabled: BTreeMap<String, bool> = chart
            .actions()
            .map(|(_, name)| (name.to_string(), false))
            .collect();
        for state in config.active_states() {
            for action in chart.state(state).on.keys() {
                if let Some(name) = chart.action_name(*action) {
                    enabled.insert(name.to_string(), true);
                }
            }
        }
        Self(enabled)
    }

    /// Whether `action` is enabled. Unknown names are never enabled.
    pub fn is_enabled(&self, action: &str) -> bool {
        self.0.get(action).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names of the enabled actions, sorted.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, on)| *on).map(|(name, _)| name)
    }
}

/// Whether `query` holds for `config`.
///
/// Every key marked `true` must be active, every key marked `false` must not
/// be, and unmentioned keys are unconstrained. A nested query under a key
/// that is not active never matches.
pub fn matches<S>(chart: &Chart<S>, config: &Configuration, query: &Query) -> bool {
    matches_at(chart, config.root(chart), query)
}

fn matches_at<S>(chart: &Chart<S>, cursor: Cursor<'_>, query: &Query) -> bool {
    query.entries().all(|(key, node)| {
        let next = cursor.step(chart, key);
        match node {
            QueryNode::Is(active) => next.is_some() == *active,
            QueryNode::Nested(inner) => next.is_some_and(|inside| matches_at(chart, inside, inner)),
        }
    })
}
