//! Chart definitions.
//!
//! A [`ChartSpec`] is validated and frozen into an immutable [`Chart`]: an
//! arena of chart and state records addressed by [`ChartId`] and
//! [`StateId`]. Nesting is expressed by indices, so a frozen chart has no
//! ownership cycles and configurations that point into it are plain data.
//!
//! # Example
//!
//! ```rust
//! use chartgate::chart::{build, ChartSpec, StateSpec};
//!
//! let chart = build::<()>(
//!     ChartSpec::new("LOGIN")
//!         .state(StateSpec::new("LOGIN").on("login", "AUTHENTICATED"))
//!         .state(StateSpec::new("AUTHENTICATED").on("logout", "LOGIN")),
//! )
//! .unwrap();
//!
//! assert!(chart.action_id("login").is_some());
//! assert!(chart.action_id("unknown").is_none());
//! ```

mod build;
mod error;
mod spec;

pub use build::{build, ChartBuilder};
pub use error::ConfigurationError;
pub use spec::{ChartRef, ChartSpec, On, Regions, StateSpec};

use crate::core::{ActionId, ChartId, Guard, StateId};
use std::collections::HashMap;

/// A frozen chart in the arena.
#[derive(Debug)]
pub(crate) struct ChartDef {
    /// Registered name, or the dotted path of the owning state
    pub(crate) label: String,
    pub(crate) initial: StateId,
    pub(crate) states: Vec<StateId>,
}

/// A region slot owned by a state (or by the root).
#[derive(Debug, Clone)]
pub(crate) struct RegionDef {
    /// `None` for the implicit region of a single nested chart
    pub(crate) key: Option<String>,
    pub(crate) chart: ChartId,
}

#[derive(Debug)]
pub(crate) struct TransitionDef<S> {
    pub(crate) target: Option<StateId>,
    pub(crate) guard: Option<Guard<S>>,
}

#[derive(Debug)]
pub(crate) struct StateDef<S> {
    pub(crate) id: String,
    pub(crate) entry: Option<String>,
    pub(crate) exit: Option<String>,
    pub(crate) on: HashMap<ActionId, TransitionDef<S>>,
    pub(crate) regions: Vec<RegionDef>,
}

/// Immutable, validated chart set.
///
/// `S` is the host's external state type that guards read.
#[derive(Debug)]
pub struct Chart<S> {
    pub(crate) charts: Vec<ChartDef>,
    pub(crate) states: Vec<StateDef<S>>,
    pub(crate) root: Vec<RegionDef>,
    pub(crate) actions: Vec<String>,
    pub(crate) action_index: HashMap<String, ActionId>,
}

impl<S> Chart<S> {
    /// Resolve an action name to its interned identifier.
    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.action_index.get(name).copied()
    }

    pub fn action_name(&self, id: ActionId) -> Option<&str> {
        self.actions.get(id.0).map(String::as_str)
    }

    /// Every action name appearing in any action map, in first-seen order.
    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &str)> + '_ {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, name)| (ActionId(i), name.as_str()))
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.0).map(|s| s.id.as_str())
    }

    /// Label of a chart: its registered name or the path of its owner.
    pub fn chart_label(&self, id: ChartId) -> Option<&str> {
        self.charts.get(id.0).map(|c| c.label.as_str())
    }

    /// Find a state of `chart` by identifier.
    pub fn find_state(&self, chart: ChartId, name: &str) -> Option<StateId> {
        self.charts
            .get(chart.0)?
            .states
            .iter()
            .copied()
            .find(|s| self.states[s.0].id == name)
    }

    pub(crate) fn chart(&self, id: ChartId) -> &ChartDef {
        &self.charts[id.0]
    }

    pub(crate) fn state(&self, id: StateId) -> &StateDef<S> {
        &self.states[id.0]
    }
}
