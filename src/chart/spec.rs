//! In-memory chart specification.
//!
//! A specification is the mutable, unvalidated description a host writes.
//! It is frozen into a [`Chart`](crate::chart::Chart) by
//! [`ChartBuilder::build`](crate::chart::ChartBuilder::build).

use crate::core::Guard;

/// What an action does when it matches an active state.
pub enum On<S> {
    /// Run the host action, leave the configuration untouched.
    Stay,
    /// Run the host action, then move to the target state.
    Target(String),
    /// Like `Target`, but only when the guard passes at dispatch time.
    Guarded { target: String, guard: Guard<S> },
}

impl<S> On<S> {
    pub fn target(&self) -> Option<&str> {
        match self {
            On::Stay => None,
            On::Target(target) | On::Guarded { target, .. } => Some(target),
        }
    }
}

impl<S> From<&str> for On<S> {
    fn from(target: &str) -> Self {
        On::Target(target.to_string())
    }
}

impl<S> From<String> for On<S> {
    fn from(target: String) -> Self {
        On::Target(target)
    }
}

/// A nested chart, either written in place or registered by name.
pub enum ChartRef<S> {
    Inline(Box<ChartSpec<S>>),
    Named(String),
}

impl<S> ChartRef<S> {
    /// Reference a chart registered with
    /// [`ChartBuilder::define`](crate::chart::ChartBuilder::define).
    pub fn named(name: impl Into<String>) -> Self {
        ChartRef::Named(name.into())
    }
}

impl<S> From<ChartSpec<S>> for ChartRef<S> {
    fn from(spec: ChartSpec<S>) -> Self {
        ChartRef::Inline(Box::new(spec))
    }
}

/// The region set owned by a state (or by the root of a chart set).
pub enum Regions<S> {
    /// One implicit region.
    Single(ChartRef<S>),
    /// One region per key, all active at once.
    Parallel(Vec<(String, ChartRef<S>)>),
}

/// A single state of a chart.
pub struct StateSpec<S> {
    pub(crate) id: String,
    pub(crate) entry: Option<String>,
    pub(crate) exit: Option<String>,
    pub(crate) on: Vec<(String, On<S>)>,
    pub(crate) regions: Option<Regions<S>>,
}

impl<S> StateSpec<S> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry: None,
            exit: None,
            on: Vec::new(),
            regions: None,
        }
    }

    /// Hook run when this state becomes active.
    pub fn entry(mut self, hook: impl Into<String>) -> Self {
        self.entry = Some(hook.into());
        self
    }

    /// Hook run when this state is vacated.
    pub fn exit(mut self, hook: impl Into<String>) -> Self {
        self.exit = Some(hook.into());
        self
    }

    /// Allow `action` in this state with the given outcome.
    ///
    /// A later entry for the same action replaces an earlier one.
    pub fn on(mut self, action: impl Into<String>, outcome: impl Into<On<S>>) -> Self {
        let action = action.into();
        let outcome = outcome.into();
        match self.on.iter_mut().find(|(name, _)| *name == action) {
            Some(slot) => slot.1 = outcome,
            None => self.on.push((action, outcome)),
        }
        self
    }

    /// Allow `action` in this state without transitioning.
    pub fn stay(self, action: impl Into<String>) -> Self {
        self.on(action, On::Stay)
    }

    /// Allow `action` to move to `target` when `predicate` holds.
    pub fn on_guarded<F>(self, action: impl Into<String>, target: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.on(
            action,
            On::Guarded {
                target: target.into(),
                guard: Guard::new(predicate),
            },
        )
    }

    /// Nest a single chart inside this state.
    pub fn nested(mut self, chart: impl Into<ChartRef<S>>) -> Self {
        self.regions = Some(Regions::Single(chart.into()));
        self
    }

    /// Nest parallel charts inside this state, one region per key.
    pub fn parallel<K, C, I>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<ChartRef<S>>,
    {
        let regions = regions
            .into_iter()
            .map(|(key, chart)| (key.into(), chart.into()))
            .collect();
        self.regions = Some(Regions::Parallel(regions));
        self
    }
}

/// A chart: an initial state plus its states, in declaration order.
pub struct ChartSpec<S> {
    pub(crate) initial: String,
    pub(crate) states: Vec<StateSpec<S>>,
}

impl<S> ChartSpec<S> {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            initial: initial.into(),
            states: Vec::new(),
        }
    }

    pub fn state(mut self, state: StateSpec<S>) -> Self {
        self.states.push(state);
        self
    }

    pub fn states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = StateSpec<S>>,
    {
        self.states.extend(states);
        self
    }
}
