//! Builder that validates and freezes chart specifications.
//!
//! Validation accumulates ALL violations with Stillwater's `Validation`
//! instead of stopping at the first one, so a host sees every broken state
//! and transition in a single pass.

use crate::chart::error::ConfigurationError;
use crate::chart::spec::{ChartRef, ChartSpec, On, Regions};
use crate::chart::{Chart, ChartDef, RegionDef, StateDef, TransitionDef};
use crate::core::{ActionId, ChartId, StateId};
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigurationError>>;

/// Build a chart set whose root is a single chart.
pub fn build<S>(spec: ChartSpec<S>) -> Result<Chart<S>, ConfigurationError> {
    ChartBuilder::new().root(spec).build()
}

/// Builder for chart sets with a fluent API.
///
/// # Example
///
/// ```rust
/// use chartgate::chart::{ChartBuilder, ChartRef, ChartSpec, StateSpec};
///
/// let chart = ChartBuilder::<()>::new()
///     .define("issues", ChartSpec::new("LOADING").state(StateSpec::new("LOADING")))
///     .root(
///         ChartSpec::new("ISSUES")
///             .state(StateSpec::new("ISSUES").nested(ChartRef::named("issues"))),
///     )
///     .build();
///
/// assert!(chart.is_ok());
/// ```
pub struct ChartBuilder<S> {
    root: Option<Regions<S>>,
    library: HashMap<String, ChartSpec<S>>,
}

impl<S> ChartBuilder<S> {
    pub fn new() -> Self {
        Self {
            root: None,
            library: HashMap::new(),
        }
    }

    /// Set a single root chart (required, or use `parallel_root`).
    pub fn root(mut self, chart: impl Into<ChartRef<S>>) -> Self {
        self.root = Some(Regions::Single(chart.into()));
        self
    }

    /// Set parallel root charts, one top-level region per key.
    pub fn parallel_root<K, C, I>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<ChartRef<S>>,
    {
        let regions = regions
            .into_iter()
            .map(|(key, chart)| (key.into(), chart.into()))
            .collect();
        self.root = Some(Regions::Parallel(regions));
        self
    }

    /// Register a chart that nested states can reference by name.
    pub fn define(mut self, name: impl Into<String>, spec: ChartSpec<S>) -> Self {
        self.library.insert(name.into(), spec);
        self
    }

    /// Validate and freeze the chart set.
    pub fn build(self) -> Result<Chart<S>, ConfigurationError> {
        let root = self.root.ok_or(ConfigurationError::MissingRoot)?;

        let mut flattener = Flattener::new(self.library);
        let root = flattener.regions(root, "root", None);
        flattener.finish(root)
    }
}

impl<S> Default for ChartBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks a specification tree and lays it out in the arena.
struct Flattener<S> {
    library: HashMap<String, ChartSpec<S>>,
    resolved: HashMap<String, ChartId>,
    visiting: Vec<String>,
    charts: Vec<ChartDef>,
    states: Vec<StateDef<S>>,
    actions: Vec<String>,
    action_index: HashMap<String, ActionId>,
    checks: Vec<Check>,
}

impl<S> Flattener<S> {
    fn new(library: HashMap<String, ChartSpec<S>>) -> Self {
        Self {
            library,
            resolved: HashMap::new(),
            visiting: Vec::new(),
            charts: Vec::new(),
            states: Vec::new(),
            actions: Vec::new(),
            action_index: HashMap::new(),
            checks: Vec::new(),
        }
    }

    fn fail(&mut self, error: ConfigurationError) {
        self.checks.push(Validation::fail(error));
    }

    fn intern(&mut self, action: String) -> ActionId {
        if let Some(id) = self.action_index.get(&action) {
            return *id;
        }
        let id = ActionId(self.actions.len());
        self.actions.push(action.clone());
        self.action_index.insert(action, id);
        id
    }

    /// Flatten a region set. `owner` is the dotted path used to label
    /// inline charts; `state` names the owning state for region errors.
    fn regions(&mut self, regions: Regions<S>, owner: &str, state: Option<&str>) -> Vec<RegionDef> {
        match regions {
            Regions::Single(chart) => self
                .chart_ref(chart, owner)
                .map(|chart| RegionDef { key: None, chart })
                .into_iter()
                .collect(),
            Regions::Parallel(list) => {
                let mut seen = HashSet::new();
                let mut defs = Vec::with_capacity(list.len());
                for (key, chart) in list {
                    if !seen.insert(key.clone()) {
                        self.fail(ConfigurationError::DuplicateRegion {
                            state: state.unwrap_or("root").to_string(),
                            region: key,
                        });
                        continue;
                    }
                    let label = match state {
                        Some(_) => format!("{owner}.{key}"),
                        None => key.clone(),
                    };
                    if let Some(chart) = self.chart_ref(chart, &label) {
                        defs.push(RegionDef {
                            key: Some(key),
                            chart,
                        });
                    }
                }
                defs
            }
        }
    }

    fn chart_ref(&mut self, chart: ChartRef<S>, label: &str) -> Option<ChartId> {
        match chart {
            ChartRef::Inline(spec) => Some(self.chart(*spec, label.to_string())),
            ChartRef::Named(name) => {
                if let Some(id) = self.resolved.get(&name) {
                    return Some(*id);
                }
                if self.visiting.contains(&name) {
                    self.fail(ConfigurationError::SelfEmbedding { chart: name });
                    return None;
                }
                let Some(spec) = self.library.remove(&name) else {
                    self.fail(ConfigurationError::UndefinedChart { name });
                    return None;
                };
                self.visiting.push(name.clone());
                let id = self.chart(spec, name.clone());
                self.visiting.pop();
                self.resolved.insert(name, id);
                Some(id)
            }
        }
    }

    fn chart(&mut self, spec: ChartSpec<S>, label: String) -> ChartId {
        let chart_id = ChartId(self.charts.len());
        let base = self.states.len();

        // Reserve contiguous state ids before nested charts claim any.
        let mut by_name: HashMap<String, StateId> = HashMap::new();
        let mut ids = Vec::with_capacity(spec.states.len());
        for (offset, state) in spec.states.iter().enumerate() {
            let id = StateId(base + offset);
            if by_name.contains_key(&state.id) {
                self.fail(ConfigurationError::DuplicateState {
                    chart: label.clone(),
                    state: state.id.clone(),
                });
            } else {
                by_name.insert(state.id.clone(), id);
            }
            ids.push(id);
            self.states.push(StateDef {
                id: state.id.clone(),
                entry: None,
                exit: None,
                on: HashMap::new(),
                regions: Vec::new(),
            });
        }

        let initial = match by_name.get(&spec.initial) {
            Some(id) => *id,
            None => {
                self.fail(ConfigurationError::UndefinedInitial {
                    chart: label.clone(),
                    initial: spec.initial.clone(),
                });
                StateId(base)
            }
        };
        self.charts.push(ChartDef {
            label: label.clone(),
            initial,
            states: ids.clone(),
        });

        for (state, id) in spec.states.into_iter().zip(ids) {
            let mut on = HashMap::new();
            for (action, outcome) in state.on {
                let target = match outcome.target() {
                    None => None,
                    Some(target) => match by_name.get(target) {
                        Some(target) => Some(*target),
                        None => {
                            self.fail(ConfigurationError::DanglingTarget {
                                chart: label.clone(),
                                state: state.id.clone(),
                                action: action.clone(),
                                target: target.to_string(),
                            });
                            continue;
                        }
                    },
                };
                let guard = match outcome {
                    On::Guarded { guard, .. } => Some(guard),
                    On::Stay | On::Target(_) => None,
                };
                on.insert(self.intern(action), TransitionDef { target, guard });
            }

            let regions = match state.regions {
                Some(regions) => {
                    let owner = format!("{label}.{}", state.id);
                    self.regions(regions, &owner, Some(&state.id))
                }
                None => Vec::new(),
            };

            let def = &mut self.states[id.0];
            def.entry = state.entry;
            def.exit = state.exit;
            def.on = on;
            def.regions = regions;
        }

        chart_id
    }

    fn finish(self, root: Vec<RegionDef>) -> Result<Chart<S>, ConfigurationError> {
        match Validation::all_vec(self.checks) {
            Validation::Success(_) => Ok(Chart {
                charts: self.charts,
                states: self.states,
                root,
                actions: self.actions,
                action_index: self.action_index,
            }),
            Validation::Failure(errors) => {
                let mut errors: Vec<ConfigurationError> = errors.iter().cloned().collect();
                if errors.len() == 1 {
                    Err(errors.remove(0))
                } else {
                    Err(ConfigurationError::Multiple(errors))
                }
            }
        }
    }
}
