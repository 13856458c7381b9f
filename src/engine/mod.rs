//! The transition engine.
//!
//! An [`Interpreter`] owns one configuration of a frozen [`Chart`] and gates
//! host actions against it. Dispatching an action:
//!
//! 1. looks the action up in the action map of every active state, in
//!    declaration order (outer regions before their children);
//! 2. evaluates guards of targeted matches against the host's state view;
//! 3. invokes the host action once, while the configuration still reflects
//!    the pre-transition state;
//! 4. once the action's synchronous segment returns, applies each targeted
//!    transition: exit hooks innermost-first, a single swap of the region's
//!    subtree, then entry hooks outermost-first.
//!
//! An action with no match is a silent no-op. The host is single-threaded
//! and cooperative: the interpreter lives behind an `Rc` and uses `RefCell`
//! for its configuration, and no borrow is held while host code runs, so
//! actions may dispatch reentrantly.

mod advisory;
mod settings;
mod step;

pub use advisory::{AdvisoryHandler, DispatchAdvisory};
pub use settings::{InterpreterBuilder, Mode, Settings, DEFAULT_HISTORY_LIMIT};
pub use step::{Continuation, Step};

use crate::chart::{Chart, StateDef};
use crate::configuration::{Activation, ActiveRegion, Configuration, RegionInfo, Snapshot};
use crate::core::{evaluate, ChartId, Guard, StateId, TransitionHistory, TransitionRecord};
use crate::projection::{self, EnabledActions, Query};
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// The host collaborators the engine calls out to.
///
/// `read` exposes the external state guards are evaluated against; it is
/// called afresh for every guard. `invoke` runs the logic of a gated action
/// and `hook` runs entry and exit hooks. Both report whether they suspended.
pub trait Host: Sized {
    /// External application state, read by guards.
    type State;
    /// Data passed along with a dispatched action.
    type Payload;

    fn read<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R;

    fn invoke(&self, cx: &ActionContext<'_, Self>, payload: Self::Payload) -> Step;

    fn hook(&self, cx: &ActionContext<'_, Self>, hook: &str) -> Step {
        let _ = (cx, hook);
        Step::Complete
    }
}

/// What a host action sees of the interpreter while it runs.
pub struct ActionContext<'a, H: Host> {
    interpreter: &'a Interpreter<H>,
    name: &'a str,
}

impl<'a, H: Host> ActionContext<'a, H> {
    /// Name of the running action or hook.
    pub fn action(&self) -> &str {
        self.name
    }

    pub fn interpreter(&self) -> &'a Interpreter<H> {
        self.interpreter
    }

    /// Owned handle for use in continuations.
    ///
    /// A continuation holding the handle is queued inside the interpreter it
    /// points to, so the interpreter stays alive until the continuation is
    /// driven with `settle`, handed out with `take_pending`, or dropped by
    /// `stop`.
    pub fn handle(&self) -> Option<Rc<Interpreter<H>>> {
        self.interpreter.this.upgrade()
    }

    /// Dispatch another action from inside this one.
    pub fn dispatch(&self, action: &str, payload: H::Payload) -> Dispatched {
        self.interpreter.dispatch(action, payload)
    }

    pub fn matches(&self, query: &Query) -> bool {
        self.interpreter.matches(query)
    }

    pub fn is_enabled(&self, action: &str) -> bool {
        self.interpreter.is_enabled(action)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.interpreter.snapshot()
    }

    pub fn read<R>(&self, f: impl FnOnce(&H::State) -> R) -> R {
        self.interpreter.host.read(f)
    }
}

/// Outcome of a dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// No active state allows the action (or the interpreter is stopped).
    Ignored,
    /// Every match was targeted and blocked by its guard.
    Blocked,
    /// The host action ran and `transitions` regions changed state.
    Handled { transitions: usize, suspended: bool },
}

impl Dispatched {
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatched::Handled { .. })
    }
}

/// A match found during lookup.
struct Candidate<'c, S> {
    source: Activation,
    chart: ChartId,
    target: Option<StateId>,
    guard: Option<&'c Guard<S>>,
}

/// A transition that passed its guard and waits for the action to finish.
struct Planned {
    source: Activation,
    chart: ChartId,
    target: StateId,
}

#[derive(Clone, Copy)]
enum HookKind {
    Entry,
    Exit,
}

/// A running chart interpreter.
pub struct Interpreter<H: Host> {
    id: Uuid,
    chart: Arc<Chart<H::State>>,
    host: H,
    settings: Settings,
    on_advisory: Option<AdvisoryHandler>,
    this: Weak<Interpreter<H>>,
    running: Cell<bool>,
    config: RefCell<Configuration>,
    generation: Cell<u64>,
    activations: Cell<u64>,
    /// Activations whose entry hook has not run yet
    awaiting: RefCell<Vec<Activation>>,
    /// Activations whose exit hook has run but that are still in place
    exited: RefCell<Vec<Activation>>,
    enabled: RefCell<Option<(u64, Rc<EnabledActions>)>>,
    history: RefCell<TransitionHistory>,
    pending: RefCell<VecDeque<Continuation>>,
}

impl<H: Host> Interpreter<H> {
    pub fn builder(chart: impl Into<Arc<Chart<H::State>>>, host: H) -> InterpreterBuilder<H> {
        InterpreterBuilder::new(chart, host)
    }

    /// Start with default settings.
    pub fn new(chart: impl Into<Arc<Chart<H::State>>>, host: H) -> Rc<Self> {
        Self::builder(chart, host).start()
    }

    pub(crate) fn start(builder: InterpreterBuilder<H>) -> Rc<Self> {
        let InterpreterBuilder {
            chart,
            host,
            settings,
            on_advisory,
        } = builder;
        let config = Configuration::initialize(&chart);
        let history = match settings.history_limit {
            Some(limit) => TransitionHistory::bounded(limit),
            None => TransitionHistory::new(),
        };

        let interpreter = Rc::new_cyclic(|this| Self {
            id: Uuid::new_v4(),
            chart,
            host,
            settings,
            on_advisory,
            this: this.clone(),
            running: Cell::new(true),
            config: RefCell::new(config),
            generation: Cell::new(0),
            activations: Cell::new(0),
            awaiting: RefCell::new(Vec::new()),
            exited: RefCell::new(Vec::new()),
            enabled: RefCell::new(None),
            history: RefCell::new(history),
            pending: RefCell::new(VecDeque::new()),
        });

        debug!(interpreter = %interpreter.id, snapshot = %interpreter.snapshot(), "interpreter started");
        let entries = interpreter.config.borrow().entry_order();
        interpreter.enter_all(entries);
        interpreter
    }

    /// Run exit hooks for the whole configuration, innermost first, and
    /// discard it. Later dispatches are inert and pending continuations are
    /// dropped.
    pub fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        let exits = self.config.borrow().exit_order();
        for activation in exits {
            self.exit(&activation);
        }
        *self.config.borrow_mut() = Configuration::default();
        self.awaiting.borrow_mut().clear();
        self.exited.borrow_mut().clear();
        self.bump();
        let dropped = std::mem::take(&mut *self.pending.borrow_mut());
        debug!(interpreter = %self.id, dropped = dropped.len(), "interpreter stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Dispatch `action` with `payload`.
    ///
    /// When no active state allows the action, nothing happens: the host
    /// action is not invoked and the configuration is unchanged.
    pub fn dispatch(&self, action: &str, payload: H::Payload) -> Dispatched {
        if !self.running.get() {
            trace!(interpreter = %self.id, action, "dispatch on stopped interpreter");
            return Dispatched::Ignored;
        }

        let candidates = self.lookup(action);
        if candidates.is_empty() {
            self.advise(action);
            return Dispatched::Ignored;
        }

        let mut passed = false;
        let mut planned = Vec::new();
        for candidate in candidates {
            let Some(target) = candidate.target else {
                passed = true;
                continue;
            };
            if self.host.read(|state| evaluate(candidate.guard, state)) {
                passed = true;
                planned.push(Planned {
                    source: candidate.source,
                    chart: candidate.chart,
                    target,
                });
            } else {
                debug!(interpreter = %self.id, action, to = self.name(target), "guard blocked transition");
            }
        }
        if !passed {
            return Dispatched::Blocked;
        }

        let cx = ActionContext {
            interpreter: self,
            name: action,
        };
        let step = self.host.invoke(&cx, payload);
        let suspended = step.is_suspended();

        // The synchronous segment is over: transitions apply now, before any
        // continuation resumes.
        let transitions = planned
            .iter()
            .filter(|plan| self.apply(action, plan))
            .count();
        self.defer(step);

        Dispatched::Handled {
            transitions,
            suspended,
        }
    }

    fn lookup(&self, action: &str) -> Vec<Candidate<'_, H::State>> {
        let Some(action_id) = self.chart.action_id(action) else {
            return Vec::new();
        };
        let config = self.config.borrow();
        let candidates = config
            .walk()
            .into_iter()
            .filter_map(|(addr, region)| {
                let transition = self.chart.state(region.state).on.get(&action_id)?;
                Some(Candidate {
                    source: Activation {
                        addr,
                        state: region.state,
                        entered: region.entered,
                    },
                    chart: region.chart,
                    target: transition.target,
                    guard: transition.guard.as_ref(),
                })
            })
            .collect();
        candidates
    }

    /// Apply one planned transition. Returns `false` when the source state
    /// is no longer active, e.g. because a nested dispatch or an earlier
    /// transition of the same dispatch already moved or vacated it.
    fn apply(&self, action: &str, plan: &Planned) -> bool {
        let addr = &plan.source.addr;

        // Exit whatever is live under the source, innermost first. Hooks may
        // dispatch and reshape the subtree, so the order is re-read after
        // every hook.
        loop {
            let next = {
                let config = self.config.borrow();
                if !config.holds(&plan.source) {
                    debug!(interpreter = %self.id, action, "source state no longer active, transition skipped");
                    return false;
                }
                let exited = self.exited.borrow();
                let next = config
                    .exits_at(addr)
                    .into_iter()
                    .find(|activation| !exited.contains(activation));
                next
            };
            let Some(next) = next else {
                break;
            };
            self.exit(&next);
        }

        let entered = self.next_activation();
        let next = ActiveRegion::enter(&self.chart, plan.chart, plan.target, entered);
        let (region, entries) = {
            let mut config = self.config.borrow_mut();
            config.replace(addr, next);
            self.exited.borrow_mut().retain(|activation| config.holds(activation));
            (config.region_id(&self.chart, addr), config.entries_at(addr))
        };
        self.bump();

        let from = self.name(plan.source.state);
        debug!(
            interpreter = %self.id,
            action,
            region = %region,
            from,
            to = self.name(plan.target),
            "transition applied"
        );
        self.history.borrow_mut().push(TransitionRecord {
            region,
            action: action.to_string(),
            from: from.to_string(),
            to: self.name(plan.target).to_string(),
            timestamp: Utc::now(),
        });

        self.enter_all(entries);
        true
    }

    /// Run entry hooks for freshly activated states, outermost first.
    ///
    /// A hook may dispatch and move a region entered in the same batch. A
    /// state that is no longer held when its turn comes is skipped, and so
    /// is everything that was entered beneath it.
    fn enter_all(&self, entries: Vec<Activation>) {
        self.awaiting.borrow_mut().extend(entries.iter().cloned());
        for activation in entries {
            let awaiting = self.take_awaiting(&activation);
            let live = self.config.borrow().holds(&activation);
            if awaiting && live {
                self.run_hook(activation.state, HookKind::Entry);
            } else {
                trace!(interpreter = %self.id, state = self.name(activation.state), "state left before entry, hook skipped");
            }
        }
    }

    /// Run the exit hook of `activation` once. A state vacated before its
    /// entry hook ever ran gets no exit hook either.
    fn exit(&self, activation: &Activation) {
        {
            let mut exited = self.exited.borrow_mut();
            if exited.contains(activation) {
                return;
            }
            exited.push(activation.clone());
        }
        if self.take_awaiting(activation) {
            trace!(interpreter = %self.id, state = self.name(activation.state), "state never entered, exit hook skipped");
            return;
        }
        self.run_hook(activation.state, HookKind::Exit);
    }

    fn take_awaiting(&self, activation: &Activation) -> bool {
        let mut awaiting = self.awaiting.borrow_mut();
        match awaiting.iter().position(|a| a == activation) {
            Some(index) => {
                awaiting.swap_remove(index);
                true
            }
            None => false,
        }
    }

    fn next_activation(&self) -> u64 {
        let next = self.activations.get() + 1;
        self.activations.set(next);
        next
    }

    fn run_hook(&self, state: StateId, kind: HookKind) {
        let def: &StateDef<H::State> = self.chart.state(state);
        let hook = match kind {
            HookKind::Entry => def.entry.as_deref(),
            HookKind::Exit => def.exit.as_deref(),
        };
        let Some(hook) = hook else {
            return;
        };
        trace!(interpreter = %self.id, state = def.id.as_str(), hook, "running hook");
        let cx = ActionContext {
            interpreter: self,
            name: hook,
        };
        let step = self.host.hook(&cx, hook);
        self.defer(step);
    }

    fn defer(&self, step: Step) {
        if let Step::Suspended(continuation) = step {
            self.pending.borrow_mut().push_back(continuation);
        }
    }

    fn advise(&self, action: &str) {
        if self.settings.mode != Mode::Development {
            return;
        }
        let advisory = DispatchAdvisory {
            interpreter: self.id,
            action: action.to_string(),
            snapshot: self.snapshot(),
        };
        warn!(
            interpreter = %self.id,
            action,
            snapshot = %advisory.snapshot,
            "dispatch matched no active state"
        );
        if let Some(handler) = &self.on_advisory {
            handler(&advisory);
        }
    }

    fn bump(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    fn name(&self, state: StateId) -> &str {
        self.chart.state_name(state).unwrap_or("?")
    }

    /// Drive every queued continuation to completion, including ones queued
    /// while driving.
    pub async fn settle(&self) {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(continuation) => continuation.await,
                None => break,
            }
        }
    }

    /// Hand every queued continuation to the host.
    pub fn take_pending(&self) -> Vec<Continuation> {
        self.pending.borrow_mut().drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Per leaf region, the chain of active identifiers from the root.
    pub fn snapshot(&self) -> Snapshot {
        self.config.borrow().snapshot(&self.chart)
    }

    pub fn is_active(&self, path: &[&str]) -> bool {
        self.config.borrow().is_active(&self.chart, path)
    }

    pub fn regions_of(&self, path: &[&str]) -> Option<Vec<RegionInfo>> {
        self.config.borrow().regions_of(&self.chart, path)
    }

    pub fn matches(&self, query: &Query) -> bool {
        projection::matches(&self.chart, &self.config.borrow(), query)
    }

    /// Enabled-action map, recomputed only after the configuration changed.
    pub fn enabled_actions(&self) -> Rc<EnabledActions> {
        let generation = self.generation.get();
        if let Some((cached, enabled)) = &*self.enabled.borrow() {
            if *cached == generation {
                return Rc::clone(enabled);
            }
        }
        let enabled = Rc::new(EnabledActions::compute(&self.chart, &self.config.borrow()));
        *self.enabled.borrow_mut() = Some((generation, Rc::clone(&enabled)));
        enabled
    }

    pub fn is_enabled(&self, action: &str) -> bool {
        self.enabled_actions().is_enabled(action)
    }

    pub fn configuration(&self) -> Configuration {
        self.config.borrow().clone()
    }

    pub fn history(&self) -> TransitionHistory {
        self.history.borrow().clone()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chart(&self) -> &Chart<H::State> {
        &self.chart
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
