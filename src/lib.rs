//! Chartgate: a statechart interpreter that gates host actions
//!
//! A chart declares which named actions are allowed in which states. The
//! interpreter holds the active configuration of a hierarchical, parallel
//! chart and only lets an action run when some active state allows it.
//! Everything else is a silent no-op, so the UI never needs to ask "may I
//! do this now?" before calling an action.
//!
//! # Core Concepts
//!
//! - **Chart**: validated, immutable definition of states, regions and
//!   per-state action maps
//! - **Configuration**: the tree of currently active states
//! - **Interpreter**: dispatches actions, runs entry and exit hooks, applies
//!   transitions after the action's synchronous segment
//! - **Projection**: the enabled-action map and nested `matches` queries
//!
//! # Example
//!
//! ```rust
//! use chartgate::{build, ActionContext, ChartSpec, Host, Interpreter, Mode, StateSpec, Step};
//! use std::cell::RefCell;
//!
//! struct Counter {
//!     clicks: RefCell<u32>,
//! }
//!
//! impl Host for Counter {
//!     type State = u32;
//!     type Payload = ();
//!
//!     fn read<R>(&self, f: impl FnOnce(&u32) -> R) -> R {
//!         f(&self.clicks.borrow())
//!     }
//!
//!     fn invoke(&self, _cx: &ActionContext<'_, Self>, _payload: ()) -> Step {
//!         *self.clicks.borrow_mut() += 1;
//!         Step::Complete
//!     }
//! }
//!
//! let chart = build::<u32>(
//!     ChartSpec::new("IDLE")
//!         .state(StateSpec::new("IDLE").on("start", "RUNNING"))
//!         .state(StateSpec::new("RUNNING").stay("click").on("stop", "IDLE")),
//! )
//! .unwrap();
//!
//! let counter = Counter { clicks: RefCell::new(0) };
//! let interpreter = Interpreter::builder(chart, counter)
//!     .mode(Mode::Production)
//!     .start();
//!
//! // Not allowed in IDLE: nothing happens.
//! interpreter.dispatch("click", ());
//! assert_eq!(*interpreter.host().clicks.borrow(), 0);
//!
//! interpreter.dispatch("start", ());
//! interpreter.dispatch("click", ());
//! assert!(interpreter.is_active(&["RUNNING"]));
//! assert_eq!(*interpreter.host().clicks.borrow(), 2);
//! ```

pub mod chart;
pub mod configuration;
pub mod core;
pub mod engine;
pub mod projection;

// Re-export commonly used types
pub use chart::{build, Chart, ChartBuilder, ChartRef, ChartSpec, ConfigurationError, On, StateSpec};
pub use configuration::{Configuration, RegionInfo, Snapshot};
pub use core::{Guard, TransitionHistory, TransitionRecord};
pub use engine::{
    ActionContext, DispatchAdvisory, Dispatched, Host, Interpreter, InterpreterBuilder, Mode,
    Settings, Step, DEFAULT_HISTORY_LIMIT,
};
pub use projection::{EnabledActions, Query, QueryNode};
