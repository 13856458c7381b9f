//! Core value types shared by the chart, configuration and engine layers.
//!
//! - Stable arena identifiers for charts, states and actions
//! - Guard predicates over external state
//! - Immutable transition history
//!
//! Nothing in this module performs side effects.

mod guard;
mod history;
mod ids;

pub use guard::{evaluate, Guard};
pub use history::{TransitionHistory, TransitionRecord};
pub use ids::{ActionId, ChartId, StateId};
