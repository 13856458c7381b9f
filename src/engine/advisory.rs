//! Non-fatal diagnostics emitted in development mode.

use crate::configuration::Snapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Emitted when a dispatch matches no active state.
///
/// Advisories never change control flow: the dispatch is a silent no-op in
/// both modes, development mode only reports it.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[error("Action '{action}' matched no active state ({snapshot})")]
pub struct DispatchAdvisory {
    /// Instance that received the dispatch
    pub interpreter: Uuid,
    /// The action that was dispatched
    pub action: String,
    /// Configuration at the time of the dispatch
    pub snapshot: Snapshot,
}

/// Callback receiving advisories in addition to the `tracing` warning.
pub type AdvisoryHandler = Box<dyn Fn(&DispatchAdvisory)>;
