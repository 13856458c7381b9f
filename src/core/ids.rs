//! Stable arena indices.
//!
//! A frozen chart is stored as flat vectors of chart and state records.
//! Everything that refers into it (configurations, transition tables,
//! history) holds these indices instead of references.

use serde::{Deserialize, Serialize};

/// Index of a chart inside a frozen chart set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartId(pub(crate) usize);

/// Index of a state inside a frozen chart set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) usize);

/// Interned action name.
///
/// Every action name appearing in any action map of a chart set gets one
/// identifier at build time. Dispatch resolves the name once and then works
/// with the identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub(crate) usize);

impl ChartId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}
