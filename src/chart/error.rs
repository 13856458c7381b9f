//! Build-time errors for chart definitions.

use thiserror::Error;

/// A structural problem found while freezing a chart specification.
///
/// Raised only by [`ChartBuilder::build`](crate::chart::ChartBuilder::build),
/// never during dispatch. `chart` fields carry the registered name of the
/// chart, or the dotted path of the state that owns it (`"root"` for the
/// top level).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Root chart not specified. Call .root(chart) or .parallel_root(charts) before .build()")]
    MissingRoot,

    #[error("Duplicate state '{state}' in chart '{chart}'")]
    DuplicateState { chart: String, state: String },

    #[error("Initial state '{initial}' of chart '{chart}' is not defined")]
    UndefinedInitial { chart: String, initial: String },

    #[error("Action '{action}' of state '{state}' in chart '{chart}' targets undefined state '{target}'")]
    DanglingTarget {
        chart: String,
        state: String,
        action: String,
        target: String,
    },

    #[error("Chart '{chart}' embeds itself as its own descendant")]
    SelfEmbedding { chart: String },

    #[error("Nested chart '{name}' is not defined")]
    UndefinedChart { name: String },

    #[error("Duplicate region '{region}' under state '{state}'")]
    DuplicateRegion { state: String, region: String },

    #[error("{} configuration errors: {}", .0.len(), join(.0))]
    Multiple(Vec<ConfigurationError>),
}

impl ConfigurationError {
    /// Flatten into the individual violations.
    pub fn violations(&self) -> Vec<&ConfigurationError> {
        match self {
            ConfigurationError::Multiple(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

fn join(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
