//! Interpreter settings and the builder that starts an interpreter.

use crate::chart::Chart;
use crate::engine::advisory::{AdvisoryHandler, DispatchAdvisory};
use crate::engine::{Host, Interpreter};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;

/// Diagnostic mode of an interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Report dispatches that match nothing.
    Development,
    /// Stay quiet about dispatches that match nothing.
    Production,
}

impl Default for Mode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        }
    }
}

/// Transition records kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

/// Tunable interpreter behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    /// Keep at most this many transition records (unbounded when `None`)
    pub history_limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

/// Builder for starting an interpreter with a fluent API.
///
/// # Example
///
/// ```rust
/// use chartgate::chart::{build, ChartSpec, StateSpec};
/// use chartgate::engine::{ActionContext, Host, Interpreter, Mode, Step};
///
/// struct NoopHost;
///
/// impl Host for NoopHost {
///     type State = ();
///     type Payload = ();
///
///     fn read<R>(&self, f: impl FnOnce(&()) -> R) -> R {
///         f(&())
///     }
///
///     fn invoke(&self, _cx: &ActionContext<'_, Self>, _payload: ()) -> Step {
///         Step::Complete
///     }
/// }
///
/// let chart = build::<()>(ChartSpec::new("IDLE").state(StateSpec::new("IDLE").stay("ping"))).unwrap();
/// let interpreter = Interpreter::builder(chart, NoopHost)
///     .mode(Mode::Production)
///     .history_limit(100)
///     .start();
///
/// assert!(interpreter.is_enabled("ping"));
/// ```
pub struct InterpreterBuilder<H: Host> {
    pub(crate) chart: Arc<Chart<H::State>>,
    pub(crate) host: H,
    pub(crate) settings: Settings,
    pub(crate) on_advisory: Option<AdvisoryHandler>,
}

impl<H: Host> InterpreterBuilder<H> {
    pub fn new(chart: impl Into<Arc<Chart<H::State>>>, host: H) -> Self {
        Self {
            chart: chart.into(),
            host,
            settings: Settings::default(),
            on_advisory: None,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.settings.mode = mode;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.settings.history_limit = Some(limit);
        self
    }

    /// Keep every transition record for the lifetime of the interpreter.
    pub fn unbounded_history(mut self) -> Self {
        self.settings.history_limit = None;
        self
    }

    /// Replace all settings at once.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Receive every advisory emitted in development mode.
    pub fn on_advisory<F>(mut self, handler: F) -> Self
    where
        F: Fn(&DispatchAdvisory) + 'static,
    {
        self.on_advisory = Some(Box::new(handler));
        self
    }

    /// Initialize the configuration and run entry hooks, outermost first.
    pub fn start(self) -> Rc<Interpreter<H>> {
        Interpreter::start(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "mode": "production" }"#).unwrap();

        assert_eq!(settings.mode, Mode::Production);
        assert_eq!(settings.history_limit, Some(DEFAULT_HISTORY_LIMIT));
    }

    #[test]
    fn explicit_null_limit_keeps_history_unbounded() {
        let settings: Settings = serde_json::from_str(r#"{ "history_limit": null }"#).unwrap();

        assert_eq!(settings.history_limit, None);
    }

    #[test]
    fn settings_roundtrip_through_json() {
        let settings = Settings {
            mode: Mode::Development,
            history_limit: Some(32),
        };

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"development\""));
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
