//! End-to-end scenarios: login gating, nested entry hooks and parallel
//! regions, driven through the public API only.

use chartgate::{
    build, query, ActionContext, Chart, ChartBuilder, ChartRef, ChartSpec, ConfigurationError,
    Dispatched, Host, Interpreter, Mode, StateSpec, Step,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Default)]
struct Recorder {
    state: RefCell<Credentials>,
    calls: RefCell<Vec<String>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Host for Recorder {
    type State = Credentials;
    type Payload = Option<String>;

    fn read<R>(&self, f: impl FnOnce(&Credentials) -> R) -> R {
        f(&self.state.borrow())
    }

    fn invoke(&self, cx: &ActionContext<'_, Self>, payload: Option<String>) -> Step {
        if let Some(username) = payload {
            self.state.borrow_mut().username = username;
        }
        self.calls.borrow_mut().push(cx.action().to_string());
        Step::Complete
    }

    fn hook(&self, _cx: &ActionContext<'_, Self>, hook: &str) -> Step {
        self.calls.borrow_mut().push(hook.to_string());
        Step::Complete
    }
}

fn login_chart() -> Chart<Credentials> {
    build(
        ChartSpec::new("LOGIN")
            .state(
                StateSpec::new("LOGIN")
                    .on_guarded("login", "AUTHENTICATING", |c: &Credentials| {
                        !c.username.is_empty() && !c.password.is_empty()
                    })
                    .stay("changeUsername"),
            )
            .state(
                StateSpec::new("AUTHENTICATING")
                    .on("resolveUser", "AUTHENTICATED")
                    .on("rejectUser", "ERROR"),
            )
            .state(StateSpec::new("AUTHENTICATED").on("logout", "LOGIN"))
            .state(StateSpec::new("ERROR").on("tryAgain", "LOGIN")),
    )
    .unwrap()
}

#[test]
fn login_is_gated_by_guard() {
    let interpreter = Interpreter::builder(login_chart(), Recorder::default())
        .mode(Mode::Production)
        .start();

    assert_eq!(interpreter.dispatch("login", None), Dispatched::Blocked);
    assert!(interpreter.is_active(&["LOGIN"]));
    assert!(interpreter.host().calls().is_empty());

    interpreter.dispatch("changeUsername", Some("a".to_string()));
    interpreter.host().state.borrow_mut().password = "b".to_string();
    interpreter.host().clear();

    assert!(interpreter.dispatch("login", None).is_handled());
    assert!(interpreter.is_active(&["AUTHENTICATING"]));
    assert_eq!(interpreter.host().calls(), vec!["login"]);
}

#[test]
fn actions_outside_their_state_do_nothing() {
    let interpreter = Interpreter::builder(login_chart(), Recorder::default())
        .mode(Mode::Production)
        .start();

    for action in ["resolveUser", "rejectUser", "logout", "tryAgain"] {
        assert_eq!(interpreter.dispatch(action, None), Dispatched::Ignored);
    }

    assert!(interpreter.is_active(&["LOGIN"]));
    assert!(interpreter.host().calls().is_empty());
    assert!(interpreter.history().is_empty());
}

#[test]
fn login_round_trip_is_recorded() {
    let interpreter = Interpreter::new(login_chart(), Recorder::default());
    {
        let mut state = interpreter.host().state.borrow_mut();
        state.username = "a".into();
        state.password = "b".into();
    }

    interpreter.dispatch("login", None);
    interpreter.dispatch("rejectUser", None);
    interpreter.dispatch("tryAgain", None);

    let history = interpreter.history();
    assert_eq!(
        history.path("root"),
        vec!["LOGIN", "AUTHENTICATING", "ERROR", "LOGIN"]
    );
}

fn issues_chart() -> ChartSpec<Credentials> {
    ChartSpec::new("LOADING")
        .state(
            StateSpec::new("LOADING")
                .entry("fetchIssues")
                .on("resolve", "LIST")
                .on("reject", "ERROR"),
        )
        .state(StateSpec::new("LIST").on("refresh", "LOADING"))
        .state(StateSpec::new("ERROR").on("retry", "LOADING"))
}

fn projects_chart() -> ChartSpec<Credentials> {
    ChartSpec::new("LIST")
        .state(StateSpec::new("LIST").entry("showProjects"))
        .state(StateSpec::new("ERROR"))
}

#[test]
fn nested_entry_hooks_run_once_outer_first() {
    let chart = build(
        ChartSpec::new("ISSUES").state(
            StateSpec::new("ISSUES")
                .entry("enterIssues")
                .nested(issues_chart()),
        ),
    )
    .unwrap();

    let interpreter = Interpreter::builder(chart, Recorder::default())
        .mode(Mode::Production)
        .start();

    assert!(interpreter.is_active(&["ISSUES", "LOADING"]));
    assert_eq!(interpreter.host().calls(), vec!["enterIssues", "fetchIssues"]);
}

fn dashboard_chart() -> Chart<Credentials> {
    ChartBuilder::new()
        .define("issues", issues_chart())
        .define("projects", projects_chart())
        .root(
            ChartSpec::new("DASHBOARD").state(StateSpec::new("DASHBOARD").parallel([
                ("issues", ChartRef::named("issues")),
                ("projects", ChartRef::named("projects")),
            ])),
        )
        .build()
        .unwrap()
}

#[test]
fn retry_moves_only_the_failed_region() {
    let interpreter = Interpreter::builder(dashboard_chart(), Recorder::default())
        .mode(Mode::Production)
        .start();
    interpreter.dispatch("reject", None);
    let projects_before = interpreter.snapshot().get("projects").map(<[String]>::to_vec);
    interpreter.host().clear();

    let outcome = interpreter.dispatch("retry", None);

    assert_eq!(
        outcome,
        Dispatched::Handled {
            transitions: 1,
            suspended: false
        }
    );
    assert!(interpreter.is_active(&["DASHBOARD", "issues", "LOADING"]));
    assert_eq!(
        interpreter.snapshot().get("projects").map(<[String]>::to_vec),
        projects_before
    );
    assert_eq!(interpreter.host().calls(), vec!["retry", "fetchIssues"]);
}

#[test]
fn projections_follow_parallel_regions() {
    let interpreter = Interpreter::builder(dashboard_chart(), Recorder::default())
        .mode(Mode::Production)
        .start();

    assert!(interpreter.matches(&query! {
        DASHBOARD: { issues: { LOADING: true }, projects: { LIST: true } }
    }));
    assert!(interpreter.is_enabled("resolve"));
    assert!(!interpreter.is_enabled("retry"));

    interpreter.dispatch("reject", None);

    assert!(interpreter.matches(&query! { DASHBOARD: { issues: { ERROR: true } } }));
    assert!(interpreter.is_enabled("retry"));
    assert_eq!(
        interpreter.snapshot().to_string(),
        "issues: DASHBOARD > ERROR, projects: DASHBOARD > LIST"
    );

    let regions = interpreter.regions_of(&["DASHBOARD"]).unwrap();
    let keys: Vec<_> = regions.iter().filter_map(|r| r.key.as_deref()).collect();
    assert_eq!(keys, vec!["issues", "projects"]);
}

#[test]
fn snapshot_and_enabled_map_serialize_to_json() {
    let interpreter = Interpreter::builder(dashboard_chart(), Recorder::default())
        .mode(Mode::Production)
        .start();

    let snapshot = serde_json::to_value(interpreter.snapshot()).unwrap();
    assert_eq!(
        snapshot,
        serde_json::json!({
            "issues": ["DASHBOARD", "LOADING"],
            "projects": ["DASHBOARD", "LIST"],
        })
    );

    let enabled = serde_json::to_value(&*interpreter.enabled_actions()).unwrap();
    assert_eq!(enabled["resolve"], serde_json::json!(true));
    assert_eq!(enabled["refresh"], serde_json::json!(false));
}

#[test]
fn advisories_reach_the_handler_in_development() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let interpreter = Interpreter::builder(login_chart(), Recorder::default())
        .mode(Mode::Development)
        .on_advisory(move |advisory| sink.borrow_mut().push(advisory.to_string()))
        .start();

    interpreter.dispatch("logout", None);

    assert_eq!(
        *seen.borrow(),
        vec!["Action 'logout' matched no active state (root: LOGIN)".to_string()]
    );
}

#[test]
fn a_chart_that_embeds_itself_is_rejected() {
    let result = ChartBuilder::<Credentials>::new()
        .define(
            "folder",
            ChartSpec::new("OPEN").state(StateSpec::new("OPEN").nested(ChartRef::named("folder"))),
        )
        .root(ChartRef::named("folder"))
        .build();

    assert!(matches!(
        result,
        Err(ConfigurationError::SelfEmbedding { ref chart }) if chart == "folder"
    ));
}
