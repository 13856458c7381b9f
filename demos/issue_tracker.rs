//! Issue Tracker
//!
//! This example gates the actions of a small issue tracker UI with a
//! hierarchical, parallel chart.
//!
//! Key concepts:
//! - Guarded login transition
//! - Parallel `issues` and `projects` regions inside DASHBOARD
//! - Entry hooks that suspend and dispatch later
//! - Silent no-ops for actions the current state does not allow
//!
//! Run with: cargo run --example issue_tracker

use chartgate::{
    query, ActionContext, ChartBuilder, ChartRef, ChartSpec, Dispatched, Host, Interpreter, Mode,
    StateSpec, Step,
};
use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug, Default)]
struct Session {
    username: String,
    password: String,
    issues: Vec<String>,
}

#[derive(Default)]
struct Tracker {
    session: RefCell<Session>,
}

impl Host for Tracker {
    type State = Session;
    type Payload = Option<String>;

    fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.session.borrow())
    }

    fn invoke(&self, cx: &ActionContext<'_, Self>, payload: Option<String>) -> Step {
        println!("  action {}", cx.action());
        let mut session = self.session.borrow_mut();
        match (cx.action(), payload) {
            ("changeUsername", Some(value)) => session.username = value,
            ("changePassword", Some(value)) => session.password = value,
            ("resolveIssues", Some(value)) => session.issues.push(value),
            _ => {}
        }
        drop(session);

        if cx.action() != "login" {
            return Step::Complete;
        }
        let Some(handle) = cx.handle() else {
            return Step::Complete;
        };
        Step::suspend(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.dispatch("resolveUser", None);
        })
    }

    fn hook(&self, cx: &ActionContext<'_, Self>, hook: &str) -> Step {
        println!("  hook   {hook}");
        if hook != "fetchIssues" {
            return Step::Complete;
        }
        let Some(handle) = cx.handle() else {
            return Step::Complete;
        };
        Step::suspend(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.dispatch("resolveIssues", Some("#1 Crash on start".to_string()));
        })
    }
}

fn report(interpreter: &Interpreter<Tracker>) {
    println!("  state  {}", interpreter.snapshot());
    let actions = interpreter.enabled_actions();
    let enabled: Vec<_> = actions.enabled().collect();
    println!("  enabled {enabled:?}\n");
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== Issue Tracker ===\n");

    let chart = ChartBuilder::new()
        .define(
            "issues",
            ChartSpec::new("LOADING")
                .state(
                    StateSpec::new("LOADING")
                        .entry("fetchIssues")
                        .on("resolveIssues", "LIST")
                        .on("rejectIssues", "ERROR"),
                )
                .state(StateSpec::new("LIST").on("refresh", "LOADING"))
                .state(StateSpec::new("ERROR").on("retry", "LOADING")),
        )
        .root(
            ChartSpec::new("LOGIN")
                .state(
                    StateSpec::new("LOGIN")
                        .stay("changeUsername")
                        .stay("changePassword")
                        .on_guarded("login", "AUTHENTICATING", |s: &Session| {
                            !s.username.is_empty() && !s.password.is_empty()
                        }),
                )
                .state(
                    StateSpec::new("AUTHENTICATING")
                        .on("resolveUser", "DASHBOARD")
                        .on("rejectUser", "LOGIN"),
                )
                .state(
                    StateSpec::new("DASHBOARD")
                        .exit("clearSession")
                        .on("logout", "LOGIN")
                        .parallel([
                            ("issues", ChartRef::named("issues")),
                            (
                                "projects",
                                ChartSpec::new("LIST")
                                    .state(StateSpec::new("LIST").on("createProject", "CREATING"))
                                    .state(StateSpec::new("CREATING").on("cancel", "LIST"))
                                    .into(),
                            ),
                        ]),
                ),
        )
        .build();

    let chart = match chart {
        Ok(chart) => chart,
        Err(error) => {
            eprintln!("invalid chart: {error}");
            return;
        }
    };

    let interpreter = Interpreter::builder(chart, Tracker::default())
        .mode(Mode::Development)
        .history_limit(50)
        .on_advisory(|advisory| println!("  advisory: {advisory}"))
        .start();
    report(&interpreter);

    println!("Logging in without credentials:");
    let outcome = interpreter.dispatch("login", None);
    println!("  -> {outcome:?}");
    report(&interpreter);

    println!("Refreshing issues while logged out:");
    interpreter.dispatch("refresh", None);
    report(&interpreter);

    println!("Entering credentials and logging in:");
    interpreter.dispatch("changeUsername", Some("ada".to_string()));
    interpreter.dispatch("changePassword", Some("secret".to_string()));
    if let Dispatched::Handled { suspended, .. } = interpreter.dispatch("login", None) {
        println!("  login suspended: {suspended}");
    }
    report(&interpreter);

    println!("Waiting for pending work:");
    interpreter.settle().await;
    report(&interpreter);

    let on_list = interpreter.matches(&query! {
        DASHBOARD: { issues: { LIST: true }, projects: { LIST: true } }
    });
    println!("Issues and projects both listed: {on_list}");
    println!("Loaded issues: {:?}\n", interpreter.host().session.borrow().issues);

    println!("Logging out:");
    interpreter.dispatch("logout", None);
    report(&interpreter);

    println!("Transition path of the root region:");
    println!("  {}", interpreter.history().path("root").join(" -> "));

    interpreter.stop();
    println!("\n=== Example Complete ===");
}
