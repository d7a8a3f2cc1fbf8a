//! EventEmitter dispatch, binding and host-connection behavior.

use std::collections::HashMap;
use std::sync::Arc;

use oo_events::{
    callback,
    error::BindingError,
    event::{Connection, DeferredReporter, EventEmitter, Handler, Host, HostRef},
    Callback, ListenerResult, Value,
};
use parking_lot::Mutex;
use serde_json::json;

// ============================================================================
// Helpers
// ============================================================================

type Log = Arc<Mutex<Vec<String>>>;

fn make_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Listener that records `label` followed by its string arguments.
fn recorder(log: &Log, label: &str) -> Callback {
    let log = Arc::clone(log);
    let label = label.to_string();
    callback(move |args| {
        let mut entry = label.clone();
        for arg in args {
            entry.push(':');
            match arg {
                Value::Data(v) => entry.push_str(&v.to_string()),
                Value::Object(_) => entry.push_str("object"),
            }
        }
        log.lock().push(entry);
        Ok(())
    })
}

fn make_emitter() -> (EventEmitter, Arc<DeferredReporter>) {
    let reporter = Arc::new(DeferredReporter::new());
    (EventEmitter::with_reporter(reporter.clone()), reporter)
}

/// Host with a mutable method table, for exercising late binding.
#[derive(Default)]
struct Widget {
    methods: Mutex<HashMap<String, Callback>>,
}

impl Widget {
    fn with_methods(methods: &[(&str, Callback)]) -> Arc<Self> {
        let widget = Arc::new(Self::default());
        for (name, cb) in methods {
            widget.define(name, cb.clone());
        }
        widget
    }

    fn define(&self, name: &str, cb: Callback) {
        self.methods.lock().insert(name.to_string(), cb);
    }

    fn undefine(&self, name: &str) {
        self.methods.lock().remove(name);
    }
}

impl Host for Widget {
    fn responds_to(&self, method: &str) -> bool {
        self.methods.lock().contains_key(method)
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Option<ListenerResult> {
        let cb = self.methods.lock().get(method).cloned()?;
        Some(cb(args))
    }
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn emit_calls_listeners_in_subscription_order() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    emitter.on("change", recorder(&log, "first"));
    emitter.on("change", recorder(&log, "second"));

    assert!(emitter.emit("change", &["x".into(), 3.into()]));
    assert_eq!(
        *log.lock(),
        vec!["first:\"x\":3".to_string(), "second:\"x\":3".to_string()]
    );
}

#[test]
fn emit_without_listeners_returns_false() {
    let (emitter, _) = make_emitter();
    assert!(!emitter.emit("nothing", &[]));
    assert!(!emitter.has_listeners("nothing"));
}

#[test]
fn the_same_listener_can_be_bound_twice() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let cb = recorder(&log, "dup");
    emitter.on("change", cb.clone()).on("change", cb.clone());

    emitter.emit("change", &[]);
    assert_eq!(log.lock().len(), 2);

    emitter.off("change", &cb, None).unwrap();
    assert!(!emitter.has_listeners("change"));
}

#[test]
fn listener_added_during_emit_waits_for_next_round() {
    let log = make_log();
    let emitter = Arc::new(EventEmitter::new());
    let late = recorder(&log, "late");

    let em = Arc::clone(&emitter);
    emitter.on(
        "tick",
        callback(move |_| {
            em.on("tick", late.clone());
            Ok(())
        }),
    );

    emitter.emit("tick", &[]);
    assert!(log.lock().is_empty());

    emitter.emit("tick", &[]);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn listener_removed_during_emit_still_runs_that_round() {
    let log = make_log();
    let emitter = Arc::new(EventEmitter::new());
    let victim = recorder(&log, "victim");

    let em = Arc::clone(&emitter);
    let removed = victim.clone();
    emitter.on(
        "tick",
        callback(move |_| {
            em.off("tick", &removed, None)?;
            Ok(())
        }),
    );
    emitter.on("tick", victim);

    emitter.emit("tick", &[]);
    assert_eq!(*log.lock(), vec!["victim".to_string()]);

    emitter.emit("tick", &[]);
    assert_eq!(log.lock().len(), 1);
}

// ============================================================================
// once
// ============================================================================

#[test]
fn once_listener_runs_a_single_time() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    emitter.once("ready", recorder(&log, "ready"));

    emitter.emit("ready", &[]);
    emitter.emit("ready", &[]);

    assert_eq!(log.lock().len(), 1);
    assert!(!emitter.has_listeners("ready"));
}

#[test]
fn once_listener_is_not_reentered_by_its_own_emit() {
    let log = make_log();
    let emitter = Arc::new(EventEmitter::new());

    let em = Arc::clone(&emitter);
    let inner = Arc::clone(&log);
    emitter.once(
        "ping",
        callback(move |_| {
            inner.lock().push("ping".into());
            em.emit("ping", &[]);
            Ok(())
        }),
    );

    emitter.emit("ping", &[]);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn once_listener_can_be_removed_with_off() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let cb = recorder(&log, "once");
    emitter.once("ready", cb.clone());
    emitter.off("ready", &cb, None).unwrap();

    emitter.emit("ready", &[]);
    assert!(log.lock().is_empty());
}

// ============================================================================
// Error isolation
// ============================================================================

#[test]
fn failing_listener_does_not_stop_dispatch() {
    let log = make_log();
    let (emitter, reporter) = make_emitter();
    emitter.on("save", callback(|_| Err("disk full".into())));
    emitter.on("save", recorder(&log, "after"));

    assert!(emitter.emit("save", &[]));
    assert_eq!(*log.lock(), vec!["after".to_string()]);

    let reported = reporter.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].event, "save");
    assert_eq!(reported[0].error.to_string(), "disk full");
}

#[test]
fn panicking_listener_is_reported() {
    let log = make_log();
    let (emitter, reporter) = make_emitter();
    emitter.on("save", callback(|_| panic!("boom")));
    emitter.on("save", recorder(&log, "after"));

    emitter.emit("save", &[]);
    assert_eq!(log.lock().len(), 1);

    let reported = reporter.take();
    assert_eq!(reported.len(), 1);
    assert!(reported[0].error.to_string().contains("boom"));
}

#[test]
fn emit_throw_returns_first_error_and_reports_the_rest() {
    let log = make_log();
    let (emitter, reporter) = make_emitter();
    emitter.on("save", callback(|_| Err("first".into())));
    emitter.on("save", recorder(&log, "middle"));
    emitter.on("save", callback(|_| Err("second".into())));

    let err = emitter.emit_throw("save", &[]).unwrap_err();
    assert_eq!(err.to_string(), "first");
    assert_eq!(log.lock().len(), 1);

    let reported = reporter.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].error.to_string(), "second");
}

#[test]
fn emit_throw_without_errors() {
    let (emitter, reporter) = make_emitter();
    assert!(!emitter.emit_throw("save", &[]).unwrap());
    emitter.on("save", callback(|_| Ok(())));
    assert!(emitter.emit_throw("save", &[]).unwrap());
    assert!(reporter.is_empty());
}

// ============================================================================
// off
// ============================================================================

#[test]
fn off_only_removes_matching_handler() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let keep = recorder(&log, "keep");
    let removed = recorder(&log, "drop");
    emitter.on("change", keep).on("change", removed.clone());

    emitter.off("change", &removed, None).unwrap();
    emitter.emit("change", &[]);

    assert_eq!(*log.lock(), vec!["keep".to_string()]);
    assert_eq!(emitter.listener_count("change"), 1);
}

#[test]
fn off_requires_matching_context() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[]);
    let host = HostRef::new(&widget);
    let cb = recorder(&log, "bound");
    emitter.on_with("change", &cb, Vec::new(), Some(&host)).unwrap();

    emitter.off("change", &cb, None).unwrap();
    assert_eq!(emitter.listener_count("change"), 1);

    emitter.off("change", &cb, Some(&host)).unwrap();
    assert_eq!(emitter.listener_count("change"), 0);
}

#[test]
fn off_event_removes_every_listener() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    emitter
        .on("change", recorder(&log, "a"))
        .on("change", recorder(&log, "b"))
        .on("other", recorder(&log, "c"));

    emitter.off_event("change");
    emitter.emit("change", &[]);
    emitter.emit("other", &[]);

    assert_eq!(*log.lock(), vec!["c".to_string()]);
}

// ============================================================================
// Method handlers and late binding
// ============================================================================

#[test]
fn method_handler_needs_a_context() {
    let (emitter, _) = make_emitter();
    let err = emitter
        .on_with("change", "onChange", Vec::new(), None)
        .unwrap_err();
    assert_eq!(err, BindingError::NoContext("onChange".into()));
    assert_eq!(err.to_string(), "Method name \"onChange\" has no context.");
}

#[test]
fn method_handler_must_exist_on_host() {
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[]);
    let err = emitter
        .on_with("change", "onChange", Vec::new(), Some(&HostRef::new(&widget)))
        .unwrap_err();
    assert_eq!(err, BindingError::NotAMethod("onChange".into()));
    assert!(!emitter.has_listeners("change"));
}

#[test]
fn prepended_arguments_come_first() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[("onChange", recorder(&log, "onChange"))]);
    emitter
        .on_with(
            "change",
            "onChange",
            vec!["bound".into(), json!({"k": 1}).into()],
            Some(&HostRef::new(&widget)),
        )
        .unwrap();

    emitter.emit("change", &[7.into()]);
    assert_eq!(*log.lock(), vec!["onChange:\"bound\":{\"k\":1}:7".to_string()]);
}

#[test]
fn method_is_looked_up_at_emit_time() {
    let log = make_log();
    let (emitter, reporter) = make_emitter();
    let widget = Widget::with_methods(&[("onChange", recorder(&log, "old"))]);
    emitter
        .on_with("change", "onChange", Vec::new(), Some(&HostRef::new(&widget)))
        .unwrap();

    widget.define("onChange", recorder(&log, "new"));
    emitter.emit("change", &[]);
    assert_eq!(*log.lock(), vec!["new".to_string()]);

    widget.undefine("onChange");
    emitter.emit("change", &[]);
    let reported = reporter.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].error.to_string(), "Property \"onChange\" is not a function");
}

#[test]
fn emitter_does_not_keep_hosts_alive() {
    let log = make_log();
    let (emitter, reporter) = make_emitter();
    let widget = Widget::with_methods(&[("onChange", recorder(&log, "w"))]);
    emitter
        .on_with("change", "onChange", Vec::new(), Some(&HostRef::new(&widget)))
        .unwrap();

    let weak = Arc::downgrade(&widget);
    drop(widget);
    assert!(weak.upgrade().is_none());

    emitter.emit("change", &[]);
    assert!(log.lock().is_empty());
    assert_eq!(reporter.len(), 1);
}

// ============================================================================
// connect / disconnect
// ============================================================================

#[test]
fn connect_binds_several_events() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[
        ("onChange", recorder(&log, "onChange")),
        ("onRemove", recorder(&log, "onRemove")),
    ]);
    let host = HostRef::new(&widget);

    emitter
        .connect(
            &host,
            [
                ("change", Connection::from("onChange")),
                ("remove", Connection::with_args("onRemove", vec!["why".into()])),
            ],
        )
        .unwrap();

    emitter.emit("change", &[]);
    emitter.emit("remove", &[]);
    assert_eq!(
        *log.lock(),
        vec!["onChange".to_string(), "onRemove:\"why\"".to_string()]
    );
}

#[test]
fn failed_connect_binds_nothing() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[("onChange", recorder(&log, "onChange"))]);
    let host = HostRef::new(&widget);

    let err = emitter
        .connect(&host, [("change", "onChange"), ("remove", "onMissing")])
        .unwrap_err();
    assert_eq!(err, BindingError::NotAMethod("onMissing".into()));
    assert!(!emitter.has_listeners("change"));
}

#[test]
fn disconnect_removes_all_bindings_of_host() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[
        ("onChange", recorder(&log, "w")),
        ("onRemove", recorder(&log, "w")),
    ]);
    let host = HostRef::new(&widget);
    emitter
        .connect(&host, [("change", "onChange"), ("remove", "onRemove")])
        .unwrap();
    emitter.on("change", recorder(&log, "free"));

    emitter.disconnect(&host);
    emitter.emit("change", &[]);
    emitter.emit("remove", &[]);

    assert_eq!(*log.lock(), vec!["free".to_string()]);
}

#[test]
fn disconnect_methods_ignores_prepended_arguments() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[
        ("onChange", recorder(&log, "onChange")),
        ("onRemove", recorder(&log, "onRemove")),
    ]);
    let host = HostRef::new(&widget);
    emitter
        .connect(
            &host,
            [
                ("change", Connection::with_args("onChange", vec![1.into()])),
                ("change", Connection::with_args("onChange", vec![2.into()])),
                ("remove", Connection::from("onRemove")),
            ],
        )
        .unwrap();

    emitter
        .disconnect_methods(&host, [("change", Handler::from("onChange"))])
        .unwrap();

    assert!(!emitter.has_listeners("change"));
    assert_eq!(emitter.listener_count("remove"), 1);
}

// ============================================================================
// Unbinding from dropped hosts
// ============================================================================

#[test]
fn off_removes_method_of_dropped_host() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[("onChange", recorder(&log, "w"))]);
    let host = HostRef::new(&widget);
    emitter
        .on_with("change", "onChange", Vec::new(), Some(&host))
        .unwrap();

    drop(widget);
    emitter.off("change", "onChange", Some(&host)).unwrap();
    assert_eq!(emitter.listener_count("change"), 0);
}

#[test]
fn disconnect_methods_of_dropped_host() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[
        ("onChange", recorder(&log, "w")),
        ("onRemove", recorder(&log, "w")),
    ]);
    let host = HostRef::new(&widget);
    emitter
        .connect(&host, [("change", "onChange"), ("remove", "onRemove")])
        .unwrap();

    drop(widget);
    emitter
        .disconnect_methods(&host, [("change", "onChange")])
        .unwrap();
    assert_eq!(emitter.listener_count("change"), 0);
    assert_eq!(emitter.listener_count("remove"), 1);
}

#[test]
fn off_still_checks_live_hosts() {
    let log = make_log();
    let (emitter, _) = make_emitter();
    let widget = Widget::with_methods(&[("onChange", recorder(&log, "w"))]);
    let host = HostRef::new(&widget);
    emitter
        .on_with("change", "onChange", Vec::new(), Some(&host))
        .unwrap();

    let err = emitter.off("change", "onMissing", Some(&host)).unwrap_err();
    assert_eq!(err, BindingError::NotAMethod("onMissing".into()));

    let err = emitter.off("change", "onChange", None).unwrap_err();
    assert_eq!(err, BindingError::NoContext("onChange".into()));
    assert_eq!(emitter.listener_count("change"), 1);
}
