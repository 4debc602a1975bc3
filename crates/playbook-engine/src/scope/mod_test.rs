use super::Scope;
use crate::backend::ActionResult;
use playbook_core::Value;
use std::collections::BTreeMap;

fn seed() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("srcIp".to_string(), Value::scalar("192.168.0.1")),
        ("hosts".to_string(), Value::list(["a", "b"])),
    ])
}

#[test]
fn lookup_dispatches_on_reference_prefix() {
    let scope = Scope::new(seed());
    scope.start_action("ac1");
    scope.complete_action(
        "ac1",
        ActionResult::new("{\"score\":50}").with_field("score", "50"),
        BTreeMap::from([("score".to_string(), Value::scalar("50"))]),
    );

    assert_eq!(scope.lookup("@alert:srcIp"), Some(Value::scalar("192.168.0.1")));
    assert_eq!(scope.lookup("@alert:hosts"), Some(Value::list(["a", "b"])));
    assert_eq!(scope.lookup("@node:ac1$score"), Some(Value::scalar("50")));
    assert_eq!(
        scope.lookup("@node:ac1$raw"),
        Some(Value::scalar("{\"score\":50}"))
    );
    assert_eq!(scope.lookup("$score"), Some(Value::scalar("50")));

    assert_eq!(scope.lookup("@alert:missing"), None);
    assert_eq!(scope.lookup("@node:ac1$missing"), None);
    assert_eq!(scope.lookup("@node:ac9$score"), None);
    assert_eq!(scope.lookup("%weird"), None);
    assert_eq!(scope.lookup("plain"), None);
}

#[test]
fn unfinished_or_failed_actions_are_not_visible() {
    let scope = Scope::new(BTreeMap::new());
    scope.start_action("pending");
    scope.record_action_params(
        "pending",
        BTreeMap::from([("ip".to_string(), "1.1.1.1".to_string())]),
        false,
    );
    assert_eq!(scope.lookup("@node:pending$raw"), None);
    let pending = scope.action_state("pending").expect("record exists");
    assert!(pending.waiting_on_input);
    assert_eq!(pending.params["ip"], "1.1.1.1");

    scope.start_action("broken");
    scope.fail_action("broken", "backend down");
    let broken = scope.action_state("broken").expect("record exists");
    assert!(broken.done);
    assert!(!broken.succeeded());
    assert_eq!(broken.error.as_deref(), Some("backend down"));
    assert_eq!(scope.node_result("broken", "score"), None);
}

#[test]
fn every_mutation_bumps_the_version() {
    let scope = Scope::new(BTreeMap::new());
    assert_eq!(scope.version(), 0);
    scope.start_if("if1");
    scope.evaluate_if(
        "if1",
        true,
        BTreeMap::from([("$x".to_string(), "5".to_string())]),
    );
    scope.export_values(&BTreeMap::from([("x".to_string(), Value::scalar("5"))]));
    scope.mark_completed();
    assert_eq!(scope.version(), 4);
    assert!(scope.completed_at_ms().is_some());
    assert!(scope.updated_at_ms() >= scope.started_at_ms());

    let record = scope.if_state("if1").expect("if record");
    assert!(record.done);
    assert_eq!(record.outcome, Some(true));
    assert_eq!(record.vars_used["$x"], "5");
}

#[test]
fn for_loop_history_keeps_every_completed_iteration() {
    let scope = Scope::new(BTreeMap::new());
    scope.start_for("loop", true);
    let initial = scope.for_state("loop").expect("loop record");
    assert!(initial.waiting_on_input);
    assert_eq!(initial.current_index, -1);

    let first = scope.new_child();
    let second = scope.new_child();
    scope.start_for_iteration("loop", 1, Value::scalar("a"), first.clone());
    scope.start_for_iteration("loop", 2, Value::scalar("b"), second.clone());

    let running = scope.for_state("loop").expect("loop record");
    assert_eq!(running.current_index, 2);
    assert_eq!(running.history.len(), 1);
    assert!(running.history[&1].scope.same_scope(&first));
    assert!(!running.waiting_on_input);

    scope.end_for_loop("loop");
    let ended = scope.for_state("loop").expect("loop record");
    assert!(ended.done);
    assert_eq!(ended.history.len(), 2);
    assert_eq!(ended.history[&2].value, Value::scalar("b"));
    assert!(ended.history[&2].scope.same_scope(&second));
}

#[test]
fn failures_are_terminal_for_if_and_for() {
    let scope = Scope::new(BTreeMap::new());
    scope.start_if("if1");
    scope.fail_if("if1", "Evaluation failed");
    scope.start_for("loop", true);
    scope.fail_for("loop", "timed out waiting for dependency");
    scope.set_done_with_error("halted");

    let if_record = scope.if_state("if1").expect("if record");
    assert!(if_record.done);
    assert_eq!(if_record.outcome, None);
    let for_record = scope.for_state("loop").expect("loop record");
    assert!(for_record.done);
    assert!(!for_record.waiting_on_input);
    assert_eq!(scope.error().as_deref(), Some("halted"));
}

#[test]
fn child_scopes_start_empty() {
    let root = Scope::new(seed());
    let child = root.new_child();
    assert_eq!(child.lookup("@alert:srcIp"), None);
    assert_eq!(child.version(), 0);
    assert!(!child.same_scope(&root));
    assert!(child.same_scope(&child.clone()));
}
