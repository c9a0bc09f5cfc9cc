//! Start/restart/switch workflows.

use crate::helpers::{CallLog, TestEvent, handler, recorded};
use interaction_handler::InteractionState;
use std::collections::BTreeSet;

#[test]
fn test_switching_interrupts_previous() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction("A", recorded("A", &log).with_map_behavior("a-tool"));
    handler.add_interaction("B", recorded("B", &log).with_map_behavior("b-tool"));

    handler.start_interaction("A", None);
    handler.start_interaction("B", Some(TestEvent("switch")));

    insta::assert_snapshot!(log.lines(), @r"
    A.start
    attach:a-tool
    A.end(save)
    detach:a-tool
    B.start
    attach:b-tool
    ");
    assert_eq!(handler.active_interaction().as_deref(), Some("B"));
}

#[test]
fn test_restart_does_not_interrupt_or_reattach() {
    let log = CallLog::new();
    let handler = handler(&log);
    let check_log = log.clone();
    handler.add_interaction(
        "A",
        recorded("A", &log)
            .with_map_behavior("a-tool")
            .with_check_interrupt(move |decision| {
                check_log.push("A.check_interrupt");
                decision.cancel();
                Ok(())
            }),
    );

    handler.start_interaction("A", None);
    handler.start_interaction("A", None);

    assert_eq!(log.entries(), vec!["A.start", "attach:a-tool", "A.start"]);
    assert!(handler.state().is_active_named("A"));
}

#[test]
fn test_restart_returning_false_skips_start() {
    let log = CallLog::new();
    let handler = handler(&log);
    let restart_log = log.clone();
    handler.add_interaction(
        "A",
        recorded("A", &log).with_restart(move |_| {
            restart_log.push("A.restart");
            Ok(false)
        }),
    );

    handler.start_interaction("A", None);
    handler.start_interaction("A", None);

    assert_eq!(log.entries(), vec!["A.start", "A.restart"]);
    assert!(handler.is_active());
}

#[test]
fn test_restart_returning_true_still_starts() {
    let log = CallLog::new();
    let handler = handler(&log);
    let restart_log = log.clone();
    handler.add_interaction(
        "A",
        recorded("A", &log).with_restart(move |_| {
            restart_log.push("A.restart");
            Ok(true)
        }),
    );

    handler.start_interaction("A", None);
    handler.start_interaction("A", None);

    assert_eq!(log.entries(), vec!["A.start", "A.restart", "A.start"]);
}

#[test]
fn test_restart_not_called_on_fresh_start() {
    let log = CallLog::new();
    let handler = handler(&log);
    let restart_log = log.clone();
    handler.add_interaction(
        "A",
        recorded("A", &log).with_restart(move |_| {
            restart_log.push("A.restart");
            Ok(false)
        }),
    );

    handler.start_interaction("A", None);
    assert_eq!(log.entries(), vec!["A.start"]);
}

#[test]
fn test_unknown_name_while_idle_is_noop() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction("A", recorded("A", &log));

    handler.start_interaction("missing", None);

    assert_eq!(handler.state(), InteractionState::Idle);
    assert!(log.entries().is_empty());
}

#[test]
fn test_unknown_name_while_active_still_interrupts() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction("A", recorded("A", &log));

    handler.start_interaction("A", None);
    handler.start_interaction("missing", None);

    // requesting an unknown interaction acts as an implicit end of the active one
    assert_eq!(log.entries(), vec!["A.start", "A.end(save)"]);
    assert!(!handler.is_active());
}

#[test]
fn test_failed_start_leaves_idle() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction(
        "broken",
        interaction_handler::InteractionDefinition::new(
            |_| anyhow::bail!("no layer to draw on"),
            |_, _| Ok(None),
        )
        .with_map_behavior("broken-tool"),
    );

    handler.start_interaction("broken", None);

    assert!(!handler.is_active());
    assert!(!log.contains("attach:broken-tool"));
}

#[test]
fn test_failed_restart_clears_active() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction(
        "A",
        recorded("A", &log).with_restart(|_| anyhow::bail!("stale state")),
    );

    handler.start_interaction("A", None);
    assert!(handler.is_active());

    handler.start_interaction("A", None);
    assert!(!handler.is_active());
    assert_eq!(log.count("A.start"), 1);
}

#[test]
fn test_pre_start_veto_on_fresh_start() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction("A", recorded("A", &log));
    handler.add_interaction("B", recorded("B", &log));
    handler.on_interaction_start(|_, name| Ok(name != "B"));

    handler.start_interaction("A", None);
    handler.start_interaction("B", None);

    // A was interrupted before the hook vetoed B
    assert_eq!(log.entries(), vec!["A.start", "A.end(save)"]);
    assert!(!handler.is_active());
}

#[test]
fn test_pre_start_veto_on_restart_keeps_active() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction("A", recorded("A", &log));

    handler.start_interaction("A", None);
    handler.on_interaction_start(|_, _| Ok(false));
    handler.start_interaction("A", None);

    assert_eq!(log.entries(), vec!["A.start"]);
    assert!(handler.state().is_active_named("A"));
}

#[test]
fn test_pre_start_hook_error_aborts_start() {
    let log = CallLog::new();
    let handler = handler(&log);
    handler.add_interaction("A", recorded("A", &log));
    handler.on_interaction_start(|_, _| anyhow::bail!("hook exploded"));

    handler.start_interaction("A", None);

    assert!(log.entries().is_empty());
    assert!(!handler.is_active());
}

#[test]
fn test_pre_start_hook_runs_before_registration_check() {
    let log = CallLog::new();
    let handler = handler(&log);
    let hook_log = log.clone();
    handler.on_interaction_start(move |event, name| {
        hook_log.push(format!("hook:{name}:{:?}", event.map(|e| e.0)));
        Ok(true)
    });

    handler.start_interaction("missing", Some(TestEvent("click")));

    assert_eq!(log.entries(), vec![r#"hook:missing:Some("click")"#]);
}

#[test]
fn test_start_sees_itself_active() {
    let log = CallLog::new();
    let handler = handler(&log);
    let observer = handler.clone();
    let start_log = log.clone();
    handler.add_interaction(
        "A",
        interaction_handler::InteractionDefinition::new(
            move |_| {
                start_log.push(format!("active during start: {:?}", observer.active_interaction()));
                Ok(())
            },
            |_, _| Ok(None),
        ),
    );

    handler.start_interaction("A", None);

    assert_eq!(log.entries(), vec![r#"active during start: Some("A")"#]);
}

#[test]
fn test_start_may_end_itself() {
    let log = CallLog::new();
    let handler = handler(&log);
    let reentrant = handler.clone();
    let end_log = log.clone();
    handler.add_interaction(
        "one-shot",
        interaction_handler::InteractionDefinition::new(
            move |_| {
                reentrant.end_interaction(None, false)?;
                Ok(())
            },
            move |_, _| {
                end_log.push("one-shot.end");
                Ok(None)
            },
        )
        .with_map_behavior("one-shot-tool"),
    );

    handler.start_interaction("one-shot", None);

    // ended before start returned, so the behavior was never attached
    assert_eq!(log.entries(), vec!["one-shot.end", "detach:one-shot-tool"]);
    assert!(!handler.is_active());
}

/// Interactions whose start has been logged without a matching end
fn open_interactions(log: &CallLog) -> BTreeSet<String> {
    let mut open = BTreeSet::new();
    for entry in log.entries() {
        if let Some(name) = entry.strip_suffix(".start") {
            open.insert(name.to_string());
        } else if let Some((name, _)) = entry.split_once(".end(") {
            open.remove(name);
        }
    }
    open
}

#[test]
fn test_at_most_one_active_across_sequence() {
    let log = CallLog::new();
    let handler = handler(&log);
    for name in ["A", "B", "C", "V"] {
        handler.add_interaction(name, recorded(name, &log));
    }
    handler.add_interaction(
        "G",
        recorded("G", &log).with_check_interrupt(|decision| {
            decision.cancel();
            Ok(())
        }),
    );
    handler.on_interaction_start(|_, name| Ok(name != "V"));

    let check = |step: &str| {
        let open = open_interactions(&log);
        assert!(open.len() <= 1, "after {step}: {open:?} open at once");
        assert_eq!(
            open.iter().next().cloned(),
            handler.active_interaction(),
            "after {step}"
        );
    };

    // restart, unknown name, veto, refused interrupt and explicit end all in one run
    for name in ["A", "B", "B", "missing", "C", "V", "A", "G", "B"] {
        handler.start_interaction(name, None);
        check(name);
    }
    assert_eq!(handler.active_interaction().as_deref(), Some("G"));

    handler.end_interaction(None, false).unwrap();
    check("end");
    handler.start_interaction("A", None);
    check("A");

    assert_eq!(handler.active_interaction().as_deref(), Some("A"));
    assert_eq!(log.count("C.end(save)"), 1);
    assert_eq!(log.count("B.end(save)"), 1);
    assert!(!log.contains("V.start"));
}
