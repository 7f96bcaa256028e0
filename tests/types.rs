// tests/types.rs

use std::str::FromStr;

use pipeline_dag::types::{NodeKind, NodeStatus};

#[test]
fn status_round_trips_through_strings() {
    for status in NodeStatus::ALL {
        assert_eq!(NodeStatus::from_str(status.as_str()).unwrap(), status);
        assert_eq!(status.to_string(), status.as_str());
    }
    assert!(NodeStatus::from_str("done").is_err());
}

#[test]
fn kind_parses_case_insensitively() {
    assert_eq!("Model".parse::<NodeKind>().unwrap(), NodeKind::Model);
    assert_eq!(NodeKind::Output.to_string(), "output");
    assert!("notebook".parse::<NodeKind>().is_err());
}

#[test]
fn transient_and_terminal_partition_non_idle_states() {
    for status in NodeStatus::ALL {
        if status == NodeStatus::Idle {
            assert!(!status.is_transient() && !status.is_terminal());
        } else {
            assert_ne!(status.is_transient(), status.is_terminal(), "{status}");
        }
    }
}

#[test]
fn transition_table() {
    use NodeStatus::*;

    let allowed = [
        (Idle, Pending),
        (Failed, Pending),
        (Skipped, Pending),
        (Cancelled, Pending),
        (Pending, Running),
        (Running, Success),
        (Running, Failed),
        (Pending, Skipped),
        (Pending, Cancelled),
        (Running, Cancelled),
    ];

    for from in NodeStatus::ALL {
        assert!(from.can_transition_to(Idle), "{from} -> idle");
        for to in NodeStatus::ALL {
            if to == Idle {
                continue;
            }
            assert_eq!(
                from.can_transition_to(to),
                allowed.contains(&(from, to)),
                "{from} -> {to}"
            );
        }
    }

    // A node that succeeded is never re-run by a new cycle.
    assert!(!Success.can_transition_to(Pending));
    // Skipped nodes never start.
    assert!(!Skipped.can_transition_to(Running));
}

#[test]
fn defaults() {
    assert_eq!(NodeStatus::default(), NodeStatus::Idle);
    assert_eq!(
        pipeline_dag::config::PolicyKind::default(),
        pipeline_dag::config::PolicyKind::Random
    );
}
