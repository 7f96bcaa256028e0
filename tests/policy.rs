// tests/policy.rs

use std::time::Duration;

use pipeline_dag::dag::Node;
use pipeline_dag::sim::{
    FixedPolicy, NodeOutcome, NodePlan, RandomPolicy, RuntimeHintPolicy, SimulationPolicy,
    parse_duration,
};
use pipeline_dag::types::NodeKind;

fn node(id: &str) -> Node {
    Node::new(id, id, NodeKind::Transform)
}

#[test]
fn parse_duration_accepts_common_units() {
    assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
    assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
    assert_eq!(parse_duration("45.2s").unwrap().as_millis(), 45_200);
    assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    assert_eq!(parse_duration(" 10 S ").unwrap(), Duration::from_secs(10));
}

#[test]
fn parse_duration_rejects_malformed_input() {
    for bad in ["", "10", "5x", "-1s", "s", "1..2s"] {
        assert!(parse_duration(bad).is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn fixed_policy_uses_overrides_and_fail_list() {
    let mut policy = FixedPolicy::new(Duration::from_secs(1))
        .with_duration("slow", Duration::from_secs(10))
        .failing("broken");

    assert_eq!(
        policy.plan(&node("plain")),
        NodePlan::success(Duration::from_secs(1))
    );
    assert_eq!(
        policy.plan(&node("slow")),
        NodePlan::success(Duration::from_secs(10))
    );
    assert_eq!(policy.plan(&node("broken")).outcome, NodeOutcome::Failed);
}

#[test]
fn random_policy_is_deterministic_per_seed() {
    let nodes: Vec<Node> = (0..20).map(|i| node(&format!("n{i}"))).collect();

    let mut a = RandomPolicy::new(7).with_failure_rate(0.3);
    let mut b = RandomPolicy::new(7).with_failure_rate(0.3);

    let plans_a: Vec<NodePlan> = nodes.iter().map(|n| a.plan(n)).collect();
    let plans_b: Vec<NodePlan> = nodes.iter().map(|n| b.plan(n)).collect();

    assert_eq!(plans_a, plans_b);
}

#[test]
fn random_policy_stays_in_range() {
    let mut policy = RandomPolicy::new(1);
    for i in 0..200 {
        let plan = policy.plan(&node(&format!("n{i}")));
        assert!(plan.duration >= RandomPolicy::DEFAULT_MIN);
        assert!(plan.duration <= RandomPolicy::DEFAULT_MAX);
        assert_eq!(plan.outcome, NodeOutcome::Success);
    }
}

#[test]
fn random_policy_normalises_range_and_rate() {
    let mut policy = RandomPolicy::new(3)
        .with_range(Duration::from_millis(300), Duration::from_millis(100))
        .with_failure_rate(5.0);

    for i in 0..50 {
        let plan = policy.plan(&node(&format!("n{i}")));
        assert!(plan.duration >= Duration::from_millis(100));
        assert!(plan.duration <= Duration::from_millis(300));
        assert_eq!(plan.outcome, NodeOutcome::Failed);
    }
}

#[test]
fn random_policy_forced_failure() {
    let mut policy = RandomPolicy::new(9).failing("model-1");

    assert_eq!(policy.plan(&node("model-1")).outcome, NodeOutcome::Failed);
    assert_eq!(policy.plan(&node("output-1")).outcome, NodeOutcome::Success);
}

#[test]
fn runtime_hint_policy_reads_node_runtime() {
    let fallback = Duration::from_secs(2);
    let mut policy = RuntimeHintPolicy::new(fallback).failing("bad");

    let with_hint = node("t").with_runtime("12.8s");
    let unparseable = node("u").with_runtime("n/a");

    assert_eq!(policy.plan(&with_hint).duration.as_millis(), 12_800);
    assert_eq!(policy.plan(&unparseable).duration, fallback);
    assert_eq!(policy.plan(&node("plain")).duration, fallback);
    assert_eq!(policy.plan(&node("bad")).outcome, NodeOutcome::Failed);
}

#[test]
fn boxed_policy_delegates() {
    let mut policy: Box<dyn SimulationPolicy + Send> =
        Box::new(FixedPolicy::new(Duration::from_millis(5)).failing("x"));

    assert_eq!(policy.plan(&node("x")), NodePlan::failure(Duration::from_millis(5)));
}

#[test]
fn random_policy_handles_ranges_beyond_u64_millis() {
    let mut policy = RandomPolicy::new(5).with_range(Duration::from_secs(1), Duration::MAX);

    for i in 0..20 {
        let plan = policy.plan(&node(&format!("n{i}")));
        assert!(plan.duration >= Duration::from_secs(1));
    }

    let mut pinned = RandomPolicy::new(5).with_range(Duration::MAX, Duration::MAX);
    assert_eq!(
        pinned.plan(&node("x")).duration,
        Duration::from_millis(u64::MAX)
    );
}
