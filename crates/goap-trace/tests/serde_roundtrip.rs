#![cfg(feature = "serde")]

use goap_trace::{TraceEvent, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::new(1, "goap.plan.call").with_a(10).with_b(20),
            TraceEvent::new(2, "goap.plan.failed").with_label("unreachable"),
            TraceEvent::new(3, "goap.replan").with_a(1),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
