use goap_trace::{NullTraceSink, TraceEvent, TraceLog, TraceSink};

fn emit_all(sink: &mut dyn TraceSink) {
    sink.emit(TraceEvent::new(1, "goap.plan.call").with_a(3).with_b(1));
    sink.emit(
        TraceEvent::new(1, "goap.plan.result")
            .with_a(2)
            .with_label("TakeCover"),
    );
}

#[test]
fn trace_log_records_events_in_order() {
    let mut log = TraceLog::new();
    emit_all(&mut log);

    assert_eq!(log.len(), 2);
    assert_eq!(log.events[0].tag, "goap.plan.call");
    assert_eq!(log.events[0].a, 3);
    assert_eq!(log.events[0].b, 1);
    assert_eq!(log.events[1].label.as_deref(), Some("TakeCover"));
    assert!(log.contains("goap.plan.result"));
    assert_eq!(log.count("goap.plan.call"), 1);
}

#[test]
fn tuple_sink_fans_out_to_both() {
    let mut pair = (TraceLog::new(), TraceLog::new());
    emit_all(&mut pair);
    assert_eq!(pair.0, pair.1);
    assert_eq!(pair.0.len(), 2);
}

#[test]
fn mutable_reference_is_a_sink() {
    let mut log = TraceLog::new();
    {
        let mut borrowed = &mut log;
        emit_all(&mut borrowed);
    }
    let mut null = NullTraceSink;
    emit_all(&mut null);
    assert_eq!(log.with_tag("goap.plan.call").count(), 1);
}
