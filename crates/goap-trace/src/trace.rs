#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One planning or execution event.
///
/// `a` and `b` are tag-specific numeric payloads (expansion counts, plan
/// lengths, cursor positions); `label` names the action or failure reason
/// involved, when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub label: Option<String>,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            a: 0,
            b: 0,
            label: None,
        }
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn emit(&mut self, event: TraceEvent) {
        (**self).emit(event);
    }
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

/// In-memory event recorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.events.iter().any(|e| e.tag == tag)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for TraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Forwards every event to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::debug!(
            tick = event.tick,
            tag = %event.tag,
            a = event.a,
            b = event.b,
            label = event.label.as_deref().unwrap_or(""),
            "goap trace"
        );
    }
}

/// Fans events out to two sinks, e.g. a [`TraceLog`] and a [`TracingSink`].
impl<A: TraceSink, B: TraceSink> TraceSink for (A, B) {
    fn emit(&mut self, event: TraceEvent) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}
