//! Trace events for deterministic planning.
//!
//! Planner, monitor and driver describe what they did as small tagged events.
//! Tests record them with [`TraceLog`]; applications can forward them to the
//! `tracing` ecosystem with [`TracingSink`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, TraceEvent, TraceLog, TraceSink, TracingSink};
