//! Deterministic, engine-agnostic world-state primitives for GOAP planning.
//!
//! Everything in this crate is plain data: world-state snapshots, partial
//! conditions and effects, the closed key vocabulary, action bindings and the
//! plans a planner produces. Search lives in `goap-planner`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod atom;
pub mod binding;
pub mod cancel;
pub mod error;
pub mod plan;
pub mod vocabulary;
pub mod world;

pub use agent::AgentId;
pub use atom::{Atom, AtomKey, AtomValue};
pub use binding::{ActionId, Binding};
pub use cancel::CancellationToken;
pub use error::VocabularyError;
pub use plan::{Plan, PlanStep};
pub use vocabulary::{AtomDomain, Vocabulary};
pub use world::{apply_effect, matches, Condition, Effect, WorldState};
