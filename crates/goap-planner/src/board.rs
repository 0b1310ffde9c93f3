use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use goap_core::{AgentId, Plan};
use goap_trace::{TraceEvent, TraceSink};

/// A plan as published on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPlan {
    /// Per-agent, strictly increasing across publishes and clears.
    pub generation: u64,
    pub plan: Arc<Plan>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    plan: Option<Arc<Plan>>,
}

/// Latest completed plan per agent, last writer wins.
///
/// Shared between planning threads and the agents' executors; readers always
/// observe the most recently published plan for their agent.
#[derive(Debug)]
pub struct PlanBoard<A: AgentId> {
    slots: Mutex<BTreeMap<A, Slot>>,
}

impl<A: AgentId> Default for PlanBoard<A> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<A: AgentId> PlanBoard<A> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<A, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publishes `plan` for `agent` and returns its generation.
    pub fn publish(&self, agent: A, plan: Plan) -> u64 {
        let mut slots = self.lock();
        let slot = slots.entry(agent).or_default();
        slot.generation += 1;
        slot.plan = Some(Arc::new(plan));
        slot.generation
    }

    /// [`publish`](Self::publish), recording `goap.board.publish` with the
    /// agent's trace id and the new generation.
    pub fn publish_traced(&self, agent: A, plan: Plan, trace: &mut dyn TraceSink, tick: u64) -> u64 {
        let label = plan
            .action_ids()
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let generation = self.publish(agent, plan);
        trace.emit(
            TraceEvent::new(tick, "goap.board.publish")
                .with_a(agent.trace_id())
                .with_b(generation)
                .with_label(label),
        );
        generation
    }

    pub fn latest(&self, agent: A) -> Option<PublishedPlan> {
        let slots = self.lock();
        let slot = slots.get(&agent)?;
        Some(PublishedPlan {
            generation: slot.generation,
            plan: Arc::clone(slot.plan.as_ref()?),
        })
    }

    pub fn generation(&self, agent: A) -> u64 {
        self.lock().get(&agent).map_or(0, |slot| slot.generation)
    }

    /// Withdraws the agent's plan. Returns false when none was published.
    pub fn clear(&self, agent: A) -> bool {
        let mut slots = self.lock();
        match slots.get_mut(&agent) {
            Some(slot) if slot.plan.is_some() => {
                slot.generation += 1;
                slot.plan = None;
                true
            }
            _ => false,
        }
    }

    /// [`clear`](Self::clear), recording `goap.board.clear` when a plan was
    /// withdrawn.
    pub fn clear_traced(&self, agent: A, trace: &mut dyn TraceSink, tick: u64) -> bool {
        let cleared = self.clear(agent);
        if cleared {
            trace.emit(
                TraceEvent::new(tick, "goap.board.clear")
                    .with_a(agent.trace_id())
                    .with_b(self.generation(agent)),
            );
        }
        cleared
    }

    /// Agents with a published plan, in id order.
    pub fn agents(&self) -> Vec<A> {
        self.lock()
            .iter()
            .filter(|(_, slot)| slot.plan.is_some())
            .map(|(agent, _)| *agent)
            .collect()
    }
}
