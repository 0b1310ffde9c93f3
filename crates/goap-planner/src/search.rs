use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use goap_core::{matches, CancellationToken, Condition, Plan, PlanStep, WorldState};
use goap_trace::{TraceEvent, TraceSink};
use tracing::{debug, debug_span, trace};

use crate::action::BoundAction;
use crate::binding::{BindingProvider, NoBindings};
use crate::config::{PlannerConfig, SearchLimits};
use crate::error::{LimitKind, PlanningFailure};
use crate::heuristic::Heuristic;
use crate::library::ActionLibrary;

/// Inputs of one planning call beyond the library.
pub struct PlanRequest<'a> {
    start: &'a WorldState,
    goal: &'a Condition,
    bindings: &'a dyn BindingProvider,
    limits: Option<SearchLimits>,
    cancel: Option<&'a CancellationToken>,
    trace: Option<&'a mut dyn TraceSink>,
    tick: u64,
}

impl<'a> PlanRequest<'a> {
    pub fn new(start: &'a WorldState, goal: &'a Condition) -> Self {
        Self {
            start,
            goal,
            bindings: &NoBindings,
            limits: None,
            cancel: None,
            trace: None,
            tick: 0,
        }
    }

    pub fn bindings(mut self, bindings: &'a dyn BindingProvider) -> Self {
        self.bindings = bindings;
        self
    }

    /// Overrides the planner's configured limits for this call.
    pub fn limits(mut self, limits: SearchLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn cancel(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn trace(mut self, sink: &'a mut dyn TraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Tick stamped on emitted trace events.
    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_mut() {
            sink.emit(event);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancellationToken::is_cancelled)
    }
}

/// Best-first (A*) planner over world states.
///
/// Stateless apart from its configuration, so one planner can serve any
/// number of concurrent planning calls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Planner {
    config: PlannerConfig,
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    h: f64,
    seq: u64,
    g: f64,
    node: usize,
}

impl OpenNode {
    fn rank(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.h.total_cmp(&other.h))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.rank(self)
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cost and depth a state was reached with. A state is reopened when a new
/// path is strictly cheaper or strictly shallower than every kept label, so
/// a cheap but deep path cannot shadow a shallow one under `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Label {
    g: f64,
    depth: usize,
}

impl Label {
    fn dominates(&self, other: &Self) -> bool {
        self.g <= other.g && self.depth <= other.depth
    }
}

struct SearchNode {
    state: WorldState,
    depth: usize,
    /// `(parent node, candidate index, edge cost)`.
    parent: Option<(usize, usize, f64)>,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(&self, library: &ActionLibrary, mut request: PlanRequest<'_>) -> Result<Plan, PlanningFailure> {
        if request.is_cancelled() {
            debug!("planning cancelled before start");
            return Err(PlanningFailure::Cancelled);
        }
        let limits = request.limits.unwrap_or(self.config.limits);
        let span = debug_span!(
            "goap.plan",
            actions = library.len(),
            revision = library.revision(),
            goal = %request.goal,
        );
        let _enter = span.enter();

        let tick = request.tick;
        request.emit(
            TraceEvent::new(tick, "goap.plan.call")
                .with_a(request.start.len() as u64)
                .with_b(request.goal.len() as u64),
        );

        let result = self.search(library, &request, limits);
        match &result {
            Ok((plan, expansions)) => {
                debug!(steps = plan.len(), cost = plan.cost(), expansions, "plan found");
                let label = plan
                    .action_ids()
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                request.emit(
                    TraceEvent::new(tick, "goap.plan.result")
                        .with_a(plan.len() as u64)
                        .with_b(*expansions as u64)
                        .with_label(label),
                );
            }
            Err((failure, expansions)) => {
                debug!(reason = %failure.reason(), expansions, "planning failed");
                request.emit(
                    TraceEvent::new(tick, "goap.plan.failed")
                        .with_a(*expansions as u64)
                        .with_label(failure.reason().as_str()),
                );
            }
        }
        result.map(|(plan, _)| plan).map_err(|(failure, _)| failure)
    }

    fn search(
        &self,
        library: &ActionLibrary,
        request: &PlanRequest<'_>,
        limits: SearchLimits,
    ) -> Result<(Plan, usize), (PlanningFailure, usize)> {
        let (start, goal) = (request.start, request.goal);

        if request.is_cancelled() {
            return Err((PlanningFailure::Cancelled, 0));
        }
        if let Some(key) = library.vocabulary().first_unknown(goal) {
            debug!(key = %key, "goal references a key outside the vocabulary");
            return Err((PlanningFailure::Unreachable, 0));
        }
        if matches(start, goal) {
            return Ok((Plan::empty(start.clone(), goal.clone()), 0));
        }

        let candidates = library.bind(start, goal, request.bindings);
        let heuristic = Heuristic::from_config(&self.config.heuristic, &candidates, goal);
        trace!(candidates = candidates.len(), weight = heuristic.weight(), "search prepared");

        let mut nodes = vec![SearchNode {
            state: start.clone(),
            depth: 0,
            parent: None,
        }];
        let mut labels: BTreeMap<WorldState, Vec<Label>> = BTreeMap::new();
        labels.insert(start.clone(), vec![Label { g: 0.0, depth: 0 }]);

        let mut open = BinaryHeap::new();
        let mut seq: u64 = 0;
        open.push(OpenNode {
            f: heuristic.estimate(start, goal),
            h: heuristic.estimate(start, goal),
            seq,
            g: 0.0,
            node: 0,
        });
        seq += 1;

        let mut expansions: usize = 0;
        let mut depth_pruned = false;

        while let Some(entry) = open.pop() {
            if request.is_cancelled() {
                return Err((PlanningFailure::Cancelled, expansions));
            }

            let state = nodes[entry.node].state.clone();
            let label = Label {
                g: entry.g,
                depth: nodes[entry.node].depth,
            };
            if !labels.get(&state).is_some_and(|kept| kept.contains(&label)) {
                continue; // stale heap entry
            }

            if matches(&state, goal) {
                let plan = reconstruct(&nodes, &candidates, entry.node, start, goal);
                return Ok((plan, expansions));
            }

            if expansions >= limits.max_expansions {
                return Err((
                    PlanningFailure::ExceededLimits {
                        limit: LimitKind::Expansions,
                        expansions,
                    },
                    expansions,
                ));
            }
            expansions += 1;

            let depth = label.depth;
            if depth >= limits.max_depth {
                depth_pruned = true;
                continue;
            }

            for (index, candidate) in candidates.iter().enumerate() {
                if !candidate.is_applicable(&state) || candidate.effect.is_noop_on(&state) {
                    continue;
                }

                let cost = candidate.cost(&state);
                if !cost.is_finite() || cost < 0.0 || cost < candidate.definition.cost_floor() {
                    return Err((
                        PlanningFailure::InvalidActionCost {
                            action: candidate.id().clone(),
                            cost,
                        },
                        expansions,
                    ));
                }

                let child = candidate.apply(&state);
                let g = entry.g + cost;
                let label = Label { g, depth: depth + 1 };
                let kept = labels.entry(child.clone()).or_default();
                if kept.iter().any(|other| other.dominates(&label)) {
                    continue;
                }
                kept.retain(|other| !label.dominates(other));
                kept.push(label);

                let h = heuristic.estimate(&child, goal);
                nodes.push(SearchNode {
                    state: child,
                    depth: depth + 1,
                    parent: Some((entry.node, index, cost)),
                });
                open.push(OpenNode {
                    f: g + h,
                    h,
                    seq,
                    g,
                    node: nodes.len() - 1,
                });
                seq += 1;
            }
        }

        if depth_pruned {
            Err((
                PlanningFailure::ExceededLimits {
                    limit: LimitKind::Depth,
                    expansions,
                },
                expansions,
            ))
        } else {
            Err((PlanningFailure::Unreachable, expansions))
        }
    }
}

fn reconstruct(
    nodes: &[SearchNode],
    candidates: &[BoundAction],
    goal_node: usize,
    start: &WorldState,
    goal: &Condition,
) -> Plan {
    let mut steps = Vec::new();
    let mut current = goal_node;
    while let Some((parent, index, cost)) = nodes[current].parent {
        let candidate = &candidates[index];
        steps.push(PlanStep {
            action: candidate.id().clone(),
            binding: candidate.binding.clone(),
            precondition: candidate.precondition.clone(),
            effect: candidate.effect.clone(),
            cost,
            expected: nodes[current].state.clone(),
        });
        current = parent;
    }
    steps.reverse();
    Plan::new(start.clone(), goal.clone(), steps)
}

/// Plans with the default configuration and no binding provider.
pub fn plan(
    start: &WorldState,
    goal: &Condition,
    library: &ActionLibrary,
    limits: SearchLimits,
) -> Result<Plan, PlanningFailure> {
    Planner::default().plan(library, PlanRequest::new(start, goal).limits(limits))
}
