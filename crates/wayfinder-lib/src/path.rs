use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::{Error, Result};
use crate::graph::{DirectedEdge, GraphModel, NodeIndex};
use crate::preference::PreferenceEvaluator;

/// Relative tolerance under which two accumulated weights count as equal.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Cooperative cancellation and deadline for a single search.
///
/// Both are checked once per priority-queue pop.
#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    cancel: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl SearchControl {
    /// Search that runs to completion.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Abandon the search once `flag` becomes `true`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    fn check(&self) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(AtomicOrdering::Relaxed) {
                return Err(Error::SearchCancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

/// One traversed directed edge together with the node it leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub from: NodeIndex,
    pub edge: DirectedEdge,
}

/// Run Dijkstra's algorithm restricted to edges the evaluator allows.
///
/// Returns `Ok(None)` when the goal cannot be reached and `Ok(Some(vec![]))`
/// when `start == goal`.
pub fn find_route_dijkstra(
    graph: &GraphModel,
    start: NodeIndex,
    goal: NodeIndex,
    evaluator: &PreferenceEvaluator,
    control: &SearchControl,
) -> Result<Option<Vec<Hop>>> {
    search(graph, start, goal, evaluator, control, |_, _| 0.0)
}

/// Run A* with the straight-line distance to the goal as heuristic.
///
/// The heuristic only contributes while both ends of the relaxed edge are on
/// the goal's floor and the evaluator weighs by distance; elsewhere the search
/// behaves exactly like Dijkstra. Graphs holding a path shorter than its
/// straight line are searched with Dijkstra throughout.
pub fn find_route_a_star(
    graph: &GraphModel,
    start: NodeIndex,
    goal: NodeIndex,
    evaluator: &PreferenceEvaluator,
    control: &SearchControl,
) -> Result<Option<Vec<Hop>>> {
    if !evaluator.supports_planar_heuristic() || !graph.supports_planar_heuristic() {
        return find_route_dijkstra(graph, start, goal, evaluator, control);
    }

    let Some(goal_landmark) = graph.landmark(goal) else {
        return Ok(None);
    };

    search(graph, start, goal, evaluator, control, |from, to| {
        match (graph.landmark(from), graph.landmark(to)) {
            (Some(current), Some(next))
                if current.floor == goal_landmark.floor && next.floor == goal_landmark.floor =>
            {
                next.position.distance_to(&goal_landmark.position)
            }
            _ => 0.0,
        }
    })
}

/// Best known way of reaching `node`, linked to its predecessor label.
#[derive(Debug, Clone, Copy)]
struct Label {
    node: NodeIndex,
    parent: Option<usize>,
    edge: Option<DirectedEdge>,
    cost: f64,
    hops: usize,
}

fn search<H>(
    graph: &GraphModel,
    start: NodeIndex,
    goal: NodeIndex,
    evaluator: &PreferenceEvaluator,
    control: &SearchControl,
    heuristic: H,
) -> Result<Option<Vec<Hop>>>
where
    H: Fn(NodeIndex, NodeIndex) -> f64,
{
    if start >= graph.node_count() || goal >= graph.node_count() {
        return Ok(None);
    }
    if start == goal {
        return Ok(Some(Vec::new()));
    }

    let mut labels: Vec<Label> = vec![Label {
        node: start,
        parent: None,
        edge: None,
        cost: 0.0,
        hops: 0,
    }];
    let mut best: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut queue = BinaryHeap::new();
    let mut expanded = 0usize;

    best[start] = Some(0);
    queue.push(QueueEntry::new(start, 0, 0.0, 0.0, 0));

    while let Some(entry) = queue.pop() {
        control.check()?;

        if best[entry.node] != Some(entry.label) {
            continue;
        }

        if entry.node == goal {
            trace!(expanded, labels = labels.len(), "search reached goal");
            return Ok(Some(reconstruct_hops(&labels, entry.label)));
        }

        expanded += 1;
        let current = labels[entry.label];

        for edge in graph.neighbours(entry.node) {
            let path = graph.path(edge);
            if !evaluator.allows(path) {
                continue;
            }

            let next = edge.target;
            let next_cost = current.cost + evaluator.weight(path);
            let next_hops = current.hops + 1;

            let improves = match best[next] {
                None => true,
                Some(existing) => {
                    compare_candidate(&labels, existing, entry.label, next, next_cost, next_hops)
                        == Ordering::Less
                }
            };
            if !improves {
                continue;
            }

            let label = labels.len();
            labels.push(Label {
                node: next,
                parent: Some(entry.label),
                edge: Some(*edge),
                cost: next_cost,
                hops: next_hops,
            });
            best[next] = Some(label);

            let estimate = next_cost + heuristic(entry.node, next);
            queue.push(QueueEntry::new(next, label, next_cost, estimate, next_hops));
        }
    }

    trace!(expanded, "search exhausted without reaching goal");
    Ok(None)
}

/// Order a candidate label against the existing best label for `node`.
///
/// Lower weight wins, then fewer edges, then the lexicographically smaller
/// landmark index sequence.
fn compare_candidate(
    labels: &[Label],
    existing: usize,
    parent: usize,
    node: NodeIndex,
    cost: f64,
    hops: usize,
) -> Ordering {
    let current = &labels[existing];
    compare_weight(cost, current.cost)
        .then_with(|| hops.cmp(&current.hops))
        .then_with(|| {
            let mut candidate = node_sequence(labels, parent);
            candidate.push(node);
            candidate.cmp(&node_sequence(labels, existing))
        })
}

fn compare_weight(a: f64, b: f64) -> Ordering {
    let scale = a.abs().max(b.abs()).max(1.0);
    if (a - b).abs() <= WEIGHT_TOLERANCE * scale {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

fn node_sequence(labels: &[Label], label: usize) -> Vec<NodeIndex> {
    let mut nodes = Vec::new();
    let mut current = Some(label);
    while let Some(id) = current {
        nodes.push(labels[id].node);
        current = labels[id].parent;
    }
    nodes.reverse();
    nodes
}

fn reconstruct_hops(labels: &[Label], goal_label: usize) -> Vec<Hop> {
    let mut hops = Vec::new();
    let mut current = goal_label;
    while let (Some(parent), Some(edge)) = (labels[current].parent, labels[current].edge) {
        hops.push(Hop {
            from: labels[parent].node,
            edge,
        });
        current = parent;
    }
    hops.reverse();
    hops
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeIndex,
    label: usize,
    cost: FloatOrd,
    estimate: FloatOrd,
    hops: usize,
}

impl QueueEntry {
    fn new(node: NodeIndex, label: usize, cost: f64, estimate: f64, hops: usize) -> Self {
        Self {
            node,
            label,
            cost: FloatOrd(cost),
            estimate: FloatOrd(estimate),
            hops,
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.label.cmp(&self.label))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
