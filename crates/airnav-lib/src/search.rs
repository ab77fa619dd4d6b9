//! A* search over one level of the airway graph.
//!
//! Edge cost and heuristic are both great-circle distance in nautical miles.
//! The heuristic never overestimates a route that has to follow published
//! edges, so the first time the goal is popped its path is optimal.
//!
//! Search records live in a per-call arena and refer to their predecessor by
//! index; the whole structure is dropped when the call returns.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use tracing::debug;

use crate::airway::{AirwayId, Level};
use crate::error::{Error, Result};
use crate::positioned::{Guid, PositionedRef};
use crate::store::NavDataStore;

/// One node on a found path and the airway of the edge that reached it.
///
/// The first hop has no airway.
#[derive(Debug, Clone)]
pub struct SearchHop {
    pub node: PositionedRef,
    pub airway: Option<AirwayId>,
}

#[derive(Debug)]
struct OpenNode {
    node: PositionedRef,
    previous: Option<usize>,
    airway: Option<AirwayId>,
    g: f64,
    h: f64,
}

impl OpenNode {
    fn f(&self) -> f64 {
        self.g + self.h
    }
}

/// Open-set ordering: lowest `f` first, equal `f` in arena slot order.
type OpenPriority = Reverse<(OrderedFloat<f64>, usize)>;

fn open_priority(f: f64, slot: usize) -> OpenPriority {
    Reverse((OrderedFloat(f), slot))
}

/// Find the shortest path from `start` to `goal` in the `level` network.
///
/// Returns `Ok(None)` when the open set drains without reaching the goal,
/// which means the two nodes sit in disconnected components. An edge whose
/// endpoint the store cannot resolve is a [`Error::DataInconsistency`];
/// exceeding `max_expansions` popped nodes is [`Error::SearchAborted`].
pub fn search(
    store: &dyn NavDataStore,
    level: Level,
    start: &PositionedRef,
    goal: &PositionedRef,
    max_expansions: Option<usize>,
) -> Result<Option<Vec<SearchHop>>> {
    let mut arena = vec![OpenNode {
        node: start.clone(),
        previous: None,
        airway: None,
        g: 0.0,
        h: start.position.distance_nm(&goal.position),
    }];
    let mut open_index: HashMap<Guid, usize> = HashMap::from([(start.guid, 0)]);
    let mut closed: HashSet<Guid> = HashSet::new();
    let mut open: PriorityQueue<usize, OpenPriority> = PriorityQueue::new();
    open.push(0, open_priority(arena[0].f(), 0));

    let mut expanded = 0usize;
    while let Some((slot, _)) = open.pop() {
        let current = arena[slot].node.clone();
        closed.insert(current.guid);

        if current.guid == goal.guid {
            let path = build_path(&arena, slot);
            debug!(
                from = %start.ident,
                to = %goal.ident,
                %level,
                expanded,
                hops = path.len(),
                still_open = open.len(),
                distance_nm = arena[slot].g,
                "search reached goal"
            );
            return Ok(Some(path));
        }

        if max_expansions.is_some_and(|limit| expanded >= limit) {
            debug!(from = %start.ident, to = %goal.ident, expanded, "search aborted");
            return Err(Error::SearchAborted { expanded });
        }
        expanded += 1;

        let current_g = arena[slot].g;
        for (airway, neighbour_guid) in store.edges_from(level, current.guid) {
            if closed.contains(&neighbour_guid) {
                continue;
            }

            let neighbour = store.load_by_id(neighbour_guid).ok_or_else(|| {
                Error::inconsistency(format!(
                    "edge {} -> {neighbour_guid} on airway {airway} references unknown positioned",
                    current.guid
                ))
            })?;
            let tentative_g = current_g + current.position.distance_nm(&neighbour.position);

            match open_index.get(&neighbour_guid) {
                Some(&existing) => {
                    // Equal cost keeps the first-found predecessor.
                    if arena[existing].g <= tentative_g {
                        continue;
                    }
                    let entry = &mut arena[existing];
                    entry.previous = Some(slot);
                    entry.airway = Some(airway);
                    entry.g = tentative_g;
                    let priority = open_priority(entry.f(), existing);
                    open.push_increase(existing, priority);
                }
                None => {
                    let h = neighbour.position.distance_nm(&goal.position);
                    let index = arena.len();
                    arena.push(OpenNode {
                        node: neighbour,
                        previous: Some(slot),
                        airway: Some(airway),
                        g: tentative_g,
                        h,
                    });
                    open_index.insert(neighbour_guid, index);
                    open.push(index, open_priority(arena[index].f(), index));
                }
            }
        }
    }

    debug!(
        from = %start.ident,
        to = %goal.ident,
        %level,
        expanded,
        visited = arena.len(),
        "search exhausted without reaching goal"
    );
    Ok(None)
}

fn build_path(arena: &[OpenNode], goal_slot: usize) -> Vec<SearchHop> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_slot);
    while let Some(slot) = cursor {
        let entry = &arena[slot];
        path.push(SearchHop {
            node: entry.node.clone(),
            airway: entry.airway,
        });
        cursor = entry.previous;
    }
    path.reverse();
    path
}
