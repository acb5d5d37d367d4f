#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Load-time ordering of a guard's unordered patrol waypoints.
//!
//! Starting from the guard's origin, the sequencer repeatedly walks to the
//! closest remaining waypoint that shares exactly one axis with the current
//! point. When nothing lines up with the current point, the search moves back
//! through the points already placed, newest first, down to the origin: the
//! guard reaches those by retracing its legs.

use std::collections::HashSet;

use heist_core::Position;
use thiserror::Error;

/// Errors raised when a waypoint set cannot be turned into a patrol route.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PatrolError {
    /// The same waypoint appeared more than once.
    #[error("waypoint {0:?} is listed more than once")]
    DuplicateWaypoint(Position),
    /// No remaining waypoint shares an axis with any placed point.
    #[error("no waypoint is axis-aligned with {from:?}; {remaining} left unplaced")]
    Unreachable {
        /// Last point placed on the route, or the origin.
        from: Position,
        /// Number of waypoints that could not be placed.
        remaining: usize,
    },
}

/// Orders `waypoints` into a route that starts next to `origin`.
///
/// Among the aligned candidates the nearest one is chosen; when several are
/// equally near, the one listed first wins. The origin itself is not part of
/// the returned route.
pub fn order_waypoints(
    origin: Position,
    waypoints: &[Position],
) -> Result<Vec<Position>, PatrolError> {
    let mut seen = HashSet::with_capacity(waypoints.len());
    for waypoint in waypoints {
        if !seen.insert(*waypoint) {
            return Err(PatrolError::DuplicateWaypoint(*waypoint));
        }
    }

    let mut remaining: Vec<Position> = waypoints.to_vec();
    let mut route = Vec::with_capacity(waypoints.len());
    let mut placed = vec![origin];

    while !remaining.is_empty() {
        let Some(index) = placed
            .iter()
            .rev()
            .find_map(|anchor| nearest_aligned(*anchor, &remaining))
        else {
            return Err(PatrolError::Unreachable {
                from: route.last().copied().unwrap_or(origin),
                remaining: remaining.len(),
            });
        };

        let next = remaining.remove(index);
        placed.push(next);
        route.push(next);
    }

    Ok(route)
}

/// Index of the closest waypoint sharing an axis with `anchor`; the earliest
/// listed wins a tie.
fn nearest_aligned(anchor: Position, remaining: &[Position]) -> Option<usize> {
    let mut nearest: Option<(usize, u32)> = None;
    for (index, candidate) in remaining.iter().enumerate() {
        if !anchor.is_axis_aligned_with(*candidate) {
            continue;
        }

        let distance = anchor.manhattan_distance(*candidate);
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((index, distance));
        }
    }
    nearest.map(|(index, _)| index)
}
