#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateless A* search over the orthogonal tile grid.
//!
//! Guards re-plan every time they move, so the primary entry point,
//! [`find_next_step`], only reports the first step of the discovered route.
//! Nodes are scored by steps taken plus the Manhattan distance to the goal.
//! Nodes with equal scores are expanded in the order they were discovered,
//! which keeps the chosen route stable between runs.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use heist_core::{Position, SearchTile, TileQuery};

/// Computes the first step of a shortest route from `start` to `goal`.
///
/// Returns `None` when the goal equals the start or cannot be reached.
#[must_use]
pub fn find_next_step<Q>(surface: &Q, start: Position, goal: Position) -> Option<Position>
where
    Q: TileQuery + ?Sized,
{
    Search::run(surface, start, goal)?.first_step()
}

/// Computes a complete shortest route from `start` to `goal`.
///
/// The returned positions exclude `start` and end with `goal`.
#[must_use]
pub fn find_path<Q>(surface: &Q, start: Position, goal: Position) -> Option<Vec<Position>>
where
    Q: TileQuery + ?Sized,
{
    Some(Search::run(surface, start, goal)?.route())
}

#[derive(Clone, Copy, Debug)]
struct Node {
    tile: SearchTile,
    parent: Option<usize>,
}

/// Finished search whose node arena links the goal back to the start.
#[derive(Debug)]
struct Search {
    nodes: Vec<Node>,
    goal: usize,
}

impl Search {
    fn run<Q>(surface: &Q, start: Position, goal: Position) -> Option<Self>
    where
        Q: TileQuery + ?Sized,
    {
        if start == goal {
            return None;
        }

        let origin = SearchTile::origin(start, goal);
        let mut nodes = vec![Node {
            tile: origin,
            parent: None,
        }];
        let mut open = BinaryHeap::new();
        open.push(Reverse((origin.score(), 0_u64, 0_usize)));
        let mut best_cost: HashMap<Position, u32> = HashMap::new();
        let _ = best_cost.insert(start, 0);
        let mut closed: HashSet<Position> = HashSet::new();
        let mut sequence = 1_u64;

        while let Some(Reverse((_, _, index))) = open.pop() {
            let node = nodes[index];
            let position = node.tile.position;

            // Superseded by a cheaper entry for the same tile.
            if closed.contains(&position) {
                continue;
            }
            if best_cost
                .get(&position)
                .is_some_and(|&known| known < node.tile.cost)
            {
                continue;
            }

            if position == goal {
                return Some(Self { nodes, goal: index });
            }

            let _ = closed.insert(position);

            for neighbor in surface.neighbors_of(node.tile, goal) {
                if closed.contains(&neighbor.position) {
                    continue;
                }
                if let Some(&known) = best_cost.get(&neighbor.position) {
                    if known <= neighbor.cost {
                        continue;
                    }
                }

                let _ = best_cost.insert(neighbor.position, neighbor.cost);
                nodes.push(Node {
                    tile: neighbor,
                    parent: Some(index),
                });
                open.push(Reverse((neighbor.score(), sequence, nodes.len() - 1)));
                sequence += 1;
            }
        }

        None
    }

    fn first_step(&self) -> Option<Position> {
        let mut index = self.goal;
        loop {
            let node = self.nodes.get(index)?;
            let parent = node.parent?;
            if self.nodes.get(parent)?.parent.is_none() {
                return Some(node.tile.position);
            }
            index = parent;
        }
    }

    fn route(&self) -> Vec<Position> {
        let mut route = Vec::new();
        let mut cursor = self.nodes.get(self.goal);
        while let Some(node) = cursor {
            let Some(parent) = node.parent else {
                break;
            };
            route.push(node.tile.position);
            cursor = self.nodes.get(parent);
        }
        route.reverse();
        route
    }
}
