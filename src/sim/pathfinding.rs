//! Grid A* over 4-connected unit-cost moves
//!
//! The Manhattan heuristic is admissible for this move set, so returned paths
//! are shortest. Ties between equal-priority nodes resolve by insertion order;
//! callers must not depend on which of several optimal paths comes back.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::grid::{Cell, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    index: usize,
    g_cost: u32,
    f_cost: u32,
    insertion_order: u64,
}

impl OpenNode {
    #[inline]
    fn h_cost(&self) -> u32 {
        self.f_cost - self.g_cost
    }
}

// BinaryHeap is a max-heap; invert so the lowest f (then h, then oldest) pops first.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost().cmp(&self.h_cost()))
            .then_with(|| other.insertion_order.cmp(&self.insertion_order))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `start` to `goal`, inclusive of both ends
///
/// Returns an empty path when either end is blocked or out of range, or when
/// the goal is unreachable, and `[start]` when `start == goal`.
pub fn find_path(grid: &Grid, start: Cell, goal: Cell) -> Vec<Cell> {
    if grid.is_blocked(start) || grid.is_blocked(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }
    let (Some(start_index), Some(goal_index)) = (grid.index_of(start), grid.index_of(goal)) else {
        return Vec::new();
    };

    let mut best_g = vec![u32::MAX; grid.len()];
    let mut parent: Vec<Option<usize>> = vec![None; grid.len()];
    let mut open = BinaryHeap::new();
    let mut next_insertion = 0u64;

    best_g[start_index] = 0;
    open.push(OpenNode {
        index: start_index,
        g_cost: 0,
        f_cost: start.manhattan(goal),
        insertion_order: next_insertion,
    });

    while let Some(current) = open.pop() {
        // Stale entry superseded by a cheaper push
        if current.g_cost > best_g[current.index] {
            continue;
        }
        if current.index == goal_index {
            return reconstruct(grid, &parent, start_index, goal_index);
        }

        let tentative_g = current.g_cost + 1;
        for neighbor in grid.cell_at(current.index).neighbors() {
            if grid.is_blocked(neighbor) {
                continue;
            }
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if tentative_g >= best_g[neighbor_index] {
                continue;
            }

            best_g[neighbor_index] = tentative_g;
            parent[neighbor_index] = Some(current.index);
            next_insertion += 1;
            open.push(OpenNode {
                index: neighbor_index,
                g_cost: tentative_g,
                f_cost: tentative_g + neighbor.manhattan(goal),
                insertion_order: next_insertion,
            });
        }
    }

    Vec::new()
}

fn reconstruct(
    grid: &Grid,
    parent: &[Option<usize>],
    start_index: usize,
    goal_index: usize,
) -> Vec<Cell> {
    let mut path = vec![grid.cell_at(goal_index)];
    let mut cursor = goal_index;
    while cursor != start_index {
        match parent[cursor] {
            Some(prev) => {
                cursor = prev;
                path.push(grid.cell_at(cursor));
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// Number of moves in a path (cells minus one)
#[inline]
pub fn path_cost(path: &[Cell]) -> usize {
    path.len().saturating_sub(1)
}
