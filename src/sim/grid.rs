//! Static occupancy grid rasterized from wall geometry
//!
//! Cells are addressed as (row, col) with row 0 at y = 0. Coordinates are
//! signed so positions outside the arena map to out-of-range cells, which
//! every query treats as blocked.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Wall;
use crate::consts::LOS_STEP;

/// A grid cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Manhattan distance in cells
    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// 4-connected neighbours (may be out of range)
    #[inline]
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.row - 1, self.col),
            Cell::new(self.row + 1, self.col),
            Cell::new(self.row, self.col - 1),
            Cell::new(self.row, self.col + 1),
        ]
    }
}

/// Immutable occupancy map
#[derive(Debug, Clone)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cell_size: f32,
    /// Row-major, true = blocked
    blocked: Vec<bool>,
}

impl Grid {
    /// Rasterize every wall into the cells its bounding box touches
    ///
    /// The far edge is inclusive, so a wall ending exactly on a cell boundary
    /// still blocks the next cell. That extra cell keeps paths from cutting
    /// diagonally past corners.
    pub fn build(walls: &[Wall], cell_size: f32, width: f32, height: f32) -> Self {
        let rows = (height / cell_size) as i32;
        let cols = (width / cell_size) as i32;
        let mut blocked = vec![false; (rows.max(0) * cols.max(0)) as usize];

        for wall in walls {
            let col_start = (wall.pos.x / cell_size).floor() as i32;
            let row_start = (wall.pos.y / cell_size).floor() as i32;
            let col_end = ((wall.pos.x + wall.size.x) / cell_size).floor() as i32;
            let row_end = ((wall.pos.y + wall.size.y) / cell_size).floor() as i32;

            for row in row_start.max(0)..=row_end.min(rows - 1) {
                for col in col_start.max(0)..=col_end.min(cols - 1) {
                    blocked[(row * cols + col) as usize] = true;
                }
            }
        }

        Self {
            rows,
            cols,
            cell_size,
            blocked,
        }
    }

    /// An all-free grid of the given dimensions
    pub fn open(rows: i32, cols: i32, cell_size: f32) -> Self {
        Self {
            rows,
            cols,
            cell_size,
            blocked: vec![false; (rows.max(0) * cols.max(0)) as usize],
        }
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.rows && cell.col >= 0 && cell.col < self.cols
    }

    /// Dense index of an in-range cell
    #[inline]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.row * self.cols + cell.col) as usize)
    }

    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        let index = index as i32;
        Cell::new(index / self.cols, index % self.cols)
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// True for blocked cells and for anything outside the grid
    #[inline]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.index_of(cell).is_none_or(|i| self.blocked[i])
    }

    /// Mark a single cell (used to author test layouts)
    pub fn set_blocked(&mut self, cell: Cell, blocked: bool) {
        if let Some(i) = self.index_of(cell) {
            self.blocked[i] = blocked;
        }
    }

    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> Cell {
        Cell::new(
            (pos.y / self.cell_size).floor() as i32,
            (pos.x / self.cell_size).floor() as i32,
        )
    }

    #[inline]
    pub fn cell_to_world_center(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            cell.col as f32 * self.cell_size + self.cell_size / 2.0,
            cell.row as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    #[inline]
    pub fn is_point_blocked(&self, pos: Vec2) -> bool {
        self.is_blocked(self.world_to_cell(pos))
    }

    /// Sample the segment every `LOS_STEP` units, failing on the first blocked sample
    ///
    /// The start point itself is not sampled; a zero-length segment samples
    /// its single point once.
    pub fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        let delta = to - from;
        let steps = ((delta.length() / LOS_STEP) as u32).max(1);
        (1..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            !self.is_point_blocked(from + delta * t)
        })
    }

    /// Pick a random free cell away from the arena edge
    ///
    /// Draws rows from [2, rows-3] and columns from [2, cols-3]; gives up
    /// after `attempts` blocked draws.
    pub fn random_free_cell<R: Rng>(&self, rng: &mut R, attempts: u32) -> Option<Cell> {
        let (row_max, col_max) = (self.rows - 3, self.cols - 3);
        if row_max < 2 || col_max < 2 {
            return None;
        }
        (0..attempts)
            .map(|_| Cell::new(rng.random_range(2..=row_max), rng.random_range(2..=col_max)))
            .find(|&cell| !self.is_blocked(cell))
    }

    /// Count of blocked cells
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|b| **b).count()
    }
}
