/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbour lookups.
 * It divides the world rectangle into square cells so a query only visits the
 * cells overlapping the search circle instead of every agent.
 *
 * Optimized for performance by:
 * - Using direct coordinate calculations instead of vector operations
 * - Reusing cell allocations between frames
 * - Clamping out-of-world positions to the border cells
 */

use nannou::prelude::*;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub grid: Vec<Vec<usize>>,
    pub cols: usize,
    pub rows: usize,
    origin: Vec2,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, bounds: Rect) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = ((bounds.w() / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.h() / cell_size).ceil() as usize).max(1);

        Self {
            cell_size,
            grid: vec![Vec::new(); cols * rows],
            cols,
            rows,
            origin: vec2(bounds.left(), bounds.bottom()),
        }
    }

    // Convert world coordinates to (column, row), clamped to the grid
    #[inline]
    fn cell_coords(&self, pos: Point2) -> (usize, usize) {
        let col = ((pos.x - self.origin.x) / self.cell_size).floor();
        let row = ((pos.y - self.origin.y) / self.cell_size).floor();
        (
            col.clamp(0.0, self.cols as f32 - 1.0) as usize,
            row.clamp(0.0, self.rows as f32 - 1.0) as usize,
        )
    }

    // Convert world coordinates to grid cell index
    #[inline]
    pub fn pos_to_cell_index(&self, pos: Point2) -> usize {
        let (col, row) = self.cell_coords(pos);
        row * self.cols + col
    }

    // Clear the grid
    pub fn clear(&mut self) {
        for cell in &mut self.grid {
            cell.clear();
        }
    }

    // Insert an agent into the grid
    #[inline]
    pub fn insert(&mut self, index: usize, position: Point2) {
        let cell_index = self.pos_to_cell_index(position);
        self.grid[cell_index].push(index);
    }

    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Point2>,
    {
        self.clear();
        for (i, position) in positions.into_iter().enumerate() {
            self.insert(i, position);
        }
    }

    // Candidate indices from every cell overlapping the query circle's bounding box.
    // Callers still filter by exact distance.
    pub fn query(&self, position: Point2, radius: f32) -> Vec<usize> {
        let reach = (radius / self.cell_size).ceil().max(1.0) as isize;
        let (col, row) = self.cell_coords(position);
        let (col, row) = (col as isize, row as isize);

        let min_col = (col - reach).max(0) as usize;
        let max_col = (col + reach).min(self.cols as isize - 1) as usize;
        let min_row = (row - reach).max(0) as usize;
        let max_row = (row + reach).min(self.rows as isize - 1) as usize;

        let mut result = Vec::new();
        for r in min_row..=max_row {
            let row_index = r * self.cols;
            for c in min_col..=max_col {
                result.extend_from_slice(&self.grid[row_index + c]);
            }
        }
        result
    }
}
