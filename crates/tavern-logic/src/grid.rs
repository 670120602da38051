//! Sub-tile walkability grid used by the pathfinder.
//!
//! The grid is finer than the render tile grid: each tile is split into
//! `grid_scale x grid_scale` cells. Blocking furniture and chairs mark the
//! cells their boxes cover as non-walkable.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Vec2};

/// Integer cell coordinate. Signed so neighbour offsets can step outside
/// the grid without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Walkability flags at sub-tile resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cell_size: f32,
    walkable: Vec<bool>,
}

impl Grid {
    /// Fully walkable grid.
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            walkable: vec![true; width * height],
        }
    }

    /// Build the grid for a room from static blocking boxes plus chairs.
    ///
    /// Chairs are blocked like any other obstacle; a search that targets a
    /// chair unblocks its cell through [`Grid::unblock`].
    pub fn build(
        width: usize,
        height: usize,
        cell_size: f32,
        blocking: &[Rect],
        chairs: &[Rect],
    ) -> Self {
        let mut grid = Self::new(width, height, cell_size);
        for rect in blocking.iter().chain(chairs) {
            grid.block_rect(rect);
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Out-of-range cells are never walkable.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).map(|i| self.walkable[i]).unwrap_or(false)
    }

    /// Set a cell's walkability. Out-of-range cells are ignored.
    pub fn set(&mut self, cell: Cell, walkable: bool) {
        if let Some(i) = self.index(cell) {
            self.walkable[i] = walkable;
        }
    }

    /// Mark every cell the rectangle covers, including partially covered ones.
    pub fn block_rect(&mut self, rect: &Rect) {
        let cs = self.cell_size;
        let start_x = (rect.left() / cs).floor() as i32;
        let end_x = (rect.right() / cs).ceil() as i32;
        let start_y = (rect.top() / cs).floor() as i32;
        let end_y = (rect.bottom() / cs).ceil() as i32;
        for y in start_y..end_y {
            for x in start_x..end_x {
                self.set(Cell::new(x, y), false);
            }
        }
    }

    /// Cell containing a world-space point.
    pub fn cell_at(&self, point: Vec2) -> Cell {
        Cell::new(
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    /// World-space centre of a cell.
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            cell.x as f32 * self.cell_size + self.cell_size / 2.0,
            cell.y as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Temporarily force `cell` walkable. The previous value is restored when
    /// the returned guard is dropped, whichever way the caller exits.
    pub fn unblock(&mut self, cell: Cell) -> Unblocked<'_> {
        let previous = self.is_walkable(cell);
        self.set(cell, true);
        Unblocked {
            grid: self,
            cell,
            previous,
        }
    }

    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|w| **w).count()
    }
}

/// Guard returned by [`Grid::unblock`]; reads through to the grid.
pub struct Unblocked<'a> {
    grid: &'a mut Grid,
    cell: Cell,
    previous: bool,
}

impl Deref for Unblocked<'_> {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        self.grid
    }
}

impl Drop for Unblocked<'_> {
    fn drop(&mut self) {
        self.grid.set(self.cell, self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_is_not_walkable() {
        let mut grid = Grid::new(4, 4, 12.0);
        assert!(grid.is_walkable(Cell::new(0, 0)));
        assert!(!grid.is_walkable(Cell::new(-1, 0)));
        assert!(!grid.is_walkable(Cell::new(4, 0)));
        assert!(!grid.is_walkable(Cell::new(0, 4)));
        // No panic, no effect
        grid.set(Cell::new(10, 10), false);
        assert_eq!(grid.walkable_count(), 16);
    }

    #[test]
    fn test_build_blocks_covered_cells() {
        // Box spans x 10..30, y 0..12 -> cells x 0,1,2 on row 0
        let grid = Grid::build(
            8,
            8,
            12.0,
            &[Rect::new(10.0, 0.0, 20.0, 12.0)],
            &[Rect::new(48.0, 48.0, 12.0, 12.0)],
        );
        assert!(!grid.is_walkable(Cell::new(0, 0)));
        assert!(!grid.is_walkable(Cell::new(1, 0)));
        assert!(!grid.is_walkable(Cell::new(2, 0)));
        assert!(grid.is_walkable(Cell::new(3, 0)));
        assert!(grid.is_walkable(Cell::new(0, 1)));
        // Chair exactly one cell
        assert!(!grid.is_walkable(Cell::new(4, 4)));
        assert!(grid.is_walkable(Cell::new(5, 4)));
        assert!(grid.is_walkable(Cell::new(4, 5)));
    }

    #[test]
    fn test_cell_conversions() {
        let grid = Grid::new(10, 10, 12.0);
        assert_eq!(grid.cell_at(Vec2::new(25.0, 11.9)), Cell::new(2, 0));
        assert_eq!(grid.cell_center(Cell::new(2, 0)), Vec2::new(30.0, 6.0));
    }

    #[test]
    fn test_unblock_guard_restores() {
        let mut grid = Grid::new(3, 3, 12.0);
        let cell = Cell::new(1, 1);
        grid.set(cell, false);
        {
            let guard = grid.unblock(cell);
            assert!(guard.is_walkable(cell));
        }
        assert!(!grid.is_walkable(cell));

        // Already walkable cells stay walkable
        let open = Cell::new(0, 0);
        drop(grid.unblock(open));
        assert!(grid.is_walkable(open));
    }
}
