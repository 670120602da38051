//! A* pathfinding over the sub-tile [`Grid`].
//!
//! Eight-directional movement: orthogonal steps cost 1, diagonal steps cost
//! √2, and a diagonal step is only allowed when both orthogonal cells of the
//! corner are walkable. The heuristic is octile distance, which is exact on
//! an empty grid for this move set.
//!
//! Open-set ties are broken by lower `h`, then by insertion order, so the
//! returned path is deterministic for a given grid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::Vec2;
use crate::grid::{Cell, Grid};

const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// (dx, dy, cost)
const MOVES: [(i32, i32, f32); 8] = [
    (0, -1, 1.0),
    (0, 1, 1.0),
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (-1, -1, SQRT_2),
    (1, -1, SQRT_2),
    (-1, 1, SQRT_2),
    (1, 1, SQRT_2),
];

/// Octile distance between two cells.
pub fn octile_distance(a: Cell, b: Cell) -> f32 {
    let dx = (a.x - b.x).abs() as f32;
    let dy = (a.y - b.y).abs() as f32;
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    hi - lo + lo * SQRT_2
}

#[derive(Debug)]
struct OpenNode {
    f: f32,
    h: f32,
    seq: u64,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the lowest f first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Find a path from `start` to `end`, both inclusive.
///
/// The start cell does not need to be walkable (a character may overlap an
/// obstacle slightly); the end cell does. Returns `None` when no path exists.
pub fn find_path(grid: &Grid, start: Cell, end: Cell) -> Option<Vec<Cell>> {
    if !grid.in_bounds(start) || !grid.is_walkable(end) {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    let width = grid.width();
    let index_of = |c: Cell| c.y as usize * width + c.x as usize;
    let cell_of = |i: usize| Cell::new((i % width) as i32, (i / width) as i32);

    let total = width * grid.height();
    let mut g_score = vec![f32::INFINITY; total];
    let mut came_from: Vec<Option<usize>> = vec![None; total];
    let mut closed = vec![false; total];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    let start_index = index_of(start);
    let end_index = index_of(end);
    g_score[start_index] = 0.0;
    let h = octile_distance(start, end);
    open.push(OpenNode {
        f: h,
        h,
        seq,
        index: start_index,
    });

    while let Some(node) = open.pop() {
        if closed[node.index] {
            continue;
        }
        closed[node.index] = true;

        if node.index == end_index {
            let mut path = vec![end];
            let mut current = end_index;
            while let Some(prev) = came_from[current] {
                path.push(cell_of(prev));
                current = prev;
            }
            path.reverse();
            return Some(path);
        }

        let current = cell_of(node.index);
        for (dx, dy, cost) in MOVES {
            let next = current.offset(dx, dy);
            if !grid.is_walkable(next) {
                continue;
            }
            if dx != 0
                && dy != 0
                && (!grid.is_walkable(current.offset(dx, 0))
                    || !grid.is_walkable(current.offset(0, dy)))
            {
                continue;
            }
            let next_index = index_of(next);
            if closed[next_index] {
                continue;
            }
            let tentative = g_score[node.index] + cost;
            if tentative < g_score[next_index] {
                g_score[next_index] = tentative;
                came_from[next_index] = Some(node.index);
                let h = octile_distance(next, end);
                seq += 1;
                open.push(OpenNode {
                    f: tentative + h,
                    h,
                    seq,
                    index: next_index,
                });
            }
        }
    }

    None
}

/// A walkable cell in the ring around `target`, nearest to `from`.
pub fn approach_cell(grid: &Grid, target: Cell, from: Cell) -> Option<Cell> {
    let mut best: Option<(f32, Cell)> = None;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let cell = target.offset(dx, dy);
            if !grid.is_walkable(cell) {
                continue;
            }
            let d = octile_distance(from, cell);
            if best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, cell));
            }
        }
    }
    best.map(|(_, c)| c)
}

/// Route to an occupied cell such as a chair.
///
/// Tries the nearest walkable neighbour of `target` first. If that fails the
/// search is repeated with `target` itself forced walkable; the cell is
/// restored before this function returns.
pub fn route_to_occupied(grid: &mut Grid, start: Cell, target: Cell) -> Option<Vec<Cell>> {
    if let Some(approach) = approach_cell(grid, target, start) {
        if let Some(path) = find_path(grid, start, approach) {
            return Some(path);
        }
    }
    let unblocked = grid.unblock(target);
    find_path(&unblocked, start, target)
}

/// Total step cost of a cell path.
pub fn path_cost(path: &[Cell]) -> f32 {
    path.windows(2)
        .map(|w| {
            if w[0].x != w[1].x && w[0].y != w[1].y {
                SQRT_2
            } else {
                1.0
            }
        })
        .sum()
}

/// Convert cells to world-space waypoints at cell centres.
pub fn cells_to_waypoints(grid: &Grid, path: &[Cell]) -> Vec<Vec2> {
    path.iter().map(|c| grid.cell_center(*c)).collect()
}
