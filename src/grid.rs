//! Bounded multi-occupant grid and the cell searches used for placement.

use crate::types::{Pos, WolfId};
use rand::prelude::*;

/// Grid width in cells.
pub const GRID_WIDTH: usize = 240;
/// Grid height in cells.
pub const GRID_HEIGHT: usize = 180;
/// Territory radius (Chebyshev distance) around a pack's anchor.
pub const PACK_RADIUS: usize = 3;

/// Random probes tried before an exhaustive scan for an empty cell.
const MAX_PROBES: usize = 64;

/// Non-toroidal grid where each cell holds any number of wolves.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<WolfId>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let mut cells = Vec::new();
        cells.resize_with(width * height, Vec::new);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn occupants(&self, pos: Pos) -> &[WolfId] {
        &self.cells[self.index(pos)]
    }

    pub fn is_cell_empty(&self, pos: Pos) -> bool {
        self.occupants(pos).is_empty()
    }

    pub fn place(&mut self, id: WolfId, pos: Pos) {
        let idx = self.index(pos);
        self.cells[idx].push(id);
    }

    pub fn remove(&mut self, id: WolfId, pos: Pos) {
        let idx = self.index(pos);
        let cell = &mut self.cells[idx];
        if let Some(i) = cell.iter().position(|&occupant| occupant == id) {
            cell.swap_remove(i);
        }
    }

    /// Move `id` from `from` (if placed) to `to`.
    pub fn move_to(&mut self, id: WolfId, from: Option<Pos>, to: Pos) {
        if let Some(from) = from {
            self.remove(id, from);
        }
        self.place(id, to);
    }

    /// Moore neighborhood of `center` within `radius`, clipped to the grid.
    /// The center itself is excluded.
    pub fn neighborhood(&self, center: Pos, radius: usize) -> Vec<Pos> {
        let (x_min, x_max) = span(center.0, radius, self.width);
        let (y_min, y_max) = span(center.1, radius, self.height);
        let mut cells = Vec::with_capacity((x_max - x_min + 1) * (y_max - y_min + 1));
        for x in x_min..=x_max {
            for y in y_min..=y_max {
                if (x, y) != center {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    /// Whether no wolf occupies the square of `radius` around `center`, center included.
    pub fn is_area_clear(&self, center: Pos, radius: usize) -> bool {
        self.is_cell_empty(center)
            && self
                .neighborhood(center, radius)
                .into_iter()
                .all(|pos| self.is_cell_empty(pos))
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Pos {
        (rng.random_range(0..self.width), rng.random_range(0..self.height))
    }

    /// Sample cells until one has a clear area of `radius` around it.
    ///
    /// Retries are unbounded: territories cover a small share of the grid.
    pub fn find_territory_center<R: Rng>(&self, rng: &mut R, radius: usize) -> Pos {
        loop {
            let pos = self.random_cell(rng);
            if self.is_area_clear(pos, radius) {
                return pos;
            }
        }
    }

    /// Random empty cell in the neighborhood of `center`, each candidate tried once.
    pub fn find_empty_near<R: Rng>(&self, rng: &mut R, center: Pos, radius: usize) -> Option<Pos> {
        let mut cells = self.neighborhood(center, radius);
        cells.shuffle(rng);
        cells.into_iter().find(|&pos| self.is_cell_empty(pos))
    }

    /// Random empty cell anywhere on the grid.
    pub fn find_empty_cell<R: Rng>(&self, rng: &mut R) -> Option<Pos> {
        for _ in 0..MAX_PROBES {
            let pos = self.random_cell(rng);
            if self.is_cell_empty(pos) {
                return Some(pos);
            }
        }
        let empty: Vec<Pos> = (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| (x, y)))
            .filter(|&pos| self.is_cell_empty(pos))
            .collect();
        empty.choose(rng).copied()
    }

    fn index(&self, (x, y): Pos) -> usize {
        assert!(x < self.width && y < self.height, "cell {:?} is off the grid", (x, y));
        y * self.width + x
    }
}

/// Inclusive range `[c - r, c + r]` clipped to `[0, len)`.
fn span(c: usize, r: usize, len: usize) -> (usize, usize) {
    (c.saturating_sub(r), (c + r).min(len - 1))
}

/// Chebyshev distance between two cells.
pub fn distance(a: Pos, b: Pos) -> usize {
    a.0.abs_diff(b.0).max(a.1.abs_diff(b.1))
}
