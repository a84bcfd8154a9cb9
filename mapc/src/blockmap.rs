use super::errors::{ErrorKind, Result};
use super::geometry::segment_touches_box;
use failchain::bail;
use math::{Aabb2, Pnt2d};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CELL_SIZE: f64 = 128.0;
pub const MAX_BLOCKMAP_CELLS: usize = 1 << 20;

fn checked_cell_size(cell_size: f64) -> f64 {
    if cell_size > 0.0 {
        cell_size
    } else {
        DEFAULT_CELL_SIZE
    }
}

/// A uniform grid of cells over the map, each listing the indices of the elements touching it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blockmap {
    origin: Pnt2d,
    cell_size: f64,
    width: usize,
    height: usize,
    cells: Vec<Vec<usize>>,
}

impl Blockmap {
    /// A grid with no cells.
    pub fn empty(cell_size: f64) -> Blockmap {
        Blockmap {
            origin: Pnt2d::new(0.0, 0.0),
            cell_size: checked_cell_size(cell_size),
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    /// A grid covering `bounds`; empty bounds give a grid with no cells. Fails if the grid would
    /// need more than `MAX_BLOCKMAP_CELLS` cells.
    pub fn new(bounds: &Aabb2, cell_size: f64) -> Result<Blockmap> {
        if bounds.is_empty() {
            return Ok(Blockmap::empty(cell_size));
        }
        let cell_size = checked_cell_size(cell_size);
        let size = bounds.size();
        let cells_along = |extent: f64| {
            let cells = (extent / cell_size).floor();
            if cells.is_finite() && cells < MAX_BLOCKMAP_CELLS as f64 {
                Some(cells as usize + 1)
            } else {
                None
            }
        };
        let (width, height) = match (cells_along(size.x), cells_along(size.y)) {
            (Some(width), Some(height))
                if width
                    .checked_mul(height)
                    .map_or(false, |cells| cells <= MAX_BLOCKMAP_CELLS) =>
            {
                (width, height)
            }
            _ => bail!(ErrorKind::blockmap_too_large(size.x, size.y, cell_size)),
        };
        Ok(Blockmap {
            origin: bounds.min,
            cell_size,
            width,
            height,
            cells: vec![Vec::new(); width * height],
        })
    }

    /// An empty grid with the same origin and dimensions as `self`.
    pub fn same_grid(&self) -> Blockmap {
        Blockmap {
            origin: self.origin,
            cell_size: self.cell_size,
            width: self.width,
            height: self.height,
            cells: vec![Vec::new(); self.cells.len()],
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, x: usize, y: usize) -> &[usize] {
        if x < self.width && y < self.height {
            &self.cells[y * self.width + x]
        } else {
            &[]
        }
    }

    pub fn cell_at(&self, point: Pnt2d) -> Option<(usize, usize)> {
        let x = ((point.x - self.origin.x) / self.cell_size).floor();
        let y = ((point.y - self.origin.y) / self.cell_size).floor();
        if x < 0.0 || y < 0.0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some((x as usize, y as usize))
        }
    }

    pub fn cell_bounds(&self, x: usize, y: usize) -> Aabb2 {
        let min = Pnt2d::new(
            self.origin.x + x as f64 * self.cell_size,
            self.origin.y + y as f64 * self.cell_size,
        );
        Aabb2 {
            min,
            max: Pnt2d::new(min.x + self.cell_size, min.y + self.cell_size),
        }
    }

    /// The inclusive range of cells overlapped by `aabb`, clamped to the grid.
    fn cell_range(&self, aabb: &Aabb2) -> Option<((usize, usize), (usize, usize))> {
        if self.is_empty() || aabb.is_empty() {
            return None;
        }
        let clamp = |value: f64, origin: f64, cells: usize| {
            let cell = ((value - origin) / self.cell_size).floor();
            if cell < 0.0 {
                0
            } else {
                (cell as usize).min(cells - 1)
            }
        };
        let max_x = self.origin.x + self.width as f64 * self.cell_size;
        let max_y = self.origin.y + self.height as f64 * self.cell_size;
        if aabb.max.x < self.origin.x || aabb.max.y < self.origin.y || aabb.min.x > max_x
            || aabb.min.y > max_y
        {
            return None;
        }
        Some((
            (
                clamp(aabb.min.x, self.origin.x, self.width),
                clamp(aabb.min.y, self.origin.y, self.height),
            ),
            (
                clamp(aabb.max.x, self.origin.x, self.width),
                clamp(aabb.max.y, self.origin.y, self.height),
            ),
        ))
    }

    /// Links `element` into every cell the segment passes through.
    pub fn link_segment(&mut self, element: usize, from: Pnt2d, to: Pnt2d) {
        let range = match self.cell_range(&Aabb2::from_points(vec![from, to])) {
            Some(range) => range,
            None => return,
        };
        let ((min_x, min_y), (max_x, max_y)) = range;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if segment_touches_box(from, to, &self.cell_bounds(x, y)) {
                    self.link(element, x, y);
                }
            }
        }
    }

    /// Links `element` into every cell overlapped by `aabb`.
    pub fn link_box(&mut self, element: usize, aabb: &Aabb2) {
        if let Some(((min_x, min_y), (max_x, max_y))) = self.cell_range(aabb) {
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    self.link(element, x, y);
                }
            }
        }
    }

    fn link(&mut self, element: usize, x: usize, y: usize) {
        let cell = &mut self.cells[y * self.width + x];
        if cell.last() != Some(&element) {
            cell.push(element);
        }
    }

    /// Every element linked into a cell overlapped by `aabb`, sorted and without repeats.
    pub fn query_box(&self, aabb: &Aabb2) -> Vec<usize> {
        let mut found = Vec::new();
        if let Some(((min_x, min_y), (max_x, max_y))) = self.cell_range(aabb) {
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    found.extend_from_slice(self.cell(x, y));
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}
