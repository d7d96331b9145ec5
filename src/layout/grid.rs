//! # Grid Geometry
//!
//! Rectangles on the 12-column grid, the overlap predicate every other
//! layout pass relies on, and a rasterized occupancy grid.
//!
//! Rectangles are half-open: a block at column 2 with width 3 covers
//! columns 2, 3 and 4. Two rectangles that only share an edge do not
//! overlap.

use super::resolve::SEARCH_DISTANCE;
use crate::model::{Block, Position, Size, GRID_COLUMNS, MAX_GRID_ROWS};

const COLS: usize = GRID_COLUMNS as usize;

/// A block's footprint in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub row: u32,
    pub column: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(row: u32, column: u32, width: u32, height: u32) -> Self {
        Rect {
            row,
            column,
            width,
            height,
        }
    }

    pub fn at(position: Position, size: Size) -> Self {
        Rect::new(position.row, position.column, size.width, size.height)
    }

    pub fn of(block: &Block) -> Self {
        Rect::at(block.position, block.size)
    }

    /// Same extent, different top-left corner.
    pub fn moved_to(&self, row: u32, column: u32) -> Self {
        Rect { row, column, ..*self }
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    pub fn bottom(&self) -> u32 {
        self.row.saturating_add(self.height)
    }

    pub fn right(&self) -> u32 {
        self.column.saturating_add(self.width)
    }

    /// Whether the rectangle lies horizontally inside the grid.
    pub fn in_bounds(&self) -> bool {
        self.right() <= GRID_COLUMNS
    }

    pub fn contains(&self, row: u32, column: u32) -> bool {
        row >= self.row && row < self.bottom() && column >= self.column && column < self.right()
    }

    /// The overlap predicate. Edge contact is not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.column >= other.right()
            || self.right() <= other.column
            || self.row >= other.bottom()
            || self.bottom() <= other.row)
    }

    /// Every `(row, column)` cell covered, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.row..self.bottom()).flat_map(move |r| (self.column..self.right()).map(move |c| (r, c)))
    }
}

/// Whether two blocks' footprints intersect.
pub fn overlaps(a: &Block, b: &Block) -> bool {
    Rect::of(a).overlaps(&Rect::of(b))
}

/// Lowest bottom edge across the blocks, 0 when empty.
pub fn max_bottom(blocks: &[Block]) -> u32 {
    blocks.iter().map(Block::bottom).max().unwrap_or(0)
}

/// Deepest bottom edge a drop or a resize may reach: [`SEARCH_DISTANCE`]
/// rows past the lowest of `others`, capped at [`MAX_GRID_ROWS`].
pub fn row_ceiling<'a>(others: impl IntoIterator<Item = &'a Block>) -> u32 {
    others
        .into_iter()
        .map(Block::bottom)
        .max()
        .unwrap_or(0)
        .saturating_add(SEARCH_DISTANCE)
        .min(MAX_GRID_ROWS)
}

/// Rasterized map of covered cells. Grows downward on demand; cells past
/// the last column are never stored.
#[derive(Debug, Clone, Default)]
pub struct OccupancyGrid {
    rows: Vec<[bool; COLS]>,
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid covering every block `include` accepts.
    pub fn from_blocks<'a>(
        blocks: impl IntoIterator<Item = &'a Block>,
        mut include: impl FnMut(&Block) -> bool,
    ) -> Self {
        let mut grid = OccupancyGrid::new();
        for block in blocks {
            if include(block) {
                grid.mark(Rect::of(block));
            }
        }
        grid
    }

    pub fn mark(&mut self, rect: Rect) {
        let bottom = rect.bottom() as usize;
        if self.rows.len() < bottom {
            self.rows.resize(bottom, [false; COLS]);
        }
        for (r, c) in rect.cells() {
            if (c as usize) < COLS {
                self.rows[r as usize][c as usize] = true;
            }
        }
    }

    pub fn is_occupied(&self, row: u32, column: u32) -> bool {
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(column as usize))
            .copied()
            .unwrap_or(false)
    }

    /// True when none of the rectangle's cells are covered.
    pub fn is_free(&self, rect: Rect) -> bool {
        !rect.cells().any(|(r, c)| self.is_occupied(r, c))
    }

    /// Free and horizontally inside the grid.
    pub fn fits(&self, rect: Rect) -> bool {
        rect.in_bounds() && self.is_free(rect)
    }

    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockType;

    #[test]
    fn test_overlap_true_for_shared_area() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0, 0, 4, 4);
        assert!(!a.overlaps(&Rect::new(0, 4, 2, 2))); // right edge
        assert!(!a.overlaps(&Rect::new(4, 0, 2, 2))); // bottom edge
        assert!(!a.overlaps(&Rect::new(4, 4, 2, 2))); // corner
    }

    #[test]
    fn test_contained_rect_overlaps() {
        let outer = Rect::new(0, 0, 12, 8);
        let inner = Rect::new(3, 3, 1, 1);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_edges_saturate_at_u32_max() {
        let rect = Rect::new(u32::MAX, u32::MAX - 1, 4, 4);
        assert_eq!(rect.bottom(), u32::MAX);
        assert_eq!(rect.right(), u32::MAX);
        assert!(!rect.in_bounds());
    }

    #[test]
    fn test_row_ceiling_tracks_lowest_block() {
        let blocks = vec![
            Block::new("a", BlockType::Text, "circle", Position::new(0, 0), Size::new(4, 4)),
            Block::new("b", BlockType::Text, "circle", Position::new(6, 4), Size::new(2, 3)),
        ];
        assert_eq!(row_ceiling(&blocks), 9 + SEARCH_DISTANCE);
        assert_eq!(row_ceiling(std::iter::empty()), SEARCH_DISTANCE);

        let deep = [Block::new("d", BlockType::Text, "circle", Position::new(MAX_GRID_ROWS, 0), Size::new(1, 1))];
        assert_eq!(row_ceiling(&deep), MAX_GRID_ROWS);
    }

    #[test]
    fn test_cells_are_row_major() {
        let cells: Vec<_> = Rect::new(1, 2, 2, 2).cells().collect();
        assert_eq!(cells, vec![(1, 2), (1, 3), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_grid_grows_and_marks() {
        let mut grid = OccupancyGrid::new();
        grid.mark(Rect::new(5, 10, 2, 3));
        assert_eq!(grid.height(), 8);
        assert!(grid.is_occupied(5, 10));
        assert!(grid.is_occupied(7, 11));
        assert!(!grid.is_occupied(8, 10));
        assert!(!grid.is_occupied(100, 0));
    }

    #[test]
    fn test_grid_ignores_cells_past_last_column() {
        let mut grid = OccupancyGrid::new();
        grid.mark(Rect::new(0, 10, 4, 1));
        assert!(grid.is_occupied(0, 11));
        assert!(!grid.is_occupied(0, 12));
    }

    #[test]
    fn test_fits_requires_bounds() {
        let grid = OccupancyGrid::new();
        assert!(grid.fits(Rect::new(0, 8, 4, 1)));
        assert!(!grid.fits(Rect::new(0, 9, 4, 1)));
        assert!(grid.is_free(Rect::new(0, 9, 4, 1)));
    }
}
