//! # Collision Resolution
//!
//! After a block is dragged, created or otherwise moved, it may sit on top
//! of other blocks. Resolution relocates that one block, never the blocks it
//! collides with, to the nearest free spot:
//!
//! 1. Same column, scanning down up to [`SEARCH_DISTANCE`] rows.
//! 2. Rows further down with the column drifting left and right, widening
//!    by one column per row of distance.
//! 3. Below everything, which is always free.
//!
//! The search runs in a bounded loop, but the obstacle grid is the same on
//! every pass and step 3 is always free. A movable block that conflicts is
//! therefore always settled on pass 1. [`Resolution::Unresolved`] comes back
//! only for a budget of 0, which callers use to skip relocation.

use std::cmp::Ordering;

use tracing::{debug, warn};

use super::grid::{max_bottom, OccupancyGrid, Rect};
use crate::model::{Block, BlockId, Position, GRID_COLUMNS};

/// How far the same-column and drifting searches look.
pub const SEARCH_DISTANCE: u32 = 20;

/// Default number of relocation passes before giving up.
///
/// Any budget of 1 or more settles a movable block in one pass (see the
/// module docs). Only 0 changes the outcome.
pub const MAX_RESOLVE_ITERATIONS: usize = 10;

/// What resolution did to the moved block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No conflict; nothing moved.
    Clear,
    /// The block was moved from `from` to `to` after `iterations` passes.
    Relocated {
        from: Position,
        to: Position,
        iterations: usize,
    },
    /// The block is pinned and conflicts; it stays where it is.
    Pinned,
    /// Still conflicting once the pass budget ran out.
    Unresolved { iterations: usize },
    /// No block with the given id.
    NotFound,
}

impl Resolution {
    /// True when the moved block ends up overlapping nothing.
    pub fn is_settled(&self) -> bool {
        matches!(self, Resolution::Clear | Resolution::Relocated { .. })
    }
}

/// A block collection after resolution, plus what happened.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub blocks: Vec<Block>,
    pub resolution: Resolution,
}

/// Pinned blocks first, then top-to-bottom, left-to-right.
pub fn rasterization_order(blocks: &[Block]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&blocks[a], &blocks[b]);
        match (a.is_fixed, b.is_fixed) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => (a.position.row, a.position.column).cmp(&(b.position.row, b.position.column)),
        }
    });
    order
}

/// Occupancy of every block except `skip`.
fn occupancy_without(blocks: &[Block], skip: usize) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new();
    for i in rasterization_order(blocks) {
        if i != skip {
            grid.mark(Rect::of(&blocks[i]));
        }
    }
    grid
}

/// Whether block `idx` hits the grid or overlaps any other block.
fn has_conflict(blocks: &[Block], idx: usize, grid: &OccupancyGrid) -> bool {
    let rect = Rect::of(&blocks[idx]);
    !grid.is_free(rect)
        || blocks
            .iter()
            .enumerate()
            .any(|(i, other)| i != idx && rect.overlaps(&Rect::of(other)))
}

/// Nearest free top-left corner for `block`, never `None`.
fn nearest_free_position(block: &Block, blocks: &[Block], grid: &OccupancyGrid) -> Position {
    let rect = Rect::of(block);
    let pin_left = block.is_full_width();
    let home_column = if pin_left { 0 } else { rect.column };

    for row in rect.row..rect.row.saturating_add(SEARCH_DISTANCE) {
        let candidate = rect.moved_to(row, home_column);
        if grid.fits(candidate) {
            return candidate.position();
        }
    }

    let max_column = GRID_COLUMNS.saturating_sub(rect.width) as i64;
    for distance in 1..=SEARCH_DISTANCE {
        let row = rect.row.saturating_add(distance);
        let d = distance as i64;
        for offset in -d..=d {
            let column = rect.column as i64 + offset;
            if column < 0 || column > max_column || (pin_left && column != 0) {
                continue;
            }
            let candidate = rect.moved_to(row, column as u32);
            if grid.fits(candidate) {
                return candidate.position();
            }
        }
    }

    let column = if pin_left {
        0
    } else {
        rect.column.min(max_column as u32)
    };
    Position::new(max_bottom(blocks).saturating_add(1), column)
}

/// Move `moved_id` off whatever it overlaps.
///
/// Only the moved block is relocated; pinned blocks and the other blocks
/// keep their positions. The returned collection keeps the input order, so
/// resolving an already conflict-free collection returns it unchanged.
pub fn resolve_conflicts(blocks: &[Block], moved_id: &BlockId, max_iterations: usize) -> Resolved {
    let mut blocks = blocks.to_vec();
    let Some(idx) = blocks.iter().position(|b| &b.id == moved_id) else {
        return Resolved {
            blocks,
            resolution: Resolution::NotFound,
        };
    };

    let grid = occupancy_without(&blocks, idx);
    if !has_conflict(&blocks, idx, &grid) {
        return Resolved {
            blocks,
            resolution: Resolution::Clear,
        };
    }

    if blocks[idx].is_fixed {
        warn!(block = %moved_id, "pinned block overlaps others; leaving it in place");
        return Resolved {
            blocks,
            resolution: Resolution::Pinned,
        };
    }

    let from = blocks[idx].position;
    for iteration in 1..=max_iterations {
        let grid = occupancy_without(&blocks, idx);
        let to = nearest_free_position(&blocks[idx], &blocks, &grid);
        blocks[idx].position = to;

        if !has_conflict(&blocks, idx, &grid) {
            debug!(block = %moved_id, ?from, ?to, iteration, "relocated block");
            return Resolved {
                blocks,
                resolution: Resolution::Relocated {
                    from,
                    to,
                    iterations: iteration,
                },
            };
        }
    }

    warn!(block = %moved_id, max_iterations, "block still conflicts after resolution");
    Resolved {
        blocks,
        resolution: Resolution::Unresolved {
            iterations: max_iterations,
        },
    }
}
