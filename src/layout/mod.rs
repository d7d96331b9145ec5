//! # Grid Layout Engine
//!
//! Every block on a page sits on a 12-column grid that grows downward
//! without limit. The engine keeps one promise: **at rest, no two blocks
//! overlap**, and no block hangs past the right edge.
//!
//! ## The passes
//!
//! ```text
//!   add block ──► placement ──► resolve
//!   drag stop ──────────────► resolve
//!   resize    ──► displace ──► reconcile (resolve each block)
//!   delete    ──► compact
//! ```
//!
//! - [`placement`] picks the first free row at the column the block's
//!   alignment asks for.
//! - [`resolve`] moves one block off whatever it landed on, preferring its
//!   own column, then a widening window below, then the bottom of the page.
//! - [`compact`] slides blocks of the same column and width up into the gap
//!   a deletion left.
//! - [`resize`] pushes the neighbours a growing block runs into.
//!
//! Pinned blocks (`is_fixed`) are obstacles to every pass and are never
//! moved by any of them.
//!
//! All passes are plain functions from a block slice to a new `Vec<Block>`.
//! Nothing here knows about sessions, storage or rendering.

pub mod compact;
pub mod grid;
pub mod placement;
pub mod resize;
pub mod resolve;

use std::fmt;

use crate::model::{Block, BlockId, GRID_COLUMNS};

pub use compact::compact_after_deletion;
pub use grid::{max_bottom, overlaps, row_ceiling, OccupancyGrid, Rect};
pub use placement::find_available_position;
pub use resize::{reconcile, resize, Reconciled, ResizeOutcome, ResizeResult};
pub use resolve::{resolve_conflicts, Resolution, Resolved, MAX_RESOLVE_ITERATIONS, SEARCH_DISTANCE};

/// A broken layout invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Overlap(BlockId, BlockId),
    OutOfBounds(BlockId),
    FullWidthOffset(BlockId),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Overlap(a, b) => write!(f, "{a} overlaps {b}"),
            Violation::OutOfBounds(id) => write!(f, "{id} extends past column {GRID_COLUMNS}"),
            Violation::FullWidthOffset(id) => write!(f, "{id} is full-width but not at column 0"),
        }
    }
}

/// Check a collection against the layout invariants. Empty means valid.
pub fn validate(blocks: &[Block]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, a) in blocks.iter().enumerate() {
        if a.right() > GRID_COLUMNS {
            violations.push(Violation::OutOfBounds(a.id.clone()));
        }
        if a.is_full_width() && a.position.column != 0 {
            violations.push(Violation::FullWidthOffset(a.id.clone()));
        }
        for b in &blocks[i + 1..] {
            if overlaps(a, b) {
                violations.push(Violation::Overlap(a.id.clone(), b.id.clone()));
            }
        }
    }
    violations
}

const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Label used for the block at `index` in [`render_ascii`].
pub fn ascii_label(index: usize) -> char {
    LABELS.get(index).map_or('#', |&b| b as char)
}

/// Draw the grid one character per cell: `.` for empty, the block's label
/// for covered, `!` where blocks overlap. Rows run to the lowest bottom.
pub fn render_ascii(blocks: &[Block]) -> String {
    let height = grid::max_bottom(blocks) as usize;
    let width = GRID_COLUMNS as usize;
    let mut canvas = vec![vec!['.'; width]; height];

    for (index, block) in blocks.iter().enumerate() {
        let label = ascii_label(index);
        for (row, column) in Rect::of(block).cells() {
            let Some(cell) = canvas
                .get_mut(row as usize)
                .and_then(|r| r.get_mut(column as usize))
            else {
                continue;
            };
            *cell = if *cell == '.' { label } else { '!' };
        }
    }

    let mut out = String::with_capacity(height * (width + 6));
    for (row, cells) in canvas.iter().enumerate() {
        out.push_str(&format!("{row:>4} "));
        out.extend(cells.iter());
        out.push('\n');
    }
    out
}
