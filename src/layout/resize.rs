//! # Resize
//!
//! Growing a block never gets refused because a neighbour is in the way.
//! Instead, the neighbours hit by the newly covered cells are pushed out of
//! the way (down, or right when there is room), and then every other block
//! is reconciled through collision resolution so the result is
//! overlap-free.
//!
//! Pinned neighbours cannot be pushed. A resize that would grow into one is
//! refused and the collection comes back unchanged.
//!
//! Growth downward stops at [`row_ceiling`]: at most
//! [`SEARCH_DISTANCE`](super::resolve::SEARCH_DISTANCE) rows past the
//! current bottom of the page.

use tracing::{debug, warn};

use super::grid::{row_ceiling, Rect};
use super::resolve::resolve_conflicts;
use crate::model::{Block, BlockId, Size, GRID_COLUMNS};

/// What happened to a resize request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The block now has `size`. `displaced` lists the neighbours pushed by
    /// the displacement pass; `unsettled` those reconciliation left
    /// overlapping.
    Resized {
        size: Size,
        displaced: Vec<BlockId>,
        unsettled: Vec<BlockId>,
    },
    /// The clamped size equals the current size.
    Unchanged,
    /// Growing would cover a pinned block.
    Blocked { by: BlockId },
    NotFound,
}

#[derive(Debug, Clone)]
pub struct ResizeResult {
    pub blocks: Vec<Block>,
    pub outcome: ResizeOutcome,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub blocks: Vec<Block>,
    /// Blocks whose resolution did not settle, in processing order.
    pub unsettled: Vec<BlockId>,
}

/// Size after applying the deltas: at least 1×1, square for circular
/// templates, never past the last column and never taller than
/// `max_height`.
pub fn target_size(block: &Block, delta_width: i32, delta_height: i32, max_height: u32) -> Size {
    let clamp = |current: u32, delta: i32| {
        (i64::from(current) + i64::from(delta)).clamp(1, i64::from(u32::MAX)) as u32
    };
    let mut width = clamp(block.size.width, delta_width);
    let mut height = clamp(block.size.height, delta_height);

    let max_width = GRID_COLUMNS.saturating_sub(block.position.column).max(1);
    let max_height = max_height.max(1);

    if block.is_circular() {
        let side = width.max(height).min(max_width).min(max_height);
        width = side;
        height = side;
    }

    Size::new(width.min(max_width), height.min(max_height))
}

/// Indices of the blocks covering any cell that `new` covers and `old`
/// does not, ordered top to bottom.
fn newly_covered_conflicts(blocks: &[Block], skip: usize, old: Rect, new: Rect) -> Vec<usize> {
    let mut hits: Vec<usize> = Vec::new();
    for (r, c) in new.cells().filter(|&(r, c)| !old.contains(r, c)) {
        for (i, other) in blocks.iter().enumerate() {
            if i != skip && !hits.contains(&i) && Rect::of(other).contains(r, c) {
                hits.push(i);
            }
        }
    }
    hits.sort_by_key(|&i| blocks[i].position.row);
    hits
}

/// Resize `id` by the given deltas and displace whatever it grows into.
pub fn resize(
    blocks: &[Block],
    id: &BlockId,
    delta_width: i32,
    delta_height: i32,
    max_iterations: usize,
) -> ResizeResult {
    let mut out = blocks.to_vec();
    let Some(idx) = out.iter().position(|b| &b.id == id) else {
        return ResizeResult {
            blocks: out,
            outcome: ResizeOutcome::NotFound,
        };
    };

    let old = Rect::of(&out[idx]);
    let max_height = row_ceiling(&out).saturating_sub(old.row).max(old.height);
    let size = target_size(&out[idx], delta_width, delta_height, max_height);
    if size == out[idx].size {
        return ResizeResult {
            blocks: out,
            outcome: ResizeOutcome::Unchanged,
        };
    }
    let new = Rect::at(old.position(), size);

    let conflicts = newly_covered_conflicts(&out, idx, old, new);
    if let Some(&pinned) = conflicts.iter().find(|&&i| out[i].is_fixed) {
        warn!(block = %id, pinned = %out[pinned].id, "resize refused: would cover a pinned block");
        return ResizeResult {
            outcome: ResizeOutcome::Blocked {
                by: out[pinned].id.clone(),
            },
            blocks: out,
        };
    }

    out[idx].size = size;

    let mut displaced = Vec::with_capacity(conflicts.len());
    for i in conflicts {
        let other = Rect::of(&out[i]);
        let is_below = other.row >= old.bottom();
        let is_right = other.column >= old.right();

        if is_below {
            out[i].position.row = new.bottom();
        } else if is_right && new.right().saturating_add(other.width) <= GRID_COLUMNS {
            out[i].position.column = new.right();
        } else {
            out[i].position.row = new.bottom();
        }
        debug!(block = %out[i].id, from = ?other.position(), to = ?out[i].position, "displaced by resize");
        displaced.push(out[i].id.clone());
    }

    let Reconciled { blocks, unsettled } = reconcile(out, id, max_iterations);

    ResizeResult {
        blocks,
        outcome: ResizeOutcome::Resized {
            size,
            displaced,
            unsettled,
        },
    }
}

/// Run every movable block other than `anchor` through collision
/// resolution, top to bottom.
pub fn reconcile(mut blocks: Vec<Block>, anchor: &BlockId, max_iterations: usize) -> Reconciled {
    let mut order: Vec<(u32, u32, BlockId)> = blocks
        .iter()
        .filter(|b| &b.id != anchor && !b.is_fixed)
        .map(|b| (b.position.row, b.position.column, b.id.clone()))
        .collect();
    order.sort();

    let mut unsettled = Vec::new();
    for (_, _, id) in order {
        let resolved = resolve_conflicts(&blocks, &id, max_iterations);
        if !resolved.resolution.is_settled() {
            warn!(block = %id, resolution = ?resolved.resolution, "reconciliation left block overlapping");
            unsettled.push(id);
        }
        blocks = resolved.blocks;
    }
    Reconciled { blocks, unsettled }
}
