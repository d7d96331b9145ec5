//! # Compaction
//!
//! Deleting a block opens a vertical gap. Blocks stacked underneath it in
//! the same column and with the same width slide up into that gap, closest
//! first. Everything else, pinned blocks included, stays put and acts as an
//! obstacle.

use tracing::debug;

use super::grid::{OccupancyGrid, Rect};
use crate::model::Block;

/// Shift eligible blocks upward after `deleted` has been removed.
///
/// `blocks` is the collection without the deleted block; if it is still
/// present it is dropped first. Each candidate moves by the largest shift
/// (at most its distance below the deleted block's row) that lands on free
/// cells, or stays where it is.
pub fn compact_after_deletion(blocks: &[Block], deleted: &Block) -> Vec<Block> {
    let mut blocks: Vec<Block> = blocks.iter().filter(|b| b.id != deleted.id).cloned().collect();

    let is_candidate = |b: &Block| {
        !b.is_fixed
            && b.position.row > deleted.position.row
            && b.position.column == deleted.position.column
            && b.size.width == deleted.size.width
    };

    let mut candidates: Vec<usize> = (0..blocks.len()).filter(|&i| is_candidate(&blocks[i])).collect();
    candidates.sort_by_key(|&i| blocks[i].position.row);

    let mut grid = OccupancyGrid::from_blocks(&blocks, |b| !is_candidate(b));

    for idx in candidates {
        let rect = Rect::of(&blocks[idx]);
        let max_shift = rect.row - deleted.position.row;

        let shift = (1..=max_shift)
            .rev()
            .find(|&shift| grid.is_free(rect.moved_to(rect.row - shift, rect.column)));

        let settled = match shift {
            Some(shift) => {
                let moved = rect.moved_to(rect.row - shift, rect.column);
                debug!(block = %blocks[idx].id, shift, "compacted block upward");
                blocks[idx].position = moved.position();
                moved
            }
            None => rect,
        };
        grid.mark(settled);
    }

    blocks
}
