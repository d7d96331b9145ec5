//! # Placement
//!
//! Where a freshly created block lands. The column is fixed up front by the
//! block's alignment; only the row is searched.

use tracing::debug;

use super::grid::{max_bottom, Rect};
use crate::model::{Alignment, Block, Position, Size};

/// Find the first free row for a block of `size` at the column its
/// alignment dictates.
///
/// Rows are scanned from 0 downward. Every existing block counts as an
/// obstacle, pinned or not. The scan stops at the lowest bottom edge of the
/// existing blocks: nothing can occupy that row, so it is the answer when
/// every row above it is taken.
pub fn find_available_position(size: Size, alignment: Alignment, existing: &[Block]) -> Position {
    let column = alignment.column_for(size.width);
    let limit = max_bottom(existing);

    for row in 0..=limit {
        let candidate = Rect::at(Position::new(row, column), size);
        if !existing.iter().any(|b| candidate.overlaps(&Rect::of(b))) {
            debug!(row, column, ?alignment, "placement found free row");
            return candidate.position();
        }
    }

    Position::new(limit, column)
}
