//! Grid partitioning into patch main regions.

use epi_core::{Point, Rect};

use crate::{SimError, SimResult};

/// Split `grid` into `patch_count` contiguous vertical stripes of near-equal
/// width, ordered left to right.
///
/// The stripes tile the grid exactly — no overlap, no gaps — and a stripe's
/// position in the returned sequence is its patch id.  That id-to-region
/// mapping is stable and is what neighbor detection and the channel matrix
/// index by, so the order here must never change.
///
/// Fails when the grid has fewer columns than requested patches (a zero-width
/// main region would own no cells).
pub fn partition(grid: Rect, patch_count: usize) -> SimResult<Vec<Rect>> {
    if patch_count == 0 || (grid.width as usize) < patch_count {
        return Err(SimError::GridTooNarrow {
            width:   grid.width,
            patches: patch_count,
        });
    }

    let n = patch_count as u32;
    let base = grid.width / n;
    let wider = grid.width % n; // the first `wider` stripes get one extra column

    let mut tiles = Vec::with_capacity(patch_count);
    let mut x = grid.origin.x;
    for i in 0..n {
        let width = if i < wider { base + 1 } else { base };
        tiles.push(Rect::new(Point::new(x, grid.origin.y), width, grid.height));
        x += width as i32;
    }
    Ok(tiles)
}
