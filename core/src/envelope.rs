//! Bounding boxes for ranges of cells.
//!
//! A storage chunk records the smallest and the largest cell (in child
//! position order) it contains. [`bounds`] turns such a pair back into a
//! geographic box: it walks all cells between the two endpoints below their
//! common ancestor at the chunk resolution, buffers each of them by `k`
//! rings, and reduces the centroids of the result to an axis-aligned box.
//!
//! The box is deliberately over-inclusive. It is an approximation of a
//! hex-tiled region around cell centroids and not the exact union of the
//! cells' geometries, so consumers still have to perform exact geometry
//! tests on candidates.
use geo::Rect;
use rustc_hash::FxHashSet;

use crate::{
    error::CodecError,
    grid::{check_resolution, CellId, HexGrid},
    util::extend_rect::ExtendRect,
};

/// The default ring buffer size
pub const DEFAULT_K: u32 = 1;

/// Returns all cells between `hex_min` and `hex_max` (inclusive) in child
/// position order below their common ancestor at `chunk_res`
pub fn cells_in_range<G: HexGrid + ?Sized>(
    grid: &G,
    hex_min: CellId,
    hex_max: CellId,
    chunk_res: u8,
) -> Result<Vec<CellId>, CodecError> {
    check_resolution(chunk_res)?;
    let res_min = grid.resolution(hex_min)?;
    let res_max = grid.resolution(hex_max)?;
    if res_min != res_max || chunk_res > res_min {
        return Err(CodecError::ResolutionMismatch {
            min: res_min,
            max: res_max,
            chunk: chunk_res,
        });
    }

    let ancestor = grid.parent(hex_min, chunk_res)?;
    if grid.parent(hex_max, chunk_res)? != ancestor {
        return Err(CodecError::AncestorMismatch {
            hex_min,
            hex_max,
            chunk: chunk_res,
        });
    }

    let min_pos = grid.child_position(hex_min, chunk_res)?;
    let max_pos = grid.child_position(hex_max, chunk_res)?;
    if max_pos < min_pos {
        return Err(CodecError::EmptyRange { min_pos, max_pos });
    }

    // Walking the positions is equivalent to slicing the full list of
    // descendants but does not materialize cells outside the range.
    (min_pos..=max_pos)
        .map(|pos| {
            grid.child_at_position(ancestor, pos, res_min)?
                .ok_or(CodecError::InvalidCell { cell: ancestor })
        })
        .collect()
}

/// Computes the bounding box of all cells between `hex_min` and `hex_max`
/// (see [`cells_in_range`]) buffered by `k` rings. `x` is the longitude and
/// `y` the latitude, both in degrees.
pub fn bounds<G: HexGrid + ?Sized>(
    grid: &G,
    hex_min: CellId,
    hex_max: CellId,
    chunk_res: u8,
    k: u32,
) -> Result<Rect, CodecError> {
    let range = cells_in_range(grid, hex_min, hex_max, chunk_res)?;

    let mut buffered = FxHashSet::default();
    for cell in range {
        buffered.extend(grid.grid_disk(cell, k)?);
    }

    let mut result: Option<Rect> = None;
    for cell in buffered {
        let ll = grid.cell_to_latlng(cell)?;
        match result {
            Some(ref mut r) => r.extend_latlng(ll),
            None => result = Some(Rect::from_latlng(ll)),
        }
    }

    // the range always holds at least one cell and a disk at least its center
    result.ok_or(CodecError::EmptyRange {
        min_pos: 0,
        max_pos: 0,
    })
}
