pub use filters::*;

use crate::{PixelGrid, RowRange};

mod filters;
mod native;

/// How pixels on the outermost ring of an image are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Neighbors outside the image contribute zero to the weighted sum.
    #[default]
    ZeroPad,
    /// Pixels of the first and the last row and column are copied unchanged.
    Preserve,
}

/// Applies `kernel` to the given rows of `grid`.
///
/// Result is written into a new grid, the source grid is only read.
/// Rows outside `rows` are copied unchanged. Neighbors outside `grid`
/// are handled according to `edge_policy`, so for a slice of a bigger
/// image the grid must include a halo row next to every computed row
/// that isn't on an edge of the image.
pub fn apply_kernel(
    grid: &PixelGrid,
    kernel: &FilterKernel,
    rows: RowRange,
    edge_policy: EdgePolicy,
) -> PixelGrid {
    let mut dst = grid.clone();
    let rows = RowRange::new(rows.start.min(grid.height()), rows.end.min(grid.height()));
    if rows.is_empty() {
        return dst;
    }
    let row_len = grid.row_len();
    let dst_rows = &mut dst.samples_mut()[rows.start * row_len..rows.end * row_len];

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            crate::threading::for_each_row(dst_rows, row_len, rows.start, |y, dst_row| {
                native::convolve_row(grid, kernel, y, dst_row, edge_policy)
            });
        } else {
            for (y, dst_row) in (rows.start..).zip(dst_rows.chunks_exact_mut(row_len)) {
                native::convolve_row(grid, kernel, y, dst_row, edge_policy);
            }
        }
    }
    dst
}

/// Applies all kernels of the chain to the whole grid, one after another.
///
/// This is the single-process reference for distributed runs.
pub fn apply_chain(grid: &PixelGrid, chain: &[FilterKernel], edge_policy: EdgePolicy) -> PixelGrid {
    let all_rows = RowRange::new(0, grid.height());
    let mut current = grid.clone();
    for kernel in chain {
        current = apply_kernel(&current, kernel, all_rows, edge_policy);
    }
    current
}
