use super::{EdgePolicy, FilterKernel};
use crate::PixelGrid;

/// Computes one row of the destination grid.
///
/// `dst_row` must not alias any row of `src`.
#[inline]
pub(crate) fn convolve_row(
    src: &PixelGrid,
    kernel: &FilterKernel,
    y: usize,
    dst_row: &mut [u8],
    edge_policy: EdgePolicy,
) {
    let width = src.width();
    let height = src.height();
    let count = src.channels().count();
    let max_value = src.max_value() as f64;
    let on_edge_row = y == 0 || y + 1 == height;

    for (x, dst_pixel) in dst_row.chunks_exact_mut(count).enumerate() {
        if edge_policy == EdgePolicy::Preserve && (on_edge_row || x == 0 || x + 1 == width) {
            dst_pixel.copy_from_slice(&src.row(y)[x * count..(x + 1) * count]);
            continue;
        }
        for (channel, dst_sample) in dst_pixel.iter_mut().enumerate() {
            let mut sum = 0.0f64;
            for di in -1isize..=1 {
                let Some(src_y) = y.checked_add_signed(di).filter(|&v| v < height) else {
                    continue;
                };
                let src_row = src.row(src_y);
                for dj in -1isize..=1 {
                    let Some(src_x) = x.checked_add_signed(dj).filter(|&v| v < width) else {
                        continue;
                    };
                    let sample = src_row[src_x * count + channel];
                    sum += kernel.weight_for_offset(di, dj) * sample as f64;
                }
            }
            *dst_sample = clip(sum, max_value);
        }
    }
}

/// Rounds the weighted sum to the nearest integer and saturates it
/// into `[0, max_value]`.
#[inline(always)]
fn clip(sum: f64, max_value: f64) -> u8 {
    sum.round().clamp(0.0, max_value) as u8
}

#[cfg(test)]
mod tests {
    use super::clip;

    #[test]
    fn clip_rounds_and_saturates() {
        assert_eq!(clip(-3.7, 255.), 0);
        assert_eq!(clip(99.999_999_9, 255.), 100);
        assert_eq!(clip(12.5, 255.), 13);
        assert_eq!(clip(12.49, 255.), 12);
        assert_eq!(clip(300., 255.), 255);
        assert_eq!(clip(300., 200.), 200);
    }
}
