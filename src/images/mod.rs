//! Grid of samples the convolution operates on.
pub use grid::*;

mod grid;

#[cfg(feature = "image")]
mod image_crate;
#[cfg(feature = "pnm")]
mod pnm;

#[cfg(test)]
mod tests {
    use super::PixelGrid;
    use crate::{Channels, GridError, RowRange};

    #[test]
    fn from_vec_validates_size_and_samples() {
        assert_eq!(
            PixelGrid::from_vec_u8(2, 2, Channels::Gray, 255, vec![0; 3]),
            Err(GridError::InvalidBufferSize)
        );
        assert_eq!(
            PixelGrid::from_vec_u8(2, 1, Channels::Gray, 15, vec![3, 16]),
            Err(GridError::SampleOutOfRange {
                index: 1,
                value: 16,
                max_value: 15
            })
        );
        assert_eq!(
            PixelGrid::new(0, 3, Channels::Rgb, 255),
            Err(GridError::ZeroDimension)
        );
        assert_eq!(
            PixelGrid::new(3, 3, Channels::Rgb, 0),
            Err(GridError::InvalidMaxValue)
        );
    }

    #[test]
    fn rows_of_rgb_grid() {
        let grid =
            PixelGrid::from_fn(2, 3, Channels::Rgb, 255, |r, c, ch| (r * 100 + c * 10 + ch) as u8)
                .unwrap();
        assert_eq!(grid.row_len(), 6);
        assert_eq!(grid.row(1), &[100, 101, 102, 110, 111, 112]);
        assert_eq!(grid.sample(2, 1, 2), 212);
        assert_eq!(grid.iter_rows().count(), 3);

        let part = grid.copy_rows(RowRange::new(1, 3)).unwrap();
        assert_eq!(part.height(), 2);
        assert_eq!(part.row(0), grid.row(1));
        assert_eq!(
            grid.copy_rows(RowRange::new(2, 4)),
            Err(GridError::RowsOutOfBounds {
                start: 2,
                end: 4,
                height: 3
            })
        );
    }

    #[test]
    fn from_fn_saturates_to_max_value() {
        let grid = PixelGrid::from_fn(3, 1, Channels::Gray, 100, |_, c, _| c as u8 * 90).unwrap();
        assert_eq!(grid.samples(), &[0, 90, 100]);
    }
}
