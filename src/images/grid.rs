use crate::{Channels, GridError, RowRange};

/// Dimensions and sample format of a [PixelGrid].
///
/// Can be obtained only from an existing grid, so it always
/// describes a valid grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    width: usize,
    height: usize,
    channels: Channels,
    max_value: u8,
}

impl GridGeometry {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    #[inline]
    pub fn max_value(&self) -> u8 {
        self.max_value
    }
}

/// Owned grid of 8-bit samples stored row by row.
///
/// Every sample is guaranteed to be not greater than [PixelGrid::max_value].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    channels: Channels,
    max_value: u8,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Create a grid filled with zeros.
    pub fn new(
        width: usize,
        height: usize,
        channels: Channels,
        max_value: u8,
    ) -> Result<Self, GridError> {
        check_dimensions(width, height, max_value)?;
        let size = width * height * channels.count();
        Ok(Self {
            width,
            height,
            channels,
            max_value,
            samples: vec![0; size],
        })
    }

    /// Create a grid from vector with samples.
    pub fn from_vec_u8(
        width: usize,
        height: usize,
        channels: Channels,
        max_value: u8,
        samples: Vec<u8>,
    ) -> Result<Self, GridError> {
        check_dimensions(width, height, max_value)?;
        if samples.len() != width * height * channels.count() {
            return Err(GridError::InvalidBufferSize);
        }
        if let Some((index, &value)) = samples.iter().enumerate().find(|(_, &v)| v > max_value) {
            return Err(GridError::SampleOutOfRange {
                index,
                value,
                max_value,
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            max_value,
            samples,
        })
    }

    /// Create a grid whose samples are produced by `f(row, col, channel)`.
    ///
    /// Values returned by `f` are saturated to `max_value`.
    pub fn from_fn(
        width: usize,
        height: usize,
        channels: Channels,
        max_value: u8,
        mut f: impl FnMut(usize, usize, usize) -> u8,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(width, height, channels, max_value)?;
        let count = channels.count();
        for (i, sample) in grid.samples.iter_mut().enumerate() {
            let pixel = i / count;
            *sample = f(pixel / width, pixel % width, i % count).min(max_value);
        }
        Ok(grid)
    }

    /// Create a zero-filled grid with given geometry.
    pub fn from_geometry(geometry: GridGeometry) -> Self {
        let GridGeometry {
            width,
            height,
            channels,
            max_value,
        } = geometry;
        Self {
            width,
            height,
            channels,
            max_value,
            samples: vec![0; width * height * channels.count()],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    #[inline]
    pub fn max_value(&self) -> u8 {
        self.max_value
    }

    #[inline]
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry {
            width: self.width,
            height: self.height,
            channels: self.channels,
            max_value: self.max_value,
        }
    }

    /// Count of samples in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width * self.channels.count()
    }

    /// Buffer with all samples.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    #[inline]
    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.samples
    }

    /// Sample of given channel of the pixel in `row` and `col`.
    #[inline]
    pub fn sample(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.samples[row * self.row_len() + col * self.channels.count() + channel]
    }

    /// Samples of one row. Panics if `row` is out of the grid.
    #[inline]
    pub fn row(&self, row: usize) -> &[u8] {
        let row_len = self.row_len();
        &self.samples[row * row_len..(row + 1) * row_len]
    }

    #[inline]
    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.samples.chunks_exact(self.row_len())
    }

    /// Overwrites one row with a copy of given samples.
    pub(crate) fn replace_row(&mut self, row: usize, samples: &[u8]) {
        let row_len = self.row_len();
        debug_assert_eq!(samples.len(), row_len);
        self.samples[row * row_len..(row + 1) * row_len].copy_from_slice(samples);
    }

    /// Creates a new grid from a copy of given rows.
    pub fn copy_rows(&self, rows: RowRange) -> Result<PixelGrid, GridError> {
        if rows.is_empty() || rows.end > self.height {
            return Err(GridError::RowsOutOfBounds {
                start: rows.start,
                end: rows.end,
                height: self.height,
            });
        }
        let row_len = self.row_len();
        Ok(PixelGrid {
            width: self.width,
            height: rows.len(),
            channels: self.channels,
            max_value: self.max_value,
            samples: self.samples[rows.start * row_len..rows.end * row_len].to_vec(),
        })
    }
}

fn check_dimensions(width: usize, height: usize, max_value: u8) -> Result<(), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::ZeroDimension);
    }
    if max_value == 0 {
        return Err(GridError::InvalidMaxValue);
    }
    Ok(())
}
