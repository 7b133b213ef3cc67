//! Reading and writing of binary PGM/PPM files with their own max value.
use std::io::{BufRead, Write};

use image::codecs::pnm::{
    GraymapHeader, PixmapHeader, PnmDecoder, PnmEncoder, PnmHeader, SampleEncoding,
};
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::{Channels, GridError, PixelGrid, PnmError};

impl PixelGrid {
    /// Decodes a PGM or PPM image (binary or ASCII).
    ///
    /// Max value of the grid is taken from the header of the file and
    /// samples keep their original values, so the header passes through
    /// [PixelGrid::write_pnm] unchanged.
    pub fn read_pnm(reader: impl BufRead) -> Result<Self, PnmError> {
        let decoder = PnmDecoder::new(reader)?;
        let max_sample = decoder.header().maximal_sample();
        let max_value = u8::try_from(max_sample)
            .ok()
            .filter(|&v| v > 0)
            .ok_or(PnmError::UnsupportedMaxValue(max_sample))?;

        let image = DynamicImage::from_decoder(decoder)?;
        let grid = PixelGrid::try_from(&image)?;
        if max_value == u8::MAX {
            return Ok(grid);
        }
        // The decoder stretches samples to 0..=255, revert it.
        let (width, height, channels) = (grid.width(), grid.height(), grid.channels());
        let max = max_value as u32;
        let samples = grid
            .into_vec()
            .into_iter()
            .map(|s| ((s as u32 * max + 127) / 255) as u8)
            .collect();
        Ok(PixelGrid::from_vec_u8(width, height, channels, max_value, samples)?)
    }

    /// Encodes the grid as binary PGM (`P5`) or PPM (`P6`) with
    /// the max value of the grid.
    pub fn write_pnm(&self, writer: impl Write) -> Result<(), PnmError> {
        let width = u32::try_from(self.width()).map_err(|_| GridError::InvalidBufferSize)?;
        let height = u32::try_from(self.height()).map_err(|_| GridError::InvalidBufferSize)?;
        let max_value = self.max_value() as u32;
        let (header, color): (PnmHeader, _) = match self.channels() {
            Channels::Gray => (
                GraymapHeader {
                    encoding: SampleEncoding::Binary,
                    height,
                    width,
                    maxwhite: max_value,
                }
                .into(),
                ExtendedColorType::L8,
            ),
            Channels::Rgb => (
                PixmapHeader {
                    encoding: SampleEncoding::Binary,
                    height,
                    width,
                    maxval: max_value,
                }
                .into(),
                ExtendedColorType::Rgb8,
            ),
        };
        PnmEncoder::new(writer)
            .with_header(header)
            .write_image(self.samples(), width, height, color)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_value_passes_through() {
        let mut src = b"P5\n2 1 15\n".to_vec();
        src.extend_from_slice(&[3, 15]);
        let grid = PixelGrid::read_pnm(src.as_slice()).unwrap();
        assert_eq!(grid.max_value(), 15);
        assert_eq!(grid.channels(), Channels::Gray);
        assert_eq!(grid.samples(), &[3, 15]);

        let mut dst = Vec::new();
        grid.write_pnm(&mut dst).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn every_sample_of_small_max_value_survives() {
        for max_value in [1u8, 7, 100, 254, 255] {
            let grid = PixelGrid::from_fn(
                max_value as usize + 1,
                1,
                Channels::Gray,
                max_value,
                |_, col, _| col as u8,
            )
            .unwrap();
            let mut buffer = Vec::new();
            grid.write_pnm(&mut buffer).unwrap();
            assert_eq!(PixelGrid::read_pnm(buffer.as_slice()).unwrap(), grid);
        }
    }

    #[test]
    fn rgb_grid_is_written_as_ppm() {
        let grid = PixelGrid::from_vec_u8(1, 2, Channels::Rgb, 200, vec![1, 2, 3, 200, 0, 9])
            .unwrap();
        let mut buffer = Vec::new();
        grid.write_pnm(&mut buffer).unwrap();
        assert!(buffer.starts_with(b"P6"));
        assert_eq!(PixelGrid::read_pnm(buffer.as_slice()).unwrap(), grid);
    }

    #[test]
    fn ascii_graymap() {
        let grid = PixelGrid::read_pnm(&b"P2\n3 1\n9\n0 4 9\n"[..]).unwrap();
        assert_eq!(grid.max_value(), 9);
        assert_eq!(grid.samples(), &[0, 4, 9]);
    }

    #[test]
    fn sixteen_bit_images_are_rejected() {
        let mut src = b"P5\n1 1\n1000\n".to_vec();
        src.extend_from_slice(&[0, 10]);
        assert!(matches!(
            PixelGrid::read_pnm(src.as_slice()),
            Err(PnmError::UnsupportedMaxValue(1000))
        ));
    }
}
