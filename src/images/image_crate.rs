use image::{DynamicImage, GrayImage, RgbImage};

use crate::{Channels, GridError, PixelGrid};

impl TryFrom<&DynamicImage> for PixelGrid {
    type Error = GridError;

    fn try_from(image: &DynamicImage) -> Result<Self, Self::Error> {
        let channels = match image {
            DynamicImage::ImageLuma8(_) => Channels::Gray,
            DynamicImage::ImageRgb8(_) => Channels::Rgb,
            _ => return Err(GridError::UnsupportedImageType),
        };
        PixelGrid::from_vec_u8(
            image.width() as usize,
            image.height() as usize,
            channels,
            u8::MAX,
            image.as_bytes().to_vec(),
        )
    }
}

impl PixelGrid {
    /// Converts the grid into an image of the `image` crate.
    ///
    /// Gray grids become `ImageLuma8`, RGB grids become `ImageRgb8`.
    pub fn into_dynamic_image(self) -> Result<DynamicImage, GridError> {
        let width = u32::try_from(self.width()).map_err(|_| GridError::InvalidBufferSize)?;
        let height = u32::try_from(self.height()).map_err(|_| GridError::InvalidBufferSize)?;
        let image = match self.channels() {
            Channels::Gray => GrayImage::from_raw(width, height, self.into_vec())
                .map(DynamicImage::ImageLuma8),
            Channels::Rgb => {
                RgbImage::from_raw(width, height, self.into_vec()).map(DynamicImage::ImageRgb8)
            }
        };
        image.ok_or(GridError::InvalidBufferSize)
    }
}
