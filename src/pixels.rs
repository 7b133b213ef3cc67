use crate::GridError;

/// Layout of samples of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    /// One sample per pixel (PGM-like).
    Gray,
    /// Three interleaved samples per pixel: red, green, blue (PPM-like).
    Rgb,
}

impl Channels {
    /// Count of samples in one pixel.
    #[inline]
    pub fn count(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

impl TryFrom<usize> for Channels {
    type Error = GridError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        match count {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Rgb),
            _ => Err(GridError::UnsupportedChannels(count)),
        }
    }
}
