use std::path::Path;

use halo_convolution as hc;
use image::ImageFormat;

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum EdgePolicy {
    /// Neighbors outside the image contribute zero to the weighted sum.
    Zero,
    /// Pixels of the outermost rows and columns are left unchanged.
    Preserve,
}

impl From<EdgePolicy> for hc::EdgePolicy {
    fn from(edge_policy: EdgePolicy) -> Self {
        match edge_policy {
            EdgePolicy::Zero => hc::EdgePolicy::ZeroPad,
            EdgePolicy::Preserve => hc::EdgePolicy::Preserve,
        }
    }
}

/// Count of samples which differ between two grids of the same size.
pub fn count_different_samples(a: &hc::PixelGrid, b: &hc::PixelGrid) -> Option<usize> {
    if a.geometry() != b.geometry() {
        return None;
    }
    let count = a
        .samples()
        .iter()
        .zip(b.samples())
        .filter(|(x, y)| x != y)
        .count();
    Some(count)
}

/// PGM/PPM files are written with the max value of the grid.
pub fn is_pnm_path(path: &Path) -> bool {
    ImageFormat::from_path(path).ok() == Some(ImageFormat::Pnm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc::{Channels, PixelGrid};

    #[test]
    fn count_different_samples_of_grids() {
        let a = PixelGrid::from_fn(3, 2, Channels::Gray, 255, |r, c, _| (r + c) as u8).unwrap();
        let b = PixelGrid::from_fn(3, 2, Channels::Gray, 255, |r, c, _| (r * c) as u8).unwrap();
        assert_eq!(count_different_samples(&a, &a), Some(0));
        // Only (0, 0) is the same.
        assert_eq!(count_different_samples(&a, &b), Some(5));

        let c = PixelGrid::new(2, 3, Channels::Gray, 255).unwrap();
        assert_eq!(count_different_samples(&a, &c), None);
    }

    #[test]
    fn pnm_paths() {
        assert!(is_pnm_path(Path::new("a.pgm")));
        assert!(is_pnm_path(Path::new("dir/b.ppm")));
        assert!(!is_pnm_path(Path::new("c.png")));
        assert!(!is_pnm_path(Path::new("no_extension")));
    }
}
