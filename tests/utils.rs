#![allow(dead_code)]

use halo_convolution::{Channels, PixelGrid};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic pseudo-random image with a lot of edges in it.
pub fn noise_image(width: usize, height: usize, channels: Channels, max_value: u8) -> PixelGrid {
    let mut state: u32 = 0x9E37_79B9 ^ (width as u32 * 31 + height as u32);
    PixelGrid::from_fn(width, height, channels, max_value, |_, _, _| {
        // xorshift32
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % (max_value as u32 + 1)) as u8
    })
    .unwrap()
}

pub fn uniform_image(width: usize, height: usize, value: u8) -> PixelGrid {
    PixelGrid::from_fn(width, height, Channels::Gray, 255, |_, _, _| value).unwrap()
}

pub fn image_checksum<const N: usize>(grid: &PixelGrid) -> [u64; N] {
    let mut res = [0u64; N];
    for pixel in grid.samples().chunks_exact(N) {
        res.iter_mut().zip(pixel).for_each(|(d, &s)| *d += s as u64);
    }
    res
}
