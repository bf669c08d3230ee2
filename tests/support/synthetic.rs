//! Synthetic test image generation.
//!
//! Deterministic patterns in the canonical pixel formats, plus seeded random
//! buffers for corpus-style tests.

use rand::{rngs::StdRng, Rng, SeedableRng};
use spritepng::{PixelBuffer, PixelFormat};

/// Solid-color buffer.
pub fn solid(format: PixelFormat, width: u32, height: u32, sample: &[u8]) -> PixelBuffer {
    let mut image = PixelBuffer::new(format, width, height);
    image.clear(sample);
    image
}

/// RGBA gradient: red grows left to right, green top to bottom, alpha along
/// the diagonal.
pub fn gradient_rgba(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            let b = ((x ^ y) & 0xFF) as u8;
            let a = (((x + y) * 255) / (width + height).max(1)) as u8;
            data.extend_from_slice(&[r, g, b, a]);
        }
    }
    PixelBuffer::from_raw(PixelFormat::TrueColor, width, height, data).unwrap()
}

/// Gray+alpha checkerboard with `cell`-pixel squares.
pub fn checkerboard_gray(width: u32, height: u32, cell: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 2) as usize);
    for y in 0..height {
        for x in 0..width {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            let px: [u8; 2] = if on { [230, 255] } else { [20, 128] };
            data.extend_from_slice(&px);
        }
    }
    PixelBuffer::from_raw(PixelFormat::Grayscale, width, height, data).unwrap()
}

/// Indexed buffer cycling through `colors` palette entries.
pub fn index_stripes(width: u32, height: u32, colors: u8) -> PixelBuffer {
    let data = (0..width * height)
        .map(|i| ((i / 3) % u32::from(colors.max(1))) as u8)
        .collect();
    PixelBuffer::from_raw(PixelFormat::Indexed, width, height, data).unwrap()
}

/// Buffer of random bytes, reproducible per `seed`.
pub fn random(format: PixelFormat, width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; (width * height) as usize * format.bytes_per_pixel()];
    rng.fill(data.as_mut_slice());
    PixelBuffer::from_raw(format, width, height, data).unwrap()
}
