//! Sample normalization to 8 bits per sample.
//!
//! Decoded scanlines come in at 1, 2, 4, 8 or 16 bits per sample. Everything
//! downstream works on one byte per sample, so rows are widened or narrowed
//! here right after unfiltering.

use crate::color::ColorType;

/// Bytes in one packed scanline of `width` pixels (without the filter byte).
#[inline]
pub fn scanline_bytes(width: usize, channels: usize, bit_depth: u8) -> usize {
    (width * channels * bit_depth as usize).div_ceil(8)
}

/// Byte distance to the corresponding byte of the previous pixel, as used by
/// the filters. Sub-byte formats use 1.
#[inline]
pub fn filter_bpp(channels: usize, bit_depth: u8) -> usize {
    (channels * bit_depth as usize).div_ceil(8).max(1)
}

/// Split packed sub-byte samples, most significant bits first, into one byte
/// each. Fills all of `out`.
pub fn unpack_samples(packed: &[u8], bit_depth: u8, out: &mut [u8]) {
    let bits = bit_depth as usize;
    let per_byte = 8 / bits;
    let mask = (1u16 << bits) as u8 - 1;
    for (i, sample) in out.iter_mut().enumerate() {
        let shift = 8 - bits * (i % per_byte + 1);
        *sample = (packed[i / per_byte] >> shift) & mask;
    }
}

/// Widen a 1/2/4-bit gray level to 8 bits by bit replication, so the
/// maximum level maps to 255.
#[inline]
pub fn scale_gray(sample: u8, bit_depth: u8) -> u8 {
    match bit_depth {
        1 => sample * 0xFF,
        2 => sample * 0x55,
        4 => sample * 0x11,
        _ => sample,
    }
}

/// Normalize one unfiltered scanline into `out`, which holds
/// `width * channels` bytes.
///
/// 16-bit samples keep their high byte. Packed samples are unpacked; gray
/// levels are scaled up while palette indices keep their value.
pub fn normalize_row(packed: &[u8], color_type: ColorType, bit_depth: u8, out: &mut [u8]) {
    match bit_depth {
        8 => out.copy_from_slice(&packed[..out.len()]),
        16 => {
            for (sample, pair) in out.iter_mut().zip(packed.chunks_exact(2)) {
                *sample = pair[0];
            }
        }
        _ => {
            unpack_samples(packed, bit_depth, out);
            if color_type == ColorType::Gray {
                for sample in out.iter_mut() {
                    *sample = scale_gray(*sample, bit_depth);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanline_bytes() {
        assert_eq!(scanline_bytes(3, 1, 1), 1);
        assert_eq!(scanline_bytes(9, 1, 1), 2);
        assert_eq!(scanline_bytes(3, 1, 4), 2);
        assert_eq!(scanline_bytes(2, 4, 16), 16);
        assert_eq!(scanline_bytes(5, 3, 8), 15);
    }

    #[test]
    fn test_filter_bpp() {
        assert_eq!(filter_bpp(1, 1), 1);
        assert_eq!(filter_bpp(1, 8), 1);
        assert_eq!(filter_bpp(3, 8), 3);
        assert_eq!(filter_bpp(4, 16), 8);
        assert_eq!(filter_bpp(2, 16), 4);
    }

    #[test]
    fn test_unpack_msb_first() {
        let mut out = [0u8; 8];
        unpack_samples(&[0b1010_0001], 1, &mut out);
        assert_eq!(out, [1, 0, 1, 0, 0, 0, 0, 1]);

        let mut out = [0u8; 4];
        unpack_samples(&[0b11_10_01_00], 2, &mut out);
        assert_eq!(out, [3, 2, 1, 0]);

        let mut out = [0u8; 3];
        unpack_samples(&[0xAB, 0xC0], 4, &mut out);
        assert_eq!(out, [0xA, 0xB, 0xC]);
    }

    #[test]
    fn test_gray_levels_scale() {
        let mut out = [0u8; 4];
        normalize_row(&[0b00_01_10_11], ColorType::Gray, 2, &mut out);
        assert_eq!(out, [0, 85, 170, 255]);

        let mut out = [0u8; 2];
        normalize_row(&[0xF0], ColorType::Gray, 4, &mut out);
        assert_eq!(out, [255, 0]);

        let mut out = [0u8; 3];
        normalize_row(&[0b101_00000], ColorType::Gray, 1, &mut out);
        assert_eq!(out, [255, 0, 255]);
    }

    #[test]
    fn test_indices_not_scaled() {
        let mut out = [0u8; 2];
        normalize_row(&[0x3F], ColorType::Indexed, 4, &mut out);
        assert_eq!(out, [3, 15]);
    }

    #[test]
    fn test_sixteen_bit_keeps_high_byte() {
        let mut out = [0u8; 3];
        normalize_row(&[0x12, 0x34, 0xAB, 0xCD, 0xFF, 0x00], ColorType::Rgb, 16, &mut out);
        assert_eq!(out, [0x12, 0xAB, 0xFF]);
    }
}
