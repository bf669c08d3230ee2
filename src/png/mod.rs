//! PNG codec bound to a sprite's palette and transparency state.
//!
//! [`decode`] streams a PNG into a canonical [`PixelBuffer`](crate::PixelBuffer)
//! and publishes palette and mask index to the sprite; [`encode`] writes a
//! buffer back out using the sprite's palette and alpha requirements.

pub mod bit_depth;
pub mod chunk;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod interlace;

pub use chunk::PNG_SIGNATURE;
pub use decode::{decode, decode_with_options, Decoded};
pub use encode::{encode, encode_with_options};

/// Default maximum width or height accepted by the decoder.
pub const MAX_DIMENSION: u32 = 1 << 24;

/// Default IDAT chunk payload size.
pub const DEFAULT_IDAT_CHUNK_SIZE: usize = 256 * 1024;

/// PNG decoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Largest width or height accepted from a header. Bigger images are
    /// rejected before anything is allocated.
    pub max_dimension: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
        }
    }
}

/// PNG encoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Compression level (1-9).
    pub compression_level: u8,
    /// Filter selection strategy.
    pub filter_strategy: FilterStrategy,
    /// Maximum payload of each IDAT chunk.
    pub idat_chunk_size: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::fast()
    }
}

impl EncodeOptions {
    /// Low compression level with Sub filtering (the default).
    pub fn fast() -> Self {
        Self {
            compression_level: 2,
            filter_strategy: FilterStrategy::Sub,
            idat_chunk_size: DEFAULT_IDAT_CHUNK_SIZE,
        }
    }

    /// Level 6 with per-row filter selection.
    pub fn balanced() -> Self {
        Self {
            compression_level: 6,
            filter_strategy: FilterStrategy::Adaptive,
            idat_chunk_size: DEFAULT_IDAT_CHUNK_SIZE,
        }
    }

    /// Level 9 with per-row filter selection.
    pub fn max_compression() -> Self {
        Self {
            compression_level: 9,
            filter_strategy: FilterStrategy::Adaptive,
            idat_chunk_size: DEFAULT_IDAT_CHUNK_SIZE,
        }
    }
}

/// How the encoder picks a row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStrategy {
    /// Raw rows; cheapest to produce.
    None,
    /// Every row uses Sub.
    Sub,
    /// Every row uses Up.
    Up,
    /// Every row uses Average.
    Average,
    /// Every row uses Paeth.
    Paeth,
    /// Try all five filters on each row and keep the one with the smallest
    /// absolute-sum score. Indexed images are written unfiltered instead.
    Adaptive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(EncodeOptions::default(), EncodeOptions::fast());
        assert_eq!(EncodeOptions::balanced().compression_level, 6);
        assert_eq!(EncodeOptions::max_compression().compression_level, 9);
        assert_eq!(DecodeOptions::default().max_dimension, MAX_DIMENSION);
    }
}
