//! PNG color types and their mapping onto canonical pixel formats.

use crate::error::{Error, Result};
use crate::image::PixelFormat;

/// Color types defined by the PNG format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorType {
    /// Grayscale, 1 sample per pixel.
    Gray = 0,
    /// RGB, 3 samples per pixel.
    Rgb = 2,
    /// Palette index, 1 sample per pixel.
    Indexed = 3,
    /// Grayscale with alpha, 2 samples per pixel.
    GrayAlpha = 4,
    /// RGBA, 4 samples per pixel.
    Rgba = 6,
}

impl TryFrom<u8> for ColorType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ColorType::Gray),
            2 => Ok(ColorType::Rgb),
            3 => Ok(ColorType::Indexed),
            4 => Ok(ColorType::GrayAlpha),
            6 => Ok(ColorType::Rgba),
            _ => Err(Error::UnsupportedColorType(value)),
        }
    }
}

impl ColorType {
    /// Returns the PNG color type value.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Samples per pixel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            ColorType::Gray | ColorType::Indexed => 1,
            ColorType::GrayAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }

    /// Whether the PNG format allows `bit_depth` for this color type.
    pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
        match self {
            ColorType::Gray => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
            ColorType::Indexed => matches!(bit_depth, 1 | 2 | 4 | 8),
            ColorType::Rgb | ColorType::GrayAlpha | ColorType::Rgba => {
                matches!(bit_depth, 8 | 16)
            }
        }
    }

    /// Canonical format pixels of this color type are stored in.
    #[inline]
    pub const fn canonical_format(self) -> PixelFormat {
        match self {
            ColorType::Rgb | ColorType::Rgba => PixelFormat::TrueColor,
            ColorType::Gray | ColorType::GrayAlpha => PixelFormat::Grayscale,
            ColorType::Indexed => PixelFormat::Indexed,
        }
    }

    /// Whether the color type carries a per-pixel alpha channel.
    #[inline]
    pub const fn has_alpha_channel(self) -> bool {
        matches!(self, ColorType::GrayAlpha | ColorType::Rgba)
    }

    /// Color type written for a canonical format.
    ///
    /// Indexed images always become palette PNGs; the others include an
    /// alpha channel only when `needs_alpha` is set.
    pub const fn for_format(format: PixelFormat, needs_alpha: bool) -> Self {
        match format {
            PixelFormat::TrueColor if needs_alpha => ColorType::Rgba,
            PixelFormat::TrueColor => ColorType::Rgb,
            PixelFormat::Grayscale if needs_alpha => ColorType::GrayAlpha,
            PixelFormat::Grayscale => ColorType::Gray,
            PixelFormat::Indexed => ColorType::Indexed,
        }
    }
}

/// Result of matching a PNG header against the canonical formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated {
    /// Source color type.
    pub color_type: ColorType,
    /// Source bit depth (1, 2, 4, 8 or 16).
    pub bit_depth: u8,
    /// Destination format.
    pub format: PixelFormat,
}

impl Negotiated {
    /// Whether decoded pixels keep their own alpha. Palette alpha is handled
    /// through the mask index instead and reports `false` here.
    #[inline]
    pub fn alpha_present(&self) -> bool {
        self.color_type.has_alpha_channel()
    }
}

/// Map raw IHDR color type and bit depth to a canonical format.
///
/// Fails with an unsupported-format error for color types the PNG format does
/// not define and for bit depths it forbids for the given type.
pub fn negotiate(color_type: u8, bit_depth: u8) -> Result<Negotiated> {
    let ct = ColorType::try_from(color_type)?;
    if !ct.allows_bit_depth(bit_depth) {
        return Err(Error::UnsupportedBitDepth {
            color_type,
            bit_depth,
        });
    }
    Ok(Negotiated {
        color_type: ct,
        bit_depth,
        format: ct.canonical_format(),
    })
}
