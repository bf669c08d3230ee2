//! PNG encoder for canonical pixel buffers.
//!
//! Output is always 8 bits per sample and non-interlaced. The color type
//! follows the buffer's format and the sprite's alpha requirements; indexed
//! images carry the sprite's full palette and, for sprites without a
//! background layer, a tRNS chunk that makes only the mask index transparent.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::chunk::{write_chunk, IdatWriter, PNG_SIGNATURE};
use super::filter::RowFilter;
use super::{EncodeOptions, FilterStrategy};
use crate::color::ColorType;
use crate::context::CodecContext;
use crate::error::{Error, Result};
use crate::image::{PixelBuffer, PixelFormat};
use crate::sprite::SpriteContext;
use crate::transparency::mask_alpha_table;

/// Largest width or height the format allows.
const PNG_MAX_DIMENSION: u32 = i32::MAX as u32;

/// Encode `image` as PNG into `writer` with default options.
///
/// ```
/// use spritepng::{png, CodecContext, PixelBuffer, PixelFormat, Sprite};
///
/// let sprite = Sprite::new(PixelFormat::TrueColor, 2, 2);
/// let image = PixelBuffer::new(PixelFormat::TrueColor, 2, 2);
/// let mut out = Vec::new();
/// png::encode(&mut out, &image, &sprite, &mut CodecContext::new()).unwrap();
/// assert_eq!(&out[..8], &png::PNG_SIGNATURE);
/// ```
pub fn encode<W, S>(
    writer: W,
    image: &PixelBuffer,
    sprite: &S,
    ctx: &mut CodecContext<'_>,
) -> Result<()>
where
    W: Write,
    S: SpriteContext + ?Sized,
{
    encode_with_options(writer, image, sprite, ctx, &EncodeOptions::default())
}

/// Encode `image` as PNG with custom options.
///
/// Failures are returned and also recorded on `ctx`. After a write failure
/// the bytes already written do not form a valid PNG.
pub fn encode_with_options<W, S>(
    writer: W,
    image: &PixelBuffer,
    sprite: &S,
    ctx: &mut CodecContext<'_>,
    options: &EncodeOptions,
) -> Result<()>
where
    W: Write,
    S: SpriteContext + ?Sized,
{
    encode_internal(writer, image, sprite, ctx, options).map_err(|err| ctx.fail(err))
}

fn validate(image: &PixelBuffer, options: &EncodeOptions) -> Result<()> {
    if !(1..=9).contains(&options.compression_level) {
        return Err(Error::InvalidCompressionLevel(options.compression_level));
    }
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 || width > PNG_MAX_DIMENSION || height > PNG_MAX_DIMENSION {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

fn write_ihdr<W: Write>(out: &mut W, width: u32, height: u32, color_type: ColorType) -> Result<()> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type.code());
    data.push(0); // compression
    data.push(0); // filter
    data.push(0); // interlace
    write_chunk(out, b"IHDR", &data)?;
    Ok(())
}

/// Copy one canonical row into PNG sample order for `color_type`.
fn pack_row(src: &[u8], color_type: ColorType, out: &mut [u8]) {
    match color_type {
        ColorType::Rgba | ColorType::GrayAlpha | ColorType::Indexed => out.copy_from_slice(src),
        ColorType::Rgb => {
            for (dst, px) in out.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
                dst.copy_from_slice(&px[..3]);
            }
        }
        ColorType::Gray => {
            for (dst, px) in out.iter_mut().zip(src.chunks_exact(2)) {
                *dst = px[0];
            }
        }
    }
}

fn encode_internal<W, S>(
    mut writer: W,
    image: &PixelBuffer,
    sprite: &S,
    ctx: &mut CodecContext<'_>,
    options: &EncodeOptions,
) -> Result<()>
where
    W: Write,
    S: SpriteContext + ?Sized,
{
    validate(image, options)?;

    let (width, height) = (image.width(), image.height());
    let color_type = ColorType::for_format(image.format(), sprite.needs_alpha());
    log::debug!(
        "encoding {width}x{height} {:?} as color type {}",
        image.format(),
        color_type.code()
    );

    writer.write_all(&PNG_SIGNATURE)?;
    write_ihdr(&mut writer, width, height, color_type)?;
    if image.format() == PixelFormat::Indexed {
        write_chunk(&mut writer, b"PLTE", &sprite.palette().to_rgb_bytes())?;
        if !sprite.has_background_layer() {
            write_chunk(&mut writer, b"tRNS", &mask_alpha_table(sprite.transparent_color()))?;
        }
    }

    let strategy = match (color_type, options.filter_strategy) {
        (ColorType::Indexed, FilterStrategy::Adaptive) => FilterStrategy::None,
        (_, strategy) => strategy,
    };
    let channels = color_type.channels();
    let row_len = width as usize * channels;
    let mut filter = RowFilter::new(strategy, row_len);
    let mut row = vec![0u8; row_len];
    let mut prev = vec![0u8; row_len];
    let mut filtered = Vec::with_capacity(row_len + 1);

    let idat = IdatWriter::new(&mut writer, options.idat_chunk_size);
    let mut zlib = ZlibEncoder::new(idat, Compression::new(u32::from(options.compression_level)));
    for y in 0..height {
        pack_row(image.row(y), color_type, &mut row);
        filtered.clear();
        filter.filter_row(&row, &prev, channels, &mut filtered);
        zlib.write_all(&filtered)?;
        std::mem::swap(&mut row, &mut prev);
        ctx.progress(f64::from(y + 1) / f64::from(height));
    }
    zlib.finish()?.finish()?;

    write_chunk(&mut writer, b"IEND", &[])?;
    writer.flush()?;
    Ok(())
}
