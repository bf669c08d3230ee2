//! Streaming PNG decoder.
//!
//! Supported:
//! - Color types 0, 2, 3, 4 and 6 at every bit depth the format allows
//! - Adam7 interlacing, with progressive refinement of the destination
//! - PLTE/tRNS for palette images; tRNS color keys on other types are ignored
//! - CRC validation for every chunk read; zlib checksums via `flate2`
//!
//! Rows are unfiltered and converted one at a time, so apart from the
//! destination buffer memory use is a few scanlines (plus one full-size
//! sample grid for interlaced images). Nothing after the last IDAT chunk is
//! read.

use std::cell::Cell;
use std::io::Read;

use flate2::read::ZlibDecoder;

use super::bit_depth::{filter_bpp, normalize_row, scanline_bytes};
use super::chunk::{is_critical, ChunkHeader, ChunkReader, IdatReader};
use super::filter::unfilter_row;
use super::interlace::{coverage, ADAM7};
use super::DecodeOptions;
use crate::color::{self, ColorType};
use crate::context::CodecContext;
use crate::error::{Error, Result};
use crate::image::{graya, rgba, try_zeroed, BufferFactory, DefaultFactory, PixelBuffer};
use crate::palette::{Palette, PALETTE_SIZE};
use crate::sprite::SpriteContext;
use crate::transparency::{collapse_index, resolve_mask_index, AlphaTable};

/// Largest width or height the format itself allows.
const PNG_MAX_DIMENSION: u32 = i32::MAX as u32;

/// Result of a decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Destination image. Complete unless `completed` is `false`.
    pub image: PixelBuffer,
    /// Whether the image carries transparency: an alpha channel, or a palette
    /// entry translucent enough to become the mask index.
    pub has_alpha: bool,
    /// `false` when the caller cancelled; every row not yet reached still
    /// holds what the factory put there (or an earlier interlace pass).
    pub completed: bool,
}

/// Decode a PNG from `reader`, publishing palette and mask index to `sprite`.
///
/// Uses default limits and zero-filled destination buffers.
pub fn decode<R, S>(reader: R, sprite: &mut S, ctx: &mut CodecContext<'_>) -> Result<Decoded>
where
    R: Read,
    S: SpriteContext + ?Sized,
{
    decode_with_options(
        reader,
        sprite,
        ctx,
        &DecodeOptions::default(),
        &mut DefaultFactory,
    )
}

/// Decode a PNG with explicit limits and destination allocator.
///
/// Failures are returned and also recorded on `ctx`.
pub fn decode_with_options<R, S, F>(
    reader: R,
    sprite: &mut S,
    ctx: &mut CodecContext<'_>,
    options: &DecodeOptions,
    factory: &mut F,
) -> Result<Decoded>
where
    R: Read,
    S: SpriteContext + ?Sized,
    F: BufferFactory + ?Sized,
{
    decode_internal(reader, sprite, ctx, options, factory).map_err(|err| ctx.fail(err))
}

/// Parsed IHDR chunk.
#[derive(Debug, Clone, Copy)]
struct Header {
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: u8,
    interlaced: bool,
}

fn parse_header(data: &[u8]) -> Result<Header> {
    if data.len() != 13 {
        return Err(Error::InvalidData(format!(
            "IHDR chunk has length {}, expected 13",
            data.len()
        )));
    }
    let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    if data[10] != 0 {
        return Err(Error::InvalidData(format!("unknown compression method {}", data[10])));
    }
    if data[11] != 0 {
        return Err(Error::InvalidData(format!("unknown filter method {}", data[11])));
    }
    let interlaced = match data[12] {
        0 => false,
        1 => true,
        other => return Err(Error::InvalidData(format!("unknown interlace method {other}"))),
    };
    Ok(Header {
        width,
        height,
        bit_depth: data[8],
        color_type: data[9],
        interlaced,
    })
}

fn check_dimensions(header: &Header, options: &DecodeOptions) -> Result<()> {
    let (width, height) = (header.width, header.height);
    if width == 0 || height == 0 || width > PNG_MAX_DIMENSION || height > PNG_MAX_DIMENSION {
        return Err(Error::InvalidData(format!("invalid image dimensions {width}x{height}")));
    }
    if width > options.max_dimension || height > options.max_dimension {
        return Err(Error::ImageTooLarge {
            width,
            height,
            max: options.max_dimension,
        });
    }
    Ok(())
}

fn parse_palette(data: &[u8]) -> Result<Vec<[u8; 3]>> {
    if data.is_empty() || data.len() % 3 != 0 || data.len() / 3 > PALETTE_SIZE {
        return Err(Error::InvalidData(format!("PLTE chunk has bad length {}", data.len())));
    }
    Ok(data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

/// Converts normalized sample rows into canonical pixels.
struct RowConverter<'a> {
    color_type: ColorType,
    alphas: &'a AlphaTable,
    mask_index: u8,
    palette_len: usize,
    warned: Cell<bool>,
}

impl RowConverter<'_> {
    /// Warn once per decode about a palette index with no PLTE entry.
    fn check_indices(&self, samples: &[u8]) {
        if self.color_type != ColorType::Indexed || self.warned.get() {
            return;
        }
        if let Some(&index) = samples.iter().find(|&&i| i as usize >= self.palette_len) {
            log::warn!("palette index {index} outside the {}-entry PLTE", self.palette_len);
            self.warned.set(true);
        }
    }

    fn convert(&self, samples: &[u8], dst: &mut [u8]) {
        match self.color_type {
            ColorType::Rgba | ColorType::GrayAlpha => dst.copy_from_slice(samples),
            ColorType::Rgb => {
                for (px, s) in dst.chunks_exact_mut(4).zip(samples.chunks_exact(3)) {
                    px.copy_from_slice(&rgba(s[0], s[1], s[2], 255));
                }
            }
            ColorType::Gray => {
                for (px, &v) in dst.chunks_exact_mut(2).zip(samples) {
                    px.copy_from_slice(&graya(v, 255));
                }
            }
            ColorType::Indexed => {
                for (px, &index) in dst.iter_mut().zip(samples) {
                    *px = collapse_index(index, self.alphas, self.mask_index);
                }
            }
        }
    }
}

/// Pulls filtered scanlines out of the zlib stream and normalizes them.
struct Scanlines<Z> {
    stream: Z,
    color_type: ColorType,
    bit_depth: u8,
    bpp: usize,
    line: Vec<u8>,
    prev: Vec<u8>,
}

impl<Z: Read> Scanlines<Z> {
    fn new(stream: Z, color_type: ColorType, bit_depth: u8, max_width: usize) -> Self {
        let channels = color_type.channels();
        let bytes = scanline_bytes(max_width, channels, bit_depth);
        Self {
            stream,
            color_type,
            bit_depth,
            bpp: filter_bpp(channels, bit_depth),
            line: vec![0; bytes + 1],
            prev: vec![0; bytes],
        }
    }

    /// Forget the previous row at the start of a pass.
    fn start_pass(&mut self) {
        self.prev.fill(0);
    }

    /// Read the next row of `width` pixels into `out` as 8-bit samples.
    fn read_row(&mut self, width: usize, out: &mut [u8]) -> Result<()> {
        let len = scanline_bytes(width, self.color_type.channels(), self.bit_depth);
        let line = &mut self.line[..=len];
        self.stream
            .read_exact(line)
            .map_err(|e| Error::from_read(e, "image data ended early"))?;
        let (filter, row) = line.split_at_mut(1);
        unfilter_row(filter[0], row, &self.prev[..len], self.bpp)?;
        normalize_row(row, self.color_type, self.bit_depth, out);
        self.prev[..len].copy_from_slice(row);
        Ok(())
    }
}

fn decode_internal<R, S, F>(
    reader: R,
    sprite: &mut S,
    ctx: &mut CodecContext<'_>,
    options: &DecodeOptions,
    factory: &mut F,
) -> Result<Decoded>
where
    R: Read,
    S: SpriteContext + ?Sized,
    F: BufferFactory + ?Sized,
{
    let mut chunks = ChunkReader::new(reader);
    chunks.read_signature()?;

    let first = chunks.next_header()?;
    if first.chunk_type != *b"IHDR" {
        return Err(Error::InvalidData(format!(
            "first chunk is {}, expected IHDR",
            first.name()
        )));
    }
    let header = parse_header(&chunks.read_body(&first)?)?;
    let negotiated = color::negotiate(header.color_type, header.bit_depth)?;
    check_dimensions(&header, options)?;
    log::debug!(
        "PNG {}x{} color type {} depth {}{} -> {:?}",
        header.width,
        header.height,
        header.color_type,
        header.bit_depth,
        if header.interlaced { " interlaced" } else { "" },
        negotiated.format
    );

    let mut plte: Option<Vec<[u8; 3]>> = None;
    let mut trns: Option<Vec<u8>> = None;
    let first_idat = loop {
        let next = chunks.next_header()?;
        match &next.chunk_type {
            b"IDAT" => break next,
            b"IEND" => return Err(Error::InvalidData("no IDAT chunk before IEND".into())),
            b"IHDR" => return Err(Error::InvalidData("multiple IHDR chunks".into())),
            b"PLTE" => {
                if plte.is_some() {
                    return Err(Error::InvalidData("multiple PLTE chunks".into()));
                }
                plte = Some(parse_palette(&chunks.read_body(&next)?)?);
            }
            b"tRNS" => trns = Some(chunks.read_body(&next)?),
            _ => skip_chunk(&mut chunks, &next)?,
        }
    };

    let (width, height) = (header.width, header.height);
    let format = negotiated.format;
    let mut image = factory
        .create(format, width, height)
        .filter(|img| img.format() == format && img.width() == width && img.height() == height)
        .ok_or(Error::Allocation { width, height })?;

    let mut alphas = AlphaTable::opaque();
    let mut has_alpha = negotiated.alpha_present();
    let mut palette_len = PALETTE_SIZE;
    if negotiated.color_type == ColorType::Indexed {
        let colors = plte.ok_or_else(|| Error::InvalidData("palette image without PLTE".into()))?;
        palette_len = colors.len();
        sprite.set_palette(Palette::from_colors(&colors));
        if let Some(mut trns) = trns {
            if trns.len() > palette_len {
                log::warn!(
                    "tRNS has {} entries for a {palette_len}-color palette; extra entries ignored",
                    trns.len()
                );
                trns.truncate(palette_len);
            }
            alphas = AlphaTable::from_trns(&trns);
        }
        if let Some(mask) = resolve_mask_index(&alphas) {
            log::debug!("palette entry {mask} becomes the mask index");
            sprite.set_transparent_color(mask);
            has_alpha = true;
        }
    } else if trns.is_some() {
        log::debug!("ignoring tRNS color key for color type {}", header.color_type);
    }
    ctx.set_has_alpha(has_alpha);

    let converter = RowConverter {
        color_type: negotiated.color_type,
        alphas: &alphas,
        mask_index: sprite.transparent_color(),
        palette_len,
        warned: Cell::new(false),
    };
    let idat = IdatReader::new(&mut chunks, first_idat);
    let mut rows = Scanlines::new(
        ZlibDecoder::new(idat),
        negotiated.color_type,
        header.bit_depth,
        width as usize,
    );

    let completed = if header.interlaced {
        read_interlaced(&mut rows, &converter, &mut image, ctx)?
    } else {
        read_sequential(&mut rows, &converter, &mut image, ctx)?
    };
    if !completed {
        log::debug!("decode cancelled");
    }

    Ok(Decoded {
        image,
        has_alpha,
        completed,
    })
}

fn skip_chunk<R: Read>(chunks: &mut ChunkReader<R>, header: &ChunkHeader) -> Result<()> {
    chunks.read_body(header)?;
    if is_critical(&header.chunk_type) {
        return Err(Error::InvalidData(format!(
            "unknown critical chunk {}",
            header.name()
        )));
    }
    log::debug!("skipping {} chunk ({} bytes)", header.name(), header.length);
    Ok(())
}

/// Single pass; returns `false` if cancelled.
fn read_sequential<Z: Read>(
    rows: &mut Scanlines<Z>,
    converter: &RowConverter<'_>,
    image: &mut PixelBuffer,
    ctx: &mut CodecContext<'_>,
) -> Result<bool> {
    let (width, height) = (image.width(), image.height());
    let mut samples = vec![0u8; width as usize * converter.color_type.channels()];
    for y in 0..height {
        rows.read_row(width as usize, &mut samples)?;
        converter.check_indices(&samples);
        converter.convert(&samples, image.row_mut(y));
        ctx.progress(f64::from(y + 1) / f64::from(height));
        if ctx.is_stopped() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Seven Adam7 passes; every pass redraws all rows from the pixels known so
/// far. Returns `false` if cancelled.
fn read_interlaced<Z: Read>(
    rows: &mut Scanlines<Z>,
    converter: &RowConverter<'_>,
    image: &mut PixelBuffer,
    ctx: &mut CodecContext<'_>,
) -> Result<bool> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let channels = converter.color_type.channels();
    let mut known = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .and_then(try_zeroed)
        .ok_or(Error::Allocation {
            width: width as u32,
            height: height as u32,
        })?;
    let mut pass_row = vec![0u8; width * channels];
    let mut display = vec![0u8; width * channels];
    let passes = ADAM7.len() as f64;

    for (index, pass) in ADAM7.iter().enumerate() {
        let (pass_width, pass_height) = pass.size(width as u32, height as u32);
        if pass_width > 0 && pass_height > 0 {
            rows.start_pass();
            let samples = &mut pass_row[..pass_width as usize * channels];
            for j in 0..pass_height {
                rows.read_row(pass_width as usize, samples)?;
                converter.check_indices(samples);
                let y = (pass.y_start + j * pass.y_step) as usize;
                for (i, px) in samples.chunks_exact(channels).enumerate() {
                    let x = pass.x_start as usize + i * pass.x_step as usize;
                    let at = (y * width + x) * channels;
                    known[at..at + channels].copy_from_slice(px);
                }
            }
        }

        let (cell_w, cell_h) = coverage(index);
        let (cell_w, cell_h) = (cell_w as usize, cell_h as usize);
        for y in 0..height {
            let src = &known[(y - y % cell_h) * width * channels..][..width * channels];
            for (x, px) in display.chunks_exact_mut(channels).enumerate() {
                let at = (x - x % cell_w) * channels;
                px.copy_from_slice(&src[at..at + channels]);
            }
            converter.convert(&display, image.row_mut(y as u32));
            ctx.progress((index as f64 + (y + 1) as f64 / height as f64) / passes);
            if ctx.is_stopped() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
