//! Canonical in-memory pixel storage.
//!
//! Every image the editor works with is held in one of three formats:
//!
//! | format | bytes per pixel | layout |
//! |---|---|---|
//! | [`PixelFormat::TrueColor`] | 4 | R, G, B, A |
//! | [`PixelFormat::Grayscale`] | 2 | V, A |
//! | [`PixelFormat::Indexed`] | 1 | palette index |
//!
//! Indexed images carry no per-pixel alpha; a pixel is transparent when its
//! index equals the owning sprite's mask index.

use crate::error::{Error, Result};

/// Canonical pixel format of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit RGBA.
    TrueColor,
    /// 8-bit value + alpha.
    Grayscale,
    /// 8-bit palette index.
    Indexed,
}

impl PixelFormat {
    /// Returns the number of bytes per pixel for this format.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::TrueColor => 4,
            PixelFormat::Grayscale => 2,
            PixelFormat::Indexed => 1,
        }
    }
}

/// Stable identity of an image inside a sprite's registry.
///
/// The identity outlives any particular buffer: undo/redo rebinds identities
/// to different buffers without changing what the rest of the document
/// refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

/// Pack an RGBA TrueColor sample.
#[inline]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    [r, g, b, a]
}

/// Pack a value+alpha Grayscale sample.
#[inline]
pub const fn graya(v: u8, a: u8) -> [u8; 2] {
    [v, a]
}

/// Bytes needed for a `width` x `height` image, if that fits in `usize`.
fn buffer_len(format: PixelFormat, width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(format.bytes_per_pixel())
}

/// Zero-filled vector of `len` bytes, or `None` if the allocator refuses.
pub(crate) fn try_zeroed(len: usize) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).ok()?;
    data.resize(len, 0);
    Some(data)
}

/// Row-major raster in one of the canonical formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer.
    ///
    /// # Panics
    ///
    /// Panics if the size overflows `usize` or the allocation fails. Use
    /// [`PixelBuffer::try_new`] for sizes taken from untrusted input.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        let len = buffer_len(format, width, height)
            .unwrap_or_else(|| panic!("{width}x{height} {format:?} image overflows usize"));
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    /// Create a zero-filled buffer, or `None` if the size overflows or the
    /// memory cannot be reserved.
    pub fn try_new(format: PixelFormat, width: u32, height: u32) -> Option<Self> {
        let data = try_zeroed(buffer_len(format, width, height)?)?;
        Some(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Wrap existing sample bytes, checking that they match the geometry.
    pub fn from_raw(format: PixelFormat, width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(format, width, height).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(Error::InvalidDataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes in one row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// All sample bytes, row-major.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its sample bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Samples of row `y`.
    ///
    /// # Panics
    /// If `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let row_bytes = self.row_bytes();
        let start = y as usize * row_bytes;
        &self.data[start..start + row_bytes]
    }

    /// Mutable samples of row `y`.
    ///
    /// # Panics
    /// If `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let row_bytes = self.row_bytes();
        let start = y as usize * row_bytes;
        &mut self.data[start..start + row_bytes]
    }

    /// Sample bytes of one pixel, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        Some(&self.data[start..start + bpp])
    }

    /// Overwrite one pixel. Out-of-range coordinates are ignored.
    ///
    /// # Panics
    /// If `sample` is not exactly one pixel wide for this format.
    pub fn put_pixel(&mut self, x: u32, y: u32, sample: &[u8]) {
        let bpp = self.format.bytes_per_pixel();
        assert_eq!(sample.len(), bpp, "sample width mismatch");
        if x >= self.width || y >= self.height {
            return;
        }
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        self.data[start..start + bpp].copy_from_slice(sample);
    }

    /// Fill every pixel with `sample`.
    pub fn clear(&mut self, sample: &[u8]) {
        assert_eq!(sample.len(), self.format.bytes_per_pixel());
        for px in self.data.chunks_exact_mut(sample.len()) {
            px.copy_from_slice(sample);
        }
    }
}

/// Creates destination buffers for the decoder.
///
/// The decoder calls this once, after the PNG header has been read, with the
/// negotiated format and the header's authoritative dimensions. Returning
/// `None` aborts the decode.
pub trait BufferFactory {
    /// Allocate a buffer of the given format and size.
    fn create(&mut self, format: PixelFormat, width: u32, height: u32) -> Option<PixelBuffer>;
}

impl<F> BufferFactory for F
where
    F: FnMut(PixelFormat, u32, u32) -> Option<PixelBuffer>,
{
    fn create(&mut self, format: PixelFormat, width: u32, height: u32) -> Option<PixelBuffer> {
        self(format, width, height)
    }
}

/// Factory that allocates zero-filled buffers, declining sizes the allocator
/// cannot satisfy.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFactory;

impl BufferFactory for DefaultFactory {
    fn create(&mut self, format: PixelFormat, width: u32, height: u32) -> Option<PixelBuffer> {
        let buffer = PixelBuffer::try_new(format, width, height);
        if buffer.is_none() {
            log::warn!("cannot allocate a {width}x{height} {format:?} image");
        }
        buffer
    }
}
