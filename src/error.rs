//! Error types for the spritepng library.

use std::io;

use crate::image::ImageId;

/// Result type alias for spritepng operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure category, used by callers to decide between trying another
/// loader, reporting a setup bug, or giving up on a damaged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The PNG is well-formed but uses a color type or bit depth with no
    /// canonical mapping. Raised before any destination buffer exists.
    UnsupportedFormat,
    /// Invalid input or context detected before any stream I/O happened.
    Structural,
    /// I/O failure or corrupt/truncated data in the middle of a decode or
    /// encode. No usable output exists.
    Stream,
}

/// Errors that can occur while converting between PNG and pixel buffers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// PNG color type value outside the set defined by the format.
    #[error("unsupported PNG color type {0}")]
    UnsupportedColorType(u8),

    /// Bit depth not allowed for the given color type.
    #[error("unsupported bit depth {bit_depth} for PNG color type {color_type}")]
    UnsupportedBitDepth {
        /// Raw IHDR color type.
        color_type: u8,
        /// Raw IHDR bit depth.
        bit_depth: u8,
    },

    /// Invalid image dimensions (zero width or height).
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// Image dimensions exceed the configured maximum.
    #[error("image {width}x{height} exceeds maximum dimension {max}")]
    ImageTooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Maximum supported dimension.
        max: u32,
    },

    /// Pixel data length doesn't match the buffer geometry.
    #[error("invalid pixel data length: expected {expected} bytes, got {actual}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        actual: usize,
    },

    /// Invalid compression level (must be 1-9).
    #[error("invalid compression level {0}: must be 1-9")]
    InvalidCompressionLevel(u8),

    /// The destination buffer factory refused to allocate.
    #[error("cannot allocate {width}x{height} destination image")]
    Allocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Malformed PNG structure (bad signature, CRC, chunk layout, ...).
    #[error("invalid PNG data: {0}")]
    InvalidData(String),

    /// The stream ended before the image data was complete.
    #[error("truncated PNG data: {0}")]
    Truncated(String),

    /// Underlying read/write or zlib failure.
    #[error("PNG stream I/O error: {0}")]
    Io(#[from] io::Error),

    /// No buffer is bound to the given identity.
    #[error("image {0:?} is not bound")]
    ImageNotBound(ImageId),

    /// The identity already has a bound buffer.
    #[error("image {0:?} is already bound")]
    ImageAlreadyBound(ImageId),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedColorType(_) | Error::UnsupportedBitDepth { .. } => {
                ErrorKind::UnsupportedFormat
            }
            Error::InvalidDimensions { .. }
            | Error::InvalidDataLength { .. }
            | Error::InvalidCompressionLevel(_)
            | Error::ImageNotBound(_)
            | Error::ImageAlreadyBound(_) => ErrorKind::Structural,
            Error::ImageTooLarge { .. }
            | Error::Allocation { .. }
            | Error::InvalidData(_)
            | Error::Truncated(_)
            | Error::Io(_) => ErrorKind::Stream,
        }
    }

    /// Map a read failure coming out of the zlib/IDAT pipeline.
    ///
    /// An early EOF means the file was cut short; anything else is passed on
    /// as an I/O error.
    pub(crate) fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::Truncated(what.to_string())
        } else {
            Error::Io(err)
        }
    }
}
