//! # spritepng
//!
//! PNG loading and saving for a sprite editor's canonical image formats,
//! plus the undoable image-replacement command the editor builds on.
//!
//! Images live in one of three formats (RGBA, gray+alpha, palette index).
//! Indexed images have no per-pixel alpha: the sprite designates one palette
//! slot, the *mask index*, as transparent, and the codec translates between
//! that and PNG's per-entry palette alpha in both directions.
//!
//! ## Features
//!
//! - **Decoding** of every PNG color type and bit depth, including Adam7
//!   interlacing with progressive refinement, into caller-allocated buffers
//! - **Encoding** with per-row filtering and `flate2` compression
//! - Progress reporting and cancellation (`enough::Stop`) per row
//! - **Commands**: `ReplaceImage` with undo/redo, transactions and a
//!   right-angle rotation job built on them
//!
//! ## Example
//!
//! ```rust
//! use spritepng::{png, CodecContext, PixelBuffer, PixelFormat, Sprite, SpriteContext};
//!
//! let mut sprite = Sprite::new(PixelFormat::Indexed, 2, 1);
//! sprite.set_transparent_color(1);
//! let image = PixelBuffer::from_raw(PixelFormat::Indexed, 2, 1, vec![0, 1]).unwrap();
//!
//! let mut bytes = Vec::new();
//! png::encode(&mut bytes, &image, &sprite, &mut CodecContext::new()).unwrap();
//!
//! let mut loaded = Sprite::new(PixelFormat::Indexed, 2, 1);
//! let decoded = png::decode(&bytes[..], &mut loaded, &mut CodecContext::new()).unwrap();
//! assert_eq!(decoded.image, image);
//! assert_eq!(loaded.transparent_color(), 1);
//! assert!(decoded.has_alpha);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod color;
pub mod context;
pub mod error;
pub mod image;
pub mod palette;
pub mod png;
pub mod registry;
pub mod rotate;
pub mod sprite;
pub mod transparency;

pub use cmd::{Cmd, CmdGroup, CmdState, ReplaceImage, SetSpriteSize, Transaction};
pub use color::ColorType;
pub use context::CodecContext;
pub use enough::{Stop, Unstoppable};
pub use error::{Error, ErrorKind, Result};
pub use image::{BufferFactory, DefaultFactory, ImageId, PixelBuffer, PixelFormat};
pub use palette::Palette;
pub use png::{DecodeOptions, Decoded, EncodeOptions, FilterStrategy};
pub use registry::ImageRegistry;
pub use sprite::{Sprite, SpriteContext};
pub use transparency::AlphaTable;
