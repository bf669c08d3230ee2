//! The sprite-side collaborator of the codec.
//!
//! The codec never owns palette or transparency state; it reads and writes
//! them through [`SpriteContext`]. [`Sprite`] is the in-crate implementation,
//! which also owns the image registry used by undoable commands.

use crate::image::{ImageId, PixelBuffer, PixelFormat};
use crate::palette::Palette;
use crate::registry::ImageRegistry;

/// Sprite properties the PNG codec reads and writes.
pub trait SpriteContext {
    /// Current palette.
    fn palette(&self) -> &Palette;

    /// Replace the palette.
    fn set_palette(&mut self, palette: Palette);

    /// The mask index: palette slot rendered as transparent.
    fn transparent_color(&self) -> u8;

    /// Change the mask index.
    fn set_transparent_color(&mut self, index: u8);

    /// Whether TrueColor/Grayscale images must be saved with an alpha channel.
    fn needs_alpha(&self) -> bool;

    /// Whether the sprite has an opaque background layer. Sprites without one
    /// need a transparent palette slot when saved as indexed PNG.
    fn has_background_layer(&self) -> bool;
}

/// Document-level image container.
#[derive(Debug)]
pub struct Sprite {
    format: PixelFormat,
    width: u32,
    height: u32,
    palette: Palette,
    transparent_color: u8,
    background: bool,
    images: ImageRegistry,
}

impl Sprite {
    /// Empty sprite of the given format and canvas size, without a background
    /// layer.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            palette: Palette::default(),
            transparent_color: 0,
            background: false,
            images: ImageRegistry::new(),
        }
    }

    /// Set whether the sprite has a background layer.
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    /// Pixel format of the sprite's images.
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Canvas width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize the canvas (does not touch images).
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Add or remove the background layer.
    pub fn set_background(&mut self, background: bool) {
        self.background = background;
    }

    /// Register a buffer under a fresh identity.
    pub fn add_image(&mut self, buffer: PixelBuffer) -> ImageId {
        let id = self.images.next_image_id();
        // A fresh identity is never bound.
        let _ = self.images.bind(id, buffer);
        id
    }

    /// Buffer currently bound to `id`.
    pub fn image(&self, id: ImageId) -> Option<&PixelBuffer> {
        self.images.get(id)
    }

    /// The image registry.
    pub fn images(&self) -> &ImageRegistry {
        &self.images
    }

    /// Mutable image registry.
    pub fn images_mut(&mut self) -> &mut ImageRegistry {
        &mut self.images
    }
}

impl SpriteContext for Sprite {
    fn palette(&self) -> &Palette {
        &self.palette
    }

    fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    fn transparent_color(&self) -> u8 {
        self.transparent_color
    }

    fn set_transparent_color(&mut self, index: u8) {
        self.transparent_color = index;
    }

    fn needs_alpha(&self) -> bool {
        match self.format {
            PixelFormat::TrueColor | PixelFormat::Grayscale => !self.background,
            PixelFormat::Indexed => false,
        }
    }

    fn has_background_layer(&self) -> bool {
        self.background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_alpha() {
        assert!(Sprite::new(PixelFormat::TrueColor, 1, 1).needs_alpha());
        assert!(Sprite::new(PixelFormat::Grayscale, 1, 1).needs_alpha());
        assert!(!Sprite::new(PixelFormat::Indexed, 1, 1).needs_alpha());
        assert!(!Sprite::new(PixelFormat::TrueColor, 1, 1)
            .with_background(true)
            .needs_alpha());
    }

    #[test]
    fn test_add_image() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 2, 2);
        let a = sprite.add_image(PixelBuffer::new(PixelFormat::Indexed, 2, 2));
        let b = sprite.add_image(PixelBuffer::new(PixelFormat::Indexed, 2, 2));
        assert_ne!(a, b);
        assert!(sprite.image(a).is_some());
        assert_eq!(sprite.images().len(), 2);
    }

    #[test]
    fn test_transparent_color_default() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 1, 1);
        assert_eq!(sprite.transparent_color(), 0);
        sprite.set_transparent_color(9);
        assert_eq!(sprite.transparent_color(), 9);
    }
}
