//! Right-angle rotation of images and whole sprites.
//!
//! # Example
//!
//! ```rust
//! use spritepng::rotate::{rotate_image, Rotation};
//! use spritepng::{PixelBuffer, PixelFormat};
//!
//! let src = PixelBuffer::from_raw(PixelFormat::Indexed, 3, 1, vec![1, 2, 3]).unwrap();
//! let dst = rotate_image(&src, Rotation::Clockwise);
//! assert_eq!((dst.width(), dst.height()), (1, 3));
//! assert_eq!(dst.as_bytes(), &[1, 2, 3]);
//! ```

use crate::cmd::{CmdGroup, ReplaceImage, SetSpriteSize, Transaction};
use crate::context::CodecContext;
use crate::error::{Error, Result};
use crate::image::PixelBuffer;
use crate::sprite::Sprite;

/// Rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// 90 degrees clockwise.
    Clockwise,
    /// 180 degrees.
    Half,
    /// 90 degrees counter-clockwise.
    CounterClockwise,
}

impl Rotation {
    /// Map degrees (90, 180, -90 or 270, -180) to a rotation.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            90 => Some(Rotation::Clockwise),
            180 => Some(Rotation::Half),
            270 => Some(Rotation::CounterClockwise),
            _ => None,
        }
    }

    /// Whether width and height trade places.
    #[inline]
    pub fn swaps_axes(self) -> bool {
        !matches!(self, Rotation::Half)
    }
}

/// Rotated copy of `src`, in the same pixel format.
pub fn rotate_image(src: &PixelBuffer, rotation: Rotation) -> PixelBuffer {
    let (w, h) = (src.width(), src.height());
    let (dst_w, dst_h) = if rotation.swaps_axes() { (h, w) } else { (w, h) };
    let mut dst = PixelBuffer::new(src.format(), dst_w, dst_h);
    let bpp = src.format().bytes_per_pixel();

    for y in 0..h {
        for (x, px) in (0..w).zip(src.row(y).chunks_exact(bpp)) {
            let (dx, dy) = match rotation {
                Rotation::Clockwise => (h - 1 - y, x),
                Rotation::Half => (w - 1 - x, h - 1 - y),
                Rotation::CounterClockwise => (y, w - 1 - x),
            };
            dst.put_pixel(dx, dy, px);
        }
    }
    dst
}

/// Rotate every image of `sprite` as one undoable change.
///
/// Each image is replaced by a rotated copy under a fresh identity. Progress
/// is reported per image; if `ctx` asks to stop, everything done so far is
/// rolled back and `Ok(None)` is returned. Otherwise the canvas size follows
/// the rotation and the committed group is returned, ready for an undo
/// history.
pub fn rotate_sprite(
    sprite: &mut Sprite,
    rotation: Rotation,
    ctx: &mut CodecContext<'_>,
) -> Result<Option<CmdGroup>> {
    rotate_internal(sprite, rotation, ctx).map_err(|err| ctx.fail(err))
}

fn rotate_internal(
    sprite: &mut Sprite,
    rotation: Rotation,
    ctx: &mut CodecContext<'_>,
) -> Result<Option<CmdGroup>> {
    let ids = sprite.images().ids();
    let (width, height) = (sprite.width(), sprite.height());
    let mut tx = Transaction::new(sprite, "Rotate Canvas");

    for (done, &old_id) in ids.iter().enumerate() {
        let src = tx.sprite().image(old_id).ok_or(Error::ImageNotBound(old_id))?;
        let rotated = rotate_image(src, rotation);
        let new_id = tx.sprite_mut().images_mut().next_image_id();
        tx.execute(Box::new(ReplaceImage::new(old_id, new_id, rotated)))?;

        ctx.progress((done + 1) as f64 / ids.len() as f64);
        if ctx.is_stopped() {
            log::debug!("rotation cancelled after {} of {} images", done + 1, ids.len());
            return Ok(None);
        }
    }

    if rotation.swaps_axes() {
        tx.execute(Box::new(SetSpriteSize::new(height, width)))?;
    }
    Ok(Some(tx.commit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::Cmd;
    use crate::image::PixelFormat;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn grid() -> PixelBuffer {
        // 1 2 3
        // 4 5 6
        PixelBuffer::from_raw(PixelFormat::Indexed, 3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn test_from_degrees() {
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Clockwise));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::CounterClockwise));
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Half));
        assert_eq!(Rotation::from_degrees(-180), Some(Rotation::Half));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(0), None);
    }

    #[test]
    fn test_rotate_clockwise() {
        let out = rotate_image(&grid(), Rotation::Clockwise);
        assert_eq!((out.width(), out.height()), (2, 3));
        assert_eq!(out.as_bytes(), &[4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn test_rotate_counter_clockwise() {
        let out = rotate_image(&grid(), Rotation::CounterClockwise);
        assert_eq!(out.as_bytes(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn test_rotate_half() {
        let out = rotate_image(&grid(), Rotation::Half);
        assert_eq!((out.width(), out.height()), (3, 2));
        assert_eq!(out.as_bytes(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_rotate_truecolor_keeps_pixels_whole() {
        let src = PixelBuffer::from_raw(
            PixelFormat::TrueColor,
            2,
            1,
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        )
        .unwrap();
        let out = rotate_image(&src, Rotation::Clockwise);
        assert_eq!(out.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!((out.width(), out.height()), (1, 2));
    }

    #[test]
    fn test_rotate_sprite_and_undo() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 3, 2);
        let a = sprite.add_image(grid());
        let b = sprite.add_image(grid());

        let mut seen = Vec::new();
        let mut ctx = CodecContext::new().with_progress(|f| seen.push(f));
        let mut group = rotate_sprite(&mut sprite, Rotation::Clockwise, &mut ctx)
            .unwrap()
            .unwrap();
        drop(ctx);

        assert_eq!(seen, vec![0.5, 1.0]);
        assert_eq!((sprite.width(), sprite.height()), (2, 3));
        assert!(!sprite.images().contains(a));
        assert!(!sprite.images().contains(b));
        for id in sprite.images().ids() {
            assert_eq!(sprite.image(id).unwrap().as_bytes(), &[4, 1, 5, 2, 6, 3]);
        }

        group.undo(&mut sprite).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (3, 2));
        assert_eq!(sprite.images().ids(), vec![a, b]);
        assert_eq!(sprite.image(a).unwrap(), &grid());

        group.redo(&mut sprite).unwrap();
        assert_eq!(sprite.width(), 2);
        assert!(!sprite.images().contains(a));
    }

    struct Flag(AtomicBool);

    impl enough::Stop for Flag {
        fn check(&self) -> std::result::Result<(), enough::StopReason> {
            if self.0.load(Ordering::SeqCst) {
                Err(enough::StopReason::Cancelled)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_cancel_rolls_back() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 3, 2);
        let a = sprite.add_image(grid());
        let b = sprite.add_image(grid());

        let stop = Flag(AtomicBool::new(false));
        let mut ctx = CodecContext::new()
            .with_stop(&stop)
            .with_progress(|_| stop.0.store(true, Ordering::SeqCst));
        let result = rotate_sprite(&mut sprite, Rotation::Half, &mut ctx).unwrap();

        assert!(result.is_none());
        assert_eq!(sprite.images().ids(), vec![a, b]);
        assert_eq!(sprite.image(a).unwrap(), &grid());
        assert_eq!(sprite.width(), 3);
    }
}
