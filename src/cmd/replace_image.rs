//! Swapping one image for another under a new identity.

use super::{Cmd, CmdState};
use crate::error::{Error, Result};
use crate::image::{ImageId, PixelBuffer};
use crate::sprite::Sprite;

/// Rebind an image identity to a new buffer under a new identity.
///
/// Before execution the command holds the incoming buffer; afterwards it
/// holds whichever buffer is currently *not* bound, so undo and redo just
/// swap it with the registry. At most one of the two identities is bound at
/// any time.
#[derive(Debug)]
pub struct ReplaceImage {
    old_id: ImageId,
    new_id: ImageId,
    held: Option<PixelBuffer>,
    state: CmdState,
}

impl ReplaceImage {
    /// Replace the buffer bound to `old_id` with `image`, bound as `new_id`.
    pub fn new(old_id: ImageId, new_id: ImageId, image: PixelBuffer) -> Self {
        Self {
            old_id,
            new_id,
            held: Some(image),
            state: CmdState::Pending,
        }
    }

    /// Identity being replaced.
    pub fn old_id(&self) -> ImageId {
        self.old_id
    }

    /// Identity bound after execution.
    pub fn new_id(&self) -> ImageId {
        self.new_id
    }

    /// The buffer not currently bound: the incoming image before execution
    /// and after undo, the displaced one after execute or redo.
    pub fn held(&self) -> Option<&PixelBuffer> {
        self.held.as_ref()
    }

    /// Lifecycle state.
    pub fn state(&self) -> CmdState {
        self.state
    }

    /// Bind the held buffer to `to` in place of `from`, keeping the buffer
    /// `from` had. Nothing changes if the rebinding is not possible.
    fn swap(&mut self, sprite: &mut Sprite, from: ImageId, to: ImageId) -> Result<()> {
        sprite.images().check_replace(from, to)?;
        // Present between steps.
        let held = self.held.take().ok_or(Error::ImageNotBound(from))?;
        let displaced = sprite.images_mut().replace(from, to, held)?;
        self.held = Some(displaced);
        Ok(())
    }
}

impl Cmd for ReplaceImage {
    fn label(&self) -> &str {
        "Replace Image"
    }

    fn execute(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Pending, "execute");
        self.swap(sprite, self.old_id, self.new_id)?;
        self.state = CmdState::Done;
        Ok(())
    }

    fn undo(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Done, "undo");
        self.swap(sprite, self.new_id, self.old_id)?;
        self.state = CmdState::Undone;
        Ok(())
    }

    fn redo(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Undone, "redo");
        self.swap(sprite, self.old_id, self.new_id)?;
        self.state = CmdState::Done;
        Ok(())
    }
}
