//! Canvas resize command.

use super::{Cmd, CmdState};
use crate::error::Result;
use crate::sprite::Sprite;

/// Change the sprite's canvas size.
#[derive(Debug)]
pub struct SetSpriteSize {
    width: u32,
    height: u32,
    previous: (u32, u32),
    state: CmdState,
}

impl SetSpriteSize {
    /// Resize the canvas to `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            previous: (0, 0),
            state: CmdState::Pending,
        }
    }
}

impl Cmd for SetSpriteSize {
    fn label(&self) -> &str {
        "Set Sprite Size"
    }

    fn execute(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Pending, "execute");
        self.previous = (sprite.width(), sprite.height());
        sprite.set_size(self.width, self.height);
        self.state = CmdState::Done;
        Ok(())
    }

    fn undo(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Done, "undo");
        sprite.set_size(self.previous.0, self.previous.1);
        self.state = CmdState::Undone;
        Ok(())
    }

    fn redo(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Undone, "redo");
        sprite.set_size(self.width, self.height);
        self.state = CmdState::Done;
        Ok(())
    }
}
