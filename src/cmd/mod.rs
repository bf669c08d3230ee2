//! Undoable document commands.
//!
//! A [`Cmd`] is executed once, then alternates between undo and redo. The
//! order is a contract: calling a step out of turn is a programming error and
//! panics. Steps that touch the image registry can still fail with a
//! structural error, in which case the command and the sprite are left as
//! they were.

mod replace_image;
mod set_sprite_size;

pub use replace_image::ReplaceImage;
pub use set_sprite_size::SetSpriteSize;

use std::fmt;

use crate::error::{Error, Result};
use crate::sprite::Sprite;

/// An undoable change to a [`Sprite`].
pub trait Cmd: fmt::Debug {
    /// Short human-readable name, e.g. for an Edit menu.
    fn label(&self) -> &str;

    /// Apply the change for the first time.
    fn execute(&mut self, sprite: &mut Sprite) -> Result<()>;

    /// Revert the change. Only valid right after `execute` or `redo`.
    fn undo(&mut self, sprite: &mut Sprite) -> Result<()>;

    /// Re-apply the change. Only valid right after `undo`.
    fn redo(&mut self, sprite: &mut Sprite) -> Result<()>;
}

/// Where a command is in its execute/undo/redo lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdState {
    /// Not executed yet.
    Pending,
    /// Executed or redone.
    Done,
    /// Undone.
    Undone,
}

impl CmdState {
    /// Panic unless a step that requires `self == expected` may run.
    #[track_caller]
    pub fn require(self, expected: CmdState, step: &str) {
        assert!(
            self == expected,
            "{step} called on a command in state {self:?}, expected {expected:?}"
        );
    }
}

/// Commands executed, undone and redone as one unit.
#[derive(Debug)]
pub struct CmdGroup {
    label: String,
    cmds: Vec<Box<dyn Cmd>>,
    state: CmdState,
}

impl CmdGroup {
    /// Empty, not yet executed group.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            cmds: Vec::new(),
            state: CmdState::Pending,
        }
    }

    /// Append a command to run on `execute`.
    pub fn push(&mut self, cmd: Box<dyn Cmd>) {
        self.state.require(CmdState::Pending, "push");
        self.cmds.push(cmd);
    }

    /// Number of commands in the group.
    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    /// Whether the group holds no commands.
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CmdState {
        self.state
    }
}

impl Cmd for CmdGroup {
    fn label(&self) -> &str {
        &self.label
    }

    fn execute(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Pending, "execute");
        for i in 0..self.cmds.len() {
            if let Err(err) = self.cmds[i].execute(sprite) {
                unwind(&mut self.cmds[..i], sprite);
                return Err(err);
            }
        }
        self.state = CmdState::Done;
        Ok(())
    }

    fn undo(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Done, "undo");
        for cmd in self.cmds.iter_mut().rev() {
            cmd.undo(sprite)?;
        }
        self.state = CmdState::Undone;
        Ok(())
    }

    fn redo(&mut self, sprite: &mut Sprite) -> Result<()> {
        self.state.require(CmdState::Undone, "redo");
        for cmd in &mut self.cmds {
            cmd.redo(sprite)?;
        }
        self.state = CmdState::Done;
        Ok(())
    }
}

/// Undo `cmds` (all done) in reverse order, logging failures.
fn unwind(cmds: &mut [Box<dyn Cmd>], sprite: &mut Sprite) {
    for cmd in cmds.iter_mut().rev() {
        if let Err(err) = cmd.undo(sprite) {
            log::error!("rolling back {}: {err}", cmd.label());
        }
    }
}

/// Commands executed against a sprite that are either committed together or
/// rolled back together.
///
/// Dropping a transaction without calling [`commit`](Self::commit) undoes
/// everything it executed, newest first.
#[derive(Debug)]
pub struct Transaction<'s> {
    sprite: &'s mut Sprite,
    label: String,
    done: Vec<Box<dyn Cmd>>,
}

impl<'s> Transaction<'s> {
    /// Start a transaction on `sprite`.
    pub fn new(sprite: &'s mut Sprite, label: impl Into<String>) -> Self {
        Self {
            sprite,
            label: label.into(),
            done: Vec::new(),
        }
    }

    /// The sprite being changed.
    pub fn sprite(&self) -> &Sprite {
        self.sprite
    }

    /// Mutable access to the sprite, e.g. to allocate image identities.
    pub fn sprite_mut(&mut self) -> &mut Sprite {
        self.sprite
    }

    /// Execute `cmd` and keep it for commit or rollback. A command whose
    /// execution fails is dropped; earlier ones stay.
    pub fn execute(&mut self, mut cmd: Box<dyn Cmd>) -> Result<()> {
        cmd.execute(self.sprite)?;
        self.done.push(cmd);
        Ok(())
    }

    /// Number of commands executed so far.
    pub fn len(&self) -> usize {
        self.done.len()
    }

    /// Whether nothing has been executed yet.
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Keep every change and return them as one command, already done.
    pub fn commit(mut self) -> CmdGroup {
        let cmds = std::mem::take(&mut self.done);
        log::debug!("commit {} ({} commands)", self.label, cmds.len());
        CmdGroup {
            label: std::mem::take(&mut self.label),
            cmds,
            state: CmdState::Done,
        }
    }

    /// Undo every change now, reporting the first failure.
    pub fn rollback(mut self) -> Result<()> {
        let mut first: Option<Error> = None;
        while let Some(mut cmd) = self.done.pop() {
            if let Err(err) = cmd.undo(self.sprite) {
                log::error!("rolling back {}: {err}", cmd.label());
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.done.is_empty() {
            log::debug!("rolling back {} ({} commands)", self.label, self.done.len());
            unwind(&mut self.done, self.sprite);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;

    #[test]
    fn test_transaction_drop_rolls_back() {
        let mut sprite = Sprite::new(PixelFormat::TrueColor, 4, 2);
        {
            let mut tx = Transaction::new(&mut sprite, "resize");
            tx.execute(Box::new(SetSpriteSize::new(8, 8))).unwrap();
            tx.execute(Box::new(SetSpriteSize::new(16, 1))).unwrap();
            assert_eq!(tx.sprite().width(), 16);
        }
        assert_eq!((sprite.width(), sprite.height()), (4, 2));
    }

    #[test]
    fn test_commit_yields_done_group() {
        let mut sprite = Sprite::new(PixelFormat::TrueColor, 4, 2);
        let mut tx = Transaction::new(&mut sprite, "resize");
        tx.execute(Box::new(SetSpriteSize::new(8, 8))).unwrap();
        tx.execute(Box::new(SetSpriteSize::new(16, 1))).unwrap();
        let mut group = tx.commit();
        assert_eq!(group.state(), CmdState::Done);
        assert_eq!(group.len(), 2);
        assert_eq!(group.label(), "resize");
        assert_eq!(sprite.width(), 16);

        group.undo(&mut sprite).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (4, 2));
        group.redo(&mut sprite).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (16, 1));
    }

    #[test]
    fn test_explicit_rollback() {
        let mut sprite = Sprite::new(PixelFormat::Grayscale, 1, 1);
        let mut tx = Transaction::new(&mut sprite, "resize");
        tx.execute(Box::new(SetSpriteSize::new(3, 3))).unwrap();
        tx.rollback().unwrap();
        assert_eq!(sprite.width(), 1);
    }

    #[test]
    fn test_group_execute() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 1, 1);
        let mut group = CmdGroup::new("two steps");
        group.push(Box::new(SetSpriteSize::new(2, 2)));
        group.push(Box::new(SetSpriteSize::new(5, 6)));
        group.execute(&mut sprite).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (5, 6));
        group.undo(&mut sprite).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (1, 1));
    }

    #[test]
    #[should_panic(expected = "redo called")]
    fn test_redo_before_undo_panics() {
        let mut sprite = Sprite::new(PixelFormat::Indexed, 1, 1);
        let mut cmd = SetSpriteSize::new(2, 2);
        cmd.execute(&mut sprite).unwrap();
        let _ = cmd.redo(&mut sprite);
    }
}
