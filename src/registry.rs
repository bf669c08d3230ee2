//! Identity-to-buffer registry.
//!
//! Buffers live in an arena of slots; a separate table maps each [`ImageId`]
//! to the slot holding its current buffer. Rebinding an identity only touches
//! the table and one slot, never copies pixels, and since every slot owns its
//! buffer outright no two identities can ever share a buffer instance.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::image::{ImageId, PixelBuffer};

/// Arena of pixel buffers addressed by stable identities.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    slots: Vec<Option<PixelBuffer>>,
    free: Vec<usize>,
    bindings: HashMap<ImageId, usize>,
    next_id: u32,
}

impl ImageRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identity that has never been handed out by this registry.
    pub fn next_image_id(&mut self) -> ImageId {
        self.next_id = self.next_id.wrapping_add(1);
        if self.next_id == 0 {
            self.next_id = 1; // 0 is never handed out
        }
        while self.bindings.contains_key(&ImageId(self.next_id)) {
            self.next_id = self.next_id.wrapping_add(1).max(1);
        }
        ImageId(self.next_id)
    }

    /// Number of bound identities.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Whether `id` is currently bound.
    pub fn contains(&self, id: ImageId) -> bool {
        self.bindings.contains_key(&id)
    }

    /// Bound identities in ascending order.
    pub fn ids(&self) -> Vec<ImageId> {
        let mut ids: Vec<ImageId> = self.bindings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Buffer currently bound to `id`.
    pub fn get(&self, id: ImageId) -> Option<&PixelBuffer> {
        let slot = *self.bindings.get(&id)?;
        self.slots[slot].as_ref()
    }

    /// Mutable access to the buffer bound to `id`.
    pub fn get_mut(&mut self, id: ImageId) -> Option<&mut PixelBuffer> {
        let slot = *self.bindings.get(&id)?;
        self.slots[slot].as_mut()
    }

    /// Bind a new identity to `buffer`.
    pub fn bind(&mut self, id: ImageId, buffer: PixelBuffer) -> Result<()> {
        if self.bindings.contains_key(&id) {
            return Err(Error::ImageAlreadyBound(id));
        }
        let slot = self.alloc_slot(buffer);
        self.bindings.insert(id, slot);
        Ok(())
    }

    /// Remove the binding of `id`, returning its buffer.
    pub fn unbind(&mut self, id: ImageId) -> Result<PixelBuffer> {
        let slot = self
            .bindings
            .remove(&id)
            .ok_or(Error::ImageNotBound(id))?;
        let buffer = self.slots[slot].take().ok_or(Error::ImageNotBound(id))?;
        self.free.push(slot);
        Ok(buffer)
    }

    /// Replace the buffer bound to `old_id` with `buffer`, now bound to
    /// `new_id`. `old_id` ends up unbound.
    ///
    /// The displaced buffer is returned to the caller. Passing the same
    /// identity twice swaps the buffer in place.
    pub fn replace(
        &mut self,
        old_id: ImageId,
        new_id: ImageId,
        buffer: PixelBuffer,
    ) -> Result<PixelBuffer> {
        let slot = self.replace_slot(old_id, new_id)?;
        let displaced = self.slots[slot]
            .replace(buffer)
            .ok_or(Error::ImageNotBound(old_id))?;
        self.bindings.remove(&old_id);
        self.bindings.insert(new_id, slot);
        log::debug!("rebound slot {slot}: {old_id:?} -> {new_id:?}");
        Ok(displaced)
    }

    /// Check that [`replace`](Self::replace) would succeed, without touching
    /// anything.
    pub fn check_replace(&self, old_id: ImageId, new_id: ImageId) -> Result<()> {
        self.replace_slot(old_id, new_id).map(|_| ())
    }

    fn replace_slot(&self, old_id: ImageId, new_id: ImageId) -> Result<usize> {
        let slot = *self
            .bindings
            .get(&old_id)
            .ok_or(Error::ImageNotBound(old_id))?;
        if new_id != old_id && self.bindings.contains_key(&new_id) {
            return Err(Error::ImageAlreadyBound(new_id));
        }
        Ok(slot)
    }

    fn alloc_slot(&mut self, buffer: PixelBuffer) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(buffer);
                slot
            }
            None => {
                self.slots.push(Some(buffer));
                self.slots.len() - 1
            }
        }
    }
}
