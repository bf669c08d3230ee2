//! Sprite palette.

/// Number of entries in every palette.
pub const PALETTE_SIZE: usize = 256;

/// Fixed-size table of 256 RGB colors, owned by the sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [[u8; 3]; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: [[0, 0, 0]; PALETTE_SIZE],
        }
    }
}

impl Palette {
    /// All-black palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a palette from up to 256 colors; missing entries are black.
    ///
    /// Extra colors beyond 256 are ignored.
    pub fn from_colors(colors: &[[u8; 3]]) -> Self {
        let mut palette = Self::default();
        for (slot, color) in palette.entries.iter_mut().zip(colors) {
            *slot = *color;
        }
        palette
    }

    /// Color at `index`.
    #[inline]
    pub fn get(&self, index: u8) -> [u8; 3] {
        self.entries[index as usize]
    }

    /// Replace the color at `index`.
    #[inline]
    pub fn set(&mut self, index: u8, color: [u8; 3]) {
        self.entries[index as usize] = color;
    }

    /// All 256 entries in order.
    pub fn entries(&self) -> &[[u8; 3]; PALETTE_SIZE] {
        &self.entries
    }

    /// Entries flattened as `r, g, b, r, g, b, ...` (768 bytes), the PLTE layout.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.entries.iter().flatten().copied().collect()
    }
}
