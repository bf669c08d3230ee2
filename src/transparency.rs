//! Palette transparency reconciliation.
//!
//! PNG gives every palette entry its own alpha (the `tRNS` chunk). The editor
//! only knows one transparent slot per sprite, the *mask index*. Decoding
//! therefore collapses the alpha table onto a single index, and encoding
//! projects the mask index back into a minimal alpha table. The collapse is
//! lossy: several translucent entries all become the same mask index, and
//! partial alpha values are rounded to fully transparent or fully opaque.

use crate::palette::PALETTE_SIZE;

/// Entries with alpha below this are treated as transparent.
pub const OPACITY_THRESHOLD: u8 = 128;

/// Per-entry palette alpha, as read from `tRNS`.
///
/// Entries not supplied by the file are fully opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaTable {
    alphas: [u8; PALETTE_SIZE],
}

impl Default for AlphaTable {
    fn default() -> Self {
        Self {
            alphas: [255; PALETTE_SIZE],
        }
    }
}

impl AlphaTable {
    /// Fully opaque table.
    pub fn opaque() -> Self {
        Self::default()
    }

    /// Build from the raw `tRNS` payload. Bytes past 256 are dropped.
    pub fn from_trns(trns: &[u8]) -> Self {
        let mut table = Self::default();
        for (slot, &alpha) in table.alphas.iter_mut().zip(trns) {
            *slot = alpha;
        }
        table
    }

    /// Alpha of entry `index`.
    #[inline]
    pub fn alpha(&self, index: u8) -> u8 {
        self.alphas[index as usize]
    }

    /// Whether entry `index` counts as transparent.
    #[inline]
    pub fn is_transparent(&self, index: u8) -> bool {
        self.alpha(index) < OPACITY_THRESHOLD
    }

    /// Whether any entry counts as transparent.
    pub fn has_transparency(&self) -> bool {
        self.alphas.iter().any(|&a| a < OPACITY_THRESHOLD)
    }
}

/// Pick the mask index: the lowest entry whose alpha is below 128.
///
/// Returns `None` when no entry qualifies; the sprite's current mask index
/// must then be left as it is.
pub fn resolve_mask_index(table: &AlphaTable) -> Option<u8> {
    table
        .alphas
        .iter()
        .position(|&a| a < OPACITY_THRESHOLD)
        .map(|i| i as u8)
}

/// Map a decoded palette index to the stored index.
///
/// Every transparent entry, not only the mask index itself, collapses onto
/// `mask_index`. Opaque entries pass through untouched.
#[inline]
pub fn collapse_index(index: u8, table: &AlphaTable, mask_index: u8) -> u8 {
    if table.is_transparent(index) {
        mask_index
    } else {
        index
    }
}

/// Alpha table written on encode: `mask_index + 1` entries, all opaque except
/// the mask index, which is fully transparent.
///
/// Entries above the mask index are omitted and read back as opaque.
pub fn mask_alpha_table(mask_index: u8) -> Vec<u8> {
    let mut trns = vec![255u8; mask_index as usize + 1];
    trns[mask_index as usize] = 0;
    trns
}
