//! Adam7 interlacing geometry.

/// One of the seven Adam7 passes: the pass holds every pixel whose
/// coordinates are `start + k * step` along both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// First column.
    pub x_start: u32,
    /// First row.
    pub y_start: u32,
    /// Column spacing.
    pub x_step: u32,
    /// Row spacing.
    pub y_step: u32,
}

const fn pass(x_start: u32, y_start: u32, x_step: u32, y_step: u32) -> Pass {
    Pass {
        x_start,
        y_start,
        x_step,
        y_step,
    }
}

/// The Adam7 passes in stream order.
pub const ADAM7: [Pass; 7] = [
    pass(0, 0, 8, 8),
    pass(4, 0, 8, 8),
    pass(0, 4, 4, 8),
    pass(2, 0, 4, 4),
    pass(0, 2, 2, 4),
    pass(1, 0, 2, 2),
    pass(0, 1, 1, 2),
];

/// Spacing of the pixel lattice fully known once each pass has been read.
/// After pass `i`, the pixel at `(x, y)` can be drawn from the known pixel at
/// `(x - x % w, y - y % h)` where `(w, h) = COVERAGE[i]`.
const COVERAGE: [(u32, u32); 7] = [(8, 8), (4, 8), (4, 4), (2, 4), (2, 2), (1, 2), (1, 1)];

impl Pass {
    /// Size of this pass's reduced image. Either side may be zero for small
    /// images, in which case the pass carries no data at all.
    pub fn size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            span(width, self.x_start, self.x_step),
            span(height, self.y_start, self.y_step),
        )
    }
}

fn span(extent: u32, start: u32, step: u32) -> u32 {
    if extent <= start {
        0
    } else {
        (extent - start).div_ceil(step)
    }
}

/// Lattice spacing after pass `index` (0-based) completes.
#[inline]
pub fn coverage(index: usize) -> (u32, u32) {
    COVERAGE[index]
}
