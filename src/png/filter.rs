//! PNG scanline filters.
//!
//! Every scanline is stored behind a one-byte filter type. Encoding picks a
//! filter per row according to [`FilterStrategy`]; decoding reverses it in
//! place against the previous unfiltered row.

use super::FilterStrategy;
use crate::error::{Error, Result};

/// Filter type byte preceding every scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FilterType {
    /// Raw bytes.
    None = 0,
    /// Difference from the byte one pixel to the left.
    Sub = 1,
    /// Difference from the byte above.
    Up = 2,
    /// Difference from the mean of left and above.
    Average = 3,
    /// Difference from the Paeth predictor.
    Paeth = 4,
}

impl FilterType {
    const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];
}

impl TryFrom<u8> for FilterType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        FilterType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("invalid filter type: {value}")))
    }
}

/// Paeth predictor: whichever of left, above, upper-left is closest to
/// `left + above - upper_left`, ties broken in that order.
#[inline]
pub fn paeth_predictor(left: u8, above: u8, upper_left: u8) -> u8 {
    let p = i16::from(left) + i16::from(above) - i16::from(upper_left);
    let pa = (p - i16::from(left)).abs();
    let pb = (p - i16::from(above)).abs();
    let pc = (p - i16::from(upper_left)).abs();

    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}

/// Filter `row` with `filter` into `out` (no filter byte).
fn apply(filter: FilterType, row: &[u8], prev: &[u8], bpp: usize, out: &mut Vec<u8>) {
    out.clear();
    match filter {
        FilterType::None => out.extend_from_slice(row),
        FilterType::Sub => out.extend(row.iter().enumerate().map(|(i, &byte)| {
            let left = if i >= bpp { row[i - bpp] } else { 0 };
            byte.wrapping_sub(left)
        })),
        FilterType::Up => out.extend(
            row.iter()
                .zip(prev)
                .map(|(&byte, &above)| byte.wrapping_sub(above)),
        ),
        FilterType::Average => out.extend(row.iter().enumerate().map(|(i, &byte)| {
            let left = if i >= bpp { u16::from(row[i - bpp]) } else { 0 };
            let avg = ((left + u16::from(prev[i])) / 2) as u8;
            byte.wrapping_sub(avg)
        })),
        FilterType::Paeth => out.extend(row.iter().enumerate().map(|(i, &byte)| {
            let (left, upper_left) = if i >= bpp { (row[i - bpp], prev[i - bpp]) } else { (0, 0) };
            byte.wrapping_sub(paeth_predictor(left, prev[i], upper_left))
        })),
    }
}

/// Sum of absolute values, treating bytes as signed. Lower is better.
fn score(filtered: &[u8]) -> u64 {
    filtered
        .iter()
        .map(|&b| u64::from((b as i8).unsigned_abs()))
        .sum()
}

/// Per-encode filter state; reuses its candidate buffers across rows.
#[derive(Debug)]
pub struct RowFilter {
    strategy: FilterStrategy,
    candidates: [Vec<u8>; 5],
}

impl RowFilter {
    /// Filter state for rows of `row_len` bytes.
    pub fn new(strategy: FilterStrategy, row_len: usize) -> Self {
        Self {
            strategy,
            candidates: std::array::from_fn(|_| Vec::with_capacity(row_len)),
        }
    }

    /// Append the filter byte and the filtered `row` to `out`.
    ///
    /// `prev` is the previous unfiltered row (all zeros for the first row).
    pub fn filter_row(&mut self, row: &[u8], prev: &[u8], bpp: usize, out: &mut Vec<u8>) {
        let fixed = match self.strategy {
            FilterStrategy::None => Some(FilterType::None),
            FilterStrategy::Sub => Some(FilterType::Sub),
            FilterStrategy::Up => Some(FilterType::Up),
            FilterStrategy::Average => Some(FilterType::Average),
            FilterStrategy::Paeth => Some(FilterType::Paeth),
            FilterStrategy::Adaptive => None,
        };
        let chosen = match fixed {
            Some(filter) => {
                apply(filter, row, prev, bpp, &mut self.candidates[filter as usize]);
                filter
            }
            None => self.pick_adaptive(row, prev, bpp),
        };
        out.push(chosen as u8);
        out.extend_from_slice(&self.candidates[chosen as usize]);
    }

    fn pick_adaptive(&mut self, row: &[u8], prev: &[u8], bpp: usize) -> FilterType {
        let mut best = FilterType::None;
        let mut best_score = u64::MAX;
        for filter in FilterType::ALL {
            let candidate = &mut self.candidates[filter as usize];
            apply(filter, row, prev, bpp, candidate);
            let s = score(candidate);
            if s < best_score {
                best_score = s;
                best = filter;
                if s == 0 {
                    break;
                }
            }
        }
        best
    }
}

/// Reverse the filter on `row` in place. `prev` is the previous unfiltered
/// row of the same pass, all zeros for the first.
pub fn unfilter_row(filter: u8, row: &mut [u8], prev: &[u8], bpp: usize) -> Result<()> {
    match FilterType::try_from(filter)? {
        FilterType::None => {}
        FilterType::Sub => {
            for i in bpp..row.len() {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FilterType::Up => {
            for (byte, &above) in row.iter_mut().zip(prev) {
                *byte = byte.wrapping_add(above);
            }
        }
        FilterType::Average => {
            for i in 0..row.len() {
                let left = if i >= bpp { u16::from(row[i - bpp]) } else { 0 };
                row[i] = row[i].wrapping_add(((left + u16::from(prev[i])) / 2) as u8);
            }
        }
        FilterType::Paeth => {
            for i in 0..row.len() {
                let (left, upper_left) = if i >= bpp {
                    (row[i - bpp], prev[i - bpp])
                } else {
                    (0, 0)
                };
                row[i] = row[i].wrapping_add(paeth_predictor(left, prev[i], upper_left));
            }
        }
    }
    Ok(())
}
