//! Square grid addressed by signed coordinates centred on the origin.
//!
//! A `Grid<T>` with half-extent `n` has `2n × 2n` cells covering coordinates
//! `(i, j)` with both axes in `[-n, n)`. Cells are stored flat in row-major
//! order (`i` selects the row) at `(i + n) * 2n + (j + n)`.

use crate::bounds::BoundsPolicy;
use crate::error::SimError;

/// A square, signed-index grid of `T` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    half_extent: usize,
    side: usize,
    data: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Creates a grid of half-extent `half_extent` with every cell set to `value`.
    ///
    /// Returns `SimError::InvalidDimensions` if `half_extent` is zero or the
    /// cell count overflows `usize`.
    pub fn filled(half_extent: usize, value: T) -> Result<Self, SimError> {
        let side = checked_side(half_extent)?;
        let len = side
            .checked_mul(side)
            .ok_or(SimError::InvalidDimensions)?;
        Ok(Self {
            half_extent,
            side,
            data: vec![value; len],
        })
    }

    /// Creates a grid from pre-built row-major data.
    ///
    /// Returns `SimError::InvalidDimensions` if `data.len()` is not `(2n)²`.
    pub fn from_data(half_extent: usize, data: Vec<T>) -> Result<Self, SimError> {
        let side = checked_side(half_extent)?;
        let expected = side
            .checked_mul(side)
            .ok_or(SimError::InvalidDimensions)?;
        if data.len() != expected {
            return Err(SimError::InvalidDimensions);
        }
        Ok(Self {
            half_extent,
            side,
            data,
        })
    }

    /// Half-extent `n`; coordinates span `[-n, n)`.
    pub fn half_extent(&self) -> usize {
        self.half_extent
    }

    /// Cells per axis, `2n`.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Whether `(i, j)` addresses a cell of this grid.
    pub fn contains(&self, i: isize, j: isize) -> bool {
        let n = self.half_extent as isize;
        (-n..n).contains(&i) && (-n..n).contains(&j)
    }

    fn index(&self, i: isize, j: isize) -> Option<usize> {
        if !self.contains(i, j) {
            return None;
        }
        let n = self.half_extent as isize;
        Some((i + n) as usize * self.side + (j + n) as usize)
    }

    /// Bounds-checked read.
    ///
    /// Returns `SimError::OutOfRange` if `(i, j)` lies outside the grid.
    pub fn get(&self, i: isize, j: isize) -> Result<T, SimError> {
        self.index(i, j)
            .map(|idx| self.data[idx])
            .ok_or(SimError::OutOfRange {
                i,
                j,
                half_extent: self.half_extent,
            })
    }

    /// Reads `(i, j)` after mapping it onto the grid with `policy`.
    pub fn sample(&self, i: isize, j: isize, policy: BoundsPolicy) -> Result<T, SimError> {
        let (i, j) = policy.resolve(i, j, self.half_extent)?;
        self.get(i, j)
    }

    /// Bounds-checked write.
    ///
    /// Returns `SimError::OutOfRange` if `(i, j)` lies outside the grid.
    pub fn set(&mut self, i: isize, j: isize, value: T) -> Result<(), SimError> {
        let idx = self.index(i, j).ok_or(SimError::OutOfRange {
            i,
            j,
            half_extent: self.half_extent,
        })?;
        self.data[idx] = value;
        Ok(())
    }

    /// Iterates over all cells yielding `(i, j, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (isize, isize, T)> + '_ {
        let n = self.half_extent as isize;
        self.data.iter().enumerate().map(move |(idx, &v)| {
            let i = (idx / self.side) as isize - n;
            let j = (idx % self.side) as isize - n;
            (i, j, v)
        })
    }
}

/// `2n`, rejecting zero and values whose signed coordinates would not fit `isize`.
fn checked_side(half_extent: usize) -> Result<usize, SimError> {
    if half_extent == 0 || half_extent > isize::MAX as usize / 2 {
        return Err(SimError::InvalidDimensions);
    }
    Ok(half_extent * 2)
}
