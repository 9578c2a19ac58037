//! Precomputed saddle surface: height field, discrete gradient, peak height.

use glam::DVec2;
use saddle_core::error::SimError;
use saddle_core::grid::Grid;

/// Closed-form saddle height `(i² − j²)·fmz/fmx` at integer cell `(i, j)`.
pub fn saddle_height(i: isize, j: isize, fmx: f64, fmz: f64) -> f64 {
    let (i, j) = (i as f64, j as f64);
    (i * i - j * j) * fmz / fmx
}

/// The saddle height field and its gradient, built once and never mutated.
///
/// Gradient cells hold `(2·(h(i−1,j) − h(i,j)), 2·(h(i,j−1) − h(i,j)))`.
/// A component is forced to zero when its own index is `0` or the most
/// negative index of the grid.
#[derive(Debug, Clone)]
pub struct Surface {
    height: Grid<f64>,
    gradient: Grid<DVec2>,
    max_height: f64,
}

impl Surface {
    /// Builds the surface for coordinates `[-field_size, field_size)` on both axes.
    ///
    /// Returns `SimError::InvalidDimensions` for a zero `field_size` and
    /// `SimError::InvalidParam` when `fmx` is zero or a constant is not finite.
    pub fn build(field_size: usize, fmx: f64, fmz: f64) -> Result<Self, SimError> {
        if !fmx.is_finite() || fmx == 0.0 {
            return Err(SimError::InvalidParam {
                name: "fmx".into(),
                reason: format!("must be finite and non-zero, got {fmx}"),
            });
        }
        if !fmz.is_finite() {
            return Err(SimError::InvalidParam {
                name: "fmz".into(),
                reason: format!("must be finite, got {fmz}"),
            });
        }

        let mut height = Grid::filled(field_size, 0.0)?;
        let mut gradient = Grid::filled(field_size, DVec2::ZERO)?;
        let mut max_height = f64::NEG_INFINITY;
        let n = field_size as isize;

        // Row i - 1 and column j - 1 are always written before (i, j) reads them.
        for i in -n..n {
            for j in -n..n {
                let h = saddle_height(i, j, fmx, fmz);
                height.set(i, j, h)?;

                let di = if i > -n && i != 0 {
                    height.get(i - 1, j)? - h
                } else {
                    0.0
                };
                let dj = if j > -n && j != 0 {
                    height.get(i, j - 1)? - h
                } else {
                    0.0
                };
                gradient.set(i, j, DVec2::new(2.0 * di, 2.0 * dj))?;

                max_height = max_height.max(h);
            }
        }

        log::debug!(
            "built saddle surface: {side}x{side} cells, max height {max_height}",
            side = height.side()
        );

        Ok(Self {
            height,
            gradient,
            max_height,
        })
    }

    /// Height field `h(i, j)`.
    pub fn height(&self) -> &Grid<f64> {
        &self.height
    }

    /// Backward-difference gradient field.
    pub fn gradient(&self) -> &Grid<DVec2> {
        &self.gradient
    }

    /// Largest height over the whole grid, boundary included.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn half_extent(&self) -> usize {
        self.height.half_extent()
    }
}
