//! Resolution of signed grid coordinates that may fall outside the grid.
//!
//! A grid of half-extent `n` covers coordinates `[-n, n)` on each axis.
//! [`BoundsPolicy`] decides what happens to a coordinate outside that range.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How out-of-range coordinates are mapped back onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Reject with [`SimError::OutOfRange`].
    #[default]
    Strict,
    /// Pin to the nearest edge cell, `[-n, n - 1]`.
    Clamp,
    /// Toroidal wrap into `[-n, n)`.
    Wrap,
}

impl BoundsPolicy {
    /// All policy names, in declaration order.
    pub fn list_names() -> &'static [&'static str] {
        &["strict", "clamp", "wrap"]
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            BoundsPolicy::Strict => "strict",
            BoundsPolicy::Clamp => "clamp",
            BoundsPolicy::Wrap => "wrap",
        }
    }

    /// Maps the pair `(i, j)` into `[-half_extent, half_extent)` on both axes.
    ///
    /// Under [`BoundsPolicy::Strict`] a pair with either coordinate outside the
    /// range is an error; the other policies succeed for any grid a
    /// [`Grid`](crate::Grid) can represent.
    pub fn resolve(
        self,
        i: isize,
        j: isize,
        half_extent: usize,
    ) -> Result<(isize, isize), SimError> {
        if half_extent == 0 || half_extent > isize::MAX as usize / 2 {
            return Err(SimError::InvalidDimensions);
        }
        let n = half_extent as isize;
        let inside = |c: isize| (-n..n).contains(&c);
        match self {
            BoundsPolicy::Strict => {
                if inside(i) && inside(j) {
                    Ok((i, j))
                } else {
                    Err(SimError::OutOfRange { i, j, half_extent })
                }
            }
            BoundsPolicy::Clamp => Ok((i.clamp(-n, n - 1), j.clamp(-n, n - 1))),
            BoundsPolicy::Wrap => Ok((wrap(i, n), wrap(j, n))),
        }
    }
}

/// Toroidal wrap of `c` into `[-n, n)`, computed as `(c + n) mod 2n - n`
/// without overflowing for saturated coordinates.
fn wrap(c: isize, n: isize) -> isize {
    let span = 2 * n;
    (c.rem_euclid(span) + n).rem_euclid(span) - n
}

impl FromStr for BoundsPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(BoundsPolicy::Strict),
            "clamp" => Ok(BoundsPolicy::Clamp),
            "wrap" => Ok(BoundsPolicy::Wrap),
            _ => Err(SimError::UnknownBoundsPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for BoundsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
