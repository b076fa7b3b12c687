use core::fmt;

use ipm_core::{CoefficientPair, IpmError, ensure_finite};

use crate::error::SolverResult;

/// Closed interval `[lo, hi]` with `lo <= hi`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> SolverResult<Self> {
        let lo = ensure_finite(lo, "interval lower bound")?;
        let hi = ensure_finite(hi, "interval upper bound")?;
        if lo > hi {
            return Err(IpmError::InvertedInterval {
                what: "search interval",
                lo,
                hi,
            }
            .into());
        }
        Ok(Self { lo, hi })
    }

    const fn fixed(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn is_degenerate(&self) -> bool {
        self.hi == self.lo
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.lo, self.hi)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Per-coefficient bounds for one search.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchBox {
    pub cp1: Interval,
    pub cp2: Interval,
}

/// Acceptance region of a well VLP correlation pair.
pub const WELL_ACCEPTANCE: SearchBox = SearchBox {
    cp1: Interval::fixed(0.9, 1.1),
    cp2: Interval::fixed(0.8, 1.2),
};

/// Fixed search box for pipe (gravity, friction) matching coefficients.
pub const PIPE_BOX: SearchBox = SearchBox {
    cp1: Interval::fixed(0.8, 1.1),
    cp2: Interval::fixed(0.3, 3.0),
};

impl SearchBox {
    pub fn new(cp1: Interval, cp2: Interval) -> Self {
        Self { cp1, cp2 }
    }

    pub fn intervals(&self) -> [Interval; 2] {
        [self.cp1, self.cp2]
    }

    pub fn contains(&self, pair: CoefficientPair) -> bool {
        self.cp1.contains(pair.cp1) && self.cp2.contains(pair.cp2)
    }

    pub fn clamp(&self, pair: CoefficientPair) -> CoefficientPair {
        CoefficientPair::new(self.cp1.clamp(pair.cp1), self.cp2.clamp(pair.cp2))
    }
}

impl fmt::Display for SearchBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} x {})", self.cp1, self.cp2)
    }
}
