use core::fmt;

/// Two empirical correlation multipliers for one well or one pipe group.
///
/// For a VLP correlation `cp1` scales the gravity term and `cp2` the friction
/// term; pipe matching uses the same layout (gravity, friction).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoefficientPair {
    pub cp1: f64,
    pub cp2: f64,
}

impl CoefficientPair {
    /// Neutral pair: no correction applied to the correlation.
    pub const NEUTRAL: Self = Self { cp1: 1.0, cp2: 1.0 };

    pub const fn new(cp1: f64, cp2: f64) -> Self {
        Self { cp1, cp2 }
    }

    pub fn is_finite(&self) -> bool {
        self.cp1.is_finite() && self.cp2.is_finite()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.cp1, self.cp2]
    }

    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [cp1, cp2] => Some(Self::new(*cp1, *cp2)),
            _ => None,
        }
    }
}

impl fmt::Display for CoefficientPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.cp1, self.cp2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_requires_two_values() {
        assert_eq!(
            CoefficientPair::from_slice(&[1.0, 2.0]),
            Some(CoefficientPair::new(1.0, 2.0))
        );
        assert_eq!(CoefficientPair::from_slice(&[1.0]), None);
        assert_eq!(CoefficientPair::from_slice(&[1.0, 2.0, 3.0]), None);
    }
}
