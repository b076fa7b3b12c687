//! Region classification of a raw coefficient pair.
//!
//! The decision table is evaluated top to bottom and the first match wins:
//!
//! | region         | condition                 | initial guess | search box            |
//! |----------------|---------------------------|---------------|-----------------------|
//! | `Acceptable`   | cp1 in [0.9,1.1], cp2 in [0.8,1.2] | -    | -                     |
//! | `FrictionHigh` | cp1 < 1.1 and cp2 > 1.2   | (1.1, 1.0)    | [cp1,1.1] x [1.0,3.0] |
//! | `GravityLow`   | cp1 < 0.9 and cp2 > 0.8   | (0.9, 0.8)    | [cp1,0.9] x [0.8,cp2] |
//! | `FrictionLow`  | cp1 > 0.9 and cp2 < 0.8   | (0.9, 0.8)    | [0.9,cp1] x [cp2,1.2] |
//! | `GravityHigh`  | cp1 > 1.1 and cp2 < 1.2   | (1.09, 1.2)   | [0.9,cp1] x [cp2,1.2] |
//! | `BothHigh`     | cp1 > 1.1 and cp2 > 1.2   | (1.09, 1.2)   | [1.1,1.1] x [1.2,3.0] |
//! | `Unclassified` | anything else             | -             | -                     |
//!
//! `Unclassified` pairs (for example cp1 < 0.9 with cp2 <= 0.8, or cp1 exactly
//! on 0.9 or 1.1 with cp2 outside its band) are accepted unchanged and
//! reported so they can be reviewed.

use core::fmt;

use ipm_core::{CoefficientPair, ensure_finite};
use tracing::warn;

use crate::error::SolverResult;
use crate::search_box::{Interval, SearchBox};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Region {
    Acceptable,
    FrictionHigh,
    GravityLow,
    FrictionLow,
    GravityHigh,
    BothHigh,
    Unclassified,
}

impl Region {
    pub fn needs_correction(self) -> bool {
        !matches!(self, Self::Acceptable | Self::Unclassified)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acceptable => "acceptable",
            Self::FrictionHigh => "friction_high",
            Self::GravityLow => "gravity_low",
            Self::FrictionLow => "friction_low",
            Self::GravityHigh => "gravity_high",
            Self::BothHigh => "both_high",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a raw pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Correction {
    NotNeeded {
        region: Region,
    },
    Required {
        region: Region,
        initial_guess: CoefficientPair,
        search_box: SearchBox,
    },
}

impl Correction {
    pub fn region(&self) -> Region {
        match self {
            Self::NotNeeded { region } | Self::Required { region, .. } => *region,
        }
    }
}

pub fn classify(pair: CoefficientPair) -> SolverResult<Region> {
    let cp1 = ensure_finite(pair.cp1, "cp1")?;
    let cp2 = ensure_finite(pair.cp2, "cp2")?;

    let region = if (0.9..=1.1).contains(&cp1) && (0.8..=1.2).contains(&cp2) {
        Region::Acceptable
    } else if cp1 < 1.1 && cp2 > 1.2 {
        Region::FrictionHigh
    } else if cp1 < 0.9 && cp2 > 0.8 {
        Region::GravityLow
    } else if cp1 > 0.9 && cp2 < 0.8 {
        Region::FrictionLow
    } else if cp1 > 1.1 && cp2 < 1.2 {
        Region::GravityHigh
    } else if cp1 > 1.1 && cp2 > 1.2 {
        Region::BothHigh
    } else {
        Region::Unclassified
    };
    Ok(region)
}

/// Classifies `pair` and selects the initial guess and search box.
pub fn select_correction(pair: CoefficientPair) -> SolverResult<Correction> {
    let region = classify(pair)?;
    let (cp1, cp2) = (pair.cp1, pair.cp2);

    let (initial_guess, search_box) = match region {
        Region::Acceptable => return Ok(Correction::NotNeeded { region }),
        Region::Unclassified => {
            warn!(%pair, "coefficient pair matches no correction rule, accepted as-is");
            return Ok(Correction::NotNeeded { region });
        }
        Region::FrictionHigh => (
            CoefficientPair::new(1.1, 1.0),
            SearchBox::new(Interval::new(cp1, 1.1)?, Interval::new(1.0, 3.0)?),
        ),
        Region::GravityLow => (
            CoefficientPair::new(0.9, 0.8),
            SearchBox::new(Interval::new(cp1, 0.9)?, Interval::new(0.8, cp2)?),
        ),
        Region::FrictionLow => (
            CoefficientPair::new(0.9, 0.8),
            SearchBox::new(Interval::new(0.9, cp1)?, Interval::new(cp2, 1.2)?),
        ),
        Region::GravityHigh => (
            CoefficientPair::new(1.09, 1.2),
            SearchBox::new(Interval::new(0.9, cp1)?, Interval::new(cp2, 1.2)?),
        ),
        Region::BothHigh => (
            CoefficientPair::new(1.09, 1.2),
            SearchBox::new(Interval::new(1.1, 1.1)?, Interval::new(1.2, 3.0)?),
        ),
    };

    Ok(Correction::Required {
        region,
        initial_guess,
        search_box,
    })
}
