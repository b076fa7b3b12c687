use ipm_core::TagName;
use serde::{Deserialize, Serialize};

use crate::error::SourceResult;
use crate::window::TimeWindow;

/// Time-weighted average of one tag over a window; `None` when the tag has
/// no data in the window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagAverage {
    pub tag: TagName,
    pub value: Option<f64>,
}

/// Interpolated samples of one tag, oldest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagSeries {
    pub tag: TagName,
    pub samples: Vec<f64>,
}

impl TagSeries {
    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }
}

/// Plant historian.
///
/// Values are in the historian's native units. Tags unknown to the
/// historian are answered with an absent value, not an error.
pub trait Historian {
    fn time_averaged(&self, tags: &[TagName], window: &TimeWindow) -> SourceResult<Vec<TagAverage>>;

    fn interpolated(&self, tags: &[TagName], window: &TimeWindow) -> SourceResult<Vec<TagSeries>>;
}
