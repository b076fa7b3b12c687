//! In-memory sources for tests and offline runs.

use std::cell::Cell;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use ipm_core::TagName;
use serde::{Deserialize, Serialize};

use crate::error::{SourceError, SourceResult};
use crate::historian::{Historian, TagAverage, TagSeries};
use crate::well_tests::{RawReservoirPressure, RawWellTest, WellTestSource};
use crate::window::TimeWindow;

/// Historian answering from fixed per-tag values, whatever the window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InMemoryHistorian {
    pub averages: BTreeMap<TagName, f64>,
    pub series: BTreeMap<TagName, Vec<f64>>,
    #[serde(skip)]
    outages: Cell<usize>,
}

impl InMemoryHistorian {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_average(mut self, tag: &str, value: f64) -> Self {
        self.averages.insert(tag.into(), value);
        self
    }

    pub fn with_series(mut self, tag: &str, samples: Vec<f64>) -> Self {
        self.series.insert(tag.into(), samples);
        self
    }

    /// Makes the next `n` requests fail as unavailable.
    pub fn fail_next(&self, n: usize) {
        self.outages.set(n);
    }

    fn check_outage(&self) -> SourceResult<()> {
        let left = self.outages.get();
        if left > 0 {
            self.outages.set(left - 1);
            return Err(SourceError::Unavailable {
                source_name: "historian",
                message: "simulated outage".into(),
            });
        }
        Ok(())
    }
}

impl Historian for InMemoryHistorian {
    fn time_averaged(&self, tags: &[TagName], _window: &TimeWindow) -> SourceResult<Vec<TagAverage>> {
        self.check_outage()?;
        Ok(tags
            .iter()
            .map(|tag| TagAverage {
                tag: tag.clone(),
                value: self.averages.get(tag).copied(),
            })
            .collect())
    }

    fn interpolated(&self, tags: &[TagName], _window: &TimeWindow) -> SourceResult<Vec<TagSeries>> {
        self.check_outage()?;
        Ok(tags
            .iter()
            .map(|tag| TagSeries {
                tag: tag.clone(),
                samples: self.series.get(tag).cloned().unwrap_or_default(),
            })
            .collect())
    }
}

/// Well-test database backed by row vectors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InMemoryWellTests {
    pub tests: Vec<RawWellTest>,
    pub reservoir_pressures: Vec<RawReservoirPressure>,
}

impl WellTestSource for InMemoryWellTests {
    fn well_tests(&self, completion: &str, as_of: NaiveDate) -> SourceResult<Vec<RawWellTest>> {
        Ok(self
            .tests
            .iter()
            .filter(|t| t.completion == completion && t.start_date <= as_of)
            .cloned()
            .collect())
    }

    fn reservoir_pressures(
        &self,
        completion: &str,
        as_of: NaiveDate,
    ) -> SourceResult<Vec<RawReservoirPressure>> {
        Ok(self
            .reservoir_pressures
            .iter()
            .filter(|r| r.completion == completion && r.test_date <= as_of)
            .cloned()
            .collect())
    }
}
