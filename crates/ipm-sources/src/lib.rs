//! Measured data feeding the tuners.
//!
//! Two collaborators supply measurements: a plant historian (time-averaged
//! and interpolated tag values over a window) and a well-test database (rows
//! by completion and date). Both are traits here; rows arrive in the source's
//! native units and are converted to canonical units exactly once, in the
//! collection functions.

pub mod collect;
pub mod error;
pub mod historian;
pub mod memory;
pub mod records;
pub mod retry;
pub mod units;
pub mod window;

pub use collect::{
    ManifoldTag, WellTags, collect_manifold_inputs, collect_meter_rates, collect_well_inputs,
    latest_well_tests,
};
pub use error::{SourceError, SourceResult};
pub use historian::{Historian, TagAverage, TagSeries};
pub use memory::{InMemoryHistorian, InMemoryWellTests};
pub use records::{
    ManifoldProperty, ManifoldRecord, MeasurementType, MeterRates, Routing, WellInputRecord,
    WellStatus, WellTestRecord,
};
pub use retry::{RetryPolicy, with_retry};
pub use units::SourceUnits;
pub use well_tests::{RawReservoirPressure, RawWellTest, TestUsage, WellTestSource};
pub use window::TimeWindow;
