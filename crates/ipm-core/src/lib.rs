//! ipm-core: shared foundation for ipmtune.
//!
//! Contains:
//! - error (shared error type)
//! - ids (string-keyed names for wells, joints, pipes, flowlines and tags)
//! - numeric (finite checks and guarded ratios)
//! - units (canonical oilfield units + conversion at the data boundary)
//! - coefficients (the two-parameter correlation pair)
//! - backoff (exponential delay schedule for polling and retries)

pub mod backoff;
pub mod coefficients;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use backoff::Backoff;
pub use coefficients::CoefficientPair;
pub use error::{IpmError, IpmResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
