//! Coefficient search for correlation tuning.
//!
//! A raw coefficient pair reported by the engine is classified against the
//! acceptance region; pairs outside it get an initial guess and a search box,
//! and a bounded local search minimizes the squared pressure mismatch inside
//! that box. The search never evaluates the objective outside the box,
//! finite-difference probes included.

pub mod bounded;
pub mod error;
pub mod gradient;
pub mod region;
pub mod search_box;

pub use bounded::{BoundedResult, BoundedSearchConfig, Termination, minimize_bounded};
pub use error::{SolverError, SolverResult};
pub use gradient::projected_difference_gradient;
pub use region::{Correction, Region, classify, select_correction};
pub use search_box::{Interval, PIPE_BOX, SearchBox, WELL_ACCEPTANCE};
