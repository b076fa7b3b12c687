//! ipm-oracle: the simulation-engine boundary.
//!
//! Provides:
//! - `Oracle` trait: the low-level engine surface (values, commands, busy state)
//! - `Session`: the operations the tuners rely on (set/get/solve, model lifecycle,
//!   slow commands with busy polling, reconnection)
//! - `paths`: parameter address builders for the well model and the network model
//! - `ScriptedOracle`: in-memory engine stub for tests
//! - `surrogate`: deterministic analytic engine for offline dry runs
//!
//! # Architecture
//!
//! The engine holds global mutable model state (open file, mask state, solved
//! results), so every caller goes through one `Session` borrowed mutably. The
//! production binding to the vendor automation server lives outside this crate;
//! anything implementing `Oracle` can be driven by the tuners.

pub mod app;
pub mod error;
pub mod oracle;
pub mod paths;
pub mod scripted;
pub mod session;
pub mod surrogate;
pub mod value;

pub use app::App;
pub use error::{OracleError, OracleResult};
pub use oracle::Oracle;
pub use scripted::{Call, ScriptedOracle, ValueStore};
pub use session::{Session, SolveScope};
pub use surrogate::{SurrogateField, SurrogateFlowline, SurrogateJoint, SurrogateWell};
pub use value::OracleValue;
