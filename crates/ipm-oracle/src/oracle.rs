//! Low-level engine surface.

use crate::app::App;
use crate::error::OracleResult;
use crate::value::OracleValue;

/// Raw automation interface of the simulation engine.
///
/// Implementations report engine-side failures as `OracleError::Engine`;
/// path validation happens one level up, in `Session`.
pub trait Oracle {
    fn connect(&mut self) -> OracleResult<()>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    fn set_value(&mut self, path: &str, value: &OracleValue) -> OracleResult<()>;

    fn get_value(&mut self, path: &str) -> OracleResult<OracleValue>;

    /// Runs a command to completion.
    fn do_command(&mut self, command: &str) -> OracleResult<()>;

    /// Starts a command and returns immediately; completion is observed
    /// through `is_busy`.
    fn do_command_async(&mut self, command: &str) -> OracleResult<()>;

    fn is_busy(&mut self, app: App) -> OracleResult<bool>;
}
