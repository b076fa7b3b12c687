//! Engine session used by the tuners.

use std::path::Path;
use std::thread;

use ipm_core::Backoff;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::error::{OracleError, OracleResult};
use crate::oracle::Oracle;
use crate::paths;
use crate::value::OracleValue;

/// What a solve recomputes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveScope {
    /// Single-well system analysis in the well model.
    WellSystem,
    /// Full network solve, optionally with the choke optimizer enabled.
    Network { optimize: bool },
}

/// One stateful engine session.
///
/// Every path and command is checked for a valid application prefix before
/// it reaches the engine.
pub struct Session<O: Oracle> {
    oracle: O,
    poll: Backoff,
}

impl<O: Oracle> Session<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            poll: Backoff::busy_poll(),
        }
    }

    /// Replaces the busy-poll schedule used by slow commands.
    pub fn with_poll_schedule(mut self, poll: Backoff) -> Self {
        self.poll = poll;
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn into_inner(self) -> O {
        self.oracle
    }

    pub fn is_connected(&self) -> bool {
        self.oracle.is_connected()
    }

    pub fn connect(&mut self) -> OracleResult<()> {
        self.oracle.connect()?;
        info!("engine session connected");
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.oracle.disconnect();
        info!("engine session disconnected");
    }

    /// Drops and re-establishes the session.
    pub fn reconnect(&mut self) -> OracleResult<()> {
        warn!("reconnecting engine session");
        self.oracle.disconnect();
        self.oracle.connect()
    }

    pub fn set(&mut self, path: &str, value: impl Into<OracleValue>) -> OracleResult<()> {
        App::from_path(path)?;
        self.oracle.set_value(path, &value.into())
    }

    pub fn get(&mut self, path: &str) -> OracleResult<OracleValue> {
        App::from_path(path)?;
        self.oracle.get_value(path)
    }

    pub fn get_f64(&mut self, path: &str) -> OracleResult<f64> {
        let value = self.get(path)?;
        value.as_f64().ok_or_else(|| OracleError::NotNumeric {
            path: path.to_string(),
            value: value.to_string(),
        })
    }

    pub fn command(&mut self, command: &str) -> OracleResult<()> {
        App::from_path(command)?;
        self.oracle.do_command(command)
    }

    /// Starts a command asynchronously and blocks until the application
    /// reports it is no longer busy.
    pub fn slow_command(&mut self, command: &str) -> OracleResult<()> {
        let app = App::from_path(command)?;
        self.oracle.do_command_async(command)?;
        let mut polls = 0usize;
        for delay in self.poll.clone() {
            if !self.oracle.is_busy(app)? {
                break;
            }
            polls += 1;
            thread::sleep(delay);
        }
        debug!(command, polls, "slow command finished");
        Ok(())
    }

    /// Runs a network function and returns the network's last command result.
    pub fn network_function(&mut self, command: &str) -> OracleResult<OracleValue> {
        self.slow_command(command)?;
        self.get(paths::gap::LAST_COMMAND_RETURN)
    }

    pub fn trigger_solve(&mut self, scope: SolveScope) -> OracleResult<()> {
        match scope {
            SolveScope::WellSystem => self.command(paths::prosper::SYSTEM_CALC),
            SolveScope::Network { optimize } => {
                self.network_function(&paths::gap::solve_network(optimize))?;
                Ok(())
            }
        }
    }

    pub fn open_model(&mut self, app: App, model: &Path) -> OracleResult<()> {
        info!(%app, model = %model.display(), "opening model");
        self.slow_command(&format!("{app}.OPENFILE (\"{}\")", model.display()))
    }

    pub fn save_model(&mut self, app: App, model: &Path) -> OracleResult<()> {
        debug!(%app, model = %model.display(), "saving model");
        self.slow_command(&format!("{app}.SAVEFILE (\"{}\")", model.display()))
    }

    pub fn close_model(&mut self, app: App) -> OracleResult<()> {
        debug!(%app, "closing model");
        self.command(&format!("{app}.SHUTDOWN"))
    }
}
