//! In-memory engine stub.
//!
//! Values live in an ordered map keyed by parameter path. Commands are no-ops
//! unless a handler registered for a matching prefix rewrites the store.
//! `MASK()`/`UNMASK()` commands toggle a `<entity>.Masked` flag so mask state
//! can be asserted after a pass.

use std::collections::BTreeMap;

use crate::app::App;
use crate::error::{OracleError, OracleResult};
use crate::oracle::Oracle;
use crate::value::OracleValue;

pub type ValueStore = BTreeMap<String, OracleValue>;

type Handler = Box<dyn FnMut(&str, &mut ValueStore) -> OracleResult<()>>;

/// One interaction recorded by `ScriptedOracle`.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Connect,
    Disconnect,
    Set { path: String, value: OracleValue },
    Get { path: String },
    Command { command: String },
    AsyncCommand { command: String },
    BusyPoll { app: App },
}

#[derive(Default)]
pub struct ScriptedOracle {
    values: ValueStore,
    handlers: Vec<(String, Handler)>,
    get_faults: BTreeMap<String, usize>,
    command_faults: BTreeMap<String, usize>,
    connected: bool,
    connects: usize,
    busy_polls: usize,
    pending_busy: usize,
    calls: Vec<Call>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub with a live session already established.
    pub fn connected() -> Self {
        let mut oracle = Self::new();
        oracle.connected = true;
        oracle.connects = 1;
        oracle
    }

    pub fn with_value(mut self, path: &str, value: impl Into<OracleValue>) -> Self {
        self.insert(path, value);
        self
    }

    pub fn insert(&mut self, path: &str, value: impl Into<OracleValue>) {
        self.values.insert(path.to_string(), value.into());
    }

    pub fn value(&self, path: &str) -> Option<&OracleValue> {
        self.values.get(path)
    }

    pub fn number(&self, path: &str) -> Option<f64> {
        self.values.get(path).and_then(OracleValue::as_f64)
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    /// Registers a handler for every command starting with `prefix`.
    ///
    /// Handlers are tried in registration order; the first match runs.
    pub fn on_command<F>(&mut self, prefix: &str, handler: F)
    where
        F: FnMut(&str, &mut ValueStore) -> OracleResult<()> + 'static,
    {
        self.handlers.push((prefix.to_string(), Box::new(handler)));
    }

    /// Makes the next `times` reads of `path` fail with an engine error.
    pub fn fail_gets(&mut self, path: &str, times: usize) {
        *self.get_faults.entry(path.to_string()).or_default() += times;
    }

    /// Makes the next `times` commands starting with `prefix` fail.
    pub fn fail_commands(&mut self, prefix: &str, times: usize) {
        *self.command_faults.entry(prefix.to_string()).or_default() += times;
    }

    /// Number of busy answers each asynchronous command produces before idling.
    pub fn set_busy_polls(&mut self, polls: usize) {
        self.busy_polls = polls;
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn connect_count(&self) -> usize {
        self.connects
    }

    /// Every synchronous or asynchronous command, in issue order.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Command { command } | Call::AsyncCommand { command } => {
                    Some(command.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn count_commands(&self, prefix: &str) -> usize {
        self.commands()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Every write to `path`, in order.
    pub fn writes_to(&self, path: &str) -> Vec<OracleValue> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Set { path: p, value } if p == path => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    fn ensure_connected(&self) -> OracleResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(OracleError::NotConnected)
        }
    }

    fn take_fault(faults: &mut BTreeMap<String, usize>, key: &str) -> bool {
        let hit = faults
            .iter_mut()
            .find(|(prefix, remaining)| **remaining > 0 && key.starts_with(prefix.as_str()));
        match hit {
            Some((_, remaining)) => {
                *remaining -= 1;
                true
            }
            None => false,
        }
    }

    fn run_command(&mut self, command: &str) -> OracleResult<()> {
        self.ensure_connected()?;
        if Self::take_fault(&mut self.command_faults, command) {
            return Err(OracleError::engine("command", command, "injected fault"));
        }
        apply_mask_command(command, &mut self.values);
        if let Some((_, handler)) = self
            .handlers
            .iter_mut()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
        {
            handler(command, &mut self.values)?;
        }
        Ok(())
    }
}

fn apply_mask_command(command: &str, values: &mut ValueStore) {
    if let Some(entity) = command.strip_suffix(".UNMASK()") {
        values.insert(format!("{entity}.Masked"), OracleValue::Number(0.0));
    } else if let Some(entity) = command.strip_suffix(".MASK()") {
        values.insert(format!("{entity}.Masked"), OracleValue::Number(1.0));
    }
}

impl Oracle for ScriptedOracle {
    fn connect(&mut self) -> OracleResult<()> {
        self.calls.push(Call::Connect);
        self.connected = true;
        self.connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.calls.push(Call::Disconnect);
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_value(&mut self, path: &str, value: &OracleValue) -> OracleResult<()> {
        self.calls.push(Call::Set {
            path: path.to_string(),
            value: value.clone(),
        });
        self.ensure_connected()?;
        self.values.insert(path.to_string(), value.clone());
        Ok(())
    }

    fn get_value(&mut self, path: &str) -> OracleResult<OracleValue> {
        self.calls.push(Call::Get {
            path: path.to_string(),
        });
        self.ensure_connected()?;
        if Self::take_fault(&mut self.get_faults, path) {
            return Err(OracleError::engine("get", path, "injected fault"));
        }
        self.values
            .get(path)
            .cloned()
            .ok_or_else(|| OracleError::engine("get", path, "no such variable"))
    }

    fn do_command(&mut self, command: &str) -> OracleResult<()> {
        self.calls.push(Call::Command {
            command: command.to_string(),
        });
        self.run_command(command)
    }

    fn do_command_async(&mut self, command: &str) -> OracleResult<()> {
        self.calls.push(Call::AsyncCommand {
            command: command.to_string(),
        });
        self.run_command(command)?;
        self.pending_busy = self.busy_polls;
        Ok(())
    }

    fn is_busy(&mut self, app: App) -> OracleResult<bool> {
        self.calls.push(Call::BusyPoll { app });
        self.ensure_connected()?;
        if self.pending_busy > 0 {
            self.pending_busy -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_stub_refuses_access() {
        let mut oracle = ScriptedOracle::new();
        assert_eq!(
            oracle.get_value("GAP.X").unwrap_err(),
            OracleError::NotConnected
        );
        oracle.connect().unwrap();
        assert!(oracle.get_value("GAP.X").is_err());
    }

    #[test]
    fn injected_get_fault_fires_once() {
        let mut oracle = ScriptedOracle::connected().with_value("GAP.X", 4.0);
        oracle.fail_gets("GAP.X", 1);
        assert!(oracle.get_value("GAP.X").is_err());
        assert_eq!(oracle.get_value("GAP.X").unwrap(), OracleValue::Number(4.0));
    }

    #[test]
    fn handler_rewrites_store() {
        let mut oracle = ScriptedOracle::connected().with_value("PROSPER.IN", 2.0);
        oracle.on_command("PROSPER.ANL.SYS.CALC", |_, store| {
            let x = store.get("PROSPER.IN").and_then(OracleValue::as_f64).unwrap_or(0.0);
            store.insert("PROSPER.OUT".into(), OracleValue::Number(x * 10.0));
            Ok(())
        });
        oracle.do_command("PROSPER.ANL.SYS.CALC").unwrap();
        assert_eq!(oracle.number("PROSPER.OUT"), Some(20.0));
    }

    #[test]
    fn mask_commands_toggle_flag() {
        let mut oracle = ScriptedOracle::connected();
        oracle.do_command("GAP.MOD[{PROD}].JOINT[{A}].MASK()").unwrap();
        assert_eq!(oracle.number("GAP.MOD[{PROD}].JOINT[{A}].Masked"), Some(1.0));
        oracle.do_command("GAP.MOD[{PROD}].JOINT[{A}].UNMASK()").unwrap();
        assert_eq!(oracle.number("GAP.MOD[{PROD}].JOINT[{A}].Masked"), Some(0.0));
    }
}
