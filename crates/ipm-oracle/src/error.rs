//! Engine boundary errors.

use thiserror::Error;

/// Result type for engine operations.
pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Parameter path without a usable application prefix.
    #[error("Badly formed parameter path '{path}'")]
    BadPath { path: String },

    /// Application prefix not served by the engine.
    #[error("Unrecognised application '{name}' in '{path}'")]
    UnknownApp { name: String, path: String },

    /// Operation attempted without a live session.
    #[error("Engine session is not connected")]
    NotConnected,

    /// Error reported by the engine for a value access or command.
    #[error("Engine {op} failed for '{target}': {message}")]
    Engine {
        op: &'static str,
        target: String,
        message: String,
    },

    /// A value expected to be numeric could not be read as a number.
    #[error("Value of '{path}' is not numeric: '{value}'")]
    NotNumeric { path: String, value: String },
}

impl OracleError {
    pub fn engine(op: &'static str, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            op,
            target: target.into(),
            message: message.into(),
        }
    }

    /// Failures a reconnect can plausibly clear.
    ///
    /// Malformed paths are programming errors and never transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::Engine { .. } | Self::NotNumeric { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_errors_are_not_transient() {
        assert!(!OracleError::BadPath { path: "x".into() }.is_transient());
        assert!(
            !OracleError::UnknownApp {
                name: "EXCEL".into(),
                path: "EXCEL.A1".into()
            }
            .is_transient()
        );
        assert!(OracleError::NotConnected.is_transient());
        assert!(OracleError::engine("get", "GAP.X", "lost").is_transient());
    }

    #[test]
    fn error_display_names_target() {
        let err = OracleError::engine("command", "PROSPER.ANL.SYS.CALC", "license lost");
        let msg = err.to_string();
        assert!(msg.contains("PROSPER.ANL.SYS.CALC"));
        assert!(msg.contains("license lost"));
    }
}
