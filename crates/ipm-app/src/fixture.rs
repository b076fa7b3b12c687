//! Offline data for dry runs: in-memory sources plus the analytic engine.

use std::path::Path;
use std::time::Duration;

use ipm_core::Backoff;
use ipm_oracle::{ScriptedOracle, Session, SurrogateField};
use ipm_sources::{InMemoryHistorian, InMemoryWellTests};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::run_service::DataSources;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DryRunFixture {
    #[serde(default)]
    pub historian: InMemoryHistorian,
    #[serde(default)]
    pub well_tests: InMemoryWellTests,
    pub engine: SurrogateField,
}

impl DryRunFixture {
    pub fn parse(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content).map_err(|e| AppError::Fixture(e.to_string()))
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Fixture(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    pub fn sources(&self) -> DataSources<'_> {
        DataSources {
            historian: &self.historian,
            well_tests: &self.well_tests,
        }
    }

    /// Connected session over the analytic engine. The engine never reports
    /// busy, so slow commands are not polled with delays.
    pub fn session(&self) -> AppResult<Session<ScriptedOracle>> {
        let oracle = self.engine.clone().into_oracle();
        let mut session =
            Session::new(oracle).with_poll_schedule(Backoff::new(Duration::ZERO, 2, Duration::ZERO));
        session.connect()?;
        Ok(session)
    }
}
