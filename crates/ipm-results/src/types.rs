//! Result data types.

use ipm_sources::TimeWindow;
use serde::{Deserialize, Serialize};

pub type BatchId = String;

/// Output tables, one JSON-lines file each, appended across batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    WellTuning,
    PipeTuning,
    NetworkResults,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::WellTuning, Table::PipeTuning, Table::NetworkResults];

    pub fn file_name(self) -> &'static str {
        match self {
            Table::WellTuning => "well_tuning.jsonl",
            Table::PipeTuning => "pipe_tuning.jsonl",
            Table::NetworkResults => "network_results.jsonl",
        }
    }
}

/// One row of a table, tagged with the batch that wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row<T> {
    pub batch_id: BatchId,
    #[serde(flatten)]
    pub record: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub batch_id: BatchId,
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeWindow>,
    /// RFC 3339 start time of the batch.
    pub timestamp: String,
    pub tool_version: String,
    #[serde(default)]
    pub summary: BatchSummary,
}

/// Row counts written by a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSummary {
    pub wells_tuned: usize,
    pub wells_accepted: usize,
    pub wells_neutral: usize,
    pub groups_tuned: usize,
    pub groups_skipped: usize,
    pub network_rows: usize,
    pub optimized: bool,
}
