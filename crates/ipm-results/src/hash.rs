//! Content-based hashing for batch ids.

use ipm_sources::TimeWindow;
use sha2::{Digest, Sha256};

pub fn compute_batch_id(
    project: &str,
    window: Option<&TimeWindow>,
    timestamp: &str,
    tool_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(project.as_bytes());
    hasher.update([0]);

    let window_json = serde_json::to_string(&window).unwrap_or_default();
    hasher.update(window_json.as_bytes());
    hasher.update([0]);

    hasher.update(timestamp.as_bytes());
    hasher.update([0]);
    hasher.update(tool_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
